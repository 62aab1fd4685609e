//! Error types for the IPPcode program loader.

use ippcode_common::ProgramError;
use thiserror::Error;

/// Errors produced while turning a program file into a [`Program`].
///
/// [`Program`]: ippcode_common::Program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The source file could not be opened or read.
    #[error("cannot read '{path}': {message}")]
    Read { path: String, message: String },

    /// The document is not well-formed XML.
    #[error("malformed XML: {message}")]
    Xml { message: String },

    /// The root element is not `<program language="IPPcode18">`.
    #[error("root element must be <program language=\"IPPcode18\">")]
    InvalidRoot,

    /// An element appeared where it is not allowed.
    #[error("unexpected element <{found}> inside <{parent}>")]
    UnexpectedElement { parent: String, found: String },

    /// An `<instruction>` lacks a required attribute.
    #[error("instruction #{position} is missing the '{attribute}' attribute")]
    MissingAttribute {
        position: usize,
        attribute: &'static str,
    },

    /// The `order` attribute is not a positive integer.
    #[error("order attribute must be a positive integer, got '{text}'")]
    InvalidOrder { text: String },

    /// The `opcode` attribute names no known instruction.
    #[error("unknown opcode '{opcode}' at instruction {order}")]
    UnknownOpcode { order: usize, opcode: String },

    /// An `argN` element expected by the opcode is absent.
    #[error("missing <{name}> at instruction {order}")]
    MissingArgument { order: usize, name: String },

    /// An argument element has no `type` attribute.
    #[error("<{name}> has no type attribute at instruction {order}")]
    MissingArgumentType { order: usize, name: String },

    /// An argument `type` names no known argument kind.
    #[error("unknown argument type '{kind}' at instruction {order}")]
    UnknownArgumentKind { order: usize, kind: String },

    /// The instruction table is structurally inconsistent.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

impl LoadError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Read { .. } => 11,
            LoadError::Xml { .. }
            | LoadError::InvalidRoot
            | LoadError::UnexpectedElement { .. }
            | LoadError::MissingAttribute { .. }
            | LoadError::InvalidOrder { .. }
            | LoadError::MissingArgument { .. } => 31,
            LoadError::UnknownOpcode { .. }
            | LoadError::MissingArgumentType { .. }
            | LoadError::UnknownArgumentKind { .. } => 32,
            LoadError::Program(err) => err.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = LoadError::UnknownOpcode {
            order: 3,
            opcode: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "unknown opcode 'FOO' at instruction 3");
    }

    #[test]
    fn error_display_missing_attribute() {
        let e = LoadError::MissingAttribute {
            position: 2,
            attribute: "order",
        };
        assert_eq!(
            e.to_string(),
            "instruction #2 is missing the 'order' attribute"
        );
    }

    #[test]
    fn program_errors_pass_through() {
        let e = LoadError::from(ProgramError::MissingOrder { order: 4 });
        assert_eq!(e.to_string(), ProgramError::MissingOrder { order: 4 }.to_string());
        assert_eq!(e.exit_code(), 31);
    }

    #[test]
    fn exit_codes() {
        let read = LoadError::Read {
            path: "x.xml".into(),
            message: "not found".into(),
        };
        assert_eq!(read.exit_code(), 11);
        assert_eq!(LoadError::InvalidRoot.exit_code(), 31);
        assert_eq!(
            LoadError::MissingArgument {
                order: 1,
                name: "arg2".into()
            }
            .exit_code(),
            31
        );
        assert_eq!(
            LoadError::UnknownArgumentKind {
                order: 1,
                kind: "nil".into()
            }
            .exit_code(),
            32
        );
        let arity = LoadError::from(ProgramError::ArityMismatch {
            order: 1,
            opcode: "ADD",
            expected: 3,
            found: 2,
        });
        assert_eq!(arity.exit_code(), 32);
    }
}
