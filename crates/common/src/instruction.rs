//! Decoded instructions and their argument descriptors.

use crate::data_type::ArgKind;
use crate::opcode::Opcode;

/// One raw argument: its declared kind and literal text.
///
/// The text is kept exactly as it appeared in the program file; it is
/// validated and decoded lazily when the instruction executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub kind: ArgKind,
    /// `None` when the element had no text content (an empty string literal).
    pub text: Option<String>,
}

impl Argument {
    pub fn new(kind: ArgKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
        }
    }

    /// An argument with no text content.
    pub fn empty(kind: ArgKind) -> Self {
        Self { kind, text: None }
    }

    pub fn var(text: impl Into<String>) -> Self {
        Self::new(ArgKind::Var, text)
    }

    pub fn int(value: i64) -> Self {
        Self::new(ArgKind::Int, value.to_string())
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ArgKind::Bool, if value { "true" } else { "false" })
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(ArgKind::String, text)
    }

    pub fn float(text: impl Into<String>) -> Self {
        Self::new(ArgKind::Float, text)
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(ArgKind::Label, text)
    }

    pub fn type_name(text: impl Into<String>) -> Self {
        Self::new(ArgKind::Type, text)
    }

    /// The text, or `""` when absent.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// A single decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The `order` attribute: 1-based position in the program.
    pub order: usize,
    pub opcode: Opcode,
    pub args: Vec<Argument>,
}

impl Instruction {
    pub fn new(order: usize, opcode: Opcode, args: Vec<Argument>) -> Self {
        Self {
            order,
            opcode,
            args,
        }
    }

    /// Returns true if the argument count matches the opcode's arity.
    pub fn has_valid_arity(&self) -> bool {
        self.args.len() == self.opcode.arity()
    }
}
