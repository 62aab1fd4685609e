//! Runtime errors for the IPPcode VM.
//!
//! Every error carries the order number of the offending instruction
//! (`at`) and maps to a fixed process exit code.

use ippcode_common::ArgKind;
use thiserror::Error;

/// Errors that occur during program execution.
///
/// All of them are fatal: the interpreter stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The instruction carries the wrong number of arguments.
    #[error("{opcode} expects {expected} argument(s), got {found} at instruction {at}")]
    InvalidArity {
        at: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// CALL, JUMP or a conditional jump names a label that does not exist.
    #[error("label '{label}' not found at instruction {at}")]
    LabelNotFound { at: usize, label: String },

    /// The same label is defined twice.
    #[error("label '{label}' redefined at instruction {at}")]
    DuplicateLabel { at: usize, label: String },

    /// An argument descriptor of the wrong kind for its operand position.
    #[error("expected {expected} argument, got {found} at instruction {at}")]
    UnexpectedArgument {
        at: usize,
        expected: &'static str,
        found: ArgKind,
    },

    /// Literal text that does not match the syntax of its kind.
    #[error("malformed {kind} literal '{text}' at instruction {at}")]
    MalformedLiteral {
        at: usize,
        kind: ArgKind,
        text: String,
    },

    /// Operand values of the wrong type for the operation.
    #[error("{opcode}: {expected} at instruction {at}")]
    TypeMismatch {
        at: usize,
        opcode: &'static str,
        expected: &'static str,
    },

    /// The frame exists but holds no variable with this name.
    #[error("variable {name} does not exist at instruction {at}")]
    UndefinedVariable { at: usize, name: String },

    /// TF or LF accessed while no such frame exists.
    #[error("{frame} frame does not exist at instruction {at}")]
    FrameNotDefined { at: usize, frame: &'static str },

    /// The variable is declared but has never been assigned.
    #[error("variable {name} has no value at instruction {at}")]
    MissingValue { at: usize, name: String },

    /// Pop from an empty data stack.
    #[error("data stack is empty at instruction {at}")]
    DataStackUnderflow { at: usize },

    /// RETURN with an empty call stack.
    #[error("call stack is empty at instruction {at}")]
    CallStackUnderflow { at: usize },

    /// IDIV or IDIVS with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// String index outside `0..length`.
    #[error("string index {index} out of range (length {length}) at instruction {at}")]
    StringIndexOutOfRange { at: usize, index: i64, length: usize },

    /// SETCHAR with an empty replacement string.
    #[error("SETCHAR replacement string is empty at instruction {at}")]
    EmptyReplacement { at: usize },

    /// INT2CHAR operand, or a `\ddd` escape, that is not a Unicode scalar value.
    #[error("{value} is not a valid Unicode code point at instruction {at}")]
    InvalidCodePoint { at: usize, value: String },

    /// DEFVAR of a name already present in the frame.
    #[error("variable {name} redefined at instruction {at}")]
    Redefinition { at: usize, name: String },

    /// Reading input or writing output failed.
    #[error("i/o failure at instruction {at}: {message}")]
    Io { at: usize, message: String },
}

impl RuntimeError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::InvalidArity { .. } => 32,
            RuntimeError::LabelNotFound { .. } => 52,
            RuntimeError::UnexpectedArgument { .. }
            | RuntimeError::MalformedLiteral { .. }
            | RuntimeError::TypeMismatch { .. } => 53,
            RuntimeError::UndefinedVariable { .. } => 54,
            RuntimeError::FrameNotDefined { .. } => 55,
            RuntimeError::MissingValue { .. }
            | RuntimeError::DataStackUnderflow { .. }
            | RuntimeError::CallStackUnderflow { .. }
            | RuntimeError::DuplicateLabel { .. } => 56,
            RuntimeError::DivisionByZero { .. } => 57,
            RuntimeError::StringIndexOutOfRange { .. }
            | RuntimeError::EmptyReplacement { .. }
            | RuntimeError::InvalidCodePoint { .. } => 58,
            RuntimeError::Redefinition { .. } => 59,
            RuntimeError::Io { .. } => 99,
        }
    }

    /// Order number of the instruction that failed.
    pub fn at(&self) -> usize {
        match self {
            RuntimeError::InvalidArity { at, .. }
            | RuntimeError::LabelNotFound { at, .. }
            | RuntimeError::DuplicateLabel { at, .. }
            | RuntimeError::UnexpectedArgument { at, .. }
            | RuntimeError::MalformedLiteral { at, .. }
            | RuntimeError::TypeMismatch { at, .. }
            | RuntimeError::UndefinedVariable { at, .. }
            | RuntimeError::FrameNotDefined { at, .. }
            | RuntimeError::MissingValue { at, .. }
            | RuntimeError::DataStackUnderflow { at }
            | RuntimeError::CallStackUnderflow { at }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::StringIndexOutOfRange { at, .. }
            | RuntimeError::EmptyReplacement { at }
            | RuntimeError::InvalidCodePoint { at, .. }
            | RuntimeError::Redefinition { at, .. }
            | RuntimeError::Io { at, .. } => *at,
        }
    }
}
