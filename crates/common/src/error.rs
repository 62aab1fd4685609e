//! Structural errors for IPPcode instruction tables.

use thiserror::Error;

/// Errors raised while turning a set of decoded instructions into a
/// [`Program`](crate::Program).
///
/// These are load-time faults: they are detected before the first
/// instruction runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Order numbers start at 1.
    #[error("instruction order must be a positive integer, got {order}")]
    InvalidOrder { order: usize },

    /// Two instructions share the same order number.
    #[error("duplicate instruction order {order}")]
    DuplicateOrder { order: usize },

    /// The order numbers do not form the contiguous range 1..N.
    #[error("missing instruction with order {order}")]
    MissingOrder { order: usize },

    /// The instruction carries the wrong number of arguments for its opcode.
    #[error("instruction {order}: {opcode} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        order: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },
}

impl ProgramError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProgramError::ArityMismatch { .. } => 32,
            _ => 31,
        }
    }
}
