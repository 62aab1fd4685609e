//! IPPcode virtual machine: executes loaded instruction tables.
//!
//! The VM is a frame-based machine with:
//! - A global frame, an optional temporary frame and a stack of local frames
//! - A data stack used by PUSHS/POPS and the stack-mode opcodes
//! - A call stack of return positions for CALL/RETURN
//! - A label table built before execution, so jumps may refer forward
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{Argument, Instruction, Opcode, Program};
//! use ippcode_vm::{run_with_io, Io};
//!
//! let program = Program::new(vec![
//!     Instruction::new(1, Opcode::DefVar, vec![Argument::var("GF@x")]),
//!     Instruction::new(2, Opcode::Add, vec![
//!         Argument::var("GF@x"), Argument::int(2), Argument::int(3),
//!     ]),
//!     Instruction::new(3, Opcode::Write, vec![Argument::var("GF@x")]),
//! ]);
//!
//! let mut input: &[u8] = b"";
//! let mut output = Vec::new();
//! let mut diagnostics = Vec::new();
//! let stats = run_with_io(&program, Io::new(&mut input, &mut output, &mut diagnostics)).unwrap();
//! assert_eq!(output, b"5\n");
//! assert_eq!(stats.executed, 3);
//! ```

pub mod error;
pub mod execute;
pub mod frame;
pub mod machine;
pub mod resolve;

pub use error::RuntimeError;
pub use frame::{Environment, Frame, Scope, Slot, VarRef};
pub use machine::{ExecutionStats, Io, VM};

use ippcode_common::Program;
use std::io::{self, BufWriter};

/// Execute a program against the process's standard streams.
///
/// WRITE goes to stdout, DPRINT and BREAK to stderr, READ consumes stdin.
///
/// # Errors
///
/// Returns [`RuntimeError`] for the first fault; output produced before
/// the fault has already been written.
pub fn run(program: &Program) -> Result<ExecutionStats, RuntimeError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = BufWriter::new(io::stdout().lock());
    let mut diagnostics = io::stderr().lock();
    run_with_io(program, Io::new(&mut input, &mut output, &mut diagnostics))
}

/// Execute a program against caller-supplied streams.
pub fn run_with_io<'a>(program: &'a Program, io: Io<'a>) -> Result<ExecutionStats, RuntimeError> {
    let mut vm = VM::new(program, io);
    vm.execute()
}
