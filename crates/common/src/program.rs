//! Program representation: the dense instruction table.
//!
//! Instructions arrive keyed by their `order` attribute in arbitrary
//! document order. [`Program::from_unordered`] sorts them into a dense
//! array so position `i` holds the instruction with order `i + 1`.

use crate::error::ProgramError;
use crate::instruction::Instruction;

/// An IPPcode program: instructions sorted by ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instruction table. `instructions[i].order == i + 1`.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a program from instructions that are already in order.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Build a program from instructions in any order.
    ///
    /// Orders must be positive, unique and cover exactly `1..=N`. Every
    /// instruction must carry as many arguments as its opcode takes.
    pub fn from_unordered(mut instructions: Vec<Instruction>) -> Result<Self, ProgramError> {
        instructions.sort_by_key(|instr| instr.order);

        for (idx, instr) in instructions.iter().enumerate() {
            if instr.order == 0 {
                return Err(ProgramError::InvalidOrder { order: 0 });
            }
            if idx > 0 && instructions[idx - 1].order == instr.order {
                return Err(ProgramError::DuplicateOrder { order: instr.order });
            }
            if instr.order != idx + 1 {
                return Err(ProgramError::MissingOrder { order: idx + 1 });
            }
            if !instr.has_valid_arity() {
                return Err(ProgramError::ArityMismatch {
                    order: instr.order,
                    opcode: instr.opcode.mnemonic(),
                    expected: instr.opcode.arity(),
                    found: instr.args.len(),
                });
            }
        }

        Ok(Self { instructions })
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
