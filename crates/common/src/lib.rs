//! IPPcode common types.
//!
//! This crate provides the data structures shared by the loader, the
//! virtual machine and the CLI:
//!
//! - [`Opcode`]: every instruction mnemonic with its fixed arity
//! - [`ArgKind`] / [`DataType`]: argument descriptor kinds and value types
//! - [`Argument`] / [`Instruction`]: decoded, not yet validated instructions
//! - [`Program`]: the dense, order-sorted instruction table
//! - [`Value`]: runtime values
//! - [`parse_hex_float`]: the float literal syntax
//! - [`ProgramError`]: structural faults in an instruction table

pub mod data_type;
pub mod error;
pub mod hexfloat;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use data_type::{ArgKind, DataType};
pub use error::ProgramError;
pub use hexfloat::parse_hex_float;
pub use instruction::{Argument, Instruction};
pub use opcode::Opcode;
pub use program::Program;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy that generates a random opcode.
    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(&opcode::ALL_OPCODES[..])
    }

    proptest! {
        /// Any permutation of a contiguous order range sorts back into 1..=N.
        #[test]
        fn from_unordered_accepts_any_permutation(
            ops in prop::collection::vec(arb_opcode(), 1..40),
            seed in any::<u64>(),
        ) {
            let mut instrs: Vec<Instruction> = ops
                .iter()
                .enumerate()
                .map(|(i, &op)| {
                    let args = (0..op.arity()).map(|_| Argument::int(0)).collect();
                    Instruction::new(i + 1, op, args)
                })
                .collect();
            // Deterministic shuffle driven by the seed.
            let len = instrs.len();
            for i in 0..len {
                let j = ((seed.rotate_left(i as u32) as usize) ^ i) % len;
                instrs.swap(i, j);
            }

            let program = Program::from_unordered(instrs).unwrap();
            for (idx, instr) in program.instructions.iter().enumerate() {
                prop_assert_eq!(instr.order, idx + 1);
                prop_assert_eq!(instr.opcode, ops[idx]);
            }
        }

        /// Integral values written as hex parse back exactly.
        #[test]
        fn hex_integers_parse_exactly(n in 0u32..u32::MAX) {
            let text = format!("0x{n:x}p+0");
            prop_assert_eq!(parse_hex_float(&text), Some(n as f64));
        }

        /// A power-of-two exponent scales the mantissa exactly.
        #[test]
        fn exponent_scales(m in 1u16..u16::MAX, e in -60i32..60) {
            let text = format!("0x{m:x}p{e}");
            prop_assert_eq!(parse_hex_float(&text), Some(m as f64 * 2f64.powi(e)));
        }
    }
}
