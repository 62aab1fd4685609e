//! Opcode definitions for the IPPcode instruction set.

/// Identifies the operation to perform.
///
/// Mnemonics are matched case-insensitively; every opcode has a fixed
/// argument count (see [`Opcode::arity`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames, variables and calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame back into the temporary frame slot.
    PopFrame,
    /// Declare a variable in a frame.
    DefVar,
    /// Push the return position and jump to a label.
    Call,
    /// Pop the return position and continue there.
    Return,

    // Data stack
    /// Push a symbol onto the data stack.
    Pushs,
    /// Pop the data stack into a variable.
    Pops,
    /// Empty the data stack.
    Clears,

    // Arithmetic
    Add,
    Sub,
    Mul,
    /// Floor division of two integers.
    Idiv,
    Adds,
    Subs,
    Muls,
    Idivs,

    // Relational
    Lt,
    Gt,
    Eq,
    Lts,
    Gts,
    Eqs,

    // Boolean
    And,
    Or,
    Not,
    Ands,
    Ors,
    Nots,

    // Conversion
    Int2Float,
    Float2Int,
    Int2Char,
    Stri2Int,
    Int2Chars,
    Stri2Ints,

    // Input / output
    /// Read one line of standard input as the given type.
    Read,
    /// Print a symbol to standard output.
    Write,

    // Strings
    Concat,
    Strlen,
    Getchar,
    Setchar,

    // Types
    /// Store the type name of a symbol as a string.
    Type,

    // Control flow
    /// Jump target; a no-op at run time.
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    JumpIfEqs,
    JumpIfNeqs,

    // Debugging
    /// Print a symbol to the diagnostic stream.
    Dprint,
    /// Dump interpreter state to the diagnostic stream.
    Break,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 51] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Clears,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Idiv,
    Opcode::Adds,
    Opcode::Subs,
    Opcode::Muls,
    Opcode::Idivs,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::Lts,
    Opcode::Gts,
    Opcode::Eqs,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Ands,
    Opcode::Ors,
    Opcode::Nots,
    Opcode::Int2Float,
    Opcode::Float2Int,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Int2Chars,
    Opcode::Stri2Ints,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::Getchar,
    Opcode::Setchar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::JumpIfEqs,
    Opcode::JumpIfNeqs,
    Opcode::Dprint,
    Opcode::Break,
];

impl Opcode {
    /// Returns the canonical (uppercase) mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Clears => "CLEARS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Idiv => "IDIV",
            Opcode::Adds => "ADDS",
            Opcode::Subs => "SUBS",
            Opcode::Muls => "MULS",
            Opcode::Idivs => "IDIVS",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::Lts => "LTS",
            Opcode::Gts => "GTS",
            Opcode::Eqs => "EQS",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Ands => "ANDS",
            Opcode::Ors => "ORS",
            Opcode::Nots => "NOTS",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Int2Chars => "INT2CHARS",
            Opcode::Stri2Ints => "STRI2INTS",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::Getchar => "GETCHAR",
            Opcode::Setchar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::JumpIfEqs => "JUMPIFEQS",
            Opcode::JumpIfNeqs => "JUMPIFNEQS",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(text: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(text))
    }

    /// Number of arguments the opcode takes.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Clears
            | Opcode::Adds
            | Opcode::Subs
            | Opcode::Muls
            | Opcode::Idivs
            | Opcode::Lts
            | Opcode::Gts
            | Opcode::Eqs
            | Opcode::Ands
            | Opcode::Ors
            | Opcode::Nots
            | Opcode::Int2Chars
            | Opcode::Stri2Ints
            | Opcode::Break => 0,

            Opcode::DefVar
            | Opcode::Call
            | Opcode::Pushs
            | Opcode::Pops
            | Opcode::Write
            | Opcode::Label
            | Opcode::Jump
            | Opcode::JumpIfEqs
            | Opcode::JumpIfNeqs
            | Opcode::Dprint => 1,

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Float
            | Opcode::Float2Int
            | Opcode::Int2Char
            | Opcode::Read
            | Opcode::Strlen
            | Opcode::Type => 2,

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Idiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::Getchar
            | Opcode::Setchar
            | Opcode::JumpIfEq
            | Opcode::JumpIfNeq => 3,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 51);
    }

    #[test]
    fn mnemonic_roundtrip() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
            assert_eq!(Opcode::from_mnemonic(m), Some(opcode));
        }
    }

    #[test]
    fn mnemonic_is_case_insensitive() {
        assert_eq!(Opcode::from_mnemonic("move"), Some(Opcode::Move));
        assert_eq!(Opcode::from_mnemonic("JumpIfEq"), Some(Opcode::JumpIfEq));
        assert_eq!(Opcode::from_mnemonic("int2chars"), Some(Opcode::Int2Chars));
    }

    #[test]
    fn unknown_mnemonic() {
        assert_eq!(Opcode::from_mnemonic("HALT"), None);
        assert_eq!(Opcode::from_mnemonic(""), None);
        assert_eq!(Opcode::from_mnemonic("MOVE "), None);
    }

    #[test]
    fn stack_variants_take_no_register_operands() {
        for op in [
            Opcode::Adds,
            Opcode::Subs,
            Opcode::Muls,
            Opcode::Idivs,
            Opcode::Lts,
            Opcode::Gts,
            Opcode::Eqs,
            Opcode::Ands,
            Opcode::Ors,
            Opcode::Nots,
            Opcode::Int2Chars,
            Opcode::Stri2Ints,
        ] {
            assert_eq!(op.arity(), 0, "{op}");
        }
        assert_eq!(Opcode::JumpIfEqs.arity(), 1);
        assert_eq!(Opcode::JumpIfNeqs.arity(), 1);
    }

    #[test]
    fn register_arities() {
        assert_eq!(Opcode::Move.arity(), 2);
        assert_eq!(Opcode::Add.arity(), 3);
        assert_eq!(Opcode::Not.arity(), 2);
        assert_eq!(Opcode::Read.arity(), 2);
        assert_eq!(Opcode::Setchar.arity(), 3);
        assert_eq!(Opcode::Write.arity(), 1);
    }
}
