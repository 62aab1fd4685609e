//! Type names used by values and argument descriptors.

/// The type of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Bool,
    String,
    Float,
}

/// All value types, in definition order.
pub const ALL_DATA_TYPES: [DataType; 4] = [
    DataType::Int,
    DataType::Bool,
    DataType::String,
    DataType::Float,
];

impl DataType {
    /// The name used in `type` arguments and by the TYPE instruction.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Float => "float",
        }
    }

    /// Parse a type name. Matching is exact (lowercase).
    pub fn from_name(name: &str) -> Option<DataType> {
        ALL_DATA_TYPES.iter().copied().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared kind of an instruction argument (the `type` attribute of an
/// `argN` element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Int,
    Bool,
    String,
    Float,
    /// A `GF@name`, `LF@name` or `TF@name` reference.
    Var,
    Label,
    /// A type name, as taken by READ.
    Type,
}

/// All argument kinds, in definition order.
pub const ALL_ARG_KINDS: [ArgKind; 7] = [
    ArgKind::Int,
    ArgKind::Bool,
    ArgKind::String,
    ArgKind::Float,
    ArgKind::Var,
    ArgKind::Label,
    ArgKind::Type,
];

impl ArgKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArgKind::Int => "int",
            ArgKind::Bool => "bool",
            ArgKind::String => "string",
            ArgKind::Float => "float",
            ArgKind::Var => "var",
            ArgKind::Label => "label",
            ArgKind::Type => "type",
        }
    }

    pub fn from_name(name: &str) -> Option<ArgKind> {
        ALL_ARG_KINDS.iter().copied().find(|k| k.name() == name)
    }

    /// The value type of a literal of this kind, if it is a literal kind.
    pub fn literal_type(&self) -> Option<DataType> {
        match self {
            ArgKind::Int => Some(DataType::Int),
            ArgKind::Bool => Some(DataType::Bool),
            ArgKind::String => Some(DataType::String),
            ArgKind::Float => Some(DataType::Float),
            ArgKind::Var | ArgKind::Label | ArgKind::Type => None,
        }
    }
}

impl std::fmt::Display for ArgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_names_roundtrip() {
        for &t in &ALL_DATA_TYPES {
            assert_eq!(DataType::from_name(t.name()), Some(t));
        }
    }

    #[test]
    fn data_type_names_are_exact() {
        assert_eq!(DataType::from_name("INT"), None);
        assert_eq!(DataType::from_name("nil"), None);
        assert_eq!(DataType::from_name(""), None);
    }

    #[test]
    fn arg_kind_names_roundtrip() {
        for &k in &ALL_ARG_KINDS {
            assert_eq!(ArgKind::from_name(k.name()), Some(k));
        }
        assert_eq!(ArgKind::from_name("symb"), None);
    }

    #[test]
    fn literal_types() {
        assert_eq!(ArgKind::Int.literal_type(), Some(DataType::Int));
        assert_eq!(ArgKind::Float.literal_type(), Some(DataType::Float));
        assert_eq!(ArgKind::Var.literal_type(), None);
        assert_eq!(ArgKind::Type.literal_type(), None);
    }
}
