//! Argument resolution: turning raw argument descriptors into values,
//! variable references, labels and type names.
//!
//! Lexical checks happen here, lazily, when an instruction executes. A
//! malformed descriptor is an operand type error (exit code 53), never a
//! lookup error.

use crate::error::RuntimeError;
use crate::frame::{Scope, VarRef};
use crate::machine::VM;
use ippcode_common::{parse_hex_float, ArgKind, Argument, DataType, Value};
use regex::Regex;
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(GF|TF|LF)@([a-zA-Z_\-$&%*][\w\-$&%*]*)$").expect("variable pattern compiles")
});

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_\-$&%*][\w\-$&%*]*$").expect("label pattern compiles")
});

/// Printable characters other than `#` and `\`, or `\ddd` escapes.
static STRING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^\s#\\\p{Cc}]|\\[0-9]{3})*$").expect("string pattern compiles")
});

fn expect_kind(arg: &Argument, kind: ArgKind, at: usize) -> Result<(), RuntimeError> {
    if arg.kind == kind {
        Ok(())
    } else {
        Err(RuntimeError::UnexpectedArgument {
            at,
            expected: kind.name(),
            found: arg.kind,
        })
    }
}

fn malformed(arg: &Argument, at: usize) -> RuntimeError {
    RuntimeError::MalformedLiteral {
        at,
        kind: arg.kind,
        text: arg.text_or_empty().to_string(),
    }
}

/// Parse a `var` argument into a variable reference.
pub fn parse_var_ref(arg: &Argument, at: usize) -> Result<VarRef, RuntimeError> {
    expect_kind(arg, ArgKind::Var, at)?;
    let text = arg.text.as_deref().ok_or_else(|| malformed(arg, at))?;
    let caps = VAR_PATTERN
        .captures(text)
        .ok_or_else(|| malformed(arg, at))?;
    let scope = Scope::from_prefix(&caps[1]).ok_or_else(|| malformed(arg, at))?;
    Ok(VarRef::new(scope, &caps[2]))
}

/// Parse a `label` argument and return the label name.
pub fn parse_label(arg: &Argument, at: usize) -> Result<&str, RuntimeError> {
    expect_kind(arg, ArgKind::Label, at)?;
    match arg.text.as_deref() {
        Some(text) if LABEL_PATTERN.is_match(text) => Ok(text),
        _ => Err(malformed(arg, at)),
    }
}

/// Parse a `type` argument.
pub fn parse_type(arg: &Argument, at: usize) -> Result<DataType, RuntimeError> {
    expect_kind(arg, ArgKind::Type, at)?;
    arg.text
        .as_deref()
        .and_then(DataType::from_name)
        .ok_or_else(|| malformed(arg, at))
}

/// Decode a literal argument of kind int, bool, string or float.
pub fn parse_literal(arg: &Argument, at: usize) -> Result<Value, RuntimeError> {
    let Some(data_type) = arg.kind.literal_type() else {
        return Err(RuntimeError::UnexpectedArgument {
            at,
            expected: "symbol",
            found: arg.kind,
        });
    };
    match data_type {
        DataType::Int => arg
            .text
            .as_deref()
            .and_then(|t| t.trim().parse::<i64>().ok())
            .map(Value::Int)
            .ok_or_else(|| malformed(arg, at)),
        DataType::Bool => match arg.text.as_deref() {
            Some("true") => Ok(Value::Bool(true)),
            Some("false") => Ok(Value::Bool(false)),
            _ => Err(malformed(arg, at)),
        },
        DataType::String => match arg.text.as_deref() {
            None => Ok(Value::String(String::new())),
            Some(text) if STRING_PATTERN.is_match(text) => decode_escapes(text, at).map(Value::String),
            Some(_) => Err(malformed(arg, at)),
        },
        DataType::Float => arg
            .text
            .as_deref()
            .and_then(parse_hex_float)
            .map(Value::Float)
            .ok_or_else(|| malformed(arg, at)),
    }
}

/// Replace every `\ddd` escape with the code point it names.
///
/// The text must already match the string literal pattern, so every
/// backslash is followed by exactly three ASCII digits.
pub fn decode_escapes(text: &str, at: usize) -> Result<String, RuntimeError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let digits: String = chars.by_ref().take(3).collect();
        let code = digits
            .parse::<u32>()
            .map_err(|_| RuntimeError::InvalidCodePoint {
                at,
                value: format!("\\{digits}"),
            })?;
        let decoded = char::from_u32(code).ok_or_else(|| RuntimeError::InvalidCodePoint {
            at,
            value: format!("\\{digits}"),
        })?;
        out.push(decoded);
    }
    Ok(out)
}

impl<'a> VM<'a> {
    /// Resolve a symbol (literal or defined variable) to a value.
    pub(crate) fn symbol(&self, arg: &Argument) -> Result<Value, RuntimeError> {
        let at = self.order();
        match self.symbol_or_none(arg)? {
            Some(value) => Ok(value),
            None => Err(RuntimeError::MissingValue {
                at,
                name: arg.text_or_empty().to_string(),
            }),
        }
    }

    /// Resolve a symbol, yielding `None` for a declared but unassigned
    /// variable instead of failing.
    pub(crate) fn symbol_or_none(&self, arg: &Argument) -> Result<Option<Value>, RuntimeError> {
        let at = self.order();
        if arg.kind == ArgKind::Var {
            let var = parse_var_ref(arg, at)?;
            Ok(self.env.slot(&var, at)?.clone())
        } else {
            parse_literal(arg, at).map(Some)
        }
    }

    /// Parse a destination argument and check that the variable exists.
    pub(crate) fn destination(&self, arg: &Argument) -> Result<VarRef, RuntimeError> {
        let at = self.order();
        let var = parse_var_ref(arg, at)?;
        self.env.slot(&var, at)?;
        Ok(var)
    }

    /// Store a value into an existing variable.
    pub(crate) fn assign(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        let at = self.order();
        *self.env.slot_mut(var, at)? = Some(value);
        Ok(())
    }
}
