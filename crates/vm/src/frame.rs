//! The memory model: frames, the data stack and the call stack.

use crate::error::RuntimeError;
use ippcode_common::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A variable slot: `None` while declared but unassigned.
pub type Slot = Option<Value>;

/// Which frame a variable reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `GF@`: the global frame, always present.
    Global,
    /// `TF@`: the temporary frame, if one has been created.
    Temporary,
    /// `LF@`: the top of the local frame stack.
    Local,
}

impl Scope {
    pub fn prefix(&self) -> &'static str {
        match self {
            Scope::Global => "GF",
            Scope::Temporary => "TF",
            Scope::Local => "LF",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Scope> {
        match prefix {
            "GF" => Some(Scope::Global),
            "TF" => Some(Scope::Temporary),
            "LF" => Some(Scope::Local),
            _ => None,
        }
    }

    fn frame_name(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Temporary => "temporary",
            Scope::Local => "local",
        }
    }
}

/// A parsed `SCOPE@name` variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub scope: Scope,
    pub name: String,
}

impl VarRef {
    pub fn new(scope: Scope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.scope.prefix(), self.name)
    }
}

/// Named variable storage. Sorted so state dumps are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub(crate) vars: BTreeMap<String, Slot>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.vars.get(name)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, slot)) in self.vars.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(value) => write!(f, "{name}: {}", value.typed())?,
                None => write!(f, "{name}: <undefined>")?,
            }
        }
        f.write_str("}")
    }
}

/// All mutable interpreter state other than the instruction pointer.
#[derive(Debug, Default)]
pub struct Environment {
    pub(crate) global: Frame,
    pub(crate) temporary: Option<Frame>,
    pub(crate) locals: Vec<Frame>,
    pub(crate) data_stack: Vec<Value>,
    pub(crate) call_stack: Vec<usize>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the temporary frame with an empty one.
    pub fn create_frame(&mut self) {
        if let Some(old) = self.temporary.replace(Frame::default()) {
            debug!(discarded = old.len(), "temporary frame replaced");
        }
    }

    /// Move the temporary frame onto the local frame stack.
    pub fn push_frame(&mut self, at: usize) -> Result<(), RuntimeError> {
        let frame = self.temporary.take().ok_or(RuntimeError::FrameNotDefined {
            at,
            frame: Scope::Temporary.frame_name(),
        })?;
        self.locals.push(frame);
        debug!(depth = self.locals.len(), "local frame pushed");
        Ok(())
    }

    /// Pop the top local frame into the temporary frame slot.
    pub fn pop_frame(&mut self, at: usize) -> Result<(), RuntimeError> {
        let frame = self.locals.pop().ok_or(RuntimeError::FrameNotDefined {
            at,
            frame: Scope::Local.frame_name(),
        })?;
        self.temporary = Some(frame);
        debug!(depth = self.locals.len(), "local frame popped");
        Ok(())
    }

    /// Declare an unassigned variable.
    pub fn declare(&mut self, var: &VarRef, at: usize) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(var.scope, at)?;
        if frame.vars.contains_key(&var.name) {
            return Err(RuntimeError::Redefinition {
                at,
                name: var.to_string(),
            });
        }
        frame.vars.insert(var.name.clone(), None);
        Ok(())
    }

    /// Look up an existing slot for reading.
    pub fn slot(&self, var: &VarRef, at: usize) -> Result<&Slot, RuntimeError> {
        self.frame(var.scope, at)?
            .vars
            .get(&var.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                at,
                name: var.to_string(),
            })
    }

    /// Look up an existing slot for in-place assignment.
    pub fn slot_mut(&mut self, var: &VarRef, at: usize) -> Result<&mut Slot, RuntimeError> {
        self.frame_mut(var.scope, at)?
            .vars
            .get_mut(&var.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                at,
                name: var.to_string(),
            })
    }

    /// Number of declared variables across every reachable frame.
    pub fn live_variables(&self) -> usize {
        self.global.len()
            + self.temporary.as_ref().map_or(0, Frame::len)
            + self.locals.iter().map(Frame::len).sum::<usize>()
    }

    pub fn push_value(&mut self, value: Value) {
        self.data_stack.push(value);
    }

    pub fn pop_value(&mut self, at: usize) -> Result<Value, RuntimeError> {
        self.data_stack
            .pop()
            .ok_or(RuntimeError::DataStackUnderflow { at })
    }

    pub fn clear_values(&mut self) {
        self.data_stack.clear();
    }

    pub fn push_return(&mut self, target: usize) {
        self.call_stack.push(target);
    }

    pub fn pop_return(&mut self, at: usize) -> Result<usize, RuntimeError> {
        self.call_stack
            .pop()
            .ok_or(RuntimeError::CallStackUnderflow { at })
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Local frames, bottom first.
    pub fn locals(&self) -> &[Frame] {
        &self.locals
    }

    /// Data stack, bottom first.
    pub fn data_stack(&self) -> &[Value] {
        &self.data_stack
    }

    fn frame(&self, scope: Scope, at: usize) -> Result<&Frame, RuntimeError> {
        let frame = match scope {
            Scope::Global => Some(&self.global),
            Scope::Temporary => self.temporary.as_ref(),
            Scope::Local => self.locals.last(),
        };
        frame.ok_or(RuntimeError::FrameNotDefined {
            at,
            frame: scope.frame_name(),
        })
    }

    fn frame_mut(&mut self, scope: Scope, at: usize) -> Result<&mut Frame, RuntimeError> {
        let frame = match scope {
            Scope::Global => Some(&mut self.global),
            Scope::Temporary => self.temporary.as_mut(),
            Scope::Local => self.locals.last_mut(),
        };
        frame.ok_or(RuntimeError::FrameNotDefined {
            at,
            frame: scope.frame_name(),
        })
    }
}
