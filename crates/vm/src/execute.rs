//! Main execution loop and opcode dispatch for the IPPcode VM.

use crate::error::RuntimeError;
use crate::machine::{ExecutionStats, Flow, VM};
use crate::resolve::{parse_label, parse_type, parse_var_ref};
use ippcode_common::{DataType, Instruction, Opcode, Value};
use std::cmp::Ordering;
use tracing::{debug, trace};

impl<'a> VM<'a> {
    /// Execute the program until it runs past its last instruction or an
    /// error occurs.
    pub fn execute(&mut self) -> Result<ExecutionStats, RuntimeError> {
        self.scan_labels()?;
        self.ip = 0;

        while let Some(instr) = self.fetch() {
            trace!(order = instr.order, opcode = %instr.opcode, "execute");
            let flow = self.step(instr)?;
            self.record_step();
            self.ip = match flow {
                Flow::Next => self.ip + 1,
                Flow::Jump(target) => target,
            };
        }

        self.io.output.flush().map_err(|e| self.io_error(e))?;
        debug!(
            executed = self.stats.executed,
            max_live_variables = self.stats.max_live_variables,
            "program finished"
        );
        Ok(self.stats)
    }

    /// Execute a single instruction and report where control goes next.
    fn step(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        if !instr.has_valid_arity() {
            return Err(RuntimeError::InvalidArity {
                at: instr.order,
                opcode: instr.opcode.mnemonic(),
                expected: instr.opcode.arity(),
                found: instr.args.len(),
            });
        }

        match instr.opcode {
            // Frames and calls
            Opcode::CreateFrame => {
                self.env.create_frame();
                Ok(Flow::Next)
            }
            Opcode::PushFrame => {
                self.env.push_frame(instr.order)?;
                Ok(Flow::Next)
            }
            Opcode::PopFrame => {
                self.env.pop_frame(instr.order)?;
                Ok(Flow::Next)
            }
            Opcode::DefVar => self.exec_defvar(instr),
            Opcode::Move => self.exec_move(instr),
            Opcode::Call => self.exec_call(instr),
            Opcode::Return => {
                let target = self.env.pop_return(instr.order)?;
                Ok(Flow::Jump(target))
            }

            // Data stack
            Opcode::Pushs => {
                let value = self.symbol(&instr.args[0])?;
                self.env.push_value(value);
                Ok(Flow::Next)
            }
            Opcode::Pops => {
                let dest = self.destination(&instr.args[0])?;
                let value = self.env.pop_value(instr.order)?;
                self.assign(&dest, value)?;
                Ok(Flow::Next)
            }
            Opcode::Clears => {
                self.env.clear_values();
                Ok(Flow::Next)
            }

            // Arithmetic
            Opcode::Add => self.exec_binary(instr, |vm, a, b| {
                vm.arith(Opcode::Add, a, b, i64::wrapping_add, |x, y| x + y)
            }),
            Opcode::Sub => self.exec_binary(instr, |vm, a, b| {
                vm.arith(Opcode::Sub, a, b, i64::wrapping_sub, |x, y| x - y)
            }),
            Opcode::Mul => self.exec_binary(instr, |vm, a, b| {
                vm.arith(Opcode::Mul, a, b, i64::wrapping_mul, |x, y| x * y)
            }),
            Opcode::Idiv => self.exec_binary(instr, |vm, a, b| vm.idiv(Opcode::Idiv, a, b)),
            Opcode::Adds => self.exec_binary_stack(|vm, a, b| {
                vm.arith(Opcode::Adds, a, b, i64::wrapping_add, |x, y| x + y)
            }),
            Opcode::Subs => self.exec_binary_stack(|vm, a, b| {
                vm.arith(Opcode::Subs, a, b, i64::wrapping_sub, |x, y| x - y)
            }),
            Opcode::Muls => self.exec_binary_stack(|vm, a, b| {
                vm.arith(Opcode::Muls, a, b, i64::wrapping_mul, |x, y| x * y)
            }),
            Opcode::Idivs => self.exec_binary_stack(|vm, a, b| vm.idiv(Opcode::Idivs, a, b)),

            // Relational
            Opcode::Lt => self.exec_binary(instr, |vm, a, b| {
                vm.relation(Opcode::Lt, a, b, Ordering::is_lt)
            }),
            Opcode::Gt => self.exec_binary(instr, |vm, a, b| {
                vm.relation(Opcode::Gt, a, b, Ordering::is_gt)
            }),
            Opcode::Eq => self.exec_binary(instr, |vm, a, b| {
                vm.equals(Opcode::Eq, &a, &b).map(Value::Bool)
            }),
            Opcode::Lts => self.exec_binary_stack(|vm, a, b| {
                vm.relation(Opcode::Lts, a, b, Ordering::is_lt)
            }),
            Opcode::Gts => self.exec_binary_stack(|vm, a, b| {
                vm.relation(Opcode::Gts, a, b, Ordering::is_gt)
            }),
            Opcode::Eqs => self.exec_binary_stack(|vm, a, b| {
                vm.equals(Opcode::Eqs, &a, &b).map(Value::Bool)
            }),

            // Boolean
            Opcode::And => {
                self.exec_binary(instr, |vm, a, b| vm.logic(Opcode::And, a, b, |x, y| x && y))
            }
            Opcode::Or => {
                self.exec_binary(instr, |vm, a, b| vm.logic(Opcode::Or, a, b, |x, y| x || y))
            }
            Opcode::Not => self.exec_unary(instr, |vm, a| vm.negate(Opcode::Not, a)),
            Opcode::Ands => {
                self.exec_binary_stack(|vm, a, b| vm.logic(Opcode::Ands, a, b, |x, y| x && y))
            }
            Opcode::Ors => {
                self.exec_binary_stack(|vm, a, b| vm.logic(Opcode::Ors, a, b, |x, y| x || y))
            }
            Opcode::Nots => self.exec_unary_stack(|vm, a| vm.negate(Opcode::Nots, a)),

            // Conversion
            Opcode::Int2Float => self.exec_unary(instr, |vm, a| match a {
                Value::Int(n) => Ok(Value::Float(n as f64)),
                _ => Err(vm.type_mismatch(Opcode::Int2Float, "operand must be int")),
            }),
            Opcode::Float2Int => self.exec_unary(instr, |vm, a| match a {
                Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
                _ => Err(vm.type_mismatch(Opcode::Float2Int, "operand must be a finite float")),
            }),
            Opcode::Int2Char => self.exec_unary(instr, |vm, a| vm.int_to_char(a)),
            Opcode::Int2Chars => self.exec_unary_stack(|vm, a| vm.int_to_char(a)),
            Opcode::Stri2Int => self.exec_binary(instr, |vm, a, b| {
                vm.char_at(Opcode::Stri2Int, a, b).map(code_point)
            }),
            Opcode::Stri2Ints => self.exec_binary_stack(|vm, a, b| {
                vm.char_at(Opcode::Stri2Ints, a, b).map(code_point)
            }),

            // Input / output
            Opcode::Read => self.exec_read(instr),
            Opcode::Write => {
                let value = self.symbol(&instr.args[0])?;
                writeln!(self.io.output, "{value}").map_err(|e| self.io_error(e))?;
                Ok(Flow::Next)
            }

            // Strings
            Opcode::Concat => self.exec_binary(instr, |vm, a, b| match (a, b) {
                (Value::String(mut x), Value::String(y)) => {
                    x.push_str(&y);
                    Ok(Value::String(x))
                }
                _ => Err(vm.type_mismatch(Opcode::Concat, "operands must be strings")),
            }),
            Opcode::Strlen => self.exec_unary(instr, |vm, a| match a {
                Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
                _ => Err(vm.type_mismatch(Opcode::Strlen, "operand must be a string")),
            }),
            Opcode::Getchar => self.exec_binary(instr, |vm, a, b| {
                vm.char_at(Opcode::Getchar, a, b)
                    .map(|c| Value::String(c.to_string()))
            }),
            Opcode::Setchar => self.exec_setchar(instr),

            // Types
            Opcode::Type => {
                let dest = self.destination(&instr.args[0])?;
                let name = self
                    .symbol_or_none(&instr.args[1])?
                    .map(|v| v.data_type().name())
                    .unwrap_or("");
                self.assign(&dest, Value::String(name.to_string()))?;
                Ok(Flow::Next)
            }

            // Control flow
            Opcode::Label => Ok(Flow::Next),
            Opcode::Jump => Ok(Flow::Jump(self.jump_target(instr)?)),
            Opcode::JumpIfEq | Opcode::JumpIfNeq => {
                let a = self.symbol(&instr.args[1])?;
                let b = self.symbol(&instr.args[2])?;
                let target = self.jump_target(instr)?;
                self.branch_if(instr.opcode, target, a, b)
            }
            Opcode::JumpIfEqs | Opcode::JumpIfNeqs => {
                let target = self.jump_target(instr)?;
                let b = self.env.pop_value(instr.order)?;
                let a = self.env.pop_value(instr.order)?;
                self.branch_if(instr.opcode, target, a, b)
            }

            // Debugging
            Opcode::Dprint => {
                let value = self.symbol(&instr.args[0])?;
                writeln!(self.io.diagnostics, "{value}").map_err(|e| self.io_error(e))?;
                Ok(Flow::Next)
            }
            Opcode::Break => {
                self.dump_state().map_err(|e| self.io_error(e))?;
                Ok(Flow::Next)
            }
        }
    }

    // ---- Instruction shapes ----

    /// `OP var symb symb`: resolve both operands, store the result.
    fn exec_binary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(&Self, Value, Value) -> Result<Value, RuntimeError>,
    ) -> Result<Flow, RuntimeError> {
        let dest = self.destination(&instr.args[0])?;
        let a = self.symbol(&instr.args[1])?;
        let b = self.symbol(&instr.args[2])?;
        let result = op(&*self, a, b)?;
        self.assign(&dest, result)?;
        Ok(Flow::Next)
    }

    /// `OP var symb`: resolve the operand, store the result.
    fn exec_unary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(&Self, Value) -> Result<Value, RuntimeError>,
    ) -> Result<Flow, RuntimeError> {
        let dest = self.destination(&instr.args[0])?;
        let a = self.symbol(&instr.args[1])?;
        let result = op(&*self, a)?;
        self.assign(&dest, result)?;
        Ok(Flow::Next)
    }

    /// Stack form: pop the right operand, then the left, push the result.
    fn exec_binary_stack(
        &mut self,
        op: impl FnOnce(&Self, Value, Value) -> Result<Value, RuntimeError>,
    ) -> Result<Flow, RuntimeError> {
        let at = self.order();
        let b = self.env.pop_value(at)?;
        let a = self.env.pop_value(at)?;
        let result = op(&*self, a, b)?;
        self.env.push_value(result);
        Ok(Flow::Next)
    }

    /// Stack form: pop one operand, push the result.
    fn exec_unary_stack(
        &mut self,
        op: impl FnOnce(&Self, Value) -> Result<Value, RuntimeError>,
    ) -> Result<Flow, RuntimeError> {
        let a = self.env.pop_value(self.order())?;
        let result = op(&*self, a)?;
        self.env.push_value(result);
        Ok(Flow::Next)
    }

    // ---- Frames, variables and calls ----

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let var = parse_var_ref(&instr.args[0], instr.order)?;
        self.env.declare(&var, instr.order)?;
        Ok(Flow::Next)
    }

    fn exec_move(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.destination(&instr.args[0])?;
        let value = self.symbol(&instr.args[1])?;
        self.assign(&dest, value)?;
        Ok(Flow::Next)
    }

    /// The return address is the instruction after the CALL; RETURN
    /// resumes there without a further increment.
    fn exec_call(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let target = self.jump_target(instr)?;
        self.env.push_return(self.ip + 1);
        Ok(Flow::Jump(target))
    }

    /// Resolve the label in the first argument of a jump or call.
    fn jump_target(&self, instr: &Instruction) -> Result<usize, RuntimeError> {
        let label = parse_label(&instr.args[0], instr.order)?;
        self.label_target(label)
    }

    fn branch_if(
        &self,
        opcode: Opcode,
        target: usize,
        a: Value,
        b: Value,
    ) -> Result<Flow, RuntimeError> {
        let equal = self.equals(opcode, &a, &b)?;
        let want_equal = matches!(opcode, Opcode::JumpIfEq | Opcode::JumpIfEqs);
        if equal == want_equal {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }

    // ---- Input ----

    fn exec_read(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.destination(&instr.args[0])?;
        let data_type = parse_type(&instr.args[1], instr.order)?;

        let mut line = String::new();
        let read = self
            .io
            .input
            .read_line(&mut line)
            .map_err(|e| self.io_error(e))?;
        let input = if read == 0 {
            None
        } else {
            Some(line.strip_suffix('\n').unwrap_or(&line).trim_end_matches('\r'))
        };

        let value = input
            .and_then(|text| read_value(data_type, text))
            .unwrap_or_else(|| Value::default_for(data_type));
        self.assign(&dest, value)?;
        Ok(Flow::Next)
    }

    // ---- Strings ----

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.destination(&instr.args[0])?;
        let index = self.symbol(&instr.args[1])?;
        let replacement = self.symbol(&instr.args[2])?;

        let (index, replacement) = match (index, replacement) {
            (Value::Int(i), Value::String(s)) => (i, s),
            _ => {
                return Err(
                    self.type_mismatch(Opcode::Setchar, "operands must be int and string")
                )
            }
        };
        let current = match self.env.slot(&dest, instr.order)? {
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(self.type_mismatch(Opcode::Setchar, "target must hold a string"))
            }
            None => {
                return Err(RuntimeError::MissingValue {
                    at: instr.order,
                    name: dest.to_string(),
                })
            }
        };

        let length = current.chars().count();
        let position = checked_index(index, length).ok_or(RuntimeError::StringIndexOutOfRange {
            at: instr.order,
            index,
            length,
        })?;
        let new_char = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { at: instr.order })?;

        let updated: String = current
            .chars()
            .enumerate()
            .map(|(i, c)| if i == position { new_char } else { c })
            .collect();
        self.assign(&dest, Value::String(updated))?;
        Ok(Flow::Next)
    }

    /// The character at `index`, counted in code points.
    fn char_at(&self, opcode: Opcode, string: Value, index: Value) -> Result<char, RuntimeError> {
        let (string, index) = match (string, index) {
            (Value::String(s), Value::Int(i)) => (s, i),
            _ => return Err(self.type_mismatch(opcode, "operands must be string and int")),
        };
        let length = string.chars().count();
        checked_index(index, length)
            .and_then(|i| string.chars().nth(i))
            .ok_or(RuntimeError::StringIndexOutOfRange {
                at: self.order(),
                index,
                length,
            })
    }

    fn int_to_char(&self, value: Value) -> Result<Value, RuntimeError> {
        let decoded = match &value {
            Value::Int(n) => u32::try_from(*n).ok().and_then(char::from_u32),
            _ => None,
        };
        decoded
            .map(|c| Value::String(c.to_string()))
            .ok_or_else(|| RuntimeError::InvalidCodePoint {
                at: self.order(),
                value: value.typed(),
            })
    }

    // ---- Operators ----

    fn arith(
        &self,
        opcode: Opcode,
        a: Value,
        b: Value,
        int_op: fn(i64, i64) -> i64,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(Value::Int(int_op(x, y))),
            (Value::Float(x), Value::Float(y)) => Ok(Value::Float(float_op(x, y))),
            _ => Err(self.type_mismatch(opcode, "operands must both be int or both be float")),
        }
    }

    fn idiv(&self, opcode: Opcode, a: Value, b: Value) -> Result<Value, RuntimeError> {
        match (a, b) {
            (Value::Int(_), Value::Int(0)) => Err(RuntimeError::DivisionByZero { at: self.order() }),
            (Value::Int(x), Value::Int(y)) => Ok(Value::Int(floor_div(x, y))),
            _ => Err(self.type_mismatch(opcode, "operands must be int")),
        }
    }

    fn relation(
        &self,
        opcode: Opcode,
        a: Value,
        b: Value,
        accept: fn(Ordering) -> bool,
    ) -> Result<Value, RuntimeError> {
        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
            (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
            _ => return Err(self.type_mismatch(opcode, "operands must have the same type")),
        };
        Ok(Value::Bool(ordering.is_some_and(accept)))
    }

    fn equals(&self, opcode: Opcode, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        if a.data_type() != b.data_type() {
            return Err(self.type_mismatch(opcode, "operands must have the same type"));
        }
        Ok(a == b)
    }

    fn logic(
        &self,
        opcode: Opcode,
        a: Value,
        b: Value,
        op: fn(bool, bool) -> bool,
    ) -> Result<Value, RuntimeError> {
        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(op(x, y))),
            _ => Err(self.type_mismatch(opcode, "operands must be bool")),
        }
    }

    fn negate(&self, opcode: Opcode, a: Value) -> Result<Value, RuntimeError> {
        match a {
            Value::Bool(x) => Ok(Value::Bool(!x)),
            _ => Err(self.type_mismatch(opcode, "operand must be bool")),
        }
    }

    // ---- Error helpers ----

    fn type_mismatch(&self, opcode: Opcode, expected: &'static str) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.order(),
            opcode: opcode.mnemonic(),
            expected,
        }
    }

    fn io_error(&self, err: std::io::Error) -> RuntimeError {
        RuntimeError::Io {
            at: self.order(),
            message: err.to_string(),
        }
    }
}

/// Integer division rounding toward negative infinity.
pub fn floor_div(x: i64, y: i64) -> i64 {
    let q = x.wrapping_div(y);
    if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
        q - 1
    } else {
        q
    }
}

fn code_point(c: char) -> Value {
    Value::Int(i64::from(u32::from(c)))
}

/// `index` as a position into a string of `length` code points.
fn checked_index(index: i64, length: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < length)
}

/// Parse one line of READ input; `None` falls back to the type's default.
fn read_value(data_type: DataType, text: &str) -> Option<Value> {
    match data_type {
        DataType::Int => text.trim().parse().ok().map(Value::Int),
        DataType::Bool => Some(Value::Bool(text == "true")),
        DataType::String => Some(Value::String(text.to_string())),
        DataType::Float => ippcode_common::parse_hex_float(text).map(Value::Float),
    }
}
