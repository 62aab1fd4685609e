//! VM state management: instruction pointer, label table, I/O handles and
//! execution counters.

use crate::error::RuntimeError;
use crate::frame::Environment;
use crate::resolve::parse_label;
use ippcode_common::{Instruction, Opcode, Program};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::debug;

/// The streams an executing program talks to.
///
/// `output` receives WRITE, `diagnostics` receives DPRINT and BREAK, and
/// READ consumes `input` one line at a time.
pub struct Io<'a> {
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
    pub diagnostics: &'a mut dyn Write,
}

impl<'a> Io<'a> {
    pub fn new(
        input: &'a mut dyn BufRead,
        output: &'a mut dyn Write,
        diagnostics: &'a mut dyn Write,
    ) -> Self {
        Self {
            input,
            output,
            diagnostics,
        }
    }
}

/// Counters collected while a program runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Number of instructions executed, LABELs that were stepped onto included.
    pub executed: u64,
    /// Highest number of declared variables alive at once across all frames.
    pub max_live_variables: usize,
}

/// Where control goes after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to the following instruction.
    Next,
    /// Continue at this instruction index.
    Jump(usize),
}

/// The IPPcode virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Frames, data stack and call stack.
    pub(crate) env: Environment,
    /// Label name to the index of its LABEL instruction.
    pub(crate) labels: BTreeMap<String, usize>,
    /// Index of the instruction being executed.
    pub(crate) ip: usize,
    pub(crate) io: Io<'a>,
    pub(crate) stats: ExecutionStats,
}

impl<'a> VM<'a> {
    /// Create a new VM for the given program.
    pub fn new(program: &'a Program, io: Io<'a>) -> Self {
        Self {
            program,
            env: Environment::new(),
            labels: BTreeMap::new(),
            ip: 0,
            io,
            stats: ExecutionStats::default(),
        }
    }

    /// Read-only view of the memory model.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Counters collected so far.
    pub fn stats(&self) -> ExecutionStats {
        self.stats
    }

    /// Pre-scan the program and record every LABEL so jumps may refer to
    /// labels defined later in the program.
    pub(crate) fn scan_labels(&mut self) -> Result<(), RuntimeError> {
        self.labels.clear();
        for (index, instr) in self.program.instructions.iter().enumerate() {
            if instr.opcode != Opcode::Label {
                continue;
            }
            let arg = instr.args.first().ok_or(RuntimeError::InvalidArity {
                at: instr.order,
                opcode: instr.opcode.mnemonic(),
                expected: instr.opcode.arity(),
                found: instr.args.len(),
            })?;
            let name = parse_label(arg, instr.order)?;
            if self.labels.insert(name.to_string(), index).is_some() {
                return Err(RuntimeError::DuplicateLabel {
                    at: instr.order,
                    label: name.to_string(),
                });
            }
        }
        debug!(labels = self.labels.len(), "label table built");
        Ok(())
    }

    /// Index of the instruction following the LABEL named `name`.
    pub(crate) fn label_target(&self, name: &str) -> Result<usize, RuntimeError> {
        self.labels
            .get(name)
            .map(|&index| index + 1)
            .ok_or_else(|| RuntimeError::LabelNotFound {
                at: self.order(),
                label: name.to_string(),
            })
    }

    /// Fetch the instruction at the current ip.
    pub(crate) fn fetch(&self) -> Option<&'a Instruction> {
        let program = self.program;
        program.instructions.get(self.ip)
    }

    /// Order number of the current instruction, used in error reports.
    pub(crate) fn order(&self) -> usize {
        self.order_at(self.ip)
    }

    /// Update counters after an instruction completes.
    pub(crate) fn record_step(&mut self) {
        self.stats.executed += 1;
        let live = self.env.live_variables();
        if live > self.stats.max_live_variables {
            self.stats.max_live_variables = live;
        }
    }

    /// Write the full machine state to the diagnostic stream.
    pub(crate) fn dump_state(&mut self) -> std::io::Result<()> {
        let report = self.state_report();
        self.io.diagnostics.write_all(report.as_bytes())
    }

    /// Human-readable snapshot of the machine state, as printed by BREAK.
    pub fn state_report(&self) -> String {
        let calls: Vec<String> = self
            .env
            .call_stack
            .iter()
            .map(|&ret| self.order_at(ret).to_string())
            .collect();
        let labels: Vec<String> = self
            .labels
            .iter()
            .map(|(name, &index)| format!("{name}: {}", self.order_at(index)))
            .collect();
        let stack: Vec<String> = self.env.data_stack.iter().map(|v| v.typed()).collect();
        let locals: Vec<String> = self.env.locals.iter().map(|f| f.to_string()).collect();
        let temporary = match &self.env.temporary {
            Some(frame) => frame.to_string(),
            None => "<none>".to_string(),
        };

        let mut report = String::new();
        report.push_str(&format!("Instruction: {}\n", self.order()));
        report.push_str(&format!("Executed instructions: {}\n", self.stats.executed));
        report.push_str(&format!("Call stack: [{}]\n", calls.join(", ")));
        report.push_str(&format!("Labels: {{{}}}\n", labels.join(", ")));
        report.push_str(&format!("Data stack: [{}]\n", stack.join(", ")));
        report.push_str(&format!("Global frame: {}\n", self.env.global));
        report.push_str(&format!("Local frames: [{}]\n", locals.join(", ")));
        report.push_str(&format!("Temporary frame: {temporary}\n"));
        report
    }

    /// Order number for an instruction index; one past the end maps to N+1.
    fn order_at(&self, index: usize) -> usize {
        self.program
            .instructions
            .get(index)
            .map_or(index + 1, |instr| instr.order)
    }
}
