//! IPPcode program loader: XML source → validated [`Program`].
//!
//! The loader checks document structure only: the root element, the
//! instruction elements and their attributes, argument element names, the
//! argument count per opcode and the order numbering. Argument text is
//! carried verbatim and checked lazily by the VM.
//!
//! # Usage
//!
//! ```
//! use ippcode_common::Opcode;
//! use ippcode_loader::load;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode18">
//!   <instruction order="2" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
//!   <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
//! </program>"#;
//! let program = load(xml).unwrap();
//! assert_eq!(program.instructions[0].opcode, Opcode::DefVar);
//! assert_eq!(program.instructions[1].opcode, Opcode::Write);
//! ```

pub mod error;

mod parser;

pub use error::LoadError;

use ippcode_common::Program;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a program from XML text.
///
/// Returns the first error encountered.
pub fn load(xml: &str) -> Result<Program, LoadError> {
    let instructions = parser::parse_document(xml)?;
    let program = Program::from_unordered(instructions)?;
    debug!(instructions = program.len(), "program loaded");
    Ok(program)
}

/// Read and load a program file.
///
/// An unreadable file is a [`LoadError::Read`]; bytes that are not UTF-8
/// are reported as malformed XML.
pub fn load_file(path: &Path) -> Result<Program, LoadError> {
    let bytes = fs::read(path).map_err(|e| LoadError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let xml = String::from_utf8(bytes).map_err(|e| LoadError::Xml {
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), bytes = xml.len(), "source read");
    load(&xml)
}
