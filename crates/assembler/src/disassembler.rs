//! Renders programs back to assembly text.

use std::fmt::Write;

use pcode_common::Program;

/// Disassemble a program, one instruction per line.
///
/// The output re-assembles to the identical program.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    for instr in &program.instructions {
        // Display renders the canonical "MNEMONIC level arg" form.
        let _ = writeln!(out, "{instr}");
    }
    out
}
