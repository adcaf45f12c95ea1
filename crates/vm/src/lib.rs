//! Stack-based abstract machine for P-code programs.
//!
//! The machine interprets a [`Program`] over a single integer array that
//! holds both the operand stack and activation frames. Three registers
//! drive execution:
//!
//! - `p` — program counter, index of the next instruction
//! - `b` — base pointer, start of the current activation frame
//! - `t` — stack-top pointer
//!
//! Each frame begins with three link words (static link, dynamic link,
//! return address) followed by locals. Execution starts in a synthetic
//! outermost frame whose return address is the end of the code, so a
//! top-level `OPR 0 0` halts the machine cleanly.
//!
//! # Example
//!
//! ```
//! use pcode_common::{Instruction, Opr, Program};
//! use pcode_vm::run;
//!
//! // 2 + 3, returned as the program's value.
//! let program = Program::new(vec![
//!     Instruction::lit(2),
//!     Instruction::lit(3),
//!     Instruction::opr(Opr::Add),
//! ]);
//! let machine = run(&program).unwrap();
//! assert_eq!(machine.stack()[machine.t()], 5);
//! ```

pub mod error;
pub mod execute;
pub mod machine;

pub use error::RuntimeFault;
pub use machine::{Machine, State, DEFAULT_STACK_SIZE, ENTRY_BASE};

use pcode_common::Program;

/// Run a program to completion on a fresh machine with the default
/// stack capacity.
///
/// Returns the halted machine so callers can read results back out of
/// the stack, or the fault that stopped execution.
pub fn run(program: &Program) -> Result<Machine<'_>, RuntimeFault> {
    let mut machine = Machine::new(program);
    machine.execute()?;
    Ok(machine)
}
