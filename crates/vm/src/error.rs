//! Runtime faults for the P-code machine.
//!
//! These are conditions detected during `execute()`, never during
//! compilation. Every fault includes the index (`at`) of the faulting
//! instruction for diagnostics. A fault terminates the run immediately;
//! the machine's register state stays inspectable but must not be read
//! as a valid halted result.

use thiserror::Error;

/// Fatal faults that stop program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeFault {
    /// Integer division or modulo by zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// A stack address fell outside the allocated stack array.
    #[error("stack fault at instruction {at}: address {addr} out of range")]
    StackFault { at: usize, addr: i64 },

    /// An OPR instruction carried an unrecognized operation code.
    #[error("invalid opcode at instruction {at}: OPR {code}")]
    InvalidOpcode { at: usize, code: i32 },

    /// A jump, call, or return target fell outside the code array.
    #[error("invalid address at instruction {at}: target {target}")]
    InvalidAddress { at: usize, target: i64 },
}
