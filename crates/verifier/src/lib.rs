//! Static verifier for P-code programs.
//!
//! Checks every property of a program that can be decided without
//! running it: control-transfer targets must land inside the code (the
//! one-past-the-end index is allowed, since jumping there is a clean
//! halt), and every OPR instruction must carry a known sub-code.
//!
//! The verifier reports all violations, not just the first, so a bad
//! binary produces one diagnostic per offending instruction. Dynamic
//! conditions (stack depth, static-link integrity, division by zero)
//! remain runtime faults.
//!
//! # Example
//!
//! ```
//! use pcode_common::{Instruction, Program};
//! use pcode_verifier::verify;
//!
//! let program = Program::new(vec![Instruction::jmp(9)]);
//! assert_eq!(verify(&program).unwrap_err().len(), 1);
//! ```

pub mod error;

pub use error::VerifyError;

use pcode_common::{Opcode, Opr, Program};

/// Check a program's static structure.
///
/// Returns all violations found, in instruction order.
pub fn verify(program: &Program) -> Result<(), Vec<VerifyError>> {
    let len = program.instructions.len();
    let mut errors = Vec::new();

    for (at, instr) in program.instructions.iter().enumerate() {
        match instr.op {
            Opcode::Jmp | Opcode::Jpc => {
                if !target_in_range(instr.arg, len) {
                    errors.push(VerifyError::JumpOutOfRange {
                        at,
                        target: instr.arg,
                    });
                }
            }
            Opcode::Cal => {
                if !target_in_range(instr.arg, len) {
                    errors.push(VerifyError::CallOutOfRange {
                        at,
                        target: instr.arg,
                    });
                }
            }
            Opcode::Opr => {
                if Opr::from_arg(instr.arg).is_none() {
                    errors.push(VerifyError::UnknownOprCode {
                        at,
                        code: instr.arg,
                    });
                }
            }
            Opcode::Lit | Opcode::Lod | Opcode::Sto | Opcode::Int => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn target_in_range(target: i32, len: usize) -> bool {
    target >= 0 && target as usize <= len
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcode_common::Instruction;

    #[test]
    fn accepts_well_formed_program() {
        let program = Program::new(vec![
            Instruction::int(1),
            Instruction::lit(5),
            Instruction::sto(0, 3),
            Instruction::jmp(5),
            Instruction::lit(9),
            Instruction::opr(Opr::Return),
        ]);
        assert_eq!(verify(&program), Ok(()));
    }

    #[test]
    fn accepts_empty_program() {
        assert_eq!(verify(&Program::new(vec![])), Ok(()));
    }

    #[test]
    fn jump_to_one_past_the_end_is_legal() {
        let program = Program::new(vec![Instruction::jmp(1)]);
        assert_eq!(verify(&program), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_jumps() {
        let program = Program::new(vec![Instruction::jmp(5), Instruction::jpc(-1)]);
        assert_eq!(
            verify(&program).unwrap_err(),
            vec![
                VerifyError::JumpOutOfRange { at: 0, target: 5 },
                VerifyError::JumpOutOfRange { at: 1, target: -1 },
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_call() {
        let program = Program::new(vec![Instruction::cal(0, 2)]);
        assert_eq!(
            verify(&program).unwrap_err(),
            vec![VerifyError::CallOutOfRange { at: 0, target: 2 }]
        );
    }

    #[test]
    fn rejects_unknown_opr_code() {
        let program = Program::new(vec![Instruction::new(Opcode::Opr, 0, 16)]);
        assert_eq!(
            verify(&program).unwrap_err(),
            vec![VerifyError::UnknownOprCode { at: 0, code: 16 }]
        );
    }

    #[test]
    fn reports_every_violation() {
        let program = Program::new(vec![
            Instruction::jmp(-3),
            Instruction::lit(1),
            Instruction::new(Opcode::Opr, 0, 99),
            Instruction::cal(0, 100),
        ]);
        assert_eq!(verify(&program).unwrap_err().len(), 3);
    }
}
