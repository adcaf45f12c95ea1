//! Verification errors, one per offending instruction.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// A JMP or JPC target outside `0..=len(code)`.
    #[error("instruction {at}: jump target {target} out of range")]
    JumpOutOfRange { at: usize, target: i32 },

    /// A CAL target outside `0..=len(code)`.
    #[error("instruction {at}: call target {target} out of range")]
    CallOutOfRange { at: usize, target: i32 },

    /// An OPR instruction with an unrecognized sub-code.
    #[error("instruction {at}: unknown OPR code {code}")]
    UnknownOprCode { at: usize, code: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(
            VerifyError::JumpOutOfRange { at: 3, target: -1 }.to_string(),
            "instruction 3: jump target -1 out of range"
        );
        assert_eq!(
            VerifyError::UnknownOprCode { at: 0, code: 42 }.to_string(),
            "instruction 0: unknown OPR code 42"
        );
    }
}
