use std::fmt;

use crate::arch::{InstructionCode, VCallCode};

/// Either kind of code a translator can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeRef {
    OpCode(InstructionCode),
    VCall(VCallCode),
}

impl fmt::Display for CodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeRef::OpCode(code) => write!(f, "opcode {}", code),
            CodeRef::VCall(call) => write!(f, "vcall {}", call),
        }
    }
}

impl From<InstructionCode> for CodeRef {
    fn from(code: InstructionCode) -> Self {
        CodeRef::OpCode(code)
    }
}

impl From<VCallCode> for CodeRef {
    fn from(call: VCallCode) -> Self {
        CodeRef::VCall(call)
    }
}

/// Failure while translating a single instruction.
///
/// None of these are recoverable locally. Translation is deterministic, so
/// retrying cannot change the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// No translator is registered for the opcode.
    UnsupportedInstruction(InstructionCode),
    /// No translator is registered for the intrinsic.
    UnsupportedVCall(VCallCode),
    /// A translator was handed a code or operand outside its declared family.
    ContractViolation {
        code: CodeRef,
        operand: String,
        expected: String,
    },
    StackUnderflow {
        code: CodeRef,
        needed: usize,
        available: usize,
    },
    StackOverflow {
        code: CodeRef,
        limit: usize,
    },
    /// The method needs more host locals than a local index can address.
    TooManyLocals {
        code: CodeRef,
        limit: usize,
    },
}

impl TranslateError {
    pub fn contract(code: impl Into<CodeRef>, operand: impl fmt::Display, expected: impl Into<String>) -> Self {
        TranslateError::ContractViolation {
            code: code.into(),
            operand: operand.to_string(),
            expected: expected.into(),
        }
    }

    /// Whether the registry, rather than the decoder output, needs fixing.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            TranslateError::UnsupportedInstruction(_) | TranslateError::UnsupportedVCall(_)
        )
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::UnsupportedInstruction(code) => {
                write!(f, "recompilation of opcode {} is not supported", code)
            }
            TranslateError::UnsupportedVCall(call) => {
                write!(f, "recompilation of vcall {} is not supported", call)
            }
            TranslateError::ContractViolation {
                code,
                operand,
                expected,
            } => {
                write!(f, "contract violation in {}: got operand '{}', expected {}", code, operand, expected)
            }
            TranslateError::StackUnderflow {
                code,
                needed,
                available,
            } => write!(
                f,
                "stack underflow in {}: needs {} value(s) but only {} available",
                code, needed, available
            ),
            TranslateError::StackOverflow { code, limit } => {
                write!(f, "stack overflow in {}: abstract depth exceeds {}", code, limit)
            }
            TranslateError::TooManyLocals { code, limit } => {
                write!(f, "too many locals in {}: a method can hold at most {}", code, limit)
            }
        }
    }
}

impl std::error::Error for TranslateError {}

/// A translation failure pinned to its position in the method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecompileError {
    /// Index of the offending instruction in the decoded stream.
    pub index: usize,
    /// Byte offset of the offending instruction.
    pub offset: u64,
    pub source: TranslateError,
}

impl fmt::Display for RecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to recompile instruction #{} at IL_{:04X}: {}",
            self.index, self.offset, self.source
        )
    }
}

impl std::error::Error for RecompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
