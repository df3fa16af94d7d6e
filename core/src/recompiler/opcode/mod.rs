//! Translators for plain VM opcodes.

mod compare;
mod pop;
mod push;
mod simple;

pub use compare::CompareTranslator;
pub use pop::PopTranslator;
pub use push::PushTranslator;
pub use simple::SimpleOpCodeTranslator;

use std::fmt;

use crate::arch::{InstructionCode, VmInstruction};
use crate::cil::CilInstruction;

use super::context::TranslationContext;
use super::error::TranslateError;

/// Strategy class a translator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Push,
    Pop,
    SimpleArithmetic,
    Compare,
    Box,
    ExternalCall,
    FieldLoad,
    FieldStore,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::Push => "push",
            StrategyKind::Pop => "pop",
            StrategyKind::SimpleArithmetic => "simple-arithmetic",
            StrategyKind::Compare => "compare",
            StrategyKind::Box => "box",
            StrategyKind::ExternalCall => "external-call",
            StrategyKind::FieldLoad => "field-load",
            StrategyKind::FieldStore => "field-store",
        };
        f.write_str(s)
    }
}

/// Turns one decoded VM instruction into host bytecode.
///
/// Implementations are stateless: everything that changes while translating
/// a method lives in the [`TranslationContext`]. One instance may serve many
/// codes; it must reject any code outside [`OpCodeTranslator::supported_codes`].
pub trait OpCodeTranslator: Send + Sync + fmt::Debug {
    fn kind(&self) -> StrategyKind;

    /// Human-readable name, e.g. `add` or `push`.
    fn name(&self) -> &str;

    fn supported_codes(&self) -> &[InstructionCode];

    fn supports(&self, code: InstructionCode) -> bool {
        self.supported_codes().contains(&code)
    }

    fn translate(
        &self,
        instruction: &VmInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError>;
}

/// Fails with a contract violation unless `translator` declared `instruction.code`.
pub(crate) fn ensure_supported(
    translator: &dyn OpCodeTranslator,
    instruction: &VmInstruction,
) -> Result<(), TranslateError> {
    if translator.supports(instruction.code) {
        return Ok(());
    }
    Err(TranslateError::contract(
        instruction.code,
        instruction.code,
        format!("one of the codes handled by the {} translator", translator.name()),
    ))
}

#[cfg(test)]
mod opcode_test;
