//! Translators for VM intrinsics (`VCALL`).

mod boxing;
mod ecall;
mod field;

pub use boxing::BoxTranslator;
pub use ecall::ECallTranslator;
pub use field::{FieldLoadTranslator, FieldStoreTranslator};

use std::fmt;

use crate::arch::{VCallCode, VCallInstruction};
use crate::cil::CilInstruction;

use super::context::TranslationContext;
use super::error::TranslateError;
use super::opcode::StrategyKind;

/// Turns one decoded intrinsic call into host bytecode.
///
/// Same contract as [`super::OpCodeTranslator`], keyed by [`VCallCode`].
pub trait VCallTranslator: Send + Sync + fmt::Debug {
    fn kind(&self) -> StrategyKind;

    fn name(&self) -> &str;

    fn supported_calls(&self) -> &[VCallCode];

    fn supports(&self, call: VCallCode) -> bool {
        self.supported_calls().contains(&call)
    }

    fn translate(
        &self,
        instruction: &VCallInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError>;
}

pub(crate) fn ensure_supported(
    translator: &dyn VCallTranslator,
    instruction: &VCallInstruction,
) -> Result<(), TranslateError> {
    if translator.supports(instruction.call) {
        return Ok(());
    }
    Err(TranslateError::contract(
        instruction.call,
        instruction.call,
        format!("one of the vcalls handled by the {} translator", translator.name()),
    ))
}
