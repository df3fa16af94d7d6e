use crate::arch::{ElementType, VCallCode, VCallInstruction, VCallOperand};
use crate::cil::CilInstruction;
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;
use crate::recompiler::opcode::StrategyKind;

use super::{VCallTranslator, ensure_supported};

/// `BOX`: value types are boxed, reference types only re-typed with `castclass`.
#[derive(Debug, Default)]
pub struct BoxTranslator;

impl BoxTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl VCallTranslator for BoxTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Box
    }

    fn name(&self) -> &str {
        "box"
    }

    fn supported_calls(&self) -> &[VCallCode] {
        &[VCallCode::Box]
    }

    fn translate(
        &self,
        instruction: &VCallInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let call = instruction.call;
        let VCallOperand::Type(ty) = &instruction.operand else {
            return Err(TranslateError::contract(call, instruction.operand.shape(), "a type reference"));
        };
        if ty.element == ElementType::Void {
            return Err(TranslateError::contract(call, ty, "a non-void type"));
        }
        if ty.is_value_type() {
            ctx.emit(call, CilInstruction::Box(ty.clone()))?;
        } else {
            ctx.emit(call, CilInstruction::Castclass(ty.clone()))?;
        }
        Ok(ctx.take_emitted())
    }
}
