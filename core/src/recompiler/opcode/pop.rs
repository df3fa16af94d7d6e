use crate::arch::{InstructionCode, Operand, VmInstruction};
use crate::cil::{CilInstruction, StackType};
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;

use super::{OpCodeTranslator, StrategyKind, ensure_supported};

/// `POP` either discards the top value or stores it into a register.
#[derive(Debug, Default)]
pub struct PopTranslator;

impl PopTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl OpCodeTranslator for PopTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pop
    }

    fn name(&self) -> &str {
        "pop"
    }

    fn supported_codes(&self) -> &[InstructionCode] {
        &[InstructionCode::Pop]
    }

    fn translate(
        &self,
        instruction: &VmInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let code = instruction.code;
        match instruction.operand {
            Operand::None => ctx.emit(code, CilInstruction::Pop)?,
            Operand::Register(register) => {
                let top = ctx.peek(code, 0)?;
                let local = ctx.store_register(code, register, top)?;
                // Integral registers are backed by an int64 local.
                if matches!(top, StackType::Int32 | StackType::NativeInt | StackType::Pointer) {
                    ctx.emit(code, CilInstruction::ConvU8)?;
                }
                ctx.emit(code, CilInstruction::Stloc(local))?;
            }
            Operand::Immediate(_) => {
                return Err(TranslateError::contract(
                    code,
                    instruction.operand.shape(),
                    "no operand or a register",
                ));
            }
        }
        Ok(ctx.take_emitted())
    }
}
