use crate::arch::{FieldRef, VCallCode, VCallInstruction, VCallOperand};
use crate::cil::{CilInstruction, StackType};
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;
use crate::recompiler::opcode::StrategyKind;

use super::{VCallTranslator, ensure_supported};

fn field_operand(instruction: &VCallInstruction) -> Result<&FieldRef, TranslateError> {
    match &instruction.operand {
        VCallOperand::Field(field) => Ok(field),
        other => Err(TranslateError::contract(instruction.call, other.shape(), "a field reference")),
    }
}

/// Instance receivers must be references, pointers or native ints.
fn check_receiver(call: VCallCode, receiver: StackType) -> Result<(), TranslateError> {
    match receiver {
        StackType::Object | StackType::Pointer | StackType::NativeInt => Ok(()),
        other => Err(TranslateError::contract(call, other, "an object reference or pointer as receiver")),
    }
}

/// `LDFLD`: read an instance or static field.
#[derive(Debug, Default)]
pub struct FieldLoadTranslator;

impl FieldLoadTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl VCallTranslator for FieldLoadTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FieldLoad
    }

    fn name(&self) -> &str {
        "ldfld"
    }

    fn supported_calls(&self) -> &[VCallCode] {
        &[VCallCode::Ldfld]
    }

    fn translate(
        &self,
        instruction: &VCallInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let call = instruction.call;
        let field = field_operand(instruction)?;
        if field.is_static {
            ctx.emit(call, CilInstruction::Ldsfld(field.clone()))?;
        } else {
            check_receiver(call, ctx.peek(call, 0)?)?;
            ctx.emit(call, CilInstruction::Ldfld(field.clone()))?;
        }
        Ok(ctx.take_emitted())
    }
}

/// `STFLD`: write an instance or static field.
#[derive(Debug, Default)]
pub struct FieldStoreTranslator;

impl FieldStoreTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl VCallTranslator for FieldStoreTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FieldStore
    }

    fn name(&self) -> &str {
        "stfld"
    }

    fn supported_calls(&self) -> &[VCallCode] {
        &[VCallCode::Stfld]
    }

    fn translate(
        &self,
        instruction: &VCallInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let call = instruction.call;
        let field = field_operand(instruction)?;
        if field.is_static {
            ctx.emit(call, CilInstruction::Stsfld(field.clone()))?;
        } else {
            // Stack: [..., instance, value]
            check_receiver(call, ctx.peek(call, 1)?)?;
            ctx.emit(call, CilInstruction::Stfld(field.clone()))?;
        }
        Ok(ctx.take_emitted())
    }
}
