use crate::arch::{Immediate, InstructionCode, Operand, OperandWidth, VmInstruction, VmRegister};
use crate::cil::{CilInstruction, StackType};
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;

use super::{OpCodeTranslator, StrategyKind, ensure_supported};

const PUSH_CODES: &[InstructionCode] = &[
    InstructionCode::PushrByte,
    InstructionCode::PushrWord,
    InstructionCode::PushrDword,
    InstructionCode::PushrQword,
    InstructionCode::PushrObject,
    InstructionCode::PushiDword,
    InstructionCode::PushiQword,
];

/// Every width of "push a register or immediate onto the VM stack".
///
/// Register pushes read the backing local and zero-extend to the declared
/// width; a register last written with a float is read back as a float.
/// Immediates become constant loads.
#[derive(Debug, Default)]
pub struct PushTranslator;

impl PushTranslator {
    pub fn new() -> Self {
        Self
    }

    fn push_register(
        &self,
        code: InstructionCode,
        register: VmRegister,
        width: OperandWidth,
        ctx: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        if width != OperandWidth::Object && ctx.register_holds_float(register) {
            // Float bits are read back as stored; narrowing would convert the value.
            if !matches!(width, OperandWidth::Dword | OperandWidth::Qword) {
                return Err(TranslateError::contract(code, register, "a register holding an integral value"));
            }
            let local = ctx.register_local(code, register, StackType::Float)?;
            return ctx.emit(code, CilInstruction::Ldloc(local));
        }
        let local = ctx.register_local(code, register, StackType::from_width(width))?;
        ctx.emit(code, CilInstruction::Ldloc(local))?;
        if let Some(narrow) = narrowing_for(width) {
            ctx.emit(code, narrow)?;
        }
        Ok(())
    }
}

/// Registers are 64 bits wide; narrower reads truncate and zero-extend.
fn narrowing_for(width: OperandWidth) -> Option<CilInstruction> {
    match width {
        OperandWidth::Byte => Some(CilInstruction::ConvU1),
        OperandWidth::Word => Some(CilInstruction::ConvU2),
        OperandWidth::Dword => Some(CilInstruction::ConvU4),
        _ => None,
    }
}

impl OpCodeTranslator for PushTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Push
    }

    fn name(&self) -> &str {
        "push"
    }

    fn supported_codes(&self) -> &[InstructionCode] {
        PUSH_CODES
    }

    fn translate(
        &self,
        instruction: &VmInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let code = instruction.code;
        match (code, instruction.operand) {
            (InstructionCode::PushiDword, Operand::Immediate(Immediate::Dword(value))) => {
                ctx.emit(code, CilInstruction::LdcI4(value as i32))?;
            }
            (InstructionCode::PushiQword, Operand::Immediate(Immediate::Qword(value))) => {
                ctx.emit(code, CilInstruction::LdcI8(value as i64))?;
            }
            (InstructionCode::PushiDword, operand) => {
                return Err(TranslateError::contract(code, operand.shape(), "a dword immediate"));
            }
            (InstructionCode::PushiQword, operand) => {
                return Err(TranslateError::contract(code, operand.shape(), "a qword immediate"));
            }
            (_, Operand::Register(register)) => {
                let width = code
                    .width()
                    .ok_or_else(|| TranslateError::contract(code, "no width", "a width-tagged push"))?;
                self.push_register(code, register, width, ctx)?;
            }
            (_, operand) => {
                return Err(TranslateError::contract(code, operand.shape(), "a register"));
            }
        }
        Ok(ctx.take_emitted())
    }
}
