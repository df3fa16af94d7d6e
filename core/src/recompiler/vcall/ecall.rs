use crate::arch::{ECallKind, VCallCode, VCallInstruction, VCallOperand};
use crate::cil::CilInstruction;
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;
use crate::recompiler::opcode::StrategyKind;

use super::{VCallTranslator, ensure_supported};

/// `ECALL`: a call into a routine outside the virtualised code.
#[derive(Debug, Default)]
pub struct ECallTranslator;

impl ECallTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl VCallTranslator for ECallTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExternalCall
    }

    fn name(&self) -> &str {
        "ecall"
    }

    fn supported_calls(&self) -> &[VCallCode] {
        &[VCallCode::ECall]
    }

    fn translate(
        &self,
        instruction: &VCallInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let call = instruction.call;
        let VCallOperand::Method { method, kind } = &instruction.operand else {
            return Err(TranslateError::contract(call, instruction.operand.shape(), "a method reference"));
        };
        let insn = match kind {
            ECallKind::Call => CilInstruction::Call(method.clone()),
            ECallKind::CallVirt => {
                if !method.has_this {
                    return Err(TranslateError::contract(call, method, "an instance method for callvirt"));
                }
                CilInstruction::Callvirt(method.clone())
            }
            ECallKind::NewObj => {
                if !method.has_this {
                    return Err(TranslateError::contract(call, method, "an instance constructor for newobj"));
                }
                CilInstruction::Newobj(method.clone())
            }
        };
        let (needed, _) = insn.stack_arity();
        if ctx.depth() < needed {
            return Err(TranslateError::StackUnderflow {
                code: call.into(),
                needed,
                available: ctx.depth(),
            });
        }
        ctx.emit(call, insn)?;
        Ok(ctx.take_emitted())
    }
}
