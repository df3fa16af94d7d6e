use crate::arch::{InstructionCode, VmInstruction};
use crate::cil::{CilInstruction, StackType};
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;

use super::{OpCodeTranslator, StrategyKind, ensure_supported};

const COMPARE_CODES: &[InstructionCode] = &[
    InstructionCode::Cmp,
    InstructionCode::CmpDword,
    InstructionCode::CmpQword,
    InstructionCode::CmpR32,
    InstructionCode::CmpR64,
];

/// Comparisons producing sign(a - b) as an int32 in {-1, 0, 1}.
///
/// Every width uses the same sequence:
///
/// ```text
/// stloc b; stloc a
/// ldloc a; ldloc b; cgt
/// ldloc a; ldloc b; clt
/// sub
/// ```
///
/// `cgt`/`clt` are the ordered forms, so an unordered float pair classifies
/// as equal, same as two equal integers. The generic `CMP` on object
/// references yields 0 when both are the same reference and 1 otherwise.
#[derive(Debug, Default)]
pub struct CompareTranslator;

impl CompareTranslator {
    pub fn new() -> Self {
        Self
    }

    fn compare_numeric(
        &self,
        code: InstructionCode,
        ty: StackType,
        ctx: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        let lhs = ctx.temp_local(code, ty, 0)?;
        let rhs = ctx.temp_local(code, ty, 1)?;
        ctx.emit_all(
            code,
            [
                CilInstruction::Stloc(rhs),
                CilInstruction::Stloc(lhs),
                CilInstruction::Ldloc(lhs),
                CilInstruction::Ldloc(rhs),
                CilInstruction::Cgt,
                CilInstruction::Ldloc(lhs),
                CilInstruction::Ldloc(rhs),
                CilInstruction::Clt,
                CilInstruction::Sub,
            ],
        )
    }

    fn compare_references(&self, code: InstructionCode, ctx: &mut TranslationContext) -> Result<(), TranslateError> {
        ctx.emit_all(
            code,
            [CilInstruction::Ceq, CilInstruction::LdcI4(1), CilInstruction::Xor],
        )
    }
}

impl OpCodeTranslator for CompareTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Compare
    }

    fn name(&self) -> &str {
        "cmp"
    }

    fn supported_codes(&self) -> &[InstructionCode] {
        COMPARE_CODES
    }

    fn translate(
        &self,
        instruction: &VmInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let code = instruction.code;
        if ctx.depth() < 2 {
            return Err(TranslateError::StackUnderflow {
                code: code.into(),
                needed: 2,
                available: ctx.depth(),
            });
        }
        let rhs = ctx.peek(code, 0)?;
        let lhs = ctx.peek(code, 1)?;
        let references = (lhs == StackType::Object, rhs == StackType::Object);

        match (code.width(), references) {
            (None, (true, true)) => self.compare_references(code, ctx)?,
            (None, (false, false)) => self.compare_numeric(code, StackType::binary_result(lhs, rhs), ctx)?,
            (Some(width), (false, false)) => self.compare_numeric(code, StackType::from_width(width), ctx)?,
            (None, _) => {
                return Err(TranslateError::contract(
                    code,
                    format!("{} and {}", lhs, rhs),
                    "two references or two numeric operands",
                ));
            }
            (Some(_), _) => {
                return Err(TranslateError::contract(
                    code,
                    format!("{} and {}", lhs, rhs),
                    "two numeric operands",
                ));
            }
        }
        Ok(ctx.take_emitted())
    }
}
