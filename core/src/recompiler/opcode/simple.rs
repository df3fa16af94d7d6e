use anyhow::{Result, bail};

use crate::arch::{InstructionCode, VmInstruction};
use crate::cil::CilInstruction;
use crate::recompiler::context::TranslationContext;
use crate::recompiler::error::TranslateError;

use super::{OpCodeTranslator, StrategyKind, ensure_supported};

/// Maps a family of VM opcodes onto a fixed host opcode sequence.
///
/// Operands are taken from the abstract stack as the sequence consumes them
/// and the sequence leaves exactly one result behind. `add` uses a single
/// host opcode for four widths; `nor` chains `or` and `not`.
#[derive(Debug)]
pub struct SimpleOpCodeTranslator {
    name: &'static str,
    sequence: Vec<CilInstruction>,
    codes: Vec<InstructionCode>,
    operand_count: usize,
}

impl SimpleOpCodeTranslator {
    pub fn new(name: &'static str, opcode: CilInstruction, codes: &[InstructionCode]) -> Result<Self> {
        Self::with_sequence(name, vec![opcode], codes)
    }

    /// Fails unless `sequence` is non-empty and leaves exactly one result.
    pub fn with_sequence(name: &'static str, sequence: Vec<CilInstruction>, codes: &[InstructionCode]) -> Result<Self> {
        if sequence.is_empty() {
            bail!("translator '{}' has an empty host sequence", name);
        }
        let (operand_count, produced) = sequence_shape(&sequence);
        if produced != 1 {
            bail!(
                "translator '{}' host sequence leaves {} values, expected exactly one",
                name,
                produced
            );
        }
        Ok(Self {
            name,
            sequence,
            codes: codes.to_vec(),
            operand_count,
        })
    }

    /// Host opcodes emitted, in order.
    pub fn sequence(&self) -> &[CilInstruction] {
        &self.sequence
    }

    /// Values the sequence takes off the stack.
    pub fn operand_count(&self) -> usize {
        self.operand_count
    }
}

/// Returns (values consumed from below the sequence, values left behind).
fn sequence_shape(sequence: &[CilInstruction]) -> (usize, usize) {
    let mut depth: isize = 0;
    let mut consumed: isize = 0;
    for insn in sequence {
        let (pops, pushes) = insn.stack_arity();
        depth -= pops as isize;
        consumed = consumed.max(-depth);
        depth += pushes as isize;
    }
    (consumed as usize, (depth + consumed) as usize)
}

impl OpCodeTranslator for SimpleOpCodeTranslator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SimpleArithmetic
    }

    fn name(&self) -> &str {
        self.name
    }

    fn supported_codes(&self) -> &[InstructionCode] {
        &self.codes
    }

    fn translate(
        &self,
        instruction: &VmInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        ensure_supported(self, instruction)?;
        let code = instruction.code;
        if ctx.depth() < self.operand_count {
            return Err(TranslateError::StackUnderflow {
                code: code.into(),
                needed: self.operand_count,
                available: ctx.depth(),
            });
        }
        ctx.emit_all(code, self.sequence.iter().cloned())?;
        Ok(ctx.take_emitted())
    }
}
