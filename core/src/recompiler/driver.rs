use rayon::prelude::*;
use tracing::{debug, warn};

use crate::arch::DecodedInstruction;
use crate::cil::{CilInstruction, LocalVariable};

use super::context::TranslationContext;
use super::error::{RecompileError, TranslateError};
use super::options::RecompilerOptions;
use super::registry::TranslatorRegistry;

/// Where the host code for one decoded instruction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionMapping {
    /// Offset of the decoded instruction.
    pub offset: u64,
    /// Index of its first host instruction in [`RecompiledMethod::instructions`].
    pub start: usize,
    pub len: usize,
}

/// Host body produced for one method.
#[derive(Debug, Clone, PartialEq)]
pub struct RecompiledMethod {
    pub instructions: Vec<CilInstruction>,
    pub locals: Vec<LocalVariable>,
    pub max_stack: usize,
    pub mappings: Vec<InstructionMapping>,
}

/// Walks decoded method bodies and dispatches each instruction through a
/// [`TranslatorRegistry`].
///
/// A method is translated completely or not at all: the first failure aborts
/// it and reports the offending instruction's position.
#[derive(Debug, Clone)]
pub struct MethodRecompiler<'r> {
    registry: &'r TranslatorRegistry,
    options: RecompilerOptions,
}

impl<'r> MethodRecompiler<'r> {
    pub fn new(registry: &'r TranslatorRegistry) -> Self {
        Self::with_options(registry, RecompilerOptions::default())
    }

    pub fn with_options(registry: &'r TranslatorRegistry, options: RecompilerOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &RecompilerOptions {
        &self.options
    }

    /// Translate a single instruction against an existing context.
    pub fn translate_one(
        &self,
        instruction: &DecodedInstruction,
        ctx: &mut TranslationContext,
    ) -> Result<Vec<CilInstruction>, TranslateError> {
        match instruction {
            DecodedInstruction::OpCode(insn) => self.registry.lookup_opcode(insn.code)?.translate(insn, ctx),
            DecodedInstruction::VCall(insn) => self.registry.lookup_vcall(insn.call)?.translate(insn, ctx),
        }
    }

    pub fn recompile(&self, body: &[DecodedInstruction]) -> Result<RecompiledMethod, RecompileError> {
        let mut ctx = TranslationContext::new(self.options.clone());
        let mut instructions = Vec::with_capacity(body.len() * 2);
        let mut mappings = Vec::with_capacity(body.len());

        for (index, decoded) in body.iter().enumerate() {
            match self.translate_one(decoded, &mut ctx) {
                Ok(emitted) => {
                    mappings.push(InstructionMapping {
                        offset: decoded.offset(),
                        start: instructions.len(),
                        len: emitted.len(),
                    });
                    instructions.extend(emitted);
                }
                Err(source) => {
                    warn!(index, offset = decoded.offset(), error = %source, "aborting method recompilation");
                    return Err(RecompileError {
                        index,
                        offset: decoded.offset(),
                        source,
                    });
                }
            }
        }

        debug!(
            decoded = body.len(),
            emitted = instructions.len(),
            locals = ctx.locals().len(),
            max_stack = ctx.max_depth(),
            "method recompiled"
        );
        Ok(RecompiledMethod {
            instructions,
            locals: ctx.take_new_locals(),
            max_stack: ctx.max_depth(),
            mappings,
        })
    }

    /// Recompile independent methods in parallel; results keep input order.
    ///
    /// Each method gets its own context; only the registry is shared.
    pub fn recompile_all(&self, bodies: &[&[DecodedInstruction]]) -> Vec<Result<RecompiledMethod, RecompileError>> {
        bodies.par_iter().map(|body| self.recompile(body)).collect()
    }
}
