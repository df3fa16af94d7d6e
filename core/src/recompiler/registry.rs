use std::sync::Arc;

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::arch::{InstructionCode, VCallCode};
use crate::cil::CilInstruction;
use crate::util::fast_map::{FastHashMap, fast_hash_map_with_capacity};

use super::error::TranslateError;
use super::opcode::{
    CompareTranslator, OpCodeTranslator, PopTranslator, PushTranslator, SimpleOpCodeTranslator,
};
use super::vcall::{BoxTranslator, ECallTranslator, FieldLoadTranslator, FieldStoreTranslator, VCallTranslator};

pub type SharedOpCodeTranslator = Arc<dyn OpCodeTranslator>;
pub type SharedVCallTranslator = Arc<dyn VCallTranslator>;

/// Mutable half of the registry; frozen by [`RegistryBuilder::build`].
///
/// Registering a code that already has a translator replaces it, so the
/// last registration in table order wins.
#[derive(Debug)]
pub struct RegistryBuilder {
    opcodes: FastHashMap<InstructionCode, SharedOpCodeTranslator>,
    vcalls: FastHashMap<VCallCode, SharedVCallTranslator>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            opcodes: fast_hash_map_with_capacity(InstructionCode::ALL.len()),
            vcalls: fast_hash_map_with_capacity(VCallCode::ALL.len()),
        }
    }

    /// Register one translator instance for every code in `codes`.
    pub fn register_opcodes(&mut self, codes: &[InstructionCode], translator: SharedOpCodeTranslator) -> Result<()> {
        for &code in codes {
            if !translator.supports(code) {
                return Err(anyhow!(
                    "translator '{}' does not handle opcode {}",
                    translator.name(),
                    code
                ));
            }
            if let Some(previous) = self.opcodes.insert(code, Arc::clone(&translator)) {
                debug!(
                    %code,
                    previous = previous.name(),
                    replacement = translator.name(),
                    "opcode translator replaced"
                );
            }
        }
        Ok(())
    }

    /// Register one translator instance for every call in `calls`.
    pub fn register_vcalls(&mut self, calls: &[VCallCode], translator: SharedVCallTranslator) -> Result<()> {
        for &call in calls {
            if !translator.supports(call) {
                return Err(anyhow!(
                    "translator '{}' does not handle vcall {}",
                    translator.name(),
                    call
                ));
            }
            if let Some(previous) = self.vcalls.insert(call, Arc::clone(&translator)) {
                debug!(
                    %call,
                    previous = previous.name(),
                    replacement = translator.name(),
                    "vcall translator replaced"
                );
            }
        }
        Ok(())
    }

    pub fn build(self) -> TranslatorRegistry {
        debug!(
            opcodes = self.opcodes.len(),
            vcalls = self.vcalls.len(),
            "translator registry built"
        );
        TranslatorRegistry {
            opcodes: self.opcodes,
            vcalls: self.vcalls,
        }
    }
}

/// The fixed translation table, in registration order.
///
/// Order matters only when a code appears twice; the later entry wins.
pub fn register_default_translators(builder: &mut RegistryBuilder) -> Result<()> {
    use InstructionCode::*;

    let push: SharedOpCodeTranslator = Arc::new(PushTranslator::new());
    builder.register_opcodes(
        &[PushrByte, PushrWord, PushrDword, PushrQword, PushrObject, PushiDword, PushiQword],
        push,
    )?;

    builder.register_opcodes(&[Pop], Arc::new(PopTranslator::new()))?;

    let add_codes = [AddDword, AddQword, AddR32, AddR64];
    let add = Arc::new(SimpleOpCodeTranslator::new("add", CilInstruction::Add, &add_codes)?);
    builder.register_opcodes(&add_codes, add)?;

    let cmp: SharedOpCodeTranslator = Arc::new(CompareTranslator::new());
    builder.register_opcodes(&[Cmp, CmpDword, CmpQword, CmpR32, CmpR64], cmp)?;

    let nor_codes = [NorDword, NorQword];
    let nor = Arc::new(SimpleOpCodeTranslator::with_sequence(
        "nor",
        vec![CilInstruction::Or, CilInstruction::Not],
        &nor_codes,
    )?);
    builder.register_opcodes(&nor_codes, nor)?;

    let single: [(&'static str, CilInstruction, InstructionCode); 5] = [
        ("sub", CilInstruction::Sub, SubDword),
        ("or", CilInstruction::Or, OrDword),
        ("and", CilInstruction::And, AndDword),
        ("xor", CilInstruction::Xor, XorDword),
        ("not", CilInstruction::Not, NotDword),
    ];
    for (name, opcode, code) in single {
        builder.register_opcodes(&[code], Arc::new(SimpleOpCodeTranslator::new(name, opcode, &[code])?))?;
    }

    builder.register_vcalls(&[VCallCode::Box], Arc::new(BoxTranslator::new()))?;
    builder.register_vcalls(&[VCallCode::ECall], Arc::new(ECallTranslator::new()))?;
    builder.register_vcalls(&[VCallCode::Ldfld], Arc::new(FieldLoadTranslator::new()))?;
    builder.register_vcalls(&[VCallCode::Stfld], Arc::new(FieldStoreTranslator::new()))?;
    Ok(())
}

static SHARED_REGISTRY: OnceCell<TranslatorRegistry> = OnceCell::new();

/// Immutable code → translator mapping.
///
/// There are no mutating methods; lookups are safe from any number of
/// threads once the value exists.
#[derive(Debug)]
pub struct TranslatorRegistry {
    opcodes: FastHashMap<InstructionCode, SharedOpCodeTranslator>,
    vcalls: FastHashMap<VCallCode, SharedVCallTranslator>,
}

impl TranslatorRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build the registry from the default translation table.
    pub fn build() -> Result<Self> {
        let mut builder = RegistryBuilder::new();
        register_default_translators(&mut builder)?;
        Ok(builder.build())
    }

    /// Process-wide registry, built on first use.
    pub fn shared() -> Result<&'static TranslatorRegistry> {
        SHARED_REGISTRY.get_or_try_init(Self::build)
    }

    pub fn lookup_opcode(&self, code: InstructionCode) -> Result<&SharedOpCodeTranslator, TranslateError> {
        self.opcodes
            .get(&code)
            .ok_or(TranslateError::UnsupportedInstruction(code))
    }

    pub fn lookup_vcall(&self, call: VCallCode) -> Result<&SharedVCallTranslator, TranslateError> {
        self.vcalls.get(&call).ok_or(TranslateError::UnsupportedVCall(call))
    }

    /// Covered opcodes, in declaration order.
    pub fn opcode_codes(&self) -> Vec<InstructionCode> {
        let mut codes: Vec<_> = self.opcodes.keys().copied().collect();
        codes.sort();
        codes
    }

    /// Covered intrinsics, in declaration order.
    pub fn vcall_codes(&self) -> Vec<VCallCode> {
        let mut calls: Vec<_> = self.vcalls.keys().copied().collect();
        calls.sort();
        calls
    }
}
