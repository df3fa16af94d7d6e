//! Translation of decoded VM instructions into host bytecode
//!
//! The [`TranslatorRegistry`] maps every supported [`InstructionCode`] and
//! [`VCallCode`] to a stateless translator. [`MethodRecompiler`] walks a
//! decoded method, asks the registry for each instruction's translator and
//! threads a per-method [`TranslationContext`] through them.
//!
//! [`InstructionCode`]: crate::arch::InstructionCode
//! [`VCallCode`]: crate::arch::VCallCode

mod context;
mod driver;
mod error;
mod opcode;
mod options;
mod registry;
mod vcall;

pub use context::{MAX_LOCALS, TranslationContext};
pub use driver::{InstructionMapping, MethodRecompiler, RecompiledMethod};
pub use error::{CodeRef, RecompileError, TranslateError};
pub use opcode::{
    CompareTranslator, OpCodeTranslator, PopTranslator, PushTranslator, SimpleOpCodeTranslator, StrategyKind,
};
pub use options::RecompilerOptions;
pub use registry::{
    RegistryBuilder, SharedOpCodeTranslator, SharedVCallTranslator, TranslatorRegistry,
    register_default_translators,
};
pub use vcall::{BoxTranslator, ECallTranslator, FieldLoadTranslator, FieldStoreTranslator, VCallTranslator};
