use tracing::trace;

use crate::arch::VmRegister;
use crate::cil::{CilInstruction, LocalIndex, LocalOrigin, LocalVariable, StackType};
use crate::util::fast_map::FastHashMap;

use super::error::{CodeRef, TranslateError};
use super::options::RecompilerOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RegisterClass {
    Integral,
    Float,
    Object,
}

impl RegisterClass {
    fn of(ty: StackType) -> (Self, StackType) {
        match ty {
            StackType::Object => (RegisterClass::Object, StackType::Object),
            StackType::Float => (RegisterClass::Float, StackType::Float),
            _ => (RegisterClass::Integral, StackType::Int64),
        }
    }
}

/// Host locals are addressed by a `u16`.
pub const MAX_LOCALS: usize = u16::MAX as usize + 1;

/// Abstract evaluation stack and locals for one method under translation.
///
/// A context belongs to exactly one translation task; translators only ever
/// see it through `&mut`. Every emitted host instruction has its stack effect
/// applied immediately, so the stack always mirrors the host code produced so
/// far.
#[derive(Debug)]
pub struct TranslationContext {
    options: RecompilerOptions,
    stack: Vec<StackType>,
    max_depth: usize,
    locals: Vec<LocalVariable>,
    // Locals before this index were already handed out by `take_new_locals`.
    reported_locals: usize,
    register_locals: FastHashMap<(VmRegister, RegisterClass), LocalIndex>,
    // Class of the value most recently stored into each register.
    register_contents: FastHashMap<VmRegister, RegisterClass>,
    temp_locals: FastHashMap<(StackType, u8), LocalIndex>,
    pending: Vec<CilInstruction>,
}

impl Default for TranslationContext {
    fn default() -> Self {
        Self::new(RecompilerOptions::default())
    }
}

impl TranslationContext {
    pub fn new(options: RecompilerOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            max_depth: 0,
            locals: Vec::new(),
            reported_locals: 0,
            register_locals: FastHashMap::default(),
            register_contents: FastHashMap::default(),
            temp_locals: FastHashMap::default(),
            pending: Vec::new(),
        }
    }

    pub fn options(&self) -> &RecompilerOptions {
        &self.options
    }

    // === Abstract stack ===

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Stack contents, bottom first.
    pub fn stack(&self) -> &[StackType] {
        &self.stack
    }

    /// Type `n` slots below the top (top is 0).
    pub fn peek(&self, code: impl Into<CodeRef>, n: usize) -> Result<StackType, TranslateError> {
        let available = self.stack.len();
        if n >= available {
            return Err(TranslateError::StackUnderflow {
                code: code.into(),
                needed: n + 1,
                available,
            });
        }
        Ok(self.stack[available - 1 - n])
    }

    pub fn push(&mut self, code: impl Into<CodeRef>, ty: StackType) -> Result<(), TranslateError> {
        if self.stack.len() >= self.options.max_stack_depth {
            return Err(TranslateError::StackOverflow {
                code: code.into(),
                limit: self.options.max_stack_depth,
            });
        }
        self.stack.push(ty);
        self.max_depth = self.max_depth.max(self.stack.len());
        Ok(())
    }

    /// Pop `n` values, returned in push order (deepest first).
    pub fn pop(&mut self, code: impl Into<CodeRef>, n: usize) -> Result<Vec<StackType>, TranslateError> {
        let available = self.stack.len();
        if n > available {
            return Err(TranslateError::StackUnderflow {
                code: code.into(),
                needed: n,
                available,
            });
        }
        Ok(self.stack.split_off(available - n))
    }

    // === Locals ===

    pub fn locals(&self) -> &[LocalVariable] {
        &self.locals
    }

    /// Locals allocated since the previous call.
    pub fn take_new_locals(&mut self) -> Vec<LocalVariable> {
        let fresh = self.locals[self.reported_locals..].to_vec();
        self.reported_locals = self.locals.len();
        fresh
    }

    pub fn local_type(&self, index: LocalIndex) -> Option<StackType> {
        self.locals.get(index.0 as usize).map(|local| local.ty)
    }

    /// Host local backing `register` for values of type `ty`.
    ///
    /// Object references, floats and integral bits never share a slot: each
    /// register gets at most one `Int64`, one `Float` and one `Object` local.
    pub fn register_local(
        &mut self,
        code: impl Into<CodeRef>,
        register: VmRegister,
        ty: StackType,
    ) -> Result<LocalIndex, TranslateError> {
        let (class, local_ty) = RegisterClass::of(ty);
        if let Some(&index) = self.register_locals.get(&(register, class)) {
            return Ok(index);
        }
        let index = self.allocate_local(code.into(), local_ty, LocalOrigin::Register(register))?;
        self.register_locals.insert((register, class), index);
        Ok(index)
    }

    /// Like [`Self::register_local`], and remembers that `register` now holds a `ty`.
    pub fn store_register(
        &mut self,
        code: impl Into<CodeRef>,
        register: VmRegister,
        ty: StackType,
    ) -> Result<LocalIndex, TranslateError> {
        let index = self.register_local(code, register, ty)?;
        self.register_contents.insert(register, RegisterClass::of(ty).0);
        Ok(index)
    }

    /// Whether the last value stored into `register` was a float.
    pub fn register_holds_float(&self, register: VmRegister) -> bool {
        self.register_contents.get(&register) == Some(&RegisterClass::Float)
    }

    /// Scratch local of type `ty`. Distinct `slot`s never alias within one
    /// instruction's translation.
    pub fn temp_local(
        &mut self,
        code: impl Into<CodeRef>,
        ty: StackType,
        slot: u8,
    ) -> Result<LocalIndex, TranslateError> {
        let code = code.into();
        if !self.options.reuse_temporaries {
            return self.allocate_local(code, ty, LocalOrigin::Temporary { slot });
        }
        if let Some(&index) = self.temp_locals.get(&(ty, slot)) {
            return Ok(index);
        }
        let index = self.allocate_local(code, ty, LocalOrigin::Temporary { slot })?;
        self.temp_locals.insert((ty, slot), index);
        Ok(index)
    }

    fn allocate_local(
        &mut self,
        code: CodeRef,
        ty: StackType,
        origin: LocalOrigin,
    ) -> Result<LocalIndex, TranslateError> {
        let index = u16::try_from(self.locals.len()).map_err(|_| TranslateError::TooManyLocals {
            code,
            limit: MAX_LOCALS,
        })?;
        let index = LocalIndex(index);
        self.locals.push(LocalVariable { index, ty, origin });
        Ok(index)
    }

    // === Emission ===

    /// Append `insn` to the pending sequence and apply its stack effect.
    pub fn emit(&mut self, code: impl Into<CodeRef>, insn: CilInstruction) -> Result<(), TranslateError> {
        let code = code.into();
        self.apply_stack_effect(code, &insn)?;
        if self.options.trace_emission {
            trace!(%code, insn = %insn, depth = self.stack.len(), "emit");
        }
        self.pending.push(insn);
        Ok(())
    }

    pub fn emit_all(
        &mut self,
        code: impl Into<CodeRef>,
        insns: impl IntoIterator<Item = CilInstruction>,
    ) -> Result<(), TranslateError> {
        let code = code.into();
        for insn in insns {
            self.emit(code, insn)?;
        }
        Ok(())
    }

    /// Drain everything emitted since the last call.
    pub fn take_emitted(&mut self) -> Vec<CilInstruction> {
        std::mem::take(&mut self.pending)
    }

    fn apply_stack_effect(&mut self, code: CodeRef, insn: &CilInstruction) -> Result<(), TranslateError> {
        use CilInstruction::*;
        match insn {
            Nop => {}
            Ldnull => self.push(code, StackType::Object)?,
            LdcI4(_) => self.push(code, StackType::Int32)?,
            LdcI8(_) => self.push(code, StackType::Int64)?,
            Ldloc(index) => {
                let ty = self
                    .local_type(*index)
                    .ok_or_else(|| TranslateError::contract(code, index, "a local allocated by this context"))?;
                self.push(code, ty)?;
            }
            Stloc(_) | Pop => {
                self.pop(code, 1)?;
            }
            Dup => {
                let top = self.peek(code, 0)?;
                self.push(code, top)?;
            }
            Add | Sub | Mul | Div | Rem | And | Or | Xor => {
                let operands = self.pop(code, 2)?;
                self.push(code, StackType::binary_result(operands[0], operands[1]))?;
            }
            Shl | Shr | ShrUn => {
                let operands = self.pop(code, 2)?;
                self.push(code, operands[0])?;
            }
            Not | Neg => {
                let operand = self.pop(code, 1)?;
                self.push(code, operand[0])?;
            }
            ConvU1 | ConvU2 | ConvI4 | ConvU4 => self.convert(code, StackType::Int32)?,
            ConvI8 | ConvU8 => self.convert(code, StackType::Int64)?,
            ConvR4 | ConvR8 => self.convert(code, StackType::Float)?,
            ConvI => self.convert(code, StackType::NativeInt)?,
            Ceq | Cgt | CgtUn | Clt | CltUn => {
                self.pop(code, 2)?;
                self.push(code, StackType::Int32)?;
            }
            Box(_) | Castclass(_) => self.convert(code, StackType::Object)?,
            Call(method) | Callvirt(method) => {
                self.pop(code, method.stack_arguments())?;
                if let Some(ret) = method.return_type.as_ref().and_then(|ty| StackType::from_element(ty.element)) {
                    self.push(code, ret)?;
                }
            }
            Newobj(ctor) => {
                self.pop(code, ctor.parameters.len())?;
                self.push(code, StackType::Object)?;
            }
            Ldfld(field) => {
                self.pop(code, 1)?;
                self.push(code, field_stack_type(field))?;
            }
            Ldsfld(field) => self.push(code, field_stack_type(field))?,
            Stfld(_) => {
                self.pop(code, 2)?;
            }
            Stsfld(_) => {
                self.pop(code, 1)?;
            }
        }
        Ok(())
    }

    fn convert(&mut self, code: CodeRef, to: StackType) -> Result<(), TranslateError> {
        self.pop(code, 1)?;
        self.push(code, to)
    }
}

fn field_stack_type(field: &crate::arch::FieldRef) -> StackType {
    StackType::from_element(field.field_type.element).unwrap_or(StackType::Object)
}
