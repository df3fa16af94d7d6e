//! Host bytecode emitted by the recompiler
//!
//! Only the slice of CIL that translators produce is modelled here, together
//! with the evaluation-stack types the abstract interpreter tracks.

use std::fmt;

use crate::arch::{ElementType, FieldRef, MethodRef, OperandWidth, TypeRef, VmRegister};

/// Type of a value on the host evaluation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackType {
    Int32,
    Int64,
    NativeInt,
    Float,
    Object,
    Pointer,
}

impl StackType {
    pub fn from_width(width: OperandWidth) -> Self {
        match width {
            OperandWidth::Byte | OperandWidth::Word | OperandWidth::Dword => StackType::Int32,
            OperandWidth::Qword => StackType::Int64,
            OperandWidth::Real32 | OperandWidth::Real64 => StackType::Float,
            OperandWidth::Object => StackType::Object,
            OperandWidth::Pointer => StackType::NativeInt,
        }
    }

    /// `None` for `void`.
    pub fn from_element(element: ElementType) -> Option<Self> {
        let ty = match element {
            ElementType::Void => return None,
            ElementType::Boolean
            | ElementType::Char
            | ElementType::I1
            | ElementType::U1
            | ElementType::I2
            | ElementType::U2
            | ElementType::I4
            | ElementType::U4 => StackType::Int32,
            ElementType::I8 | ElementType::U8 => StackType::Int64,
            ElementType::R4 | ElementType::R8 => StackType::Float,
            ElementType::I | ElementType::U => StackType::NativeInt,
            ElementType::String | ElementType::Object | ElementType::Class => StackType::Object,
            // Value types other than primitives are opaque structs; keep them
            // as object-like slots for bookkeeping.
            ElementType::ValueType => StackType::Object,
        };
        Some(ty)
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, StackType::Int32 | StackType::Int64 | StackType::NativeInt)
    }

    /// Result type of a numeric binary operator.
    ///
    /// Mixed integer widths widen to the larger operand; anything involving a
    /// float yields a float.
    pub fn binary_result(lhs: StackType, rhs: StackType) -> StackType {
        use StackType::*;
        match (lhs, rhs) {
            (Float, _) | (_, Float) => Float,
            (Int64, _) | (_, Int64) => Int64,
            (NativeInt, _) | (_, NativeInt) | (Pointer, _) | (_, Pointer) => NativeInt,
            (Int32, Int32) => Int32,
            (Object, _) | (_, Object) => Object,
        }
    }
}

impl fmt::Display for StackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StackType::Int32 => "int32",
            StackType::Int64 => "int64",
            StackType::NativeInt => "native int",
            StackType::Float => "F",
            StackType::Object => "O",
            StackType::Pointer => "&",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalIndex(pub u16);

impl fmt::Display for LocalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V_{}", self.0)
    }
}

/// Why a host local exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalOrigin {
    /// Backs a VM register.
    Register(VmRegister),
    /// Scratch slot owned by a translator.
    Temporary { slot: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub index: LocalIndex,
    pub ty: StackType,
    pub origin: LocalOrigin,
}

/// A single host instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum CilInstruction {
    Nop,
    // Constants
    Ldnull,
    LdcI4(i32),
    LdcI8(i64),
    // Locals and stack shuffling
    Ldloc(LocalIndex),
    Stloc(LocalIndex),
    Dup,
    Pop,
    // Arithmetic / bitwise
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    ShrUn,
    And,
    Or,
    Xor,
    Not,
    Neg,
    // Conversions
    ConvU1,
    ConvU2,
    ConvI4,
    ConvU4,
    ConvI8,
    ConvU8,
    ConvR4,
    ConvR8,
    ConvI,
    // Comparisons
    Ceq,
    Cgt,
    CgtUn,
    Clt,
    CltUn,
    // Object model
    Box(TypeRef),
    Castclass(TypeRef),
    Call(MethodRef),
    Callvirt(MethodRef),
    Newobj(MethodRef),
    Ldfld(FieldRef),
    Ldsfld(FieldRef),
    Stfld(FieldRef),
    Stsfld(FieldRef),
}

impl CilInstruction {
    pub fn mnemonic(&self) -> &'static str {
        use CilInstruction::*;
        match self {
            Nop => "nop",
            Ldnull => "ldnull",
            LdcI4(_) => "ldc.i4",
            LdcI8(_) => "ldc.i8",
            Ldloc(_) => "ldloc",
            Stloc(_) => "stloc",
            Dup => "dup",
            Pop => "pop",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Rem => "rem",
            Shl => "shl",
            Shr => "shr",
            ShrUn => "shr.un",
            And => "and",
            Or => "or",
            Xor => "xor",
            Not => "not",
            Neg => "neg",
            ConvU1 => "conv.u1",
            ConvU2 => "conv.u2",
            ConvI4 => "conv.i4",
            ConvU4 => "conv.u4",
            ConvI8 => "conv.i8",
            ConvU8 => "conv.u8",
            ConvR4 => "conv.r4",
            ConvR8 => "conv.r8",
            ConvI => "conv.i",
            Ceq => "ceq",
            Cgt => "cgt",
            CgtUn => "cgt.un",
            Clt => "clt",
            CltUn => "clt.un",
            Box(_) => "box",
            Castclass(_) => "castclass",
            Call(_) => "call",
            Callvirt(_) => "callvirt",
            Newobj(_) => "newobj",
            Ldfld(_) => "ldfld",
            Ldsfld(_) => "ldsfld",
            Stfld(_) => "stfld",
            Stsfld(_) => "stsfld",
        }
    }

    /// Number of values popped and pushed, ignoring their types.
    pub fn stack_arity(&self) -> (usize, usize) {
        use CilInstruction::*;
        match self {
            Nop => (0, 0),
            Ldnull | LdcI4(_) | LdcI8(_) | Ldloc(_) | Ldsfld(_) => (0, 1),
            Stloc(_) | Pop | Stsfld(_) => (1, 0),
            Dup => (1, 2),
            Add | Sub | Mul | Div | Rem | Shl | Shr | ShrUn | And | Or | Xor | Ceq | Cgt | CgtUn | Clt | CltUn => {
                (2, 1)
            }
            Not | Neg | ConvU1 | ConvU2 | ConvI4 | ConvU4 | ConvI8 | ConvU8 | ConvR4 | ConvR8 | ConvI | Box(_)
            | Castclass(_) | Ldfld(_) => (1, 1),
            Call(m) | Callvirt(m) => (m.stack_arguments(), usize::from(!m.is_void())),
            Newobj(m) => (m.parameters.len(), 1),
            Stfld(_) => (2, 0),
        }
    }
}

impl fmt::Display for CilInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CilInstruction::*;
        let mnemonic = self.mnemonic();
        match self {
            LdcI4(v) => write!(f, "{} {}", mnemonic, v),
            LdcI8(v) => write!(f, "{} {}", mnemonic, v),
            Ldloc(idx) | Stloc(idx) => write!(f, "{} {}", mnemonic, idx),
            Box(ty) | Castclass(ty) => write!(f, "{} {}", mnemonic, ty),
            Call(m) | Callvirt(m) | Newobj(m) => write!(f, "{} {}", mnemonic, m),
            Ldfld(fd) | Ldsfld(fd) | Stfld(fd) | Stsfld(fd) => write!(f, "{} {}", mnemonic, fd),
            _ => f.write_str(mnemonic),
        }
    }
}
