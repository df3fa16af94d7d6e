use std::fmt;

use super::metadata::{FieldRef, MethodRef, TypeRef};
use super::opcode::InstructionCode;
use super::vcall::VCallCode;

/// Registers of the virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VmRegister {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    Bp,
    Sp,
    Ip,
    Fl,
    K1,
    K2,
    M1,
    M2,
}

impl fmt::Display for VmRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VmRegister::R0 => "R0",
            VmRegister::R1 => "R1",
            VmRegister::R2 => "R2",
            VmRegister::R3 => "R3",
            VmRegister::R4 => "R4",
            VmRegister::R5 => "R5",
            VmRegister::R6 => "R6",
            VmRegister::R7 => "R7",
            VmRegister::Bp => "BP",
            VmRegister::Sp => "SP",
            VmRegister::Ip => "IP",
            VmRegister::Fl => "FL",
            VmRegister::K1 => "K1",
            VmRegister::K2 => "K2",
            VmRegister::M1 => "M1",
            VmRegister::M2 => "M2",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Immediate {
    Dword(u32),
    Qword(u64),
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Dword(v) => write!(f, "{:#010x}", v),
            Immediate::Qword(v) => write!(f, "{:#018x}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operand {
    #[default]
    None,
    Immediate(Immediate),
    Register(VmRegister),
}

impl Operand {
    /// Short shape name used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Operand::None => "none",
            Operand::Immediate(Immediate::Dword(_)) => "dword immediate",
            Operand::Immediate(Immediate::Qword(_)) => "qword immediate",
            Operand::Register(_) => "register",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Immediate(imm) => write!(f, "{}", imm),
            Operand::Register(reg) => write!(f, "{}", reg),
        }
    }
}

/// One decoded plain VM instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct VmInstruction {
    /// Byte offset of the instruction in the virtualised method body.
    pub offset: u64,
    pub code: InstructionCode,
    pub operand: Operand,
}

impl VmInstruction {
    pub fn new(offset: u64, code: InstructionCode, operand: Operand) -> Self {
        Self { offset, code, operand }
    }

    pub fn register(offset: u64, code: InstructionCode, register: VmRegister) -> Self {
        Self::new(offset, code, Operand::Register(register))
    }

    pub fn dword(offset: u64, code: InstructionCode, value: u32) -> Self {
        Self::new(offset, code, Operand::Immediate(Immediate::Dword(value)))
    }

    pub fn qword(offset: u64, code: InstructionCode, value: u64) -> Self {
        Self::new(offset, code, Operand::Immediate(Immediate::Qword(value)))
    }

    pub fn bare(offset: u64, code: InstructionCode) -> Self {
        Self::new(offset, code, Operand::None)
    }
}

impl fmt::Display for VmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "IL_{:04X}: {}", self.offset, self.code),
            ref operand => write!(f, "IL_{:04X}: {} {}", self.offset, self.code, operand),
        }
    }
}

/// How an external call is dispatched on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ECallKind {
    Call,
    CallVirt,
    NewObj,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum VCallOperand {
    #[default]
    None,
    Type(TypeRef),
    Field(FieldRef),
    Method { method: MethodRef, kind: ECallKind },
}

impl VCallOperand {
    pub fn shape(&self) -> &'static str {
        match self {
            VCallOperand::None => "none",
            VCallOperand::Type(_) => "type reference",
            VCallOperand::Field(_) => "field reference",
            VCallOperand::Method { .. } => "method reference",
        }
    }
}

impl fmt::Display for VCallOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VCallOperand::None => Ok(()),
            VCallOperand::Type(ty) => write!(f, "{}", ty),
            VCallOperand::Field(field) => write!(f, "{}", field),
            VCallOperand::Method { method, kind } => write!(f, "{:?} {}", kind, method),
        }
    }
}

/// One decoded `VCALL` with its intrinsic resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct VCallInstruction {
    pub offset: u64,
    pub call: VCallCode,
    pub operand: VCallOperand,
}

impl VCallInstruction {
    pub fn new(offset: u64, call: VCallCode, operand: VCallOperand) -> Self {
        Self { offset, call, operand }
    }
}

impl fmt::Display for VCallInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04X}: VCALL {}", self.offset, self.call)?;
        if !matches!(self.operand, VCallOperand::None) {
            write!(f, " {}", self.operand)?;
        }
        Ok(())
    }
}

/// Anything the decoder hands to the recompiler.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedInstruction {
    OpCode(VmInstruction),
    VCall(VCallInstruction),
}

impl DecodedInstruction {
    pub fn offset(&self) -> u64 {
        match self {
            DecodedInstruction::OpCode(insn) => insn.offset,
            DecodedInstruction::VCall(insn) => insn.offset,
        }
    }
}

impl From<VmInstruction> for DecodedInstruction {
    fn from(insn: VmInstruction) -> Self {
        DecodedInstruction::OpCode(insn)
    }
}

impl From<VCallInstruction> for DecodedInstruction {
    fn from(insn: VCallInstruction) -> Self {
        DecodedInstruction::VCall(insn)
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedInstruction::OpCode(insn) => write!(f, "{}", insn),
            DecodedInstruction::VCall(insn) => write!(f, "{}", insn),
        }
    }
}
