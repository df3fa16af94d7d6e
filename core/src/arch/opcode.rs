use std::fmt;

/// Width / value class an opcode operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandWidth {
    Byte,
    Word,
    Dword,
    Qword,
    Object,
    Pointer,
    Real32,
    Real64,
}

impl OperandWidth {
    pub fn is_floating(&self) -> bool {
        matches!(self, OperandWidth::Real32 | OperandWidth::Real64)
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            OperandWidth::Byte | OperandWidth::Word | OperandWidth::Dword | OperandWidth::Qword
        )
    }
}

impl fmt::Display for OperandWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperandWidth::Byte => "byte",
            OperandWidth::Word => "word",
            OperandWidth::Dword => "dword",
            OperandWidth::Qword => "qword",
            OperandWidth::Object => "object",
            OperandWidth::Pointer => "ptr",
            OperandWidth::Real32 => "r32",
            OperandWidth::Real64 => "r64",
        };
        f.write_str(s)
    }
}

/// Operation family an opcode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpFamily {
    Nop,
    Load,
    Store,
    Push,
    Pop,
    Extend,
    Call,
    Return,
    Nor,
    Compare,
    Branch,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shr,
    Shl,
    Or,
    And,
    Xor,
    Not,
    Convert,
    VCall,
    Exception,
}

macro_rules! instruction_codes {
    ($($variant:ident => $mnemonic:literal, $family:ident, $width:expr;)+) => {
        /// Opcodes of the virtual machine, as produced by the decoder.
        ///
        /// The set is closed. Variants whose mnemonic starts with `__` are pseudo
        /// opcodes synthesised by upstream pattern recovery (e.g. a NOR chain
        /// collapsed back into `__XOR_DWORD`); the VM itself never encodes them.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum InstructionCode {
            $($variant,)+
        }

        impl InstructionCode {
            /// Every opcode, in declaration order.
            pub const ALL: &'static [InstructionCode] = &[$(InstructionCode::$variant,)+];

            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(InstructionCode::$variant => $mnemonic,)+
                }
            }

            pub fn family(&self) -> OpFamily {
                match self {
                    $(InstructionCode::$variant => OpFamily::$family,)+
                }
            }

            pub fn width(&self) -> Option<OperandWidth> {
                match self {
                    $(InstructionCode::$variant => $width,)+
                }
            }
        }
    };
}

use OperandWidth::*;

instruction_codes! {
    Nop => "NOP", Nop, None;

    LindPtr => "LIND_PTR", Load, Some(Pointer);
    LindObject => "LIND_OBJECT", Load, Some(Object);
    LindByte => "LIND_BYTE", Load, Some(Byte);
    LindWord => "LIND_WORD", Load, Some(Word);
    LindDword => "LIND_DWORD", Load, Some(Dword);
    LindQword => "LIND_QWORD", Load, Some(Qword);

    SindPtr => "SIND_PTR", Store, Some(Pointer);
    SindObject => "SIND_OBJECT", Store, Some(Object);
    SindByte => "SIND_BYTE", Store, Some(Byte);
    SindWord => "SIND_WORD", Store, Some(Word);
    SindDword => "SIND_DWORD", Store, Some(Dword);
    SindQword => "SIND_QWORD", Store, Some(Qword);

    Pop => "POP", Pop, None;

    PushrObject => "PUSHR_OBJECT", Push, Some(Object);
    PushrByte => "PUSHR_BYTE", Push, Some(Byte);
    PushrWord => "PUSHR_WORD", Push, Some(Word);
    PushrDword => "PUSHR_DWORD", Push, Some(Dword);
    PushrQword => "PUSHR_QWORD", Push, Some(Qword);
    PushiDword => "PUSHI_DWORD", Push, Some(Dword);
    PushiQword => "PUSHI_QWORD", Push, Some(Qword);

    SxByte => "SX_BYTE", Extend, Some(Byte);
    SxWord => "SX_WORD", Extend, Some(Word);
    SxDword => "SX_DWORD", Extend, Some(Dword);

    Call => "CALL", Call, None;
    Ret => "RET", Return, None;

    NorDword => "NOR_DWORD", Nor, Some(Dword);
    NorQword => "NOR_QWORD", Nor, Some(Qword);

    Cmp => "CMP", Compare, None;
    CmpDword => "CMP_DWORD", Compare, Some(Dword);
    CmpQword => "CMP_QWORD", Compare, Some(Qword);
    CmpR32 => "CMP_R32", Compare, Some(Real32);
    CmpR64 => "CMP_R64", Compare, Some(Real64);

    Jz => "JZ", Branch, None;
    Jnz => "JNZ", Branch, None;
    Jmp => "JMP", Branch, None;
    Swt => "SWT", Branch, None;

    AddDword => "ADD_DWORD", Add, Some(Dword);
    AddQword => "ADD_QWORD", Add, Some(Qword);
    AddR32 => "ADD_R32", Add, Some(Real32);
    AddR64 => "ADD_R64", Add, Some(Real64);

    SubR32 => "SUB_R32", Sub, Some(Real32);
    SubR64 => "SUB_R64", Sub, Some(Real64);

    MulDword => "MUL_DWORD", Mul, Some(Dword);
    MulQword => "MUL_QWORD", Mul, Some(Qword);
    MulR32 => "MUL_R32", Mul, Some(Real32);
    MulR64 => "MUL_R64", Mul, Some(Real64);

    DivDword => "DIV_DWORD", Div, Some(Dword);
    DivQword => "DIV_QWORD", Div, Some(Qword);
    DivR32 => "DIV_R32", Div, Some(Real32);
    DivR64 => "DIV_R64", Div, Some(Real64);

    RemDword => "REM_DWORD", Rem, Some(Dword);
    RemQword => "REM_QWORD", Rem, Some(Qword);
    RemR32 => "REM_R32", Rem, Some(Real32);
    RemR64 => "REM_R64", Rem, Some(Real64);

    ShrDword => "SHR_DWORD", Shr, Some(Dword);
    ShrQword => "SHR_QWORD", Shr, Some(Qword);
    ShlDword => "SHL_DWORD", Shl, Some(Dword);
    ShlQword => "SHL_QWORD", Shl, Some(Qword);

    FconvR32R64 => "FCONV_R32_R64", Convert, Some(Real64);
    FconvR64R32 => "FCONV_R64_R32", Convert, Some(Real32);
    FconvR32 => "FCONV_R32", Convert, Some(Real32);
    FconvR64 => "FCONV_R64", Convert, Some(Real64);
    IconvPtr => "ICONV_PTR", Convert, Some(Pointer);
    IconvR64 => "ICONV_R64", Convert, Some(Qword);

    Vcall => "VCALL", VCall, None;

    Try => "TRY", Exception, None;
    Leave => "LEAVE", Exception, None;

    SubDword => "__SUB_DWORD", Sub, Some(Dword);
    OrDword => "__OR_DWORD", Or, Some(Dword);
    AndDword => "__AND_DWORD", And, Some(Dword);
    XorDword => "__XOR_DWORD", Xor, Some(Dword);
    NotDword => "__NOT_DWORD", Not, Some(Dword);
}

impl InstructionCode {
    /// Whether this code only exists after upstream pattern recovery.
    pub fn is_pseudo(&self) -> bool {
        self.mnemonic().starts_with("__")
    }
}

impl fmt::Display for InstructionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
