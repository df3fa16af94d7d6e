use std::fmt;

macro_rules! vcall_codes {
    ($($variant:ident => $mnemonic:literal;)+) => {
        /// VM intrinsics reached through the `VCALL` opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum VCallCode {
            $($variant,)+
        }

        impl VCallCode {
            pub const ALL: &'static [VCallCode] = &[$(VCallCode::$variant,)+];

            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(VCallCode::$variant => $mnemonic,)+
                }
            }
        }
    };
}

vcall_codes! {
    Exit => "EXIT";
    Break => "BREAK";
    ECall => "ECALL";
    Cast => "CAST";
    CkFinite => "CKFINITE";
    CkOverflow => "CKOVERFLOW";
    RangeChk => "RANGECHK";
    InitObj => "INITOBJ";
    Ldfld => "LDFLD";
    Ldftn => "LDFTN";
    Token => "TOKEN";
    Throw => "THROW";
    SizeOf => "SIZEOF";
    Stfld => "STFLD";
    Box => "BOX";
    Unbox => "UNBOX";
    Localloc => "LOCALLOC";
}

impl fmt::Display for VCallCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
