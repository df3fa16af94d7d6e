//! Data model of the virtual machine being reversed
//!
//! Opcode and intrinsic enumerations plus the decoded instruction records the
//! upstream disassembler hands over for translation.

mod instruction;
mod metadata;
mod opcode;
mod vcall;

pub use instruction::*;
pub use metadata::*;
pub use opcode::*;
pub use vcall::*;
