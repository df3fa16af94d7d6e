pub mod arch;
pub mod cil;
pub mod recompiler;
pub mod util;
