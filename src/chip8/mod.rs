//! The full implementation of the chip8 emulator, from the chipset state
//! over the dual-clock stepping to the instruction execution.
mod chipset;
mod opcodes;

/// reexport chipset structs and data for simpler usage
pub use chipset::*;
