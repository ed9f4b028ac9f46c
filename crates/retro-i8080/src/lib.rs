//! Instruction-accurate I8080 decoder/executor: the full documented
//! instruction set, driven one instruction at a time against a
//! [`retro_core::CpuContext`].
//!
//! Unlike the Z80 executor, there are no prefix planes and no undocumented
//! opcode surface — every one of the 256 opcode values is either a
//! documented instruction or one of the datasheet's literal duplicate
//! encodings (extra NOPs at the `z=0` column, extra JMP/RET/CALL at
//! 0xCB/0xD9/0xDD/0xED/0xFD).

mod alu;
mod decode;
mod interrupt;
mod timing;

pub use decode::step;
pub use interrupt::service_interrupts;
