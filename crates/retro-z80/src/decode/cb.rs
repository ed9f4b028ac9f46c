//! The CB-prefixed plane: rotate/shift, BIT, RES, SET. Reused for the
//! DDCB/FDCB planes, which fix `z` at 6 (the displacement was already
//! latched by the caller) and write the result back to both `(IX+d)`/
//! `(IY+d)` and, for the undocumented DDCB/FDCB form, the named register.

use retro_core::flags::{CF, PF, XF, YF};
use retro_core::{CpuError, Ticks};

use super::{Exec, Idx};
use crate::alu::{self, AluResult};
use crate::timing::{CB_TSTATES, DDFD_CB_EXTRA};

fn apply_rot(y: u8, value: u8, carry_in: bool) -> AluResult {
    match y {
        0 => alu::rlc8(value),
        1 => alu::rrc8(value),
        2 => alu::rl8(value, carry_in),
        3 => alu::rr8(value, carry_in),
        4 => alu::sla8(value),
        5 => alu::sra8(value),
        6 => alu::sll8(value),
        _ => alu::srl8(value),
    }
}

/// `z` is 6 whenever the DD/FD prefix promoted `(HL)` to `(IX+d)`/`(IY+d)`;
/// `displacement` carries the byte the caller already fetched in that case.
pub fn execute_cb(x: &mut Exec, opcode: u8, idx: Idx, displacement: Option<i8>) -> Ticks {
    let group = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;

    let addr = if idx.has_displacement() {
        let d = displacement.unwrap_or(0);
        Some(x.pair(idx).wrapping_add(d as i16 as u16))
    } else {
        None
    };
    if let Some(a) = addr {
        x.ctx.regs.wz = a;
    }
    // Plain `(HL)` forms do not touch WZ themselves; `BIT n,(HL)`'s
    // undocumented Y/X bits are sourced from whatever WZ already holds.

    // Under DD/FD, the grid always targets `(IX+d)`/`(IY+d)`; `z` in the
    // encoding still names a register for the undocumented write-back
    // variants, where the result is stored to memory AND to that register.
    let operand_index = if idx.has_displacement() { 6 } else { z };
    let value = if let Some(a) = addr { x.read_mem(a) } else { x.read_r8(operand_index, idx) };

    let base = Ticks::new(u64::from(CB_TSTATES[opcode as usize]))
        + if idx.has_displacement() { Ticks::new(DDFD_CB_EXTRA) } else { Ticks::ZERO };

    match group {
        0 => {
            if y == 6 && !x.ctx.config.undocumented {
                x.raise(CpuError::OpTrap2);
                return base;
            }
            let carry_in = x.ctx.regs.f & CF != 0;
            let result = apply_rot(y, value, carry_in);
            store_result(x, addr, z, idx, result.value);
            x.ctx.regs.f = result.flags;
            base
        }
        1 => {
            let bit = value & (1 << y);
            let mut flags = (x.ctx.regs.f & CF) | retro_core::flags::HF;
            if bit == 0 {
                flags |= retro_core::flags::ZF | PF;
            }
            if y == 7 && bit != 0 {
                flags |= retro_core::flags::SF;
            }
            // Undocumented Y/X: from the tested value for register
            // operands, from WZ's high byte for any memory operand —
            // `(HL)` included, not just the DD/FD-promoted forms. Gated on
            // `config.undocumented`: when disabled, every operand form
            // falls back to sourcing Y/X from the tested value itself.
            if x.ctx.config.undocumented && (addr.is_some() || z == 6) {
                flags |= (x.ctx.regs.wz >> 8) as u8 & (YF | XF);
            } else {
                flags |= value & (YF | XF);
            }
            x.ctx.regs.f = flags;
            base
        }
        2 => {
            let result = value & !(1 << y);
            store_result(x, addr, z, idx, result);
            base
        }
        _ => {
            let result = value | (1 << y);
            store_result(x, addr, z, idx, result);
            base
        }
    }
}

fn store_result(x: &mut Exec, addr: Option<u16>, z: u8, idx: Idx, value: u8) {
    if let Some(a) = addr {
        x.write_mem(a, value);
        // Undocumented DDCB/FDCB write-back: z != 6 also copies into the
        // named register, gated on `config.undocumented` per SPEC_FULL.md
        // §4.6; when disabled, only the memory write (the documented
        // behavior) happens.
        if z != 6 && x.ctx.config.undocumented {
            x.write_r8(z, idx, value);
        }
    } else {
        x.write_r8(z, idx, value);
    }
}

