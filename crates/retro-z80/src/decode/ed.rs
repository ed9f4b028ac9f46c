//! The ED-prefixed plane: 16-bit loads/ALU against HL, I/O, block-move and
//! block-search/IO groups, and the interrupt/refresh housekeeping
//! instructions (NEG, RETN/RETI, IM, LD A,I/R, RRD/RLD).

use retro_core::flags::{CF, HF, NF, PF, SF, SZYXP, XF, YF, ZF};
use retro_core::{CpuError, Ticks};

use super::{Exec, Idx};
use crate::alu;

fn parity_flag(count_matches: bool) -> u8 {
    if count_matches {
        PF
    } else {
        0
    }
}

#[allow(clippy::too_many_lines)]
pub fn execute_ed(x: &mut Exec, opcode: u8) -> Ticks {
    let group = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let p = y >> 1;
    let q = y & 1;

    match group {
        1 => execute_io_and_16bit(x, y, z, p, q),
        2 if z <= 3 && y >= 4 => execute_block(x, y, z),
        _ => {
            x.raise(CpuError::OpTrap2);
            Ticks::new(8)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn execute_io_and_16bit(x: &mut Exec, y: u8, z: u8, p: u8, q: u8) -> Ticks {
    match z {
        0 => {
            let port = x.ctx.regs.c;
            x.ctx.regs.wz = x.ctx.regs.bc().wrapping_add(1);
            let value = x.in_port(port);
            // y == 6 is the undocumented `IN F,(C)`: flags only, no
            // register write.
            if y != 6 {
                x.write_r8(y, Idx::Hl, value);
            }
            x.ctx.regs.f = (x.ctx.regs.f & CF) | SZYXP[value as usize];
            Ticks::new(12)
        }
        1 => {
            let value = if y == 6 { 0 } else { x.read_r8(y, Idx::Hl) };
            x.ctx.regs.wz = x.ctx.regs.bc().wrapping_add(1);
            x.out_port(x.ctx.regs.c, value);
            Ticks::new(12)
        }
        2 => {
            let hl = x.ctx.regs.hl();
            let rp = x.read_rp(p, Idx::Hl);
            x.ctx.regs.wz = hl.wrapping_add(1);
            let (result, flags) = if q == 0 {
                alu::sbc16(hl, rp, x.ctx.regs.f & CF != 0)
            } else {
                alu::adc16(hl, rp, x.ctx.regs.f & CF != 0)
            };
            x.ctx.regs.set_hl(result);
            x.ctx.regs.f = flags;
            Ticks::new(15)
        }
        3 => {
            let addr = x.fetch_word();
            x.ctx.regs.wz = addr.wrapping_add(1);
            if q == 0 {
                let value = x.read_rp(p, Idx::Hl);
                x.write_mem(addr, value as u8);
                x.write_mem(addr.wrapping_add(1), (value >> 8) as u8);
            } else {
                let lo = x.read_mem(addr);
                let hi = x.read_mem(addr.wrapping_add(1));
                x.write_rp(p, Idx::Hl, u16::from_le_bytes([lo, hi]));
            }
            Ticks::new(20)
        }
        4 => {
            let a = x.ctx.regs.a;
            let result = alu::sub8(0, a, false);
            x.ctx.regs.a = result.value;
            x.ctx.regs.f = result.flags;
            Ticks::new(8)
        }
        5 => {
            // RETN (y != 1) and RETI (y == 1) are identical here; RETI's
            // extra signal to a daisy-chained interrupt controller has no
            // observer in this core.
            let addr = x.pop16();
            x.ctx.regs.pc = addr;
            x.ctx.regs.wz = addr;
            x.ctx.regs.iff1 = x.ctx.regs.iff2;
            Ticks::new(14)
        }
        6 => {
            x.ctx.regs.im = match y & 3 {
                0 | 1 => 0,
                2 => 1,
                _ => 2,
            };
            Ticks::new(8)
        }
        _ => execute_housekeeping(x, y),
    }
}

fn execute_housekeeping(x: &mut Exec, y: u8) -> Ticks {
    match y {
        0 => {
            x.ctx.regs.i = x.ctx.regs.a;
            Ticks::new(9)
        }
        1 => {
            x.ctx.regs.set_r_full(x.ctx.regs.a);
            Ticks::new(9)
        }
        2 => {
            x.ctx.regs.a = x.ctx.regs.i;
            set_ir_flags(x, x.ctx.regs.a);
            Ticks::new(9)
        }
        3 => {
            x.ctx.regs.a = x.ctx.regs.r_full();
            set_ir_flags(x, x.ctx.regs.a);
            Ticks::new(9)
        }
        4 => {
            // RRD
            let addr = x.ctx.regs.hl();
            let mem = x.read_mem(addr);
            let a = x.ctx.regs.a;
            let new_mem = (a << 4) | (mem >> 4);
            let new_a = (a & 0xF0) | (mem & 0x0F);
            x.write_mem(addr, new_mem);
            x.ctx.regs.a = new_a;
            x.ctx.regs.wz = addr.wrapping_add(1);
            x.ctx.regs.f = (x.ctx.regs.f & CF) | SZYXP[new_a as usize];
            Ticks::new(18)
        }
        5 => {
            // RLD
            let addr = x.ctx.regs.hl();
            let mem = x.read_mem(addr);
            let a = x.ctx.regs.a;
            let new_mem = (mem << 4) | (a & 0x0F);
            let new_a = (a & 0xF0) | (mem >> 4);
            x.write_mem(addr, new_mem);
            x.ctx.regs.a = new_a;
            x.ctx.regs.wz = addr.wrapping_add(1);
            x.ctx.regs.f = (x.ctx.regs.f & CF) | SZYXP[new_a as usize];
            Ticks::new(18)
        }
        _ => Ticks::new(8),
    }
}

/// `LD A,I` / `LD A,R` clear H and N, copy S/Z from the result, and set
/// P/V from IFF2 rather than parity — the one place SZYXP's P bit is
/// wrong for the instruction and must be overridden.
fn set_ir_flags(x: &mut Exec, value: u8) {
    let mut flags = (x.ctx.regs.f & CF) | (SZYXP[value as usize] & (SF | ZF | YF | XF));
    if x.ctx.regs.iff2 {
        flags |= PF;
    }
    x.ctx.regs.f = flags;
}

fn execute_block(x: &mut Exec, y: u8, z: u8) -> Ticks {
    let repeat = y == 6 || y == 7;
    let increment = y == 4 || y == 6;

    match z {
        0 => block_ld(x, increment, repeat),
        1 => block_cp(x, increment, repeat),
        2 => block_in(x, increment, repeat),
        _ => block_out(x, increment, repeat),
    }
}

fn step_hl_de(hl: &mut u16, de: &mut u16, increment: bool) {
    if increment {
        *hl = hl.wrapping_add(1);
        *de = de.wrapping_add(1);
    } else {
        *hl = hl.wrapping_sub(1);
        *de = de.wrapping_sub(1);
    }
}

fn block_ld(x: &mut Exec, increment: bool, repeat: bool) -> Ticks {
    let mut hl = x.ctx.regs.hl();
    let mut de = x.ctx.regs.de();
    let value = x.read_mem(hl);
    x.write_mem(de, value);
    step_hl_de(&mut hl, &mut de, increment);
    x.ctx.regs.set_hl(hl);
    x.ctx.regs.set_de(de);
    let bc = x.ctx.regs.bc().wrapping_sub(1);
    x.ctx.regs.set_bc(bc);

    let sum = value.wrapping_add(x.ctx.regs.a);
    let mut flags = x.ctx.regs.f & (SF | ZF | CF);
    flags |= sum & XF;
    if sum & 0x02 != 0 {
        flags |= YF;
    }
    flags |= parity_flag(bc != 0);
    x.ctx.regs.f = flags;

    if repeat && bc != 0 {
        x.ctx.regs.pc = x.ctx.regs.pc.wrapping_sub(2);
        x.ctx.regs.wz = x.ctx.regs.pc.wrapping_add(1);
        Ticks::new(21)
    } else {
        Ticks::new(16)
    }
}

fn block_cp(x: &mut Exec, increment: bool, repeat: bool) -> Ticks {
    let hl = x.ctx.regs.hl();
    let value = x.read_mem(hl);
    let a = x.ctx.regs.a;
    let result = a.wrapping_sub(value);

    let new_hl = if increment {
        x.ctx.regs.wz = x.ctx.regs.wz.wrapping_add(1);
        hl.wrapping_add(1)
    } else {
        x.ctx.regs.wz = x.ctx.regs.wz.wrapping_sub(1);
        hl.wrapping_sub(1)
    };
    x.ctx.regs.set_hl(new_hl);
    let bc = x.ctx.regs.bc().wrapping_sub(1);
    x.ctx.regs.set_bc(bc);

    let half_borrow = (a & 0x0F) < (value & 0x0F);
    let n = if half_borrow { result.wrapping_sub(1) } else { result };
    let mut flags = NF | (x.ctx.regs.f & CF);
    if result & 0x80 != 0 {
        flags |= SF;
    }
    if result == 0 {
        flags |= ZF;
    }
    if half_borrow {
        flags |= HF;
    }
    flags |= n & XF;
    if n & 0x02 != 0 {
        flags |= YF;
    }
    flags |= parity_flag(bc != 0);
    x.ctx.regs.f = flags;

    if repeat && bc != 0 && result != 0 {
        x.ctx.regs.pc = x.ctx.regs.pc.wrapping_sub(2);
        x.ctx.regs.wz = x.ctx.regs.pc.wrapping_add(1);
        Ticks::new(21)
    } else {
        Ticks::new(16)
    }
}

fn block_in(x: &mut Exec, increment: bool, repeat: bool) -> Ticks {
    let port = x.ctx.regs.c;
    let value = x.in_port(port);
    let addr = x.ctx.regs.hl();
    x.write_mem(addr, value);
    let new_hl = if increment { addr.wrapping_add(1) } else { addr.wrapping_sub(1) };
    x.ctx.regs.set_hl(new_hl);
    let b = x.ctx.regs.b.wrapping_sub(1);
    x.ctx.regs.b = b;

    let mut flags = if value & 0x80 != 0 { NF } else { 0 };
    if b == 0 {
        flags |= ZF;
    }
    if b & 0x80 != 0 {
        flags |= SF;
    }
    x.ctx.regs.f = flags | (x.ctx.regs.f & (YF | XF));

    if repeat && b != 0 {
        x.ctx.regs.pc = x.ctx.regs.pc.wrapping_sub(2);
        Ticks::new(21)
    } else {
        Ticks::new(16)
    }
}

fn block_out(x: &mut Exec, increment: bool, repeat: bool) -> Ticks {
    let addr = x.ctx.regs.hl();
    let value = x.read_mem(addr);
    x.out_port(x.ctx.regs.c, value);
    let new_hl = if increment { addr.wrapping_add(1) } else { addr.wrapping_sub(1) };
    x.ctx.regs.set_hl(new_hl);
    let b = x.ctx.regs.b.wrapping_sub(1);
    x.ctx.regs.b = b;

    let mut flags = if value & 0x80 != 0 { NF } else { 0 };
    if b == 0 {
        flags |= ZF;
    }
    if b & 0x80 != 0 {
        flags |= SF;
    }
    x.ctx.regs.f = flags | (x.ctx.regs.f & (YF | XF));

    if repeat && b != 0 {
        x.ctx.regs.pc = x.ctx.regs.pc.wrapping_sub(2);
        Ticks::new(21)
    } else {
        Ticks::new(16)
    }
}
