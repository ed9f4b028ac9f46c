//! The base opcode table (`x`/`y`/`z`/`p`/`q` decomposition), reused for the
//! DD/FD planes by varying `Idx`.

use retro_core::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use retro_core::{BusStatus, CpuError, Ticks};

use super::{Exec, Idx};
use crate::alu;
use crate::timing::BASE_TSTATES;

fn apply_alu(x: &mut Exec, y: u8, operand: u8) {
    let a = x.ctx.regs.a;
    let carry_in = x.ctx.regs.f & CF != 0;
    let result = match y {
        0 => alu::add8(a, operand, false),
        1 => alu::add8(a, operand, carry_in),
        2 => alu::sub8(a, operand, false),
        3 => alu::sub8(a, operand, carry_in),
        4 => alu::and8(a, operand),
        5 => alu::xor8(a, operand),
        6 => alu::or8(a, operand),
        _ => alu::cp8(a, operand),
    };
    x.ctx.regs.f = result.flags;
    if y != 7 {
        x.ctx.regs.a = result.value;
    }
}

fn jump_relative(x: &mut Exec, offset: i8) {
    let target = x.ctx.regs.pc.wrapping_add(offset as i16 as u16);
    x.ctx.regs.pc = target;
    x.ctx.regs.wz = target;
}

#[allow(clippy::too_many_lines)]
pub fn execute_unprefixed(x: &mut Exec, opcode: u8, idx: Idx) -> Ticks {
    let base = Ticks::new(u64::from(BASE_TSTATES[opcode as usize]));
    let bits_x = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let p = y >> 1;
    let q = y & 1;

    match bits_x {
        0 => execute_x0(x, y, z, p, q, idx, base),
        1 => execute_x1(x, y, z, idx, base),
        2 => {
            let operand = x.read_r8(z, idx);
            apply_alu(x, y, operand);
            extend_for_index(x, z, idx, base)
        }
        _ => execute_x3(x, y, z, p, q, idx, base),
    }
}

/// `(HL)` reads through the register grid cost +8 T-states once promoted to
/// `(IX+d)`/`(IY+d)` (the displacement-byte fetch plus an internal delay);
/// the one exception is `LD (IX+d),n`, which only costs +5 since the
/// immediate byte it already fetches absorbs part of that delay.
fn extend_for_index(x: &Exec, z: u8, idx: Idx, base: Ticks) -> Ticks {
    let _ = x;
    if z == 6 && idx.has_displacement() {
        Ticks::new(base.get() + 8)
    } else {
        base
    }
}

fn extend_for_index_with_immediate(z: u8, idx: Idx, base: Ticks) -> Ticks {
    if z == 6 && idx.has_displacement() {
        Ticks::new(base.get() + 5)
    } else {
        base
    }
}

#[allow(clippy::too_many_arguments)]
fn execute_x0(x: &mut Exec, y: u8, z: u8, p: u8, q: u8, idx: Idx, base: Ticks) -> Ticks {
    match z {
        0 => match y {
            0 => base,
            1 => {
                // EX AF,AF'
                std::mem::swap(&mut x.ctx.regs.a, &mut x.ctx.regs.a_alt);
                std::mem::swap(&mut x.ctx.regs.f, &mut x.ctx.regs.f_alt);
                base
            }
            2 => {
                // DJNZ d
                let offset = x.fetch_displacement();
                x.ctx.regs.b = x.ctx.regs.b.wrapping_sub(1);
                if x.ctx.regs.b != 0 {
                    jump_relative(x, offset);
                    Ticks::new(13)
                } else {
                    Ticks::new(8)
                }
            }
            3 => {
                let offset = x.fetch_displacement();
                jump_relative(x, offset);
                base
            }
            _ => {
                let offset = x.fetch_displacement();
                if x.test_condition(y - 4) {
                    jump_relative(x, offset);
                    Ticks::new(12)
                } else {
                    Ticks::new(7)
                }
            }
        },
        1 => {
            if q == 0 {
                let value = x.fetch_word();
                x.write_rp(p, idx, value);
            } else {
                let (result, flags) = alu::add16(x.pair(idx), x.read_rp(p, idx));
                x.ctx.regs.wz = x.pair(idx).wrapping_add(1);
                x.set_pair(idx, result);
                x.ctx.regs.f = (x.ctx.regs.f & (SF | ZF | PF)) | flags;
            }
            base
        }
        2 => {
            match (p, q) {
                (0, 0) => {
                    let addr = x.ctx.regs.bc();
                    x.write_mem(addr, x.ctx.regs.a);
                    x.ctx.regs.wz = (u16::from(x.ctx.regs.a) << 8) | addr.wrapping_add(1) & 0xFF;
                }
                (0, 1) => {
                    let addr = x.ctx.regs.bc();
                    x.ctx.regs.a = x.read_mem(addr);
                    x.ctx.regs.wz = addr.wrapping_add(1);
                }
                (1, 0) => {
                    let addr = x.ctx.regs.de();
                    x.write_mem(addr, x.ctx.regs.a);
                    x.ctx.regs.wz = (u16::from(x.ctx.regs.a) << 8) | addr.wrapping_add(1) & 0xFF;
                }
                (1, 1) => {
                    let addr = x.ctx.regs.de();
                    x.ctx.regs.a = x.read_mem(addr);
                    x.ctx.regs.wz = addr.wrapping_add(1);
                }
                (2, 0) => {
                    let addr = x.fetch_word();
                    let value = x.pair(idx);
                    x.write_mem(addr, value as u8);
                    x.write_mem(addr.wrapping_add(1), (value >> 8) as u8);
                    x.ctx.regs.wz = addr.wrapping_add(1);
                }
                (2, 1) => {
                    let addr = x.fetch_word();
                    let lo = x.read_mem(addr);
                    let hi = x.read_mem(addr.wrapping_add(1));
                    x.set_pair(idx, u16::from_le_bytes([lo, hi]));
                    x.ctx.regs.wz = addr.wrapping_add(1);
                }
                (3, 0) => {
                    let addr = x.fetch_word();
                    x.write_mem(addr, x.ctx.regs.a);
                    x.ctx.regs.wz = (u16::from(x.ctx.regs.a) << 8) | addr.wrapping_add(1) & 0xFF;
                }
                _ => {
                    let addr = x.fetch_word();
                    x.ctx.regs.a = x.read_mem(addr);
                    x.ctx.regs.wz = addr.wrapping_add(1);
                }
            }
            base
        }
        3 => {
            let value = x.read_rp(p, idx);
            let result = if q == 0 { value.wrapping_add(1) } else { value.wrapping_sub(1) };
            x.write_rp(p, idx, result);
            base
        }
        4 => {
            let operand = x.read_r8(y, idx);
            let result = alu::inc8(operand);
            x.write_r8(y, idx, result.value);
            x.ctx.regs.f = (x.ctx.regs.f & CF) | result.flags;
            extend_for_index(x, y, idx, base)
        }
        5 => {
            let operand = x.read_r8(y, idx);
            let result = alu::dec8(operand);
            x.write_r8(y, idx, result.value);
            x.ctx.regs.f = (x.ctx.regs.f & CF) | result.flags;
            extend_for_index(x, y, idx, base)
        }
        6 => {
            let n = x.fetch_byte();
            x.write_r8(y, idx, n);
            extend_for_index_with_immediate(y, idx, base)
        }
        _ => {
            match y {
                0 => {
                    let r = alu::rlc8(x.ctx.regs.a);
                    x.ctx.regs.a = r.value;
                    x.ctx.regs.f = (r.flags & (YF | XF | CF)) | (x.ctx.regs.a & (YF | XF));
                }
                1 => {
                    let r = alu::rrc8(x.ctx.regs.a);
                    x.ctx.regs.a = r.value;
                    x.ctx.regs.f = (x.ctx.regs.f & (SF | ZF | PF)) | (x.ctx.regs.a & (YF | XF)) | (r.flags & CF);
                }
                2 => {
                    let carry = x.ctx.regs.f & CF != 0;
                    let r = alu::rl8(x.ctx.regs.a, carry);
                    x.ctx.regs.a = r.value;
                    x.ctx.regs.f = (x.ctx.regs.f & (SF | ZF | PF)) | (x.ctx.regs.a & (YF | XF)) | (r.flags & CF);
                }
                3 => {
                    let carry = x.ctx.regs.f & CF != 0;
                    let r = alu::rr8(x.ctx.regs.a, carry);
                    x.ctx.regs.a = r.value;
                    x.ctx.regs.f = (x.ctx.regs.f & (SF | ZF | PF)) | (x.ctx.regs.a & (YF | XF)) | (r.flags & CF);
                }
                4 => {
                    let r = alu::daa(x.ctx.regs.a, x.ctx.regs.f);
                    x.ctx.regs.a = r.value;
                    x.ctx.regs.f = r.flags;
                }
                5 => {
                    x.ctx.regs.a = !x.ctx.regs.a;
                    x.ctx.regs.f = (x.ctx.regs.f & (SF | ZF | PF | CF)) | HF | NF | (x.ctx.regs.a & (YF | XF));
                }
                6 => {
                    x.ctx.regs.f =
                        (x.ctx.regs.f & (SF | ZF | PF)) | (x.ctx.regs.a & (YF | XF)) | CF;
                }
                _ => {
                    // CCF: old carry moves into H, carry itself flips.
                    let old_carry = x.ctx.regs.f & CF != 0;
                    let mut flags = (x.ctx.regs.f & (SF | ZF | PF)) | (x.ctx.regs.a & (YF | XF));
                    if old_carry {
                        flags |= HF;
                    } else {
                        flags |= CF;
                    }
                    x.ctx.regs.f = flags;
                }
            }
            base
        }
    }
}

fn execute_x1(x: &mut Exec, y: u8, z: u8, idx: Idx, base: Ticks) -> Ticks {
    if y == 6 && z == 6 {
        x.ctx.regs.halted = true;
        x.ctx.regs.pc = x.ctx.regs.pc.wrapping_sub(1);
        x.ctx.bus_status.set(BusStatus::HLTA);
        if !x.ctx.regs.iff1 {
            x.raise(CpuError::OpHalt);
        }
        return base;
    }
    let value = x.read_r8(z, idx);
    x.write_r8(y, idx, value);
    extend_for_index(x, z.max(y), idx, base)
}

#[allow(clippy::too_many_arguments)]
fn execute_x3(x: &mut Exec, y: u8, z: u8, p: u8, q: u8, idx: Idx, base: Ticks) -> Ticks {
    match z {
        0 => {
            if x.test_condition(y) {
                let addr = x.pop16();
                x.ctx.regs.pc = addr;
                x.ctx.regs.wz = addr;
                Ticks::new(11)
            } else {
                Ticks::new(5)
            }
        }
        1 => {
            if q == 0 {
                let value = x.pop16();
                x.write_rp2(p, idx, value);
                base
            } else {
                match p {
                    0 => {
                        let addr = x.pop16();
                        x.ctx.regs.pc = addr;
                        x.ctx.regs.wz = addr;
                    }
                    1 => {
                        std::mem::swap(&mut x.ctx.regs.b, &mut x.ctx.regs.b_alt);
                        std::mem::swap(&mut x.ctx.regs.c, &mut x.ctx.regs.c_alt);
                        std::mem::swap(&mut x.ctx.regs.d, &mut x.ctx.regs.d_alt);
                        std::mem::swap(&mut x.ctx.regs.e, &mut x.ctx.regs.e_alt);
                        std::mem::swap(&mut x.ctx.regs.h, &mut x.ctx.regs.h_alt);
                        std::mem::swap(&mut x.ctx.regs.l, &mut x.ctx.regs.l_alt);
                    }
                    2 => x.ctx.regs.pc = x.pair(idx),
                    _ => x.ctx.regs.sp = x.pair(idx),
                }
                base
            }
        }
        2 => {
            let addr = x.fetch_word();
            x.ctx.regs.wz = addr;
            if x.test_condition(y) {
                x.ctx.regs.pc = addr;
            }
            base
        }
        3 => match y {
            0 => {
                let addr = x.fetch_word();
                x.ctx.regs.wz = addr;
                x.ctx.regs.pc = addr;
                base
            }
            2 => {
                let port = x.fetch_byte();
                let addr = (u16::from(x.ctx.regs.a) << 8) | u16::from(port);
                x.out_port(port, x.ctx.regs.a);
                x.ctx.regs.wz = (addr & 0xFF00) | addr.wrapping_add(1) & 0xFF;
                base
            }
            3 => {
                let port = x.fetch_byte();
                x.ctx.regs.wz = (u16::from(x.ctx.regs.a) << 8).wrapping_add(u16::from(port)).wrapping_add(1);
                x.ctx.regs.a = x.in_port(port);
                base
            }
            4 => {
                let addr = x.ctx.regs.sp;
                let lo = x.read_mem(addr);
                let hi = x.read_mem(addr.wrapping_add(1));
                let old = x.pair(idx);
                x.write_mem(addr, old as u8);
                x.write_mem(addr.wrapping_add(1), (old >> 8) as u8);
                let new = u16::from_le_bytes([lo, hi]);
                x.set_pair(idx, new);
                x.ctx.regs.wz = new;
                base
            }
            5 => {
                let hl = x.ctx.regs.hl();
                let de = x.ctx.regs.de();
                x.ctx.regs.set_hl(de);
                x.ctx.regs.set_de(hl);
                base
            }
            6 => {
                x.ctx.regs.iff1 = false;
                x.ctx.regs.iff2 = false;
                base
            }
            _ => {
                x.ctx.regs.iff1 = true;
                x.ctx.regs.iff2 = true;
                x.ctx.regs.int_protection = true;
                base
            }
        },
        4 => {
            let addr = x.fetch_word();
            x.ctx.regs.wz = addr;
            if x.test_condition(y) {
                let ret = x.ctx.regs.pc;
                x.push16(ret);
                x.ctx.regs.pc = addr;
                Ticks::new(17)
            } else {
                base
            }
        }
        5 => {
            if q == 0 {
                let value = x.read_rp2(p, idx);
                x.push16(value);
                base
            } else {
                match p {
                    0 => {
                        let addr = x.fetch_word();
                        x.ctx.regs.wz = addr;
                        let ret = x.ctx.regs.pc;
                        x.push16(ret);
                        x.ctx.regs.pc = addr;
                        base
                    }
                    // DD/FD/ED redundant-prefix cases are consumed by the
                    // caller's prefix loop before this function ever runs.
                    _ => base,
                }
            }
        }
        6 => {
            let n = x.fetch_byte();
            apply_alu(x, y, n);
            base
        }
        _ => {
            let ret = x.ctx.regs.pc;
            x.push16(ret);
            let target = u16::from(y) * 8;
            x.ctx.regs.pc = target;
            x.ctx.regs.wz = target;
            base
        }
    }
}

