//! The full documented I8080 opcode map: the MOV/arithmetic/logic grid
//! inherited wholesale from the same `x`/`y`/`z` bitfield decomposition the
//! Z80 grid uses (the Z80 was designed as an 8080 superset), plus the
//! stack, branch, and I/O groups that don't fit the grid.

use retro_core::flags::{CF, NF, PF, SF, XF, YF, ZF};
use retro_core::{BusStatus, CpuContext, CpuError, MemoryBus, PortBus, Ticks};

use crate::alu::{self, AluResult};
use crate::timing::{BASE_TSTATES, CALL_TAKEN_EXTRA, RET_TAKEN_EXTRA};

struct Exec<'a> {
    ctx: &'a mut CpuContext,
    mem: &'a mut MemoryBus,
    io: &'a mut PortBus,
}

impl Exec<'_> {
    fn fetch_byte(&mut self) -> u8 {
        let pc = self.ctx.regs.pc;
        let byte = self.mem.fetch(pc);
        self.ctx.regs.pc = pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte();
        let hi = self.fetch_byte();
        u16::from_le_bytes([lo, hi])
    }

    fn push16(&mut self, value: u16) {
        let sp = self.ctx.regs.sp.wrapping_sub(2);
        self.ctx.regs.sp = sp;
        self.mem.write(sp, value as u8);
        self.mem.write(sp.wrapping_add(1), (value >> 8) as u8);
    }

    fn pop16(&mut self) -> u16 {
        let sp = self.ctx.regs.sp;
        let lo = self.mem.read(sp);
        let hi = self.mem.read(sp.wrapping_add(1));
        self.ctx.regs.sp = sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    /// Register-grid index 0=B,1=C,2=D,3=E,4=H,5=L,6=M(HL),7=A.
    fn read_r8(&mut self, index: u8) -> u8 {
        match index {
            0 => self.ctx.regs.b,
            1 => self.ctx.regs.c,
            2 => self.ctx.regs.d,
            3 => self.ctx.regs.e,
            4 => self.ctx.regs.h,
            5 => self.ctx.regs.l,
            6 => self.mem.read(self.ctx.regs.hl()),
            _ => self.ctx.regs.a,
        }
    }

    fn write_r8(&mut self, index: u8, value: u8) {
        match index {
            0 => self.ctx.regs.b = value,
            1 => self.ctx.regs.c = value,
            2 => self.ctx.regs.d = value,
            3 => self.ctx.regs.e = value,
            4 => self.ctx.regs.h = value,
            5 => self.ctx.regs.l = value,
            6 => {
                let addr = self.ctx.regs.hl();
                self.mem.write(addr, value);
            }
            _ => self.ctx.regs.a = value,
        }
    }

    /// `rp[p]`: BC, DE, HL, SP.
    fn read_rp(&self, p: u8) -> u16 {
        match p {
            0 => self.ctx.regs.bc(),
            1 => self.ctx.regs.de(),
            2 => self.ctx.regs.hl(),
            _ => self.ctx.regs.sp,
        }
    }

    fn write_rp(&mut self, p: u8, value: u16) {
        match p {
            0 => self.ctx.regs.set_bc(value),
            1 => self.ctx.regs.set_de(value),
            2 => self.ctx.regs.set_hl(value),
            _ => self.ctx.regs.sp = value,
        }
    }

    /// `rp2[p]`: BC, DE, HL, PSW — the PUSH/POP grid.
    fn read_rp2(&self, p: u8) -> u16 {
        if p == 3 {
            // Bit 1 fixed to 1, bits 3 and 5 fixed to 0, per the datasheet's
            // documented status-word layout.
            let f = (self.ctx.regs.f | 0x02) & !0x28;
            u16::from(self.ctx.regs.a) << 8 | u16::from(f)
        } else {
            self.read_rp(p)
        }
    }

    fn write_rp2(&mut self, p: u8, value: u16) {
        if p == 3 {
            self.ctx.regs.a = (value >> 8) as u8;
            self.ctx.regs.f = (value as u8 | 0x02) & !0x28;
        } else {
            self.write_rp(p, value);
        }
    }

    fn test_condition(&self, y: u8) -> bool {
        let f = self.ctx.regs.f;
        match y {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    fn in_port(&mut self, port: u8) -> u8 {
        self.ctx.bus_status.set(BusStatus::INP);
        let value = self.io.input(port);
        self.ctx.bus_status.clear(BusStatus::INP);
        value
    }

    fn out_port(&mut self, port: u8, value: u8) {
        self.ctx.bus_status.set(BusStatus::OUT);
        self.io.output(port, value);
        self.ctx.bus_status.clear(BusStatus::OUT);
    }

    fn raise(&mut self, error: CpuError) {
        self.ctx.cpu_error = error;
    }
}

fn apply_alu(y: u8, a: u8, b: u8, carry_in: bool) -> AluResult {
    match y {
        0 => alu::add8(a, b, false),
        1 => alu::add8(a, b, carry_in),
        2 => alu::sub8(a, b, false),
        3 => alu::sub8(a, b, carry_in),
        4 => alu::and8(a, b),
        5 => alu::xor8(a, b),
        6 => alu::or8(a, b),
        _ => alu::cp8(a, b),
    }
}

/// Decode and execute exactly one instruction starting at PC. Returns the
/// T-states it consumed.
pub fn step(ctx: &mut CpuContext, mem: &mut MemoryBus, io: &mut PortBus) -> Ticks {
    let mut x = Exec { ctx, mem, io };
    x.ctx.bus_status.set(BusStatus::M1);
    let opcode = x.fetch_byte();
    x.ctx.bus_status.clear(BusStatus::M1);

    let base = u64::from(BASE_TSTATES[opcode as usize]);
    let extra = dispatch(&mut x, opcode);

    // After every I8080 instruction N is forced, and Y/X (which don't
    // exist on this model) read back as zero.
    x.ctx.regs.f = (x.ctx.regs.f | NF) & !(XF | YF);

    Ticks::new(base + extra)
}

/// Execute `opcode` as if it had just been fetched, without consuming a
/// byte from PC or touching the M1 bus-status bit — used by interrupt
/// acceptance to dispatch the device-supplied opcode.
pub(crate) fn execute_injected(ctx: &mut CpuContext, mem: &mut MemoryBus, io: &mut PortBus, opcode: u8) -> Ticks {
    let mut x = Exec { ctx, mem, io };
    let base = u64::from(BASE_TSTATES[opcode as usize]);
    let extra = dispatch(&mut x, opcode);
    x.ctx.regs.f = (x.ctx.regs.f | NF) & !(XF | YF);
    Ticks::new(base + extra)
}

fn dispatch(x: &mut Exec, opcode: u8) -> u64 {
    let group = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let p = y >> 1;
    let q = y & 1;

    match group {
        0 => execute_x0(x, y, z, p, q),
        1 => execute_mov(x, y, z),
        2 => {
            let a = x.ctx.regs.a;
            let operand = x.read_r8(z);
            let carry_in = x.ctx.regs.f & CF != 0;
            let result = apply_alu(y, a, operand, carry_in);
            if y != 7 {
                x.ctx.regs.a = result.value;
            }
            x.ctx.regs.f = result.flags;
            0
        }
        _ => execute_x3(x, y, z, p, q),
    }
}

fn execute_x0(x: &mut Exec, y: u8, z: u8, p: u8, q: u8) -> u64 {
    match z {
        0 => 0, // NOP and its seven duplicate encodings
        1 => {
            if q == 0 {
                let value = x.fetch_word();
                x.write_rp(p, value);
            } else {
                let (result, carry) = alu::dad16(x.read_rp(p), x.read_rp(2));
                x.ctx.regs.set_hl(result);
                x.ctx.regs.f = (x.ctx.regs.f & !CF) | u8::from(carry);
            }
            0
        }
        2 => {
            match y {
                0 => x.mem.write(x.ctx.regs.bc(), x.ctx.regs.a), // STAX B
                2 => x.mem.write(x.ctx.regs.de(), x.ctx.regs.a), // STAX D
                1 => x.ctx.regs.a = x.mem.read(x.ctx.regs.bc()), // LDAX B
                3 => x.ctx.regs.a = x.mem.read(x.ctx.regs.de()), // LDAX D
                4 => {
                    let addr = x.fetch_word();
                    let hl = x.ctx.regs.hl();
                    x.mem.write(addr, hl as u8);
                    x.mem.write(addr.wrapping_add(1), (hl >> 8) as u8);
                }
                5 => {
                    let addr = x.fetch_word();
                    let lo = x.mem.read(addr);
                    let hi = x.mem.read(addr.wrapping_add(1));
                    x.ctx.regs.set_hl(u16::from_le_bytes([lo, hi]));
                }
                6 => {
                    let addr = x.fetch_word();
                    x.mem.write(addr, x.ctx.regs.a);
                }
                _ => {
                    let addr = x.fetch_word();
                    x.ctx.regs.a = x.mem.read(addr);
                }
            }
            0
        }
        3 => {
            let value = x.read_rp(p);
            x.write_rp(p, if q == 0 { value.wrapping_add(1) } else { value.wrapping_sub(1) });
            0
        }
        4 => {
            let result = alu::inc8(x.read_r8(y));
            x.write_r8(y, result.value);
            x.ctx.regs.f = (x.ctx.regs.f & CF) | (result.flags & !CF);
            0
        }
        5 => {
            let result = alu::dec8(x.read_r8(y));
            x.write_r8(y, result.value);
            x.ctx.regs.f = (x.ctx.regs.f & CF) | (result.flags & !CF);
            0
        }
        6 => {
            let value = x.fetch_byte();
            x.write_r8(y, value);
            0
        }
        _ => {
            match y {
                0 => {
                    let (value, carry) = alu::rlc8(x.ctx.regs.a);
                    x.ctx.regs.a = value;
                    x.ctx.regs.f = (x.ctx.regs.f & !CF) | u8::from(carry);
                }
                1 => {
                    let (value, carry) = alu::rrc8(x.ctx.regs.a);
                    x.ctx.regs.a = value;
                    x.ctx.regs.f = (x.ctx.regs.f & !CF) | u8::from(carry);
                }
                2 => {
                    let (value, carry) = alu::ral8(x.ctx.regs.a, x.ctx.regs.f & CF != 0);
                    x.ctx.regs.a = value;
                    x.ctx.regs.f = (x.ctx.regs.f & !CF) | u8::from(carry);
                }
                3 => {
                    let (value, carry) = alu::rar8(x.ctx.regs.a, x.ctx.regs.f & CF != 0);
                    x.ctx.regs.a = value;
                    x.ctx.regs.f = (x.ctx.regs.f & !CF) | u8::from(carry);
                }
                4 => {
                    let result = alu::daa(x.ctx.regs.a, x.ctx.regs.f);
                    x.ctx.regs.a = result.value;
                    x.ctx.regs.f = result.flags;
                }
                5 => x.ctx.regs.a = !x.ctx.regs.a, // CMA
                6 => x.ctx.regs.f |= CF,            // STC
                _ => x.ctx.regs.f ^= CF,             // CMC
            }
            0
        }
    }
}

fn execute_mov(x: &mut Exec, y: u8, z: u8) -> u64 {
    if y == 6 && z == 6 {
        x.ctx.regs.halted = true;
        x.ctx.regs.pc = x.ctx.regs.pc.wrapping_sub(1);
        x.ctx.bus_status.set(BusStatus::HLTA);
        if !x.ctx.regs.iff1 {
            x.raise(CpuError::OpHalt);
        }
        return 0;
    }
    let value = x.read_r8(z);
    x.write_r8(y, value);
    0
}

fn execute_x3(x: &mut Exec, y: u8, z: u8, p: u8, q: u8) -> u64 {
    match z {
        0 => {
            if x.test_condition(y) {
                x.ctx.regs.pc = x.pop16();
                RET_TAKEN_EXTRA
            } else {
                0
            }
        }
        1 => {
            if q == 0 {
                let value = x.pop16();
                x.write_rp2(p, value);
                0
            } else {
                match y {
                    1 | 3 => x.ctx.regs.pc = x.pop16(), // RET / dup RET
                    5 => x.ctx.regs.pc = x.ctx.regs.hl(), // PCHL
                    _ => x.ctx.regs.sp = x.ctx.regs.hl(), // SPHL
                }
                0
            }
        }
        2 => {
            let target = x.fetch_word();
            if x.test_condition(y) {
                x.ctx.regs.pc = target;
            }
            0
        }
        3 => {
            match y {
                0 | 1 => x.ctx.regs.pc = x.fetch_word(), // JMP / dup JMP
                2 => {
                    let port = x.fetch_byte();
                    let value = x.ctx.regs.a;
                    x.out_port(port, value);
                }
                3 => {
                    let port = x.fetch_byte();
                    x.ctx.regs.a = x.in_port(port);
                }
                4 => {
                    let sp = x.ctx.regs.sp;
                    let lo = x.mem.read(sp);
                    let hi = x.mem.read(sp.wrapping_add(1));
                    x.mem.write(sp, x.ctx.regs.l);
                    x.mem.write(sp.wrapping_add(1), x.ctx.regs.h);
                    x.ctx.regs.set_hl(u16::from_le_bytes([lo, hi]));
                }
                5 => {
                    let hl = x.ctx.regs.hl();
                    x.ctx.regs.set_hl(x.ctx.regs.de());
                    x.ctx.regs.set_de(hl);
                }
                6 => x.ctx.regs.iff1 = false, // DI
                _ => x.ctx.regs.iff1 = true,  // EI
            }
            0
        }
        4 => {
            let target = x.fetch_word();
            if x.test_condition(y) {
                let pc = x.ctx.regs.pc;
                x.push16(pc);
                x.ctx.regs.pc = target;
                CALL_TAKEN_EXTRA
            } else {
                0
            }
        }
        5 => {
            if q == 0 {
                let value = x.read_rp2(p);
                x.push16(value);
            } else {
                // CALL nn and its three duplicate encodings
                let target = x.fetch_word();
                let pc = x.ctx.regs.pc;
                x.push16(pc);
                x.ctx.regs.pc = target;
            }
            0
        }
        6 => {
            let a = x.ctx.regs.a;
            let operand = x.fetch_byte();
            let carry_in = x.ctx.regs.f & CF != 0;
            let result = apply_alu(y, a, operand, carry_in);
            if y != 7 {
                x.ctx.regs.a = result.value;
            }
            x.ctx.regs.f = result.flags;
            0
        }
        _ => {
            let pc = x.ctx.regs.pc;
            x.push16(pc);
            x.ctx.regs.pc = u16::from(y) * 8;
            0
        }
    }
}
