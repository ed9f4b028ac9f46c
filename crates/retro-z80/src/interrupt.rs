//! NMI and maskable-interrupt delivery, consulted by the scheduler once per
//! instruction boundary, before `step`.

use retro_core::{BusStatus, CpuContext, CpuError, MemoryBus, Ticks};

/// Check the pending NMI and (if no NMI) maskable-interrupt lines and, if
/// one is deliverable, run the acceptance sequence: HALT is unwound, the
/// current PC is pushed, and control transfers per the active interrupt
/// mode. Returns the T-states the acceptance sequence itself consumed, or
/// `Ticks::ZERO` if nothing was delivered.
///
/// `EI`'s one-instruction protection window (`int_protection`) is honored
/// here, not inside `step`: the scheduler must still call `step` once more
/// before the first interrupt after `EI` can be taken.
pub fn service_interrupts(ctx: &mut CpuContext, mem: &mut MemoryBus) -> Ticks {
    if ctx.regs.int_protection {
        ctx.regs.int_protection = false;
        return Ticks::ZERO;
    }

    if ctx.interrupts.take_nmi() {
        return accept_nmi(ctx, mem);
    }

    if ctx.regs.iff1 && ctx.interrupts.int_pending() {
        return accept_maskable(ctx, mem);
    }

    Ticks::ZERO
}

fn leave_halt(ctx: &mut CpuContext) {
    if ctx.regs.halted {
        ctx.regs.halted = false;
        ctx.regs.pc = ctx.regs.pc.wrapping_add(1);
        ctx.cpu_error = CpuError::None;
    }
}

fn accept_nmi(ctx: &mut CpuContext, mem: &mut MemoryBus) -> Ticks {
    leave_halt(ctx);
    ctx.regs.iff2 = ctx.regs.iff1;
    ctx.regs.iff1 = false;
    push_and_jump(ctx, mem, 0x0066);
    Ticks::new(11)
}

fn accept_maskable(ctx: &mut CpuContext, mem: &mut MemoryBus) -> Ticks {
    let Some(data) = ctx.interrupts.take_int_data() else {
        ctx.cpu_error = CpuError::IntError;
        return Ticks::ZERO;
    };

    leave_halt(ctx);
    ctx.regs.iff1 = false;
    ctx.regs.iff2 = false;
    ctx.bus_status.set(BusStatus::INTA);

    let ticks = match ctx.regs.im {
        0 => {
            // Mode 0: the interrupting device supplies a full instruction
            // on the bus. This core only honors the common case of a
            // single-byte RST opcode; anything else is not representable
            // without modeling the device's instruction stream.
            if data & 0xC7 == 0xC7 {
                let target = u16::from(data & 0x38);
                push_and_jump(ctx, mem, target);
            }
            Ticks::new(13)
        }
        1 => {
            push_and_jump(ctx, mem, 0x0038);
            Ticks::new(13)
        }
        _ => {
            let vector_addr = (u16::from(ctx.regs.i) << 8) | u16::from(data);
            let lo = mem.read(vector_addr);
            let hi = mem.read(vector_addr.wrapping_add(1));
            let target = u16::from_le_bytes([lo, hi]);
            push_and_jump(ctx, mem, target);
            Ticks::new(19)
        }
    };

    ctx.bus_status.clear(BusStatus::INTA);
    ticks
}

fn push_and_jump(ctx: &mut CpuContext, mem: &mut MemoryBus, target: u16) {
    let sp = ctx.regs.sp.wrapping_sub(2);
    ctx.regs.sp = sp;
    let pc = ctx.regs.pc;
    mem.write(sp, pc as u8);
    mem.write(sp.wrapping_add(1), (pc >> 8) as u8);
    ctx.regs.pc = target;
    ctx.regs.wz = target;
}
