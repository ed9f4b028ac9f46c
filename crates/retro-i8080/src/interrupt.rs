//! I8080 interrupt acceptance: the CPU has no interrupt modes — the
//! interrupting device places a single-byte opcode (or, for `CALL`, the
//! first byte of a 3-byte encoding that the decoder's own `fetch` calls
//! then walk through normally) directly on the data bus in place of the
//! next M1 fetch.

use retro_core::{BusStatus, CpuContext, CpuError, MemoryBus, PortBus, Ticks};

/// Check the pending interrupt line and, if deliverable, run the
/// acceptance sequence. Returns the T-states consumed, or `Ticks::ZERO` if
/// nothing was delivered.
///
/// Mirrors `retro_z80::service_interrupts`'s EI-protection handling: the
/// scheduler calls this once per instruction boundary, before `step`.
pub fn service_interrupts(ctx: &mut CpuContext, mem: &mut MemoryBus, io: &mut PortBus) -> Ticks {
    if ctx.regs.int_protection {
        ctx.regs.int_protection = false;
        return Ticks::ZERO;
    }

    if !ctx.regs.iff1 || !ctx.interrupts.int_pending() {
        return Ticks::ZERO;
    }

    let Some(data) = ctx.interrupts.take_int_data() else {
        ctx.cpu_error = CpuError::IntError;
        return Ticks::ZERO;
    };

    if ctx.regs.halted {
        ctx.regs.halted = false;
        ctx.regs.pc = ctx.regs.pc.wrapping_add(1);
        ctx.cpu_error = CpuError::None;
    }

    ctx.regs.iff1 = false;
    ctx.bus_status.set(BusStatus::INTA);

    // The device's opcode is dispatched exactly as `crate::decode::step`
    // would dispatch a fetched byte, except PC never advances past it (the
    // byte did not come from the instruction stream) and any further bytes
    // the opcode needs (e.g. a `CALL`'s target address) are pulled from
    // the normal instruction stream at the current PC, matching hardware:
    // only the first byte is supplied by the interrupting device.
    let ticks = crate::decode::execute_injected(ctx, mem, io, data);

    ctx.bus_status.clear(BusStatus::INTA);
    ticks
}
