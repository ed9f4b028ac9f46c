//! Single-master DMA hand-off: a device asserts `BUSRQ` through the
//! [`retro_core::InterruptFabric`], the scheduler parks the CPU at the next
//! instruction boundary (`BUSAK`) until the device releases it.

use retro_core::{BusStatus, CpuContext, Ticks};

/// T-states charged per poll cycle while the bus is held by a DMA master.
/// The CPU itself does nothing during this time — its clock keeps ticking,
/// but no instruction fetch occurs — so this only needs to be nonzero to
/// keep `total_ticks` advancing in step with wall-clock throttling.
const BUS_HOLD_TSTATES: u64 = 1;

/// If a bus request is pending, assert `BUSAK` and spin-wait (charging one
/// T-state per poll) until the device calls `end_bus_request`. Returns the
/// T-states consumed while the bus was held; zero if no request was active.
pub fn service_bus_request(ctx: &mut CpuContext) -> Ticks {
    if !ctx.interrupts.bus_requested() {
        return Ticks::ZERO;
    }

    ctx.bus_status.set(BusStatus::BUSAK);
    let mut held = Ticks::ZERO;
    while ctx.interrupts.bus_requested() {
        held += Ticks::new(BUS_HOLD_TSTATES);
    }
    ctx.bus_status.clear(BusStatus::BUSAK);
    held
}

#[cfg(test)]
mod tests {
    use super::*;
    use retro_core::Config;

    #[test]
    fn no_pending_request_costs_nothing() {
        let mut ctx = CpuContext::new(Config::default());
        assert_eq!(service_bus_request(&mut ctx).get(), 0);
    }

    #[test]
    fn pending_request_already_ended_costs_nothing_and_leaves_busak_clear() {
        let mut ctx = CpuContext::new(Config::default());
        ctx.interrupts.start_bus_request();
        ctx.interrupts.end_bus_request();
        let ticks = service_bus_request(&mut ctx);
        assert!(ctx.bus_status.is_none());
        assert_eq!(ticks.get(), 0);
    }
}
