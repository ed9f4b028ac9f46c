//! `CpuContext`: the single owned value that replaces the teacher's
//! process-wide scalars. The scheduler owns one of these; devices reach it
//! only through the [`crate::InterruptFabric`] handle, never directly.

use std::sync::Arc;

use crate::flags::{NF, XF, YF};
use crate::{BusStatus, Config, CpuError, InterruptFabric, Model, Registers, Ticks};

/// Everything the Z80/I8080 decoders read and mutate on every step, plus
/// the bookkeeping the scheduler needs between steps.
pub struct CpuContext {
    pub regs: Registers,
    pub model: Model,
    pub config: Config,
    pub bus_status: BusStatus,
    pub cpu_error: CpuError,
    pub total_ticks: Ticks,
    pub interrupts: Arc<InterruptFabric>,
}

impl CpuContext {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            regs: Registers::default(),
            model: config.model,
            config,
            bus_status: BusStatus::NONE,
            cpu_error: CpuError::None,
            total_ticks: Ticks::ZERO,
            interrupts: Arc::new(InterruptFabric::new()),
        }
    }

    /// Power-on: PC forced to zero, interrupts disabled. Every other
    /// register is left as-is — real hardware powers up with indeterminate
    /// register contents, and tests that care seed them explicitly.
    pub fn power_on(&mut self) {
        self.regs.pc = 0;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.cpu_error = CpuError::None;
    }

    /// Reset pulse: clears interrupt state and forces PC to zero. On Z80,
    /// also resets I, R, R7, and IM to zero.
    pub fn reset(&mut self) {
        tracing::debug!(model = ?self.model, "CPU reset");
        self.regs.pc = 0;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.int_protection = false;
        self.regs.halted = false;
        if self.model == Model::Z80 {
            self.regs.i = 0;
            self.regs.r = 0;
            self.regs.r7 = 0;
            self.regs.im = 0;
        }
        self.cpu_error = CpuError::None;
    }

    /// Switch the active model, preserving shared register state. Per §3,
    /// switching to I8080 forces N=1, Y=0, X=0 on the flag byte so the next
    /// flag read already matches I8080 semantics even before the first
    /// instruction runs.
    pub fn switch_model(&mut self, model: Model) {
        tracing::info!(from = ?self.model, to = ?model, "CPU model switch");
        self.model = model;
        if model == Model::I8080 {
            self.regs.f = (self.regs.f | NF) & !(XF | YF);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_forces_pc_zero_and_disables_interrupts() {
        let mut ctx = CpuContext::new(Config::default());
        ctx.regs.pc = 0x1234;
        ctx.regs.iff1 = true;
        ctx.power_on();
        assert_eq!(ctx.regs.pc, 0);
        assert!(!ctx.regs.iff1);
    }

    #[test]
    fn reset_clears_z80_only_fields() {
        let mut ctx = CpuContext::new(Config::default());
        ctx.regs.i = 0xFF;
        ctx.regs.r = 0x7F;
        ctx.regs.im = 2;
        ctx.reset();
        assert_eq!(ctx.regs.i, 0);
        assert_eq!(ctx.regs.r, 0);
        assert_eq!(ctx.regs.im, 0);
    }

    #[test]
    fn switching_to_i8080_forces_n_y_x() {
        let mut ctx = CpuContext::new(Config::default());
        ctx.regs.f = 0xFF;
        ctx.switch_model(Model::I8080);
        assert_eq!(ctx.regs.f & crate::flags::NF, crate::flags::NF);
        assert_eq!(ctx.regs.f & crate::flags::YF, 0);
        assert_eq!(ctx.regs.f & crate::flags::XF, 0);
    }
}
