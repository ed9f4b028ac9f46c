//! The `run()`/`step()` driver: dispatches to the active model's
//! decoder/executor, advances the state machine, and throttles to a
//! target clock frequency.

use std::thread;
use std::time::Instant;

use retro_core::{Config, CpuContext, CpuState, MasterClock, MemoryBus, Model, PortBus, Ticks};

/// Owns the CPU context and buses, and drives them through the run/step
/// state machine described in the design notes.
pub struct Scheduler {
    pub ctx: CpuContext,
    pub mem: MemoryBus,
    pub io: PortBus,
    pub cpu_state: CpuState,
    clock: Option<MasterClock>,
    throttle_origin: Instant,
    throttle_base_ticks: Ticks,
}

impl Scheduler {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let clock = config.throttle_hz.map(MasterClock::new);
        Self {
            ctx: CpuContext::new(config),
            mem: MemoryBus::new(),
            io: PortBus::new(),
            cpu_state: CpuState::Stopped,
            clock,
            throttle_origin: Instant::now(),
            throttle_base_ticks: Ticks::ZERO,
        }
    }

    /// Execute exactly one instruction (honoring the interrupt/DMA gate),
    /// leaving `cpu_state` at `Stopped` afterward.
    pub fn step(&mut self) -> Ticks {
        self.cpu_state = CpuState::SingleStep;
        let ticks = self.execute_one();
        self.cpu_state = CpuState::Stopped;
        ticks
    }

    /// Run until `cpu_state` leaves `ContinRun`: a fatal `cpu_error`, a
    /// model switch request, or an externally set `Stopped`/`Reset`.
    pub fn run(&mut self) {
        self.cpu_state = CpuState::ContinRun;
        self.throttle_origin = Instant::now();
        self.throttle_base_ticks = self.ctx.total_ticks;

        while self.cpu_state == CpuState::ContinRun {
            self.execute_one();

            if self.ctx.cpu_error == retro_core::CpuError::ModelSwitch {
                self.cpu_state = CpuState::ModelSwitch;
            } else if self.ctx.cpu_error.is_fatal() {
                self.cpu_state = CpuState::Stopped;
                break;
            }

            if self.cpu_state == CpuState::ModelSwitch {
                // The model has already been set on `self.ctx.model` by
                // whoever requested the switch; just resume running it.
                self.ctx.cpu_error = retro_core::CpuError::None;
                self.cpu_state = CpuState::ContinRun;
            }

            self.throttle();
        }

        tracing::debug!(error = ?self.ctx.cpu_error, total_ticks = self.ctx.total_ticks.get(), "run() stopped");
    }

    /// Pulse a reset: clears interrupt/halt state, forces PC to zero, and
    /// leaves the scheduler `Stopped` once processed.
    pub fn reset(&mut self) {
        self.cpu_state = CpuState::Reset;
        self.ctx.reset();
        self.cpu_state = CpuState::Stopped;
    }

    /// One gated instruction: bus-request hand-off, interrupt acceptance,
    /// then dispatch to the model's `step`.
    fn execute_one(&mut self) -> Ticks {
        let dma_ticks = crate::dma::service_bus_request(&mut self.ctx);

        let int_ticks = match self.ctx.model {
            Model::Z80 => retro_z80::service_interrupts(&mut self.ctx, &mut self.mem),
            Model::I8080 => retro_i8080::service_interrupts(&mut self.ctx, &mut self.mem, &mut self.io),
        };

        let step_ticks = match self.ctx.model {
            Model::Z80 => retro_z80::step(&mut self.ctx, &mut self.mem, &mut self.io),
            Model::I8080 => retro_i8080::step(&mut self.ctx, &mut self.mem, &mut self.io),
        };

        let total = dma_ticks + int_ticks + step_ticks;
        self.ctx.total_ticks += total;
        total
    }

    /// Switch models mid-session. Per §3, shared registers persist; only
    /// model-specific flag bits are normalized by `CpuContext::switch_model`.
    pub fn switch_model(&mut self, model: Model) {
        self.ctx.switch_model(model);
    }

    /// Compare elapsed wall time against the T-states executed since `run`
    /// started and sleep to converge on the configured clock frequency.
    fn throttle(&mut self) {
        let Some(clock) = self.clock else { return };
        let executed = self.ctx.total_ticks - self.throttle_base_ticks;
        let target = clock.duration_for(executed);
        let elapsed = self.throttle_origin.elapsed();
        if target > elapsed {
            thread::sleep(target - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_executes_exactly_one_instruction_then_stops() {
        let mut sched = Scheduler::new(Config::default());
        sched.mem.load(0, &[0x00, 0x00]); // NOP ; NOP
        sched.step();
        assert_eq!(sched.ctx.regs.pc, 1);
        assert_eq!(sched.cpu_state, CpuState::Stopped);
    }

    #[test]
    fn run_stops_on_halt_with_interrupts_disabled() {
        let mut sched = Scheduler::new(Config::default());
        sched.mem.load(0, &[0x00, 0x76]); // NOP ; HALT
        sched.run();
        assert_eq!(sched.cpu_state, CpuState::Stopped);
        assert_eq!(sched.ctx.cpu_error, retro_core::CpuError::OpHalt);
        assert_eq!(sched.ctx.regs.pc, 1);
    }

    #[test]
    fn switching_model_preserves_shared_registers() {
        let mut sched = Scheduler::new(Config { model: Model::Z80, ..Config::default() });
        sched.ctx.regs.a = 0x42;
        sched.switch_model(Model::I8080);
        assert_eq!(sched.ctx.model, Model::I8080);
        assert_eq!(sched.ctx.regs.a, 0x42);
    }

    #[test]
    fn reset_clears_interrupt_state_and_leaves_scheduler_stopped() {
        let mut sched = Scheduler::new(Config::default());
        sched.ctx.regs.pc = 0x1234;
        sched.ctx.regs.iff1 = true;
        sched.reset();
        assert_eq!(sched.ctx.regs.pc, 0);
        assert!(!sched.ctx.regs.iff1);
        assert_eq!(sched.cpu_state, CpuState::Stopped);
    }
}
