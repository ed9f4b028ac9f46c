//! The scheduler's run-state machine.

/// Drives what `run()`/`step()` do on the next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuState {
    /// `run()` keeps stepping until this is no longer the state.
    ContinRun,
    /// Execute exactly one instruction, then fall to `Stopped`.
    SingleStep,
    /// Not running; `run()`/`step()` must be called again to resume.
    #[default]
    Stopped,
    /// Internal: the model was switched; the scheduler must re-select the
    /// executor before continuing.
    ModelSwitch,
    /// A reset pulse was received; cleared to `Stopped` once processed.
    Reset,
}
