//! CPU error/status kinds.
//!
//! These are not propagated as `Result` out of the decoder — they are
//! written into the [`crate::CpuContext`] and inspected by the scheduler at
//! the next instruction boundary, per the "errors are status, not control
//! flow" rule the executor follows throughout.

use std::fmt;

/// A terminal (or, for `ModelSwitch`, recoverable) condition raised by the
/// executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuError {
    #[default]
    None,
    /// HALT executed with interrupts disabled — nothing can ever wake the
    /// CPU again.
    OpHalt,
    /// Illegal 1-byte opcode.
    OpTrap1,
    /// Illegal 2-byte opcode (unassigned prefix + opcode combination).
    OpTrap2,
    /// Illegal 4-byte opcode (unassigned DDCB/FDCB combination).
    OpTrap4,
    /// `IN` on a port with no handler and trapping enabled.
    IoTrapIn,
    /// `OUT` on a port with no handler and trapping enabled.
    IoTrapOut,
    IoHalt,
    IoError,
    /// A user- or debugger-requested stop.
    UserInt,
    /// An interrupt was deliverable but `int_data` was never supplied.
    IntError,
    /// Permanent for the remainder of the process.
    PowerOff,
    /// Internal pseudo-error: the scheduler should re-select the executor
    /// for the newly chosen model and continue. Cleared automatically.
    ModelSwitch,
}

impl CpuError {
    /// Only `ModelSwitch` is recoverable; everything else ends `run()`.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::None | Self::ModelSwitch)
    }
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::None => "no error",
            Self::OpHalt => "HALT with interrupts disabled",
            Self::OpTrap1 => "illegal 1-byte opcode",
            Self::OpTrap2 => "illegal 2-byte opcode",
            Self::OpTrap4 => "illegal 4-byte opcode",
            Self::IoTrapIn => "trapped input port",
            Self::IoTrapOut => "trapped output port",
            Self::IoHalt => "I/O halt",
            Self::IoError => "I/O error",
            Self::UserInt => "user interrupt",
            Self::IntError => "interrupt acknowledged with no data byte",
            Self::PowerOff => "power off",
            Self::ModelSwitch => "model switch",
        };
        f.write_str(msg)
    }
}
