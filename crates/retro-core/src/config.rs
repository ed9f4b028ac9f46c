//! Embedder-chosen startup configuration.

use crate::Model;

/// Parameters chosen once, at construction time, by whoever embeds the
/// scheduler. None of this is a compile-time `cfg` switch — toggling
/// undocumented-opcode support, for instance, is a runtime gate consulted
/// at the dispatch entry, so the same binary can run both ways.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// The model the scheduler starts in.
    pub model: Model,
    /// Whether undocumented Z80 opcodes and undocumented Y/X flag behavior
    /// are honored. Ignored on I8080, which has no undocumented surface.
    pub undocumented: bool,
    /// Target clock frequency for throttling, in Hz. `None` runs flat out.
    pub throttle_hz: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Model::Z80,
            undocumented: true,
            throttle_hz: None,
        }
    }
}
