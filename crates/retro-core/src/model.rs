//! CPU model identity.

/// Which instruction set and register model is currently active.
///
/// Switching models clears only model-specific state; the shared register
/// file (§3 of the design notes) persists across the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Z80,
    I8080,
}

impl Model {
    #[must_use]
    pub const fn supports_undocumented_flags(self) -> bool {
        matches!(self, Self::Z80)
    }

    #[must_use]
    pub const fn has_alternate_bank(self) -> bool {
        matches!(self, Self::Z80)
    }
}
