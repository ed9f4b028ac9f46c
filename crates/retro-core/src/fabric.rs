//! Interrupt and bus-request fabric: the publishing surface device threads
//! use to reach the CPU, and the single-master DMA hand-off protocol.
//!
//! Device emulations and UI threads run concurrently with the executor and
//! publish into these scalars. They use acquire/release atomics so that
//! (a) a device-written `int_data` is visible before the `int_pending` flag
//! that announces it, and (b) the executor's clearing of `int_pending` is
//! never observed before it has consumed `int_data`. No other ordering is
//! required: the bus is single-master (the CPU) except during a bus
//! request, which is itself serialized through `bus_request`.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// The kind of access a DMA master intends to perform while it holds the
/// bus. Purely advertised for the front panel; the core does not enforce
/// read/write exclusivity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    Read,
    Write,
    ReadWrite,
}

/// Shared, thread-safe handle to the interrupt/NMI/bus-request lines.
///
/// Cheap to clone (it's a thin wrapper you construct once and share, e.g.
/// via `Arc`); every method here is safe to call from any thread.
#[derive(Debug, Default)]
pub struct InterruptFabric {
    nmi_pending: AtomicBool,
    int_pending: AtomicBool,
    /// Bit 8 is a validity flag; bits 0-7 are the data byte. Packed into one
    /// atomic so publish order only needs one store, not two.
    int_data: AtomicU16,
    bus_request: AtomicBool,
}

const INT_DATA_VALID: u16 = 1 << 8;

impl InterruptFabric {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Device-side: request a maskable interrupt, publishing the byte the
    /// interrupting device places on the data bus.
    pub fn request_interrupt(&self, data: u8) {
        self.int_data
            .store(INT_DATA_VALID | u16::from(data), Ordering::Release);
        self.int_pending.store(true, Ordering::Release);
    }

    /// Device-side: request a non-maskable interrupt.
    pub fn request_nmi(&self) {
        self.nmi_pending.store(true, Ordering::Release);
    }

    /// Device-side: take the bus for DMA. `end_bus_request` must eventually
    /// be called or the CPU stalls forever in the bus-acknowledge loop.
    pub fn start_bus_request(&self) {
        self.bus_request.store(true, Ordering::Release);
    }

    pub fn end_bus_request(&self) {
        self.bus_request.store(false, Ordering::Release);
    }

    /// Executor-side: is an NMI waiting?
    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending.load(Ordering::Acquire)
    }

    /// Executor-side: consume the pending NMI flag.
    pub fn take_nmi(&self) -> bool {
        self.nmi_pending.swap(false, Ordering::AcqRel)
    }

    /// Executor-side: is a maskable interrupt waiting, and if so with what
    /// data byte? Returns `None` if `int_pending` was set but no valid data
    /// byte was ever published (the `IntError` condition in §7).
    #[must_use]
    pub fn int_pending(&self) -> bool {
        self.int_pending.load(Ordering::Acquire)
    }

    /// Executor-side: consume the pending interrupt, returning its data
    /// byte if one was published.
    pub fn take_int_data(&self) -> Option<u8> {
        self.int_pending.store(false, Ordering::Release);
        let packed = self.int_data.swap(0, Ordering::AcqRel);
        if packed & INT_DATA_VALID != 0 {
            Some(packed as u8)
        } else {
            None
        }
    }

    #[must_use]
    pub fn bus_requested(&self) -> bool {
        self.bus_request.load(Ordering::Acquire)
    }
}
