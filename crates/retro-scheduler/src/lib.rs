//! The run/step driver: sequences `step()`/`service_interrupts()` calls
//! across the Z80 and I8080 executors, arbitrates single-master DMA bus
//! requests, and throttles wall-clock speed to a configured MHz target.
//!
//! Everything else in this workspace is a pure function of
//! `(CpuContext, MemoryBus, PortBus)` with no notion of "now" or "how
//! fast"; this crate is where that gets turned into a running machine.

mod dma;
mod scheduler;

pub use scheduler::Scheduler;
