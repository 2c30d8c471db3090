//! Hardware access backends
//!
//! - `mmio`: the register access trait and its memory-mapped backend
//! - `timer`: generic-timer busy-wait delays
//! - `sim`: simulated register file used by the unit tests

pub mod mmio;
pub mod timer;

#[cfg(test)]
pub mod sim;

pub use mmio::{MmioRegisters, RegisterAccess};
pub use timer::GenericTimer;
