//! ARM64 (AArch64) support
//!
//! This module provides what the power-management hooks need from the
//! executing core:
//! - identity of the calling core (MPIDR)
//! - re-establishing per-core secure state after power up
//! - the GICv2 CPU interface and banked distributor registers
//!
//! System register accesses are only compiled for AArch64 targets; the
//! rest builds anywhere so it can be tested on the host.

pub mod gic;

pub use gic::{GicCpuInterface, GicDistributor};

use crate::psci::Mpidr;

/// The core executing the current code
pub trait LocalCpu {
    /// Affinity of the calling core
    fn mpidr(&self) -> Mpidr;

    /// Reprogram per-core secure architectural state lost over power down
    fn init_secure_state(&self);
}

#[cfg(target_arch = "aarch64")]
pub use self::current::CurrentCpu;

#[cfg(target_arch = "aarch64")]
mod current {
    use aarch64_cpu::registers::{CNTFRQ_EL0, MPIDR_EL1};
    use tock_registers::interfaces::{Readable, Writeable};

    use super::LocalCpu;
    use crate::psci::Mpidr;

    /// System-register view of the calling core
    #[derive(Debug, Clone, Copy)]
    pub struct CurrentCpu {
        counter_freq_hz: u64,
    }

    impl CurrentCpu {
        pub const fn new(counter_freq_hz: u64) -> Self {
            Self { counter_freq_hz }
        }
    }

    impl LocalCpu for CurrentCpu {
        fn mpidr(&self) -> Mpidr {
            Mpidr::new(MPIDR_EL1.get()).affinity()
        }

        fn init_secure_state(&self) {
            CNTFRQ_EL0.set(self.counter_freq_hz);
        }
    }
}
