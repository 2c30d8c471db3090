//! a8k-pm - CPU power-domain management for Armada-8K secure firmware
//!
//! This library implements the platform half of PSCI for the AP806
//! application processor: the per-core power sequencer, the cluster
//! topology probe, the early power trimming done before DRAM init, the
//! optional delegation of power requests to the MSS management coprocessor,
//! and the PSCI operation table handed to the generic power framework.
//!
//! Hardware is only reached through [`drivers::RegisterAccess`], so every
//! path in the crate can be exercised against a simulated register file.

#![cfg_attr(not(test), no_std)]

// Core modules
pub mod utils;
pub mod config;

// Architecture-specific code
pub mod arch;

// Locking primitives shared between cores
pub mod sync;

// Register access backends
pub mod drivers;

// Generic PSCI definitions
pub mod psci;

// SoC support
pub mod platform;

use core::fmt;

pub use config::{BackendKind, FailurePolicy, PlatformConfig};
pub use platform::a8k::{
    early_cpu_powerdown, early_setup, A8kPowerOps, Backend, CoreId, CoprocessorBackend,
    LocalBackend, MssBridge, PowerBackend, PowerSequencer, PowerStep, RegisterMap, Topology,
};
pub use psci::{PsciPlatformOps, PsciReturn};

/// a8k-pm version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common error type for a8k-pm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bounded register poll ran out of budget
    Timeout {
        /// Core whose registers were being polled
        core: CoreId,
        /// Sequencer step that was waiting
        step: PowerStep,
    },
    /// Core index outside the resolved topology
    InvalidCore(u8),
    /// Operation has no implementation on this configuration
    NotSupported,
    /// A one-time facility was set up twice
    AlreadyInitialized,
    /// IO address decoder windows could not be programmed
    WindowSetup,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Timeout { core, step } => write!(f, "{}: {} timed out", core, step),
            Error::InvalidCore(index) => write!(f, "CPU{} does not exist", index),
            Error::NotSupported => f.write_str("operation not supported"),
            Error::AlreadyInitialized => f.write_str("already initialized"),
            Error::WindowSetup => f.write_str("address decoder window setup failed"),
        }
    }
}

impl From<Error> for PsciReturn {
    fn from(err: Error) -> Self {
        match err {
            Error::Timeout { .. } | Error::WindowSetup => PsciReturn::InternalFailure,
            Error::InvalidCore(_) => PsciReturn::InvalidParams,
            Error::NotSupported => PsciReturn::NotSupported,
            Error::AlreadyInitialized => PsciReturn::Denied,
        }
    }
}

/// Result type alias
pub type Result<T> = core::result::Result<T, Error>;
