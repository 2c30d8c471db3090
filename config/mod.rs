//! Configuration management
//!
//! Build-time constants come from `build.rs`; [`PlatformConfig`] gathers
//! them together with the runtime knobs of the power-management layer.

use crate::platform::a8k::{MailboxLayout, RegisterMap, POWER_UP_DELAY_US};
use crate::utils::REG_WR_VALIDATE_TIMEOUT;

/// Constants generated by `build.rs`
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

/// Who performs core power transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The AP drives the power and reset registers itself
    Local,
    /// Requests are forwarded to the MSS management coprocessor
    Coprocessor,
}

/// How sequencer failures reach the PSCI caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Every sequencer failure is returned to the caller
    #[default]
    Propagate,
    /// Failures are logged and the operation carries on, like the
    /// firmware this replaces
    Legacy,
}

/// Platform configuration
#[derive(Debug, Clone, Copy)]
pub struct PlatformConfig {
    /// Base of the AP806 register window
    pub regs_base: usize,
    /// Attempts per bounded register poll
    pub poll_budget: u32,
    /// Supply settle time between power-on request and power-ready
    pub power_up_delay_us: u32,
    /// Where released secondary cores start executing
    pub cpu_entry_addr: u64,
    /// Backend selection
    pub backend: BackendKind,
    /// Failure propagation policy
    pub failure_policy: FailurePolicy,
    /// System counter frequency programmed into each core
    pub counter_freq_hz: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            regs_base: generated::REGS_BASE,
            poll_budget: REG_WR_VALIDATE_TIMEOUT,
            power_up_delay_us: POWER_UP_DELAY_US,
            cpu_entry_addr: generated::CPU_ENTRY_ADDR,
            backend: if generated::SCP_IMAGE {
                BackendKind::Coprocessor
            } else {
                BackendKind::Local
            },
            failure_policy: FailurePolicy::default(),
            counter_freq_hz: 25_000_000,
        }
    }
}

impl PlatformConfig {
    /// Register map rooted at `regs_base`
    pub const fn register_map(&self) -> RegisterMap {
        RegisterMap::new(self.regs_base)
    }

    /// MSS mailbox and doorbell at their default location
    pub const fn mailbox_layout(&self) -> MailboxLayout {
        MailboxLayout::at_default(self.regs_base)
    }

    /// Whether core power transitions go through the MSS coprocessor
    pub const fn uses_coprocessor(&self) -> bool {
        matches!(self.backend, BackendKind::Coprocessor)
    }
}
