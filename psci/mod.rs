//! PSCI (Power State Coordination Interface) platform hooks
//!
//! Generic definitions shared between the power-management framework and
//! the SoC layer: return codes, the original-format `power_state` encoding
//! passed to CPU_SUSPEND, per-level local states and the
//! [`PsciPlatformOps`] table a platform implements.
//! Reference: ARM DEN 0022D - Power State Coordination Interface

use core::fmt;

pub mod mpidr;

pub use mpidr::Mpidr;

/// PSCI v0.2 power state encoding for CPU_SUSPEND
pub const PSCI_0_2_POWER_STATE_ID_MASK: u32 = 0xffff;
pub const PSCI_0_2_POWER_STATE_ID_SHIFT: u32 = 0;
pub const PSCI_0_2_POWER_STATE_TYPE_SHIFT: u32 = 16;
pub const PSCI_0_2_POWER_STATE_TYPE_MASK: u32 = 0x1 << PSCI_0_2_POWER_STATE_TYPE_SHIFT;
pub const PSCI_0_2_POWER_STATE_AFFL_SHIFT: u32 = 24;
pub const PSCI_0_2_POWER_STATE_AFFL_MASK: u32 = 0x3 << PSCI_0_2_POWER_STATE_AFFL_SHIFT;

/// PSCI power state type
pub const PSCI_POWER_STATE_TYPE_POWER_DOWN: u32 = 0;
pub const PSCI_POWER_STATE_TYPE_STANDBY: u32 = 1;

/// Highest power level the framework tracks
pub const PSCI_MAX_PWR_LVL: usize = 3;

/// PSCI return values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum PsciReturn {
    Success = 0,
    NotSupported = -1,
    InvalidParams = -2,
    Denied = -3,
    AlreadyOn = -4,
    OnPending = -5,
    InternalFailure = -6,
    NotPresent = -7,
    Disabled = -8,
}

impl PsciReturn {
    /// Convert to i64
    pub fn to_i64(self) -> i64 {
        self as i64
    }

    /// Convert to u64 for x0 register
    pub fn to_u64(self) -> u64 {
        self.to_i64() as u64
    }

    /// Collapse a hook result into the value returned to the caller
    pub fn from_result<T>(result: Result<T, PsciReturn>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err,
        }
    }

    /// Get error message
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NotSupported => "Not supported",
            Self::InvalidParams => "Invalid parameters",
            Self::Denied => "Denied",
            Self::AlreadyOn => "Already on",
            Self::OnPending => "On pending",
            Self::InternalFailure => "Internal failure",
            Self::NotPresent => "Not present",
            Self::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for PsciReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested power state type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerStateType {
    /// Core context is lost
    PowerDown,
    /// Core context is retained
    Standby,
}

/// Original-format `power_state` argument of CPU_SUSPEND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerState(u32);

impl PowerState {
    /// Wrap a raw `power_state` value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Encode the three fields
    pub const fn from_fields(state_id: u16, state_type: PowerStateType, level: u32) -> Self {
        let ty = match state_type {
            PowerStateType::PowerDown => PSCI_POWER_STATE_TYPE_POWER_DOWN,
            PowerStateType::Standby => PSCI_POWER_STATE_TYPE_STANDBY,
        };
        Self(
            (state_id as u32) << PSCI_0_2_POWER_STATE_ID_SHIFT
                | ty << PSCI_0_2_POWER_STATE_TYPE_SHIFT
                | (level << PSCI_0_2_POWER_STATE_AFFL_SHIFT) & PSCI_0_2_POWER_STATE_AFFL_MASK,
        )
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// State id sub-field
    pub const fn state_id(self) -> u32 {
        (self.0 >> PSCI_0_2_POWER_STATE_ID_SHIFT) & PSCI_0_2_POWER_STATE_ID_MASK
    }

    pub const fn state_type(self) -> PowerStateType {
        if self.0 & PSCI_0_2_POWER_STATE_TYPE_MASK != 0 {
            PowerStateType::Standby
        } else {
            PowerStateType::PowerDown
        }
    }

    /// Highest power level affected
    pub const fn power_level(self) -> usize {
        ((self.0 & PSCI_0_2_POWER_STATE_AFFL_MASK) >> PSCI_0_2_POWER_STATE_AFFL_SHIFT) as usize
    }
}

/// Local power state of one power domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum LocalState {
    #[default]
    Run = 0,
    Retention = 1,
    Off = 2,
}

impl LocalState {
    /// Raw value as handed to the management coprocessor
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Target local state of every power level of the calling core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PsciPowerState {
    levels: [LocalState; PSCI_MAX_PWR_LVL + 1],
}

impl PsciPowerState {
    /// Every level running
    pub const fn new() -> Self {
        Self {
            levels: [LocalState::Run; PSCI_MAX_PWR_LVL + 1],
        }
    }

    /// Levels `0..=level` off, the rest running
    pub fn off_up_to(level: usize) -> Self {
        let mut state = Self::new();
        for lvl in 0..=level.min(PSCI_MAX_PWR_LVL) {
            state.levels[lvl] = LocalState::Off;
        }
        state
    }

    /// Local state at `level`, `Run` above the tracked levels
    pub fn level(&self, level: usize) -> LocalState {
        self.levels.get(level).copied().unwrap_or(LocalState::Run)
    }

    pub fn set_level(&mut self, level: usize, state: LocalState) {
        if let Some(slot) = self.levels.get_mut(level) {
            *slot = state;
        }
    }
}

/// Platform power-management hooks driven by the generic PSCI framework.
///
/// The framework serializes calls per affinity instance; implementations
/// only lock what is shared between cores.
pub trait PsciPlatformOps {
    /// Highest power level this platform controls
    const MAX_POWER_LEVEL: usize;

    /// Turn a CPU_SUSPEND `power_state` into per-level target states.
    /// Must not touch hardware.
    fn validate_power_state(&self, power_state: PowerState) -> Result<PsciPowerState, PsciReturn>;

    /// Check a non-secure entry point
    fn validate_ns_entrypoint(&self, entrypoint: u64) -> Result<(), PsciReturn>;

    /// Enter a retention state on the calling core
    fn cpu_standby(&self, state: LocalState) -> !;

    /// Power on the core identified by `target`
    fn power_domain_on(&self, target: Mpidr) -> Result<(), PsciReturn>;

    /// Prepare the calling core for power off
    fn power_domain_off(&self, target: &PsciPowerState) -> Result<(), PsciReturn>;

    /// Prepare the calling core for a power-down suspend
    fn power_domain_suspend(&self, target: &PsciPowerState) -> Result<(), PsciReturn>;

    /// Runs on a core that just came up after CPU_ON
    fn power_domain_on_finish(&self, target: &PsciPowerState);

    /// Runs on a core that just resumed from a power-down suspend
    fn power_domain_suspend_finish(&self, target: &PsciPowerState) -> Result<(), PsciReturn>;

    fn system_off(&self) -> !;

    fn system_reset(&self) -> !;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_state_fields() {
        let ps = PowerState::new(0x0101_0000);
        assert_eq!(ps.state_id(), 0);
        assert_eq!(ps.state_type(), PowerStateType::Standby);
        assert_eq!(ps.power_level(), 1);

        let ps = PowerState::from_fields(0x12, PowerStateType::PowerDown, 1);
        assert_eq!(ps.raw(), 0x0100_0012);
        assert_eq!(ps.state_type(), PowerStateType::PowerDown);
    }

    #[test]
    fn test_off_up_to() {
        let state = PsciPowerState::off_up_to(1);
        assert_eq!(state.level(0), LocalState::Off);
        assert_eq!(state.level(1), LocalState::Off);
        assert_eq!(state.level(2), LocalState::Run);
        assert_eq!(state.level(9), LocalState::Run);
    }

    #[test]
    fn test_psci_return_display() {
        assert_eq!(PsciReturn::InvalidParams.to_string(), "Invalid parameters");
        assert_eq!(PsciReturn::InternalFailure.to_string(), "Internal failure");
    }

    #[test]
    fn test_psci_return() {
        assert_eq!(PsciReturn::InternalFailure.to_i64(), -6);
        assert_eq!(PsciReturn::NotSupported.to_u64(), u64::MAX);
        assert_eq!(PsciReturn::from_result(Ok::<_, PsciReturn>(())), PsciReturn::Success);
        assert_eq!(
            PsciReturn::from_result::<()>(Err(PsciReturn::Denied)),
            PsciReturn::Denied
        );
    }
}
