//! Per-core power sequencing
//!
//! Moves one core between powered off and powered on by toggling its power
//! control and reset control registers in a fixed order, confirming each
//! step by reading the register back. Every wait is a bounded poll: a stuck
//! acknowledgement turns into [`Error::Timeout`] instead of a hang.
//!
//! Nothing here is locked. Only the core itself, or a single orchestrating
//! core while the target is not running, may sequence a given core.

use core::fmt;

use embedded_hal::delay::DelayNs;

use super::regs::{PowerControl, RegisterMap, ResetControl};
use super::topology::CoreId;
use crate::config::PlatformConfig;
use crate::drivers::RegisterAccess;
use crate::utils::{poll_until, REG_WR_VALIDATE_TIMEOUT};
use crate::{Error, Result};

/// Supply settle time after the power-on request, in microseconds.
/// There is no status bit to poll for it.
pub const POWER_UP_DELAY_US: u32 = 100;

/// Acknowledged step of a power sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerStep {
    /// Isolation read back as enabled
    IsolationEnable,
    /// Power switch read back as off
    PowerSwitchOff,
    /// Core held in reset
    ResetAssert,
    /// LDO reports power ready
    PowerReady,
    /// Isolation read back as disabled
    IsolationDisable,
    /// Core out of reset
    ResetRelease,
}

impl fmt::Display for PowerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerStep::IsolationEnable => "isolation enable",
            PowerStep::PowerSwitchOff => "power switch off",
            PowerStep::ResetAssert => "reset assert",
            PowerStep::PowerReady => "power ready",
            PowerStep::IsolationDisable => "isolation disable",
            PowerStep::ResetRelease => "reset release",
        })
    }
}

/// Power sequencer for the AP806 cores
#[derive(Debug)]
pub struct PowerSequencer<R, D> {
    regs: R,
    delay: D,
    map: RegisterMap,
    budget: u32,
    power_up_delay_us: u32,
}

impl<R: RegisterAccess, D: DelayNs + Clone> PowerSequencer<R, D> {
    pub fn new(regs: R, delay: D, map: RegisterMap) -> Self {
        Self {
            regs,
            delay,
            map,
            budget: REG_WR_VALIDATE_TIMEOUT,
            power_up_delay_us: POWER_UP_DELAY_US,
        }
    }

    pub fn from_config(regs: R, delay: D, config: &PlatformConfig) -> Self {
        Self {
            regs,
            delay,
            map: config.register_map(),
            budget: config.poll_budget,
            power_up_delay_us: config.power_up_delay_us,
        }
    }

    /// Override the number of reads allowed per acknowledgement
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.budget = budget;
        self
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    /// Poll `addr` until every bit of `mask` reads as `set`. Callers decide
    /// how loudly a timeout is reported.
    fn wait_for(&self, core: CoreId, step: PowerStep, addr: usize, mask: u32, set: bool) -> Result<()> {
        let want = if set { mask } else { 0 };
        poll_until(self.budget, || self.regs.read32(addr) & mask == want)
            .map(|_| ())
            .map_err(|_| Error::Timeout { core, step })
    }

    /// [`Self::wait_for`] for steps the sequence cannot continue without
    fn expect_ack(&self, core: CoreId, step: PowerStep, addr: usize, mask: u32, set: bool) -> Result<()> {
        self.wait_for(core, step, addr, mask, set).inspect_err(|err| {
            log::error!("{} after {} reads of {:#x}", err, self.budget, addr);
        })
    }

    /// Remove power from `core`.
    ///
    /// Isolates the core, switches its power off, drops power ready and
    /// holds it in reset. Fails if the power switch or the reset does not
    /// acknowledge.
    pub fn power_down(&self, core: CoreId) -> Result<()> {
        let pwrc = self.map.power_control(core);
        let reset = self.map.reset_control(core);
        log::info!("{}: powering down", core);

        self.regs.set_bits32(pwrc, PowerControl::ISOLATION_ENABLE.bits());
        // The read-back only guards against write latency; carry on either way.
        if self
            .wait_for(core, PowerStep::IsolationEnable, pwrc, PowerControl::ISOLATION_ENABLE.bits(), true)
            .is_err()
        {
            log::debug!("{}: isolation read-back ignored", core);
        }

        // Cleared means "remove power"
        self.regs.clear_bits32(pwrc, PowerControl::POWER_DOWN_REQUEST.bits());
        self.expect_ack(core, PowerStep::PowerSwitchOff, pwrc, PowerControl::POWER_DOWN_REQUEST.bits(), false)?;

        self.regs.clear_bits32(pwrc, PowerControl::LDO_BYPASS_READY.bits());

        self.regs.clear_bits32(reset, ResetControl::POR_RESET_STATIC.bits());
        self.expect_ack(core, PowerStep::ResetAssert, reset, ResetControl::POR_RESET_STATIC.bits(), false)?;

        log::debug!("{}: powered down", core);
        Ok(())
    }

    /// Bring power back to `core` and release it from reset.
    ///
    /// Fails if power ready or the reset release does not acknowledge. A
    /// stuck isolation bit is only reported.
    pub fn power_up(&self, core: CoreId) -> Result<()> {
        let pwrc = self.map.power_control(core);
        let reset = self.map.reset_control(core);
        log::info!("{}: powering up", core);

        // Set means "power on"
        self.regs.set_bits32(pwrc, PowerControl::POWER_DOWN_REQUEST.bits());

        let mut delay = self.delay.clone();
        delay.delay_us(self.power_up_delay_us);

        self.regs.set_bits32(pwrc, PowerControl::LDO_BYPASS_READY.bits());
        self.expect_ack(core, PowerStep::PowerReady, pwrc, PowerControl::LDO_BYPASS_READY.bits(), true)?;

        self.regs.clear_bits32(pwrc, PowerControl::ISOLATION_ENABLE.bits());
        if self
            .wait_for(core, PowerStep::IsolationDisable, pwrc, PowerControl::ISOLATION_ENABLE.bits(), false)
            .is_err()
        {
            log::warn!("{}: isolation still enabled, releasing reset anyway", core);
        }

        self.regs.set_bits32(reset, ResetControl::POR_RESET_STATIC.bits());
        self.expect_ack(core, PowerStep::ResetRelease, reset, ResetControl::POR_RESET_STATIC.bits(), true)?;

        log::debug!("{}: powered up", core);
        Ok(())
    }
}
