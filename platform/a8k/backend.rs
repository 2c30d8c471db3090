//! Power backends
//!
//! A core power transition is carried out either by the AP itself through
//! the [`PowerSequencer`], or by the MSS coprocessor through the
//! [`MssBridge`]. Which one is used is decided when the platform is
//! configured; the PSCI hooks only see [`PowerBackend`].

use embedded_hal::delay::DelayNs;

use super::mss::{MssBridge, MssMessage, MssRequest};
use super::regs::CPU_UN_RESET_RELEASE;
use super::sequencer::PowerSequencer;
use super::topology::CoreId;
use crate::config::{BackendKind, FailurePolicy, PlatformConfig};
use crate::drivers::RegisterAccess;
use crate::psci::PsciPowerState;
use crate::utils::dsb_sy;
use crate::{Error, Result};

/// Power level whose local state is forwarded to the coprocessor
const MSS_STATE_LEVEL: usize = 1;

/// Carries out core power transitions
pub trait PowerBackend {
    /// Whether transitions are delegated to a coprocessor
    fn has_coprocessor(&self) -> bool;

    /// Power on `core` and let it run from the secure entry point
    fn cpu_on(&self, core: CoreId) -> Result<()>;

    /// Power off `core` once it stops executing
    fn cpu_off(&self, core: CoreId, target: &PsciPowerState) -> Result<()>;

    /// Suspend `core` once it stops executing
    fn cpu_suspend(&self, core: CoreId, target: &PsciPowerState) -> Result<()>;
}

/// The AP sequences its own cores
pub struct LocalBackend<R, D> {
    sequencer: PowerSequencer<R, D>,
    entry_addr: u64,
    policy: FailurePolicy,
}

impl<R: RegisterAccess, D: DelayNs + Clone> LocalBackend<R, D> {
    pub fn new(sequencer: PowerSequencer<R, D>, entry_addr: u64, policy: FailurePolicy) -> Self {
        Self {
            sequencer,
            entry_addr,
            policy,
        }
    }

    /// Point the core at the entry address and take it out of reset
    fn release(&self, core: CoreId) {
        let regs = self.sequencer.regs();
        let map = self.sequencer.map();

        dsb_sy();
        regs.write32(map.private_uid(), core.cluster() as u32 + 4);
        // RVBAR holds bits [47:16] of the entry address
        regs.write32(map.rvbar(core), (self.entry_addr >> 16) as u32);
        regs.write32(map.cpu_un_reset(core), CPU_UN_RESET_RELEASE);
    }
}

impl<R: RegisterAccess, D: DelayNs + Clone> PowerBackend for LocalBackend<R, D> {
    fn has_coprocessor(&self) -> bool {
        false
    }

    fn cpu_on(&self, core: CoreId) -> Result<()> {
        match self.sequencer.power_up(core) {
            Ok(()) => {}
            Err(err) if self.policy == FailurePolicy::Legacy => {
                log::error!("{}: power up failed ({}), releasing anyway", core, err);
            }
            Err(err) => return Err(err),
        }
        self.release(core);
        Ok(())
    }

    fn cpu_off(&self, core: CoreId, _target: &PsciPowerState) -> Result<()> {
        log::warn!("{}: power off needs the MSS coprocessor", core);
        Err(Error::NotSupported)
    }

    fn cpu_suspend(&self, core: CoreId, _target: &PsciPowerState) -> Result<()> {
        log::warn!("{}: suspend needs the MSS coprocessor", core);
        Err(Error::NotSupported)
    }
}

/// Transitions are requested from the MSS coprocessor
pub struct CoprocessorBackend<'a, R> {
    bridge: &'a MssBridge<R>,
}

impl<'a, R: RegisterAccess> CoprocessorBackend<'a, R> {
    pub const fn new(bridge: &'a MssBridge<R>) -> Self {
        Self { bridge }
    }
}

impl<R: RegisterAccess> PowerBackend for CoprocessorBackend<'_, R> {
    fn has_coprocessor(&self) -> bool {
        true
    }

    fn cpu_on(&self, core: CoreId) -> Result<()> {
        self.bridge.send(MssMessage {
            target: core,
            request: MssRequest::CpuOn,
            payload: 0,
        });
        Ok(())
    }

    fn cpu_off(&self, core: CoreId, target: &PsciPowerState) -> Result<()> {
        self.bridge.send(MssMessage {
            target: core,
            request: MssRequest::CpuOff,
            payload: target.level(MSS_STATE_LEVEL).raw(),
        });
        Ok(())
    }

    fn cpu_suspend(&self, core: CoreId, target: &PsciPowerState) -> Result<()> {
        self.bridge.send(MssMessage {
            target: core,
            request: MssRequest::CpuSuspend,
            payload: target.level(MSS_STATE_LEVEL).raw(),
        });
        Ok(())
    }
}

/// Backend chosen from [`PlatformConfig::backend`]
pub enum Backend<'a, R, D> {
    Local(LocalBackend<R, D>),
    Coprocessor(CoprocessorBackend<'a, R>),
}

impl<'a, R: RegisterAccess, D: DelayNs + Clone> Backend<'a, R, D> {
    pub fn from_config(
        config: &PlatformConfig,
        sequencer: PowerSequencer<R, D>,
        bridge: &'a MssBridge<R>,
    ) -> Self {
        match config.backend {
            BackendKind::Local => Backend::Local(LocalBackend::new(
                sequencer,
                config.cpu_entry_addr,
                config.failure_policy,
            )),
            BackendKind::Coprocessor => Backend::Coprocessor(CoprocessorBackend::new(bridge)),
        }
    }
}

impl<R: RegisterAccess, D: DelayNs + Clone> PowerBackend for Backend<'_, R, D> {
    fn has_coprocessor(&self) -> bool {
        match self {
            Backend::Local(b) => b.has_coprocessor(),
            Backend::Coprocessor(b) => b.has_coprocessor(),
        }
    }

    fn cpu_on(&self, core: CoreId) -> Result<()> {
        match self {
            Backend::Local(b) => b.cpu_on(core),
            Backend::Coprocessor(b) => b.cpu_on(core),
        }
    }

    fn cpu_off(&self, core: CoreId, target: &PsciPowerState) -> Result<()> {
        match self {
            Backend::Local(b) => b.cpu_off(core, target),
            Backend::Coprocessor(b) => b.cpu_off(core, target),
        }
    }

    fn cpu_suspend(&self, core: CoreId, target: &PsciPowerState) -> Result<()> {
        match self {
            Backend::Local(b) => b.cpu_suspend(core, target),
            Backend::Coprocessor(b) => b.cpu_suspend(core, target),
        }
    }
}
