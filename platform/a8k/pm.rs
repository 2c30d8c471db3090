//! PSCI platform hooks for the AP806
//!
//! Power levels: 0 is the core, 1 the cluster. Cluster-level power down is
//! only reachable through the MSS coprocessor, which receives the requested
//! cluster state with every off and suspend request.

use heapless::Vec;

use super::backend::PowerBackend;
use super::regs::RegisterMap;
use super::topology::{CoreId, Topology, CPUS_PER_CLUSTER};
use crate::arch::arm64::{GicCpuInterface, GicDistributor, LocalCpu};
use crate::drivers::RegisterAccess;
use crate::psci::{
    LocalState, Mpidr, PowerState, PowerStateType, PsciPlatformOps, PsciPowerState, PsciReturn,
};
use crate::sync::SpinLock;
use crate::utils::trace::PM_TRACE_DEPTH;
use crate::utils::{dsb_sy, PmTrace, TraceEntry, TraceEvent};

/// PSCI operation table of the AP806
pub struct A8kPowerOps<R, B, C> {
    regs: R,
    map: RegisterMap,
    topology: Topology,
    backend: B,
    cpu: C,
    gicc: GicCpuInterface,
    gicd: GicDistributor,
    trace: SpinLock<PmTrace>,
}

impl<R, B, C> A8kPowerOps<R, B, C>
where
    R: RegisterAccess,
    B: PowerBackend,
    C: LocalCpu,
{
    pub fn new(regs: R, map: RegisterMap, topology: Topology, backend: B, cpu: C) -> Self {
        Self {
            regs,
            map,
            topology,
            backend,
            cpu,
            gicc: GicCpuInterface::new(map.gicc()),
            gicd: GicDistributor::new(map.gicd()),
            trace: SpinLock::new(PmTrace::new()),
        }
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Recent hook invocations, oldest first
    pub fn trace_snapshot(&self) -> Vec<TraceEntry, PM_TRACE_DEPTH> {
        self.trace.lock().snapshot()
    }

    /// Linear index of the calling core
    fn current_index(&self) -> usize {
        let mpidr = self.cpu.mpidr();
        mpidr.aff1() as usize * CPUS_PER_CLUSTER + mpidr.aff0() as usize
    }

    fn record(&self, event: TraceEvent) {
        let core = self.current_index();
        self.trace.lock().record(event, core);
    }

    fn current_core(&self) -> Result<CoreId, PsciReturn> {
        Ok(CoreId::from_mpidr(self.cpu.mpidr())?)
    }

    /// Shared tail of off and suspend: stop interrupts, then hand the core
    /// to the coprocessor
    fn power_down_self(&self, target: &PsciPowerState, suspend: bool) -> Result<(), PsciReturn> {
        if !self.backend.has_coprocessor() {
            log::warn!(
                "CPU {} not supported without the MSS coprocessor",
                if suspend { "suspend" } else { "off" }
            );
            return Err(PsciReturn::NotSupported);
        }

        let core = self.current_core()?;
        self.gicc.disable(&self.regs);
        if suspend {
            self.backend.cpu_suspend(core, target)?;
        } else {
            self.backend.cpu_off(core, target)?;
        }
        Ok(())
    }

    /// Per-core state lost over power down
    fn restore_core(&self) {
        self.cpu.init_secure_state();
        self.gicd.init_percpu(&self.regs);
        self.gicc.enable(&self.regs);
    }
}

impl<R, B, C> PsciPlatformOps for A8kPowerOps<R, B, C>
where
    R: RegisterAccess,
    B: PowerBackend,
    C: LocalCpu,
{
    const MAX_POWER_LEVEL: usize = 1;

    fn validate_power_state(&self, power_state: PowerState) -> Result<PsciPowerState, PsciReturn> {
        let level = power_state.power_level();
        if level > Self::MAX_POWER_LEVEL {
            return Err(PsciReturn::InvalidParams);
        }
        if power_state.state_id() != 0 {
            return Err(PsciReturn::InvalidParams);
        }

        match power_state.state_type() {
            PowerStateType::Standby if level == 0 => {
                let mut state = PsciPowerState::new();
                state.set_level(0, LocalState::Retention);
                Ok(state)
            }
            PowerStateType::Standby => Err(PsciReturn::InvalidParams),
            PowerStateType::PowerDown => Ok(PsciPowerState::off_up_to(level)),
        }
    }

    fn validate_ns_entrypoint(&self, _entrypoint: u64) -> Result<(), PsciReturn> {
        Ok(())
    }

    fn cpu_standby(&self, state: LocalState) -> ! {
        log::error!("cpu_standby({:?}) is not supported", state);
        panic!("cpu_standby is not supported");
    }

    fn power_domain_on(&self, target: Mpidr) -> Result<(), PsciReturn> {
        let core = CoreId::from_mpidr(target)?;
        if !self.topology.contains(core) {
            log::warn!("{} is not present on this part", core);
            return Err(PsciReturn::InvalidParams);
        }

        self.backend.cpu_on(core).map_err(|err| {
            let ret = PsciReturn::from(err);
            log::error!("CPU_ON {}: {}", core, ret);
            ret
        })?;
        self.record(TraceEvent::PowerDomainOn(core.index()));
        Ok(())
    }

    fn power_domain_off(&self, target: &PsciPowerState) -> Result<(), PsciReturn> {
        self.power_down_self(target, false)?;
        self.record(TraceEvent::PowerDomainOff);
        Ok(())
    }

    fn power_domain_suspend(&self, target: &PsciPowerState) -> Result<(), PsciReturn> {
        self.power_down_self(target, true)?;
        self.record(TraceEvent::PowerDomainSuspend);
        Ok(())
    }

    fn power_domain_on_finish(&self, _target: &PsciPowerState) {
        self.record(TraceEvent::PowerDomainOnFinish);
        self.restore_core();
    }

    fn power_domain_suspend_finish(&self, _target: &PsciPowerState) -> Result<(), PsciReturn> {
        self.record(TraceEvent::PowerDomainSuspendFinish);
        if !self.backend.has_coprocessor() {
            log::warn!("CPU suspend finish not supported without the MSS coprocessor");
            return Err(PsciReturn::NotSupported);
        }
        self.restore_core();
        Ok(())
    }

    fn system_off(&self) -> ! {
        log::error!("system_off is not supported");
        panic!("system_off is not supported");
    }

    fn system_reset(&self) -> ! {
        log::info!("System reset");
        self.regs.write32(self.map.global_sw_reset(), 0);
        dsb_sy();
        panic!("system reset did not take effect");
    }
}
