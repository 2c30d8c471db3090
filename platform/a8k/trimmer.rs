//! Early power trimming
//!
//! Before DRAM is initialized only the boot core runs. Every other core is
//! switched off right away to save power and heat until the OS asks for it.

use embedded_hal::delay::DelayNs;

use super::sequencer::PowerSequencer;
use super::topology::Topology;
use crate::drivers::RegisterAccess;
use crate::Result;

/// Power down every secondary core, in index order.
///
/// Stops at the first failure, leaving later cores untouched.
pub fn early_cpu_powerdown<R, D>(seq: &PowerSequencer<R, D>, topology: &Topology) -> Result<()>
where
    R: RegisterAccess,
    D: DelayNs + Clone,
{
    for core in topology.secondary_cores() {
        seq.power_down(core).inspect_err(|err| {
            log::error!("early power down aborted: {}", err);
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::{Access, SimDelay, SimRegisters};
    use crate::platform::a8k::regs::{FeatureDisable, PowerControl, RegisterMap};
    use crate::platform::a8k::topology::CoreId;
    use crate::{Error, PowerStep};

    const MAP: RegisterMap = RegisterMap::new(0xF000_0000);

    /// Cores whose reset was asserted, in order
    fn reset_asserted(sim: &SimRegisters) -> Vec<CoreId> {
        sim.log()
            .into_iter()
            .filter_map(|access| match access {
                Access::Write(addr, 0) => [CoreId::CPU1, CoreId::CPU2, CoreId::CPU3]
                    .into_iter()
                    .find(|core| MAP.reset_control(*core) == addr),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_cluster_trims_cpu1_only() {
        let sim = SimRegisters::new();
        let seq = PowerSequencer::new(&sim, SimDelay::default(), MAP);
        let topology = Topology::from_status(FeatureDisable::SINGLE_CLUSTER);

        early_cpu_powerdown(&seq, &topology).unwrap();

        assert_eq!(reset_asserted(&sim), [CoreId::CPU1]);
        assert!(sim.log().iter().all(|access| match access {
            Access::Read(addr, _) | Access::Write(addr, _) => {
                *addr != MAP.power_control(CoreId::CPU2) && *addr != MAP.power_control(CoreId::CPU3)
            }
        }));
    }

    #[test]
    fn test_dual_cluster_trims_in_order() {
        let sim = SimRegisters::new();
        let seq = PowerSequencer::new(&sim, SimDelay::default(), MAP);
        let topology = Topology::from_status(FeatureDisable::empty());

        early_cpu_powerdown(&seq, &topology).unwrap();

        assert_eq!(reset_asserted(&sim), [CoreId::CPU1, CoreId::CPU2, CoreId::CPU3]);
        assert!(sim.writes_to(MAP.power_control(CoreId::CPU0)).is_empty());
    }

    #[test]
    fn test_failure_on_cpu1_stops_trimming() {
        let sim = SimRegisters::new();
        sim.poke(MAP.power_control(CoreId::CPU1), PowerControl::POWER_DOWN_REQUEST.bits());
        sim.stick(MAP.power_control(CoreId::CPU1), PowerControl::POWER_DOWN_REQUEST.bits());
        let seq = PowerSequencer::new(&sim, SimDelay::default(), MAP);
        let topology = Topology::from_status(FeatureDisable::empty());

        let err = early_cpu_powerdown(&seq, &topology).unwrap_err();

        assert_eq!(
            err,
            Error::Timeout {
                core: CoreId::CPU1,
                step: PowerStep::PowerSwitchOff
            }
        );
        assert_eq!(sim.reads_of(MAP.power_control(CoreId::CPU2)), 0);
        assert_eq!(sim.reads_of(MAP.power_control(CoreId::CPU3)), 0);
    }
}
