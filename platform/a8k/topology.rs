//! Cluster topology
//!
//! The AP806 has two clusters of two cores. On some parts cluster 1 is
//! fused off, which is reported by one bit of the feature disable status
//! register. The topology is probed once during early setup and is
//! read-only afterwards.

use core::fmt;

use super::regs::{FeatureDisable, RegisterMap};
use crate::drivers::RegisterAccess;
use crate::psci::Mpidr;
use crate::{Error, Result};

/// Cores in each cluster
pub const CPUS_PER_CLUSTER: usize = 2;

/// Maximum number of clusters
pub const MAX_CLUSTERS: usize = 2;

/// Maximum number of cores
pub const MAX_CORES: usize = CPUS_PER_CLUSTER * MAX_CLUSTERS;

/// Linear core index, `cluster * CPUS_PER_CLUSTER + core_in_cluster`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoreId(u8);

impl CoreId {
    pub const CPU0: Self = Self(0);
    pub const CPU1: Self = Self(1);
    pub const CPU2: Self = Self(2);
    pub const CPU3: Self = Self(3);

    /// Create from a linear index
    pub const fn new(index: u8) -> Result<Self> {
        if (index as usize) < MAX_CORES {
            Ok(Self(index))
        } else {
            Err(Error::InvalidCore(index))
        }
    }

    /// Create from cluster and in-cluster position
    pub const fn from_affinity(cluster: u8, core: u8) -> Result<Self> {
        if (cluster as usize) >= MAX_CLUSTERS || (core as usize) >= CPUS_PER_CLUSTER {
            return Err(Error::InvalidCore(
                cluster.saturating_mul(CPUS_PER_CLUSTER as u8).saturating_add(core),
            ));
        }
        Ok(Self(cluster * CPUS_PER_CLUSTER as u8 + core))
    }

    /// Resolve an MPIDR. The AP806 only populates aff1 and aff0.
    pub const fn from_mpidr(mpidr: Mpidr) -> Result<Self> {
        if mpidr.aff3() != 0 || mpidr.aff2() != 0 {
            return Err(Error::InvalidCore(u8::MAX));
        }
        Self::from_affinity(mpidr.aff1(), mpidr.aff0())
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn cluster(self) -> usize {
        self.index() / CPUS_PER_CLUSTER
    }

    pub const fn core_in_cluster(self) -> usize {
        self.index() % CPUS_PER_CLUSTER
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU{}", self.0)
    }
}

/// Clusters present on this part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    cluster_count: usize,
}

impl Topology {
    /// Read the feature disable status once and derive the cluster count
    pub fn probe<R: RegisterAccess>(regs: &R, map: &RegisterMap) -> Self {
        let status = FeatureDisable::from_bits_retain(regs.read32(map.feature_disable_status()));
        let topology = Self::from_status(status);
        log::info!("AP806: {} cluster(s)", topology.cluster_count);
        topology
    }

    pub const fn from_status(status: FeatureDisable) -> Self {
        let cluster_count = if status.contains(FeatureDisable::SINGLE_CLUSTER) {
            1
        } else {
            2
        };
        Self { cluster_count }
    }

    pub const fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub const fn core_count(&self) -> usize {
        self.cluster_count * CPUS_PER_CLUSTER
    }

    pub const fn contains(&self, core: CoreId) -> bool {
        core.index() < self.core_count()
    }

    /// Every existing core except the boot core, in index order
    pub fn secondary_cores(&self) -> impl Iterator<Item = CoreId> {
        (1..self.core_count() as u8).map(CoreId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::SimRegisters;

    const MAP: RegisterMap = RegisterMap::new(0xF000_0000);

    #[test]
    fn test_single_cluster_when_bit_set() {
        let sim = SimRegisters::new();
        sim.poke(MAP.feature_disable_status(), 1 << 4);
        let topology = Topology::probe(&sim, &MAP);

        assert_eq!(topology.cluster_count(), 1);
        assert!(topology.contains(CoreId::CPU1));
        assert!(!topology.contains(CoreId::CPU2));
        assert_eq!(sim.reads_of(MAP.feature_disable_status()), 1);
        assert!(sim.writes_to(MAP.feature_disable_status()).is_empty());
    }

    #[test]
    fn test_two_clusters_when_bit_clear() {
        let sim = SimRegisters::new();
        sim.poke(MAP.feature_disable_status(), !(1 << 4));
        let topology = Topology::probe(&sim, &MAP);

        assert_eq!(topology.cluster_count(), 2);
        assert_eq!(topology.core_count(), 4);
        let secondaries: Vec<_> = topology.secondary_cores().collect();
        assert_eq!(secondaries, [CoreId::CPU1, CoreId::CPU2, CoreId::CPU3]);
    }

    #[test]
    fn test_core_id_from_mpidr() {
        let core = CoreId::from_mpidr(Mpidr::from_affinity(0, 0, 1, 1)).unwrap();
        assert_eq!(core, CoreId::CPU3);
        assert_eq!(core.cluster(), 1);
        assert_eq!(core.core_in_cluster(), 1);
        assert_eq!(core.to_string(), "CPU3");

        assert_eq!(
            CoreId::from_mpidr(Mpidr::from_affinity(0, 0, 2, 0)),
            Err(Error::InvalidCore(4))
        );
        assert_eq!(CoreId::new(7), Err(Error::InvalidCore(7)));
    }

    #[test]
    fn test_core_id_rejects_upper_affinity() {
        assert!(CoreId::from_mpidr(Mpidr::from_affinity(0, 1, 0, 1)).is_err());
        assert!(CoreId::from_mpidr(Mpidr::from_affinity(1, 0, 0, 0)).is_err());
    }
}
