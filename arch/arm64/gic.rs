//! GICv2 CPU interface and banked distributor setup
//!
//! Only the per-core pieces touched across a power transition live here:
//! the CPU interface is switched off before a core loses power and back on
//! once it runs again, and the banked SGI/PPI distributor registers are
//! reinitialized because their contents do not survive power down.
//! Reference: ARM IHI 0048B (GIC architecture specification)

use bitflags::bitflags;

use crate::drivers::RegisterAccess;

/// GIC Distributor register offsets
pub mod gicd {
    /// GICD_IGROUPR - Interrupt Group Registers
    pub const IGROUPR: usize = 0x080;
    /// GICD_IPRIORITYR - Interrupt Priority Registers
    pub const IPRIORITYR: usize = 0x400;
}

/// GIC CPU interface register offsets
pub mod gicc {
    /// GICC_CTLR - CPU Interface Control Register
    pub const CTLR: usize = 0x00;
    /// GICC_PMR - Interrupt Priority Mask Register
    pub const PMR: usize = 0x04;
}

/// Lowest priority mask, lets every priority through
pub const GIC_PRI_MASK: u32 = 0xff;

/// Default priority of the banked interrupts
pub const GIC_HIGHEST_NS_PRIORITY: u8 = 0x80;

/// SGIs and PPIs per core
const BANKED_IRQS: usize = 32;

bitflags! {
    /// GICC_CTLR, secure view
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CpuCtlr: u32 {
        const ENABLE_GRP0 = 1 << 0;
        const ENABLE_GRP1 = 1 << 1;
        const FIQ_EN = 1 << 3;
        const FIQ_BYP_DIS_GRP0 = 1 << 5;
        const IRQ_BYP_DIS_GRP0 = 1 << 6;
        const FIQ_BYP_DIS_GRP1 = 1 << 7;
        const IRQ_BYP_DIS_GRP1 = 1 << 8;

        const BYPASS_DISABLE = Self::FIQ_BYP_DIS_GRP0.bits()
            | Self::IRQ_BYP_DIS_GRP0.bits()
            | Self::FIQ_BYP_DIS_GRP1.bits()
            | Self::IRQ_BYP_DIS_GRP1.bits();
    }
}

/// GICv2 CPU interface of the calling core
#[derive(Debug, Clone, Copy)]
pub struct GicCpuInterface {
    base: usize,
}

impl GicCpuInterface {
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    /// Route secure interrupts as FIQs and start taking them
    pub fn enable<R: RegisterAccess>(&self, regs: &R) {
        log::debug!("Enabling GIC CPU interface at {:#x}", self.base);
        regs.write32(self.base + gicc::PMR, GIC_PRI_MASK);
        let ctlr = CpuCtlr::ENABLE_GRP0 | CpuCtlr::FIQ_EN | CpuCtlr::BYPASS_DISABLE;
        regs.write32(self.base + gicc::CTLR, ctlr.bits());
    }

    /// Stop signalling both groups, and keep the legacy bypass
    /// from waking the core
    pub fn disable<R: RegisterAccess>(&self, regs: &R) {
        log::debug!("Disabling GIC CPU interface at {:#x}", self.base);
        let mut ctlr = CpuCtlr::from_bits_retain(regs.read32(self.base + gicc::CTLR));
        ctlr.remove(CpuCtlr::ENABLE_GRP0 | CpuCtlr::ENABLE_GRP1);
        ctlr.insert(CpuCtlr::BYPASS_DISABLE);
        regs.write32(self.base + gicc::CTLR, ctlr.bits());
    }
}

/// GICv2 distributor, banked registers only
#[derive(Debug, Clone, Copy)]
pub struct GicDistributor {
    base: usize,
}

impl GicDistributor {
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    /// Reset the calling core's banked SGI/PPI state: everything
    /// non-secure at the default priority
    pub fn init_percpu<R: RegisterAccess>(&self, regs: &R) {
        regs.write32(self.base + gicd::IGROUPR, !0);

        let prio = u32::from_ne_bytes([GIC_HIGHEST_NS_PRIORITY; 4]);
        for word in 0..BANKED_IRQS / 4 {
            regs.write32(self.base + gicd::IPRIORITYR + word * 4, prio);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::SimRegisters;

    #[test]
    fn test_cpuif_enable_disable() {
        let sim = SimRegisters::new();
        let gicc = GicCpuInterface::new(0x2000);

        gicc.enable(&sim);
        assert_eq!(sim.peek(0x2000 + gicc::PMR), 0xff);
        assert_eq!(sim.peek(0x2000), 0x1e9);

        sim.poke(0x2000, 0x3);
        gicc.disable(&sim);
        assert_eq!(sim.peek(0x2000), 0x1e0);
    }

    #[test]
    fn test_distributor_percpu_init() {
        let sim = SimRegisters::new();
        GicDistributor::new(0x1000).init_percpu(&sim);

        assert_eq!(sim.peek(0x1080), 0xffff_ffff);
        assert_eq!(sim.peek(0x1400), 0x8080_8080);
        assert_eq!(sim.peek(0x141c), 0x8080_8080);
        assert_eq!(sim.peek(0x1420), 0);
    }
}
