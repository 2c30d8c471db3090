//! AP806 register map
//!
//! Addresses are absolute, computed from the register window base. Bit
//! names follow the hardware documentation; note that `POWER_DOWN_REQUEST`
//! is *cleared* to request power removal and *set* to start power on.

use bitflags::bitflags;

use super::topology::CoreId;

const PWRC_BASE: usize = 0x68_0000;
const PWRC_STRIDE: usize = 0x10;

const CCU_RESET_BASE: usize = 0x1A50;
const CCU_RESET_CLUSTER_STRIDE: usize = 0x400;

const FEATURE_DISABLE_STATUS: usize = 0x6F_8230;

const CPU_PRIVATE_UID: usize = 0x30;
const CPU_RVBAR_BASE: usize = 0x640;
const CPU_UN_RESET_BASE: usize = 0x650;

const RFU_GLOBAL_SW_RST: usize = 0x6F_0000 + 0x84;

const GICD_OFFSET: usize = 0x21_0000;
const GICC_OFFSET: usize = 0x22_0000;

const MSS_MAILBOX_OFFSET: usize = 0x52_0000;
const MSS_DOORBELL_OFFSET: usize = 0x58_0020;

bitflags! {
    /// Per-core power control register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerControl: u32 {
        /// Cleared: request power removal. Set: start power on.
        const POWER_DOWN_REQUEST = 1 << 0;
        /// Electrically isolate the core from the rest of the cluster
        const ISOLATION_ENABLE = 1 << 16;
        /// Power-ready indication towards the LDO
        const LDO_BYPASS_READY = 1 << 31;
    }
}

bitflags! {
    /// Per-core reset control register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResetControl: u32 {
        /// Cleared: core held in power-on reset
        const POR_RESET_STATIC = 1 << 0;
    }
}

bitflags! {
    /// Fuse-backed feature disable status
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FeatureDisable: u32 {
        /// Cluster 1 is fused off
        const SINGLE_CLUSTER = 1 << 4;
    }
}

/// Written to a core's un-reset register to let it run
pub const CPU_UN_RESET_RELEASE: u32 = 0x1_0001;

/// Absolute register addresses of one AP806
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    base: usize,
}

impl RegisterMap {
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    pub const fn power_control(&self, core: CoreId) -> usize {
        self.base + PWRC_BASE + PWRC_STRIDE * core.index()
    }

    /// Reset control registers come in pairs, one block per cluster
    pub const fn reset_control(&self, core: CoreId) -> usize {
        self.base
            + CCU_RESET_BASE
            + CCU_RESET_CLUSTER_STRIDE * core.cluster()
            + 4 * core.core_in_cluster()
    }

    pub const fn feature_disable_status(&self) -> usize {
        self.base + FEATURE_DISABLE_STATUS
    }

    pub const fn private_uid(&self) -> usize {
        self.base + CPU_PRIVATE_UID
    }

    /// Reset vector (bits [47:16] of the entry address)
    pub const fn rvbar(&self, core: CoreId) -> usize {
        self.base + CPU_RVBAR_BASE + 4 * core.index()
    }

    pub const fn cpu_un_reset(&self, core: CoreId) -> usize {
        self.base + CPU_UN_RESET_BASE + 4 * core.index()
    }

    pub const fn global_sw_reset(&self) -> usize {
        self.base + RFU_GLOBAL_SW_RST
    }

    pub const fn gicd(&self) -> usize {
        self.base + GICD_OFFSET
    }

    pub const fn gicc(&self) -> usize {
        self.base + GICC_OFFSET
    }
}

/// Location of the MSS mailbox and its doorbell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxLayout {
    /// First word of the message area
    pub mailbox: usize,
    /// Doorbell register raising the coprocessor interrupt
    pub doorbell: usize,
}

impl MailboxLayout {
    /// Value written to the doorbell to signal a new message
    pub const DOORBELL_RING: u32 = 1 << 31;

    /// Mailbox layout at its usual place in the AP806 window
    pub const fn at_default(base: usize) -> Self {
        Self {
            mailbox: base + MSS_MAILBOX_OFFSET,
            doorbell: base + MSS_DOORBELL_OFFSET,
        }
    }

    pub const fn target(&self) -> usize {
        self.mailbox
    }

    pub const fn request(&self) -> usize {
        self.mailbox + 4
    }

    pub const fn payload(&self) -> usize {
        self.mailbox + 8
    }
}
