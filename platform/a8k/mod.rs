//! Marvell Armada-8K power management
//!
//! Data flows from the PSCI hooks in [`pm`] to a [`PowerBackend`], which
//! either sequences the core locally through [`PowerSequencer`] or posts a
//! request to the MSS coprocessor through [`MssBridge`]. The [`Topology`]
//! probed by [`early_setup`] decides which cores exist.

pub mod backend;
pub mod mss;
pub mod pm;
pub mod regs;
pub mod sequencer;
pub mod setup;
pub mod topology;
pub mod trimmer;


pub use backend::{Backend, CoprocessorBackend, LocalBackend, PowerBackend};
pub use mss::{MssBridge, MssMessage, MssRequest};
pub use pm::A8kPowerOps;
pub use regs::{MailboxLayout, RegisterMap};
pub use sequencer::{PowerSequencer, PowerStep, POWER_UP_DELAY_US};
pub use setup::{early_setup, AddressDecoder};
pub use topology::{CoreId, Topology, CPUS_PER_CLUSTER, MAX_CORES};
pub use trimmer::early_cpu_powerdown;
