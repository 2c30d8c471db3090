//! Simulated register file for host tests
//!
//! Registers spring into existence with value 0 on first access. Each one
//! can be given a response latency (a write only becomes visible on the
//! N-th read after it) and a mask of stuck bits that ignore writes. Every
//! access is appended to a log, and the file can yield the calling thread
//! after each access to force preemption in concurrency tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::delay::DelayNs;

use super::RegisterAccess;
use crate::arch::arm64::LocalCpu;
use crate::psci::Mpidr;

/// One logged register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(usize, u32),
    Write(usize, u32),
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    value: u32,
    reads_left: u32,
}

#[derive(Debug, Default)]
struct SimRegister {
    value: u32,
    pending: Option<Pending>,
    latency: u32,
    stuck: u32,
}

#[derive(Debug, Default)]
struct SimState {
    regs: BTreeMap<usize, SimRegister>,
    log: Vec<Access>,
}

/// In-memory register file
#[derive(Debug, Default)]
pub struct SimRegisters {
    state: Mutex<SimState>,
    yield_on_access: AtomicBool,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap()
    }

    fn after_access(&self) {
        if self.yield_on_access.load(Ordering::Relaxed) {
            std::thread::yield_now();
        }
    }

    /// Set a register without logging
    pub fn poke(&self, addr: usize, value: u32) {
        let mut state = self.state();
        let reg = state.regs.entry(addr).or_default();
        reg.value = value;
        reg.pending = None;
    }

    /// Current visible value without logging or consuming latency
    pub fn peek(&self, addr: usize) -> u32 {
        self.state().regs.get(&addr).map_or(0, |reg| reg.value)
    }

    /// Make writes to `addr` visible only on the `reads`-th read after them
    pub fn set_latency(&self, addr: usize, reads: u32) {
        self.state().regs.entry(addr).or_default().latency = reads;
    }

    /// Bits in `mask` keep their current value whatever is written
    pub fn stick(&self, addr: usize, mask: u32) {
        self.state().regs.entry(addr).or_default().stuck = mask;
    }

    /// Yield the calling thread after every access
    pub fn set_yield_on_access(&self, enabled: bool) {
        self.yield_on_access.store(enabled, Ordering::Relaxed);
    }

    /// Every access so far, in order
    pub fn log(&self) -> Vec<Access> {
        self.state().log.clone()
    }

    pub fn clear_log(&self) {
        self.state().log.clear();
    }

    /// Number of reads of `addr`
    pub fn reads_of(&self, addr: usize) -> usize {
        self.state()
            .log
            .iter()
            .filter(|access| matches!(access, Access::Read(a, _) if *a == addr))
            .count()
    }

    /// Values written to `addr`, in order
    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.state()
            .log
            .iter()
            .filter_map(|access| match access {
                Access::Write(a, value) if *a == addr => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl RegisterAccess for SimRegisters {
    fn read32(&self, addr: usize) -> u32 {
        let value = {
            let mut state = self.state();
            let reg = state.regs.entry(addr).or_default();
            if let Some(mut pending) = reg.pending.take() {
                pending.reads_left -= 1;
                if pending.reads_left == 0 {
                    reg.value = pending.value;
                } else {
                    reg.pending = Some(pending);
                }
            }
            let value = reg.value;
            state.log.push(Access::Read(addr, value));
            value
        };
        self.after_access();
        value
    }

    fn write32(&self, addr: usize, value: u32) {
        {
            let mut state = self.state();
            let reg = state.regs.entry(addr).or_default();
            let applied = (value & !reg.stuck) | (reg.value & reg.stuck);
            if reg.latency == 0 {
                reg.value = applied;
                reg.pending = None;
            } else {
                reg.pending = Some(Pending {
                    value: applied,
                    reads_left: reg.latency,
                });
            }
            state.log.push(Access::Write(addr, value));
        }
        self.after_access();
    }
}

/// Delay provider that only accounts for the time requested
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    total_ns: Arc<AtomicU64>,
}

impl SimDelay {
    /// Total nanoseconds waited through every clone
    pub fn total_ns(&self) -> u64 {
        self.total_ns.load(Ordering::Relaxed)
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::Relaxed);
    }
}

/// Executing core with a fixed MPIDR
#[derive(Debug)]
pub struct SimCpu {
    mpidr: Mpidr,
    secure_inits: AtomicU32,
}

impl SimCpu {
    pub fn new(cluster: u8, core: u8) -> Self {
        Self {
            mpidr: Mpidr::from_affinity(0, 0, cluster, core),
            secure_inits: AtomicU32::new(0),
        }
    }

    /// Number of times the secure state was re-established
    pub fn secure_inits(&self) -> u32 {
        self.secure_inits.load(Ordering::Relaxed)
    }
}

impl LocalCpu for SimCpu {
    fn mpidr(&self) -> Mpidr {
        self.mpidr
    }

    fn init_secure_state(&self) {
        self.secure_inits.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_delays_visibility() {
        let sim = SimRegisters::new();
        sim.set_latency(0x10, 3);
        sim.write32(0x10, 0xA);
        assert_eq!(sim.read32(0x10), 0);
        assert_eq!(sim.read32(0x10), 0);
        assert_eq!(sim.read32(0x10), 0xA);
        assert_eq!(sim.reads_of(0x10), 3);
    }

    #[test]
    fn test_stuck_bits_ignore_writes() {
        let sim = SimRegisters::new();
        sim.poke(0x20, 0x1);
        sim.stick(0x20, 0x1);
        sim.write32(0x20, 0xF0);
        assert_eq!(sim.peek(0x20), 0xF1);
        assert_eq!(sim.writes_to(0x20), [0xF0]);
    }
}
