//! Busy-wait delays on the ARM generic timer

#[cfg(target_arch = "aarch64")]
use embedded_hal::delay::DelayNs;

#[cfg(target_arch = "aarch64")]
use aarch64_cpu::registers::{CNTFRQ_EL0, CNTPCT_EL0};
#[cfg(target_arch = "aarch64")]
use tock_registers::interfaces::Readable;

/// Delay provider spinning on the physical counter
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericTimer;

/// Convert a duration to counter ticks, rounding up
pub const fn ns_to_ticks(ns: u32, freq_hz: u64) -> u64 {
    (ns as u64 * freq_hz).div_ceil(1_000_000_000)
}

#[cfg(target_arch = "aarch64")]
impl DelayNs for GenericTimer {
    fn delay_ns(&mut self, ns: u32) {
        let ticks = ns_to_ticks(ns, CNTFRQ_EL0.get());
        let start = CNTPCT_EL0.get();
        while CNTPCT_EL0.get().wrapping_sub(start) < ticks {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ns_to_ticks() {
        // 25 MHz system counter
        assert_eq!(ns_to_ticks(100_000, 25_000_000), 2500);
        assert_eq!(ns_to_ticks(1, 25_000_000), 1);
        assert_eq!(ns_to_ticks(0, 25_000_000), 0);
    }
}
