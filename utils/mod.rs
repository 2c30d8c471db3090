//! Utility functions and data structures
//!
//! This module contains the polling primitive, the console logger, the PM
//! event trace and the memory barriers used around register sequences.

pub mod logger;
pub mod poll;
pub mod trace;

// Re-export commonly used utilities
pub use self::poll::{poll_until, PollTimeout, REG_WR_VALIDATE_TIMEOUT};
pub use self::trace::{PmTrace, TraceEntry, TraceEvent};

/// Full-system data synchronization barrier
///
/// Orders every earlier memory and register access before any later one,
/// as seen by all observers including cores that are still held in reset.
#[inline]
pub fn dsb_sy() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "aarch64")] {
            aarch64_cpu::asm::barrier::dsb(aarch64_cpu::asm::barrier::SY);
        } else {
            core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        }
    }
}
