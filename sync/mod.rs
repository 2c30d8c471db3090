//! Synchronization primitives
//!
//! Busy-waiting locks usable before any scheduler exists. Every core runs
//! the same image, so these are the only way cores coordinate.

pub mod spinlock;
pub mod ticket;

// Re-export for convenience
pub use spinlock::{SpinLock, SpinLockGuard};
pub use ticket::{TicketLock, TicketLockGuard};
