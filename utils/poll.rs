//! Bounded busy-wait polling
//!
//! Every hardware acknowledgement in the power sequences is awaited with
//! [`poll_until`]. The budget counts predicate evaluations, not time: how
//! long a budget lasts depends on the core clock and the register latency.

/// Number of register reads allowed for one acknowledgement.
pub const REG_WR_VALIDATE_TIMEOUT: u32 = 2000;

/// A poll exhausted its budget without seeing the expected condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimeout {
    /// Number of times the condition was evaluated
    pub attempts: u32,
}

/// Evaluate `done` until it returns true, at most `budget` times.
///
/// Returns the number of evaluations it took, counting the successful one.
pub fn poll_until<F>(budget: u32, mut done: F) -> Result<u32, PollTimeout>
where
    F: FnMut() -> bool,
{
    for attempt in 1..=budget {
        if done() {
            return Ok(attempt);
        }
        core::hint::spin_loop();
    }
    Err(PollTimeout { attempts: budget })
}
