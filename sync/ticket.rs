//! Ticket lock for fair spin waiting
//!
//! Cores are served strictly in the order they asked for the lock, so a
//! waiter is overtaken at most once by every other core. This is the lock
//! guarding the MSS mailbox, which up to four cores may target at once.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicUsize, Ordering};

/// A fair FIFO spinlock protecting `T`
pub struct TicketLock<T: ?Sized> {
    /// Next ticket to be handed out
    next_ticket: AtomicUsize,
    /// Ticket currently being served
    serving: AtomicUsize,
    /// The data protected by the lock
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for TicketLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for TicketLock<T> {}

impl<T> TicketLock<T> {
    /// Create a new ticket lock
    pub const fn new(data: T) -> Self {
        Self {
            next_ticket: AtomicUsize::new(0),
            serving: AtomicUsize::new(0),
            data: UnsafeCell::new(data),
        }
    }
}

impl<T: ?Sized> TicketLock<T> {
    /// Acquire the lock, waiting for every earlier ticket to be served
    pub fn lock(&self) -> TicketLockGuard<'_, T> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        while self.serving.load(Ordering::Acquire) != ticket {
            core::hint::spin_loop();
        }
        TicketLockGuard { lock: self }
    }

    /// Try to acquire the lock if nobody holds or waits for it
    pub fn try_lock(&self) -> Option<TicketLockGuard<'_, T>> {
        let ticket = self.serving.load(Ordering::Acquire);
        self.next_ticket
            .compare_exchange(ticket, ticket.wrapping_add(1), Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| TicketLockGuard { lock: self })
    }

    /// Check if the lock is held or has waiters
    pub fn is_locked(&self) -> bool {
        self.next_ticket.load(Ordering::Relaxed) != self.serving.load(Ordering::Relaxed)
    }
}

/// Guard for TicketLock
pub struct TicketLockGuard<'a, T: ?Sized> {
    lock: &'a TicketLock<T>,
}

impl<T: ?Sized> Deref for TicketLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: only the holder of the served ticket has a guard.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for TicketLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: only the holder of the served ticket has a guard.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for TicketLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.serving.fetch_add(1, Ordering::Release);
    }
}
