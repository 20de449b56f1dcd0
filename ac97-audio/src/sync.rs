//! Exclusion against the interrupt handler and the writer wait queue.
//!
//! The only race the driver guards against is between a writer deciding
//! whether the ring has room and the interrupt handler moving the ring
//! along. On a real kernel [`IrqSync::enter_critical`] disables interrupt
//! delivery on the current core; the wait queue parks the writer with
//! interrupts re-enabled and wakes every parked writer on each completion
//! interrupt.
//!
//! This is not a lock between writers. A single writer per device is a
//! precondition of the streaming path.

use alloc::sync::Arc;
use core::time::Duration;

/// Result of parking on the wait queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken by [`IrqSync::wake_all`]. The condition must be rechecked.
    Woken,
    /// The deadline passed without a wake.
    TimedOut,
}

/// Platform glue for interrupt exclusion and blocking.
pub trait IrqSync {
    /// Enter the section in which the device interrupt handler cannot run.
    fn enter_critical(&self);

    /// Leave the section entered with [`enter_critical`](Self::enter_critical).
    fn leave_critical(&self);

    /// Park the caller until the next [`wake_all`](Self::wake_all) or until
    /// `timeout` elapses.
    ///
    /// Called inside the critical section. The implementation must register
    /// the caller as a waiter before leaving the section, so a wake issued
    /// by the interrupt handler right after cannot be lost, and must be back
    /// inside the section when it returns.
    fn wait(&self, timeout: Option<Duration>) -> WaitOutcome;

    /// Wake every parked waiter.
    fn wake_all(&self);

    /// Whether any caller is currently parked.
    fn has_waiters(&self) -> bool;
}

/// One wait queue shared by the driver and the platform's interrupt path.
impl<T: IrqSync + ?Sized> IrqSync for Arc<T> {
    fn enter_critical(&self) {
        (**self).enter_critical()
    }

    fn leave_critical(&self) {
        (**self).leave_critical()
    }

    fn wait(&self, timeout: Option<Duration>) -> WaitOutcome {
        (**self).wait(timeout)
    }

    fn wake_all(&self) {
        (**self).wake_all()
    }

    fn has_waiters(&self) -> bool {
        (**self).has_waiters()
    }
}

/// RAII critical section over an [`IrqSync`].
pub struct IrqGuard<'a, S: IrqSync> {
    sync: &'a S,
}

impl<'a, S: IrqSync> IrqGuard<'a, S> {
    pub fn enter(sync: &'a S) -> Self {
        sync.enter_critical();
        Self { sync }
    }

    /// Park on the wait queue; see [`IrqSync::wait`].
    pub fn wait(&mut self, timeout: Option<Duration>) -> WaitOutcome {
        self.sync.wait(timeout)
    }
}

impl<S: IrqSync> Drop for IrqGuard<'_, S> {
    fn drop(&mut self) {
        self.sync.leave_critical();
    }
}
