//! Tick accounting for the UI library's clock
//!
//! The UI library paces animations and timers from a millisecond tick.
//! A periodic timer context advances a [`TickCounter`] through a
//! [`TickDriver`]; the UI loop drains the pending milliseconds and hands
//! them to the library before each timer-handler run, so the library is
//! only ever called from one context.

use portable_atomic::{AtomicU32, Ordering};

/// Millisecond accumulator shared between the tick and UI contexts
pub struct TickCounter {
    /// Milliseconds not yet handed to the UI library
    pending: AtomicU32,
    /// Wrapping milliseconds since the counter was created or reset
    uptime: AtomicU32,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
            uptime: AtomicU32::new(0),
        }
    }

    /// Advance by `ms` milliseconds
    pub fn advance(&self, ms: u32) {
        self.pending.fetch_add(ms, Ordering::AcqRel);
        self.uptime.fetch_add(ms, Ordering::AcqRel);
    }

    /// Take all pending milliseconds, leaving zero behind
    pub fn take_pending(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Pending milliseconds without draining them
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }

    /// Wrapping milliseconds advanced so far
    pub fn uptime_ms(&self) -> u32 {
        self.uptime.load(Ordering::Acquire)
    }

    /// Milliseconds since an earlier [`uptime_ms`](Self::uptime_ms) reading
    ///
    /// Correct across u32 wraparound as long as less than ~49 days passed.
    pub fn elapsed_since(&self, earlier: u32) -> u32 {
        self.uptime_ms().wrapping_sub(earlier)
    }

    /// Drop pending ticks and restart uptime at zero
    pub fn reset(&self) {
        self.pending.store(0, Ordering::Release);
        self.uptime.store(0, Ordering::Release);
    }
}

/// Periodic tick source
///
/// Called once per period from the timer context.
pub struct TickDriver<'a> {
    counter: &'a TickCounter,
    period_ms: u32,
}

impl<'a> TickDriver<'a> {
    pub const fn new(counter: &'a TickCounter, period_ms: u32) -> Self {
        Self { counter, period_ms }
    }

    /// Advance the counter by one period
    #[inline]
    pub fn on_period(&self) {
        self.counter.advance(self.period_ms);
    }

    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }
}
