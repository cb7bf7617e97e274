//! Fault timeout policy — when a latched fault is allowed to auto-clear.
//!
//! A static table mapping each [`FaultKind`] to an optional timeout period.
//! `None` means the fault is sticky: only a fresh clean reading, never
//! elapsed time, removes it.  The table is part of the response profile and
//! is never mutated after startup.

use super::fault::FaultKind;
use super::Tick;

/// Per-fault auto-clear periods, indexed by [`FaultKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    periods: [Option<Tick>; FaultKind::COUNT],
}

impl TimeoutPolicy {
    /// Build a policy from one entry per fault kind, in `FaultKind::ALL`
    /// order.  Totality is enforced by the array length.
    pub const fn new(periods: [Option<Tick>; FaultKind::COUNT]) -> Self {
        Self { periods }
    }

    /// A policy under which no fault ever times out.
    pub const fn never() -> Self {
        Self::new([None; FaultKind::COUNT])
    }

    /// The auto-clear period for `kind`, if it has one.
    pub fn period(&self, kind: FaultKind) -> Option<Tick> {
        self.periods[kind.index()]
    }

    /// Whether a fault latched at `since` has outlived its period at `now`.
    ///
    /// Wrapping subtraction keeps the comparison correct across tick
    /// counter rollover, provided the real elapsed time is below half the
    /// counter range.  Strict boundary: latched at T with period P, the
    /// fault holds through `now == T + P` and times out from `T + P + 1`.
    pub fn is_timed_out(&self, kind: FaultKind, since: Tick, now: Tick) -> bool {
        match self.period(kind) {
            Some(period) => now.wrapping_sub(since) > period,
            None => false,
        }
    }
}
