// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative limits on how much of a pass one `traverse` call may run.
//!
//! A budget is consulted between emitted elements, never in the middle of one,
//! so a call always makes progress and overruns by at most one element.

/// Decides when a `traverse` call should hand control back to its caller.
pub trait Budget {
    /// Called once at the start of every `traverse` call.
    fn start(&mut self) {}

    /// Called after each emitted element; `true` suspends the pass.
    fn exhausted(&mut self) -> bool;
}

/// Never runs out: every call runs the pass to completion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Unbounded;

impl Budget for Unbounded {
    #[inline]
    fn exhausted(&mut self) -> bool {
        false
    }
}

/// Allows a fixed number of emitted elements per call.
///
/// Deterministic, which makes it the budget of choice for tests and replays.
/// A limit of `0` behaves like a limit of `1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ElementBudget {
    limit: usize,
    used: usize,
}

impl ElementBudget {
    /// A budget of `limit` emitted elements per call.
    pub const fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Elements counted so far in the current call.
    pub const fn used(&self) -> usize {
        self.used
    }
}

impl Budget for ElementBudget {
    fn start(&mut self) {
        self.used = 0;
    }

    fn exhausted(&mut self) -> bool {
        self.used += 1;
        self.used >= self.limit
    }
}

#[cfg(feature = "std")]
pub use time::TimeBudget;

#[cfg(feature = "std")]
mod time {
    use core::time::Duration;

    // WASM compat: web_time, not std::time.
    use web_time::Instant;

    use super::Budget;

    /// Wall-clock budget per call, measured from [`Budget::start`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TimeBudget {
        budget: Duration,
        deadline: Option<Instant>,
    }

    impl TimeBudget {
        /// A budget of `budget` wall-clock time per call.
        pub const fn new(budget: Duration) -> Self {
            Self {
                budget,
                deadline: None,
            }
        }

        /// The per-call allowance.
        pub const fn budget(&self) -> Duration {
            self.budget
        }
    }

    impl Budget for TimeBudget {
        fn start(&mut self) {
            self.deadline = Instant::now().checked_add(self.budget);
        }

        fn exhausted(&mut self) -> bool {
            // An unrepresentable deadline never arrives.
            self.deadline.is_some_and(|d| Instant::now() >= d)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_budget_counts_per_call() {
        let mut b = ElementBudget::new(3);
        b.start();
        assert!(!b.exhausted());
        assert!(!b.exhausted());
        assert!(b.exhausted());
        assert_eq!(b.used(), 3);
        b.start();
        assert_eq!(b.used(), 0);
        assert!(!b.exhausted());
    }

    #[test]
    fn zero_limit_still_allows_one_element() {
        let mut b = ElementBudget::new(0);
        b.start();
        assert!(b.exhausted());
    }

    #[test]
    fn unbounded_never_runs_out() {
        let mut b = Unbounded;
        b.start();
        assert!((0..1000).all(|_| !b.exhausted()));
    }

    #[cfg(feature = "std")]
    #[test]
    fn zero_time_budget_is_exhausted_immediately() {
        use core::time::Duration;
        let mut b = TimeBudget::new(Duration::ZERO);
        b.start();
        assert!(b.exhausted());
        assert_eq!(b.budget(), Duration::ZERO);
    }

    #[cfg(feature = "std")]
    #[test]
    fn generous_time_budget_is_not_exhausted() {
        use core::time::Duration;
        let mut b = TimeBudget::new(Duration::from_secs(3600));
        b.start();
        assert!(!b.exhausted());
    }
}
