//! Bounded-wait primitive: every "wait for X" operation in the simulator is
//! a loop of short receive windows under one wall-clock deadline, so a wait
//! can never block past its quantum and expiry is a value, not an error.
use std::time::{Duration, Instant};

/// Receive window granted to a single poll step. Short relative to the
/// protocol's natural cadence so composed waits stay responsive.
pub const POLL_QUANTUM: Duration = Duration::from_millis(50);

//==================================================================================POLL_OUTCOME
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a deadline-bounded wait. `TimedOut` is a first-class outcome
/// that callers must handle explicitly.
pub enum PollOutcome<T> {
    /// The step function produced a terminal value before the deadline.
    Complete(T),
    /// The deadline elapsed with nothing observed.
    TimedOut,
}

impl<T> PollOutcome<T> {
    /// Terminal value, if any.
    pub fn complete(self) -> Option<T> {
        match self {
            PollOutcome::Complete(value) => Some(value),
            PollOutcome::TimedOut => None,
        }
    }

    /// Whether the wait expired without a terminal value.
    pub fn timed_out(&self) -> bool {
        matches!(self, PollOutcome::TimedOut)
    }
}

//==================================================================================DEADLINE
#[derive(Debug, Clone, Copy)]
/// Wall-clock budget for one wait operation, anchored at creation time.
pub struct Deadline {
    started: Instant,
    max_duration: Duration,
    quantum: Duration,
}

impl Deadline {
    /// Start a deadline now with an explicit polling quantum.
    pub fn new(max_duration: Duration, quantum: Duration) -> Self {
        Self {
            started: Instant::now(),
            max_duration,
            quantum,
        }
    }

    /// Start a deadline now with the default [`POLL_QUANTUM`].
    pub fn starting_now(max_duration: Duration) -> Self {
        Self::new(max_duration, POLL_QUANTUM)
    }

    /// Budget left on the wall clock.
    pub fn remaining(&self) -> Duration {
        self.max_duration.saturating_sub(self.started.elapsed())
    }

    /// Whether the budget is spent.
    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Drive `step` until it yields a terminal value or the budget is spent.
    ///
    /// Each invocation receives a window of at most one quantum, truncated to
    /// whatever budget remains, and is expected to block no longer than that
    /// window (one bounded bus receive). A zero budget returns `TimedOut`
    /// without invoking `step` more than once.
    pub fn poll<T, E>(
        &self,
        mut step: impl FnMut(Duration) -> Result<Option<T>, E>,
    ) -> Result<PollOutcome<T>, E> {
        loop {
            let remaining = self.remaining();
            if remaining.is_zero() {
                return Ok(PollOutcome::TimedOut);
            }
            let window = remaining.min(self.quantum);
            if let Some(value) = step(window)? {
                return Ok(PollOutcome::Complete(value));
            }
        }
    }
}
