//! Poll loop limits.
//!
//! By default the loop is unbounded and paced entirely by the server's
//! `Retry-After` hints; the scan ends only when the service reports a
//! terminal status. A poll budget and an overall deadline can be set to
//! stop waiting on tasks that never finish.

use std::time::Duration;

/// Limits applied to the poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of task polls. `None` means unbounded.
    pub max_polls: Option<u32>,

    /// Maximum time from submission to terminal verdict. `None` means unbounded.
    pub deadline: Option<Duration>,
}

impl PollPolicy {
    /// Unbounded, server-paced polling.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Sets the maximum number of polls.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Sets the overall deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns `true` if neither limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.max_polls.is_none() && self.deadline.is_none()
    }

    /// Returns `true` if `polls` polls have used up the budget.
    pub fn budget_exhausted(&self, polls: u32) -> bool {
        self.max_polls.is_some_and(|max| polls >= max)
    }
}
