//! Connectivity state machine for the poll loop
//!
//! `connected → degraded` on the first failed poll (snapshot retained),
//! `degraded → disconnected` once consecutive failures exceed the grace
//! budget (snapshot invalidated), and back to `connected` on the first
//! successful poll.

use serde::{Deserialize, Serialize};

/// Connectivity of one device session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Last poll succeeded; snapshot is current
    Connected,
    /// Transient failures; last snapshot retained
    Degraded,
    /// Grace period exceeded (or never connected); snapshot invalid
    Disconnected,
}

/// An observed connectivity transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Connectivity,
    pub to: Connectivity,
}

/// Tracks consecutive poll failures against a grace budget
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: Connectivity,
    consecutive_failures: u32,
    grace_failures: u32,
}

impl ConnectionTracker {
    /// Create a tracker allowing `grace_failures` failed polls beyond the
    /// first before the session counts as disconnected
    pub fn new(grace_failures: u32) -> Self {
        Self {
            state: Connectivity::Disconnected,
            consecutive_failures: 0,
            grace_failures,
        }
    }

    pub fn state(&self) -> Connectivity {
        self.state
    }

    /// Record a successful poll, returning the transition if one occurred
    pub fn record_success(&mut self) -> Option<Transition> {
        self.consecutive_failures = 0;
        self.transition_to(Connectivity::Connected)
    }

    /// Record a failed poll, returning the transition if one occurred
    pub fn record_failure(&mut self) -> Option<Transition> {
        self.consecutive_failures += 1;
        match self.state {
            Connectivity::Connected => self.transition_to(Connectivity::Degraded),
            Connectivity::Degraded if self.consecutive_failures > self.grace_failures + 1 => {
                self.transition_to(Connectivity::Disconnected)
            }
            _ => None,
        }
    }

    fn transition_to(&mut self, to: Connectivity) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let transition = Transition {
            from: self.state,
            to,
        };
        self.state = to;
        Some(transition)
    }
}
