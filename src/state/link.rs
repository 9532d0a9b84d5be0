//! Explicit connection state machine for the pipeline API link.
//!
//! A pure machine plus an injectable backoff policy, so reconnect behavior
//! is unit testable without a clock. The supervisor task in `main` drives
//! this machine with real timers.

use std::time::Duration;

use thiserror::Error;

/// Delay growth and retry budget for reconnect attempts.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial: Duration,
    /// Multiplier applied per failed attempt.
    pub factor: u32,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Failed attempts tolerated before the link is declared failed.
    pub max_attempts: u32,
}

impl BackoffPolicy {
    /// Delay to wait before retry number `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.factor.saturating_pow(attempt.min(16));
        self.initial
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        // 2s, then 4s, capped, with a small budget.
        Self {
            initial: Duration::from_secs(2),
            factor: 2,
            max_delay: Duration::from_secs(4),
            max_attempts: 5,
        }
    }
}

/// Phases of the pipeline link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection requested yet.
    Idle,
    /// Initial connection attempts are in flight.
    Connecting {
        /// Zero-based attempt counter.
        attempt: u32,
    },
    /// The pipeline is reachable.
    Connected,
    /// The connection dropped and retries are in flight.
    Reconnecting {
        /// Zero-based attempt counter since the drop.
        attempt: u32,
    },
    /// The retry budget is exhausted; a new connect request is required.
    Failed,
}

/// Events applied to the link state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Start (or restart) connecting.
    ConnectRequested,
    /// An attempt succeeded.
    Opened,
    /// An established connection dropped.
    Lost,
    /// A connection attempt failed.
    AttemptFailed,
}

/// Error returned when an event cannot be applied in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("link event {event:?} cannot be applied while {from:?}")]
pub struct InvalidLinkTransition {
    /// State the machine was in.
    pub from: LinkState,
    /// Rejected event.
    pub event: LinkEvent,
}

/// Pipeline link machine: `Idle → Connecting → Connected → Reconnecting → Failed`.
#[derive(Debug, Clone)]
pub struct PipelineLink {
    state: LinkState,
    policy: BackoffPolicy,
}

impl PipelineLink {
    /// Create an idle link with the given backoff policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            state: LinkState::Idle,
            policy,
        }
    }

    /// Current phase.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Backoff policy in effect.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Delay the supervisor should wait before the next attempt, if the
    /// machine is in a retrying phase.
    pub fn next_delay(&self) -> Option<Duration> {
        match self.state {
            LinkState::Connecting { attempt } | LinkState::Reconnecting { attempt } => {
                Some(self.policy.delay_for(attempt))
            }
            _ => None,
        }
    }

    /// Apply an event, returning the new state.
    pub fn apply(&mut self, event: LinkEvent) -> Result<LinkState, InvalidLinkTransition> {
        let next = match (self.state, event) {
            (LinkState::Idle | LinkState::Failed, LinkEvent::ConnectRequested) => {
                LinkState::Connecting { attempt: 0 }
            }
            (LinkState::Connecting { .. } | LinkState::Reconnecting { .. }, LinkEvent::Opened) => {
                LinkState::Connected
            }
            (LinkState::Connecting { attempt }, LinkEvent::AttemptFailed) => {
                if attempt + 1 >= self.policy.max_attempts {
                    LinkState::Failed
                } else {
                    LinkState::Connecting { attempt: attempt + 1 }
                }
            }
            (LinkState::Reconnecting { attempt }, LinkEvent::AttemptFailed) => {
                if attempt + 1 >= self.policy.max_attempts {
                    LinkState::Failed
                } else {
                    LinkState::Reconnecting { attempt: attempt + 1 }
                }
            }
            (LinkState::Connected, LinkEvent::Lost) => LinkState::Reconnecting { attempt: 0 },
            (from, event) => return Err(InvalidLinkTransition { from, event }),
        };

        self.state = next;
        Ok(next)
    }
}

impl Default for PipelineLink {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}
