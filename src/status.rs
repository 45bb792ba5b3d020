//! Per-operation lifecycle: idle → running → succeeded | failed → idle.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::OutcomeError;
use crate::types::Outcome;

/// Messages rotated while an update is being generated.
pub const PROGRESS_MESSAGES: [&str; 9] = [
    "Connecting to lovable.dev...",
    "Fetching project changes...",
    "Tracking feature updates...",
    "Analyzing timeline shifts...",
    "Mapping dependencies...",
    "Assessing risk indicators...",
    "Generating summary report...",
    "Compiling action items...",
    "Finalizing roadmap update...",
];

/// Seconds each progress message stays up.
pub const PROGRESS_ROTATION_SECS: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationStatus {
    #[default]
    Idle,
    Running {
        #[serde(rename = "startedAt")]
        started_at: DateTime<Utc>,
    },
    Succeeded {
        #[serde(rename = "finishedAt")]
        finished_at: DateTime<Utc>,
        message: String,
    },
    Failed {
        #[serde(rename = "finishedAt")]
        finished_at: DateTime<Utc>,
        error: OutcomeError,
    },
}

impl OperationStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OperationStatus::Running { .. })
    }

    /// Progress line for a running operation at `now`.
    pub fn progress_message(&self, now: DateTime<Utc>) -> Option<&'static str> {
        match self {
            OperationStatus::Running { started_at } => {
                let ticks = (now - *started_at).num_seconds().max(0) / PROGRESS_ROTATION_SECS;
                Some(PROGRESS_MESSAGES[ticks as usize % PROGRESS_MESSAGES.len()])
            }
            _ => None,
        }
    }

    fn settled(outcome: &Outcome) -> Self {
        let finished_at = Utc::now();
        match outcome {
            Outcome::Success { message } => OperationStatus::Succeeded {
                finished_at,
                message: message.clone(),
            },
            Outcome::Failure { error } => OperationStatus::Failed {
                finished_at,
                error: error.clone(),
            },
        }
    }
}

/// Marks a status slot as running for the lifetime of an operation.
///
/// `settle` records the outcome. If the guard is dropped unsettled (the
/// future was dropped or panicked) the slot goes back to idle, so the flag is
/// always cleared on the way out.
pub struct InFlight<'a> {
    slot: &'a Mutex<OperationStatus>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    pub fn begin(slot: &'a Mutex<OperationStatus>) -> Self {
        let mut guard = slot.lock();
        if guard.is_in_flight() {
            log::warn!("Operation re-entered while still in flight");
        }
        *guard = OperationStatus::Running {
            started_at: Utc::now(),
        };
        drop(guard);
        Self {
            slot,
            settled: false,
        }
    }

    pub fn settle(mut self, outcome: &Outcome) {
        *self.slot.lock() = OperationStatus::settled(outcome);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.slot.lock() = OperationStatus::Idle;
        }
    }
}
