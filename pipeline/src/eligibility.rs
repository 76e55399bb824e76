//! Eligibility gate run before a vote is confirmed

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::election::{Candidate, Election, ElectionStatus};
use crate::error::ValidationError;

/// Result handed to the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<(), ValidationError>> for Eligibility {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                message: None,
            },
            Err(e) => Self {
                valid: false,
                message: Some(e.to_string()),
            },
        }
    }
}

#[derive(Clone)]
pub struct EligibilityValidator {
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl EligibilityValidator {
    pub fn new(clock: Arc<dyn Clock>, cooldown: Duration) -> Self {
        Self { clock, cooldown }
    }

    pub fn validate(
        &self,
        election: &Election,
        candidate: &Candidate,
        last_attempt_at: Option<DateTime<Utc>>,
    ) -> Eligibility {
        self.check(election, candidate, last_attempt_at).into()
    }

    /// Checks run in order: election window, candidate membership, cooldown.
    pub fn check(
        &self,
        election: &Election,
        candidate: &Candidate,
        last_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<(), ValidationError> {
        let now = self.clock.now();

        if election.status != ElectionStatus::Ongoing {
            let reason = if now < election.start_date {
                ValidationError::NotStarted
            } else if now > election.end_date {
                ValidationError::Ended
            } else {
                ValidationError::NotActive
            };
            debug!(
                "Election {} is {:?}, rejecting vote: {}",
                election.id, election.status, reason
            );
            return Err(reason);
        }

        if !election.has_contestant(&candidate.id) {
            debug!(
                "Candidate {} is not a contestant in election {}",
                candidate.id, election.id
            );
            return Err(ValidationError::InvalidCandidate);
        }

        if let Some(last) = last_attempt_at {
            if now - last < self.cooldown {
                debug!("Cooldown active, last attempt at {}", last);
                return Err(ValidationError::Cooldown);
            }
        }

        Ok(())
    }
}
