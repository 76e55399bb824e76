use std::collections::HashMap;

use serde_json::json;

use crate::error::{RequestError, SystemError, VerificationError, VoteError};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SubmitOutcome {
    Confirmed,
    MissingFields,
    InvalidCode,
    Expired,
    Duplicate,
    Failed,
    Rejected,
    Cancelled,
    ShutDown,
}

impl SubmitOutcome {
    pub fn label(self) -> &'static str {
        match self {
            SubmitOutcome::Confirmed => "confirmed",
            SubmitOutcome::MissingFields => "missing_fields",
            SubmitOutcome::InvalidCode => "invalid_code",
            SubmitOutcome::Expired => "expired",
            SubmitOutcome::Duplicate => "duplicate",
            SubmitOutcome::Failed => "failed",
            SubmitOutcome::Rejected => "rejected",
            SubmitOutcome::Cancelled => "cancelled",
            SubmitOutcome::ShutDown => "shut_down",
        }
    }
}

impl From<&VoteError> for SubmitOutcome {
    fn from(err: &VoteError) -> Self {
        match err {
            VoteError::Request(RequestError::MissingFields) => SubmitOutcome::MissingFields,
            VoteError::Request(RequestError::Expired) => SubmitOutcome::Expired,
            VoteError::Request(RequestError::Duplicate) => SubmitOutcome::Duplicate,
            VoteError::Verification(VerificationError::InvalidCode) => SubmitOutcome::InvalidCode,
            VoteError::System(SystemError::Rejected(_)) => SubmitOutcome::Rejected,
            VoteError::System(SystemError::Cancelled) => SubmitOutcome::Cancelled,
            VoteError::System(SystemError::ShutDown) => SubmitOutcome::ShutDown,
            _ => SubmitOutcome::Failed,
        }
    }
}

/// Outcome counters for every `submit` call, including ones refused before a record exists
#[derive(Debug, Default)]
pub struct Metrics {
    submit_total: HashMap<SubmitOutcome, u64>,
}

impl Metrics {
    pub fn record(&mut self, outcome: SubmitOutcome) {
        *self.submit_total.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: SubmitOutcome) -> u64 {
        self.submit_total.get(&outcome).copied().unwrap_or(0)
    }

    pub fn snapshot_as_json(&self) -> serde_json::Value {
        let mut submits: Vec<serde_json::Value> = self
            .submit_total
            .iter()
            .map(|(outcome, count)| {
                json!({
                    "outcome": outcome.label(),
                    "count": count
                })
            })
            .collect();
        submits.sort_by(|a, b| a["outcome"].as_str().cmp(&b["outcome"].as_str()));

        json!({
            "submit_total": submits,
            "submit_count": self.submit_total.values().sum::<u64>(),
        })
    }
}
