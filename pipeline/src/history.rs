//! Append-only log of vote attempt outcomes

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::election::Election;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteAttempt {
    pub election_id: String,
    pub candidate_id: String,
    pub success: bool,
    pub message: String,
    pub vote_id: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingProgress {
    pub total_votes: u64,
    pub user_voted: bool,
    pub progress: u8,
}

/// Cloneable handle; clones append to the same log
#[derive(Clone, Debug, Default)]
pub struct VoteHistoryTracker {
    attempts: Arc<Mutex<Vec<VoteAttempt>>>,
}

impl VoteHistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn attempts(&self) -> MutexGuard<'_, Vec<VoteAttempt>> {
        self.attempts.lock().expect("history mutex poisoned")
    }

    pub fn record(&self, attempt: VoteAttempt) {
        self.attempts().push(attempt);
    }

    pub fn get_vote_history(&self) -> Vec<VoteAttempt> {
        self.attempts().clone()
    }

    pub fn clear_vote_history(&self) {
        self.attempts().clear();
    }

    pub fn get_voting_progress(&self, election: &Election) -> VotingProgress {
        let user_voted = self
            .attempts()
            .iter()
            .any(|a| a.success && a.election_id == election.id);
        VotingProgress {
            total_votes: election.total_votes(),
            user_voted,
            progress: if user_voted { 100 } else { 0 },
        }
    }
}
