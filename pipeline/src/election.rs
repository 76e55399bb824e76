//! Election data as received from the backend. Read-only for the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectionStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub party: Option<String>,
    pub party_acronym: Option<String>,
    /// Display only, never used for decisions
    #[serde(default)]
    pub vote_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: String,
    pub title: String,
    pub status: ElectionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Candidates in ballot order
    pub contestants: Vec<Candidate>,
}

impl Election {
    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.contestants.iter().find(|c| c.id == candidate_id)
    }

    pub fn has_contestant(&self, candidate_id: &str) -> bool {
        self.candidate(candidate_id).is_some()
    }

    pub fn total_votes(&self) -> u64 {
        self.contestants.iter().map(|c| c.vote_count).sum()
    }
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            party: None,
            party_acronym: None,
            vote_count: 0,
        }
    }
}
