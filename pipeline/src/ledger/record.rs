use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VoteError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub election_id: String,
    pub candidate_id: String,
    pub voter_id: String,
    pub verification_code: String,
    pub biometric_hash: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub position: String,
}

impl SubmissionRequest {
    /// Names of the string fields that are empty or whitespace
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("electionId", &self.election_id),
            ("candidateId", &self.candidate_id),
            ("voterId", &self.voter_id),
            ("verificationCode", &self.verification_code),
            ("biometricHash", &self.biometric_hash),
            ("deviceId", &self.device_id),
            ("position", &self.position),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Processing,
    Confirmed,
    Failed,
    Rejected,
    Cancelled,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 6] = [
        SubmissionStatus::Pending,
        SubmissionStatus::Processing,
        SubmissionStatus::Confirmed,
        SubmissionStatus::Failed,
        SubmissionStatus::Rejected,
        SubmissionStatus::Cancelled,
    ];

    pub fn is_in_flight(self) -> bool {
        matches!(self, SubmissionStatus::Pending | SubmissionStatus::Processing)
    }

    /// Statuses that block another vote by the same voter in the same election
    pub fn holds_vote(self) -> bool {
        self.is_in_flight() || self == SubmissionStatus::Confirmed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Processing => "processing",
            SubmissionStatus::Confirmed => "confirmed",
            SubmissionStatus::Failed => "failed",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub vote_id: String,
    pub status: SubmissionStatus,
    pub transaction_hash: Option<String>,
    pub block_number: Option<u64>,
    pub confirmation_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request: SubmissionRequest,
}

impl SubmissionRecord {
    pub(crate) fn pending(vote_id: String, request: SubmissionRequest, now: DateTime<Utc>) -> Self {
        Self {
            vote_id,
            status: SubmissionStatus::Pending,
            transaction_hash: None,
            block_number: None,
            confirmation_id: None,
            error: None,
            created_at: now,
            updated_at: now,
            request,
        }
    }
}

/// Identifiers of a confirmed vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub vote_id: String,
    pub transaction_hash: String,
    pub block_number: u64,
    pub confirmation_id: String,
}

/// Flat `submit` result for the UI bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<SubmissionReceipt, VoteError>> for SubmitResponse {
    fn from(result: Result<SubmissionReceipt, VoteError>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                vote_id: Some(receipt.vote_id),
                transaction_hash: Some(receipt.transaction_hash),
                block_number: Some(receipt.block_number),
                confirmation_id: Some(receipt.confirmation_id),
                message: Some("Vote submitted successfully".to_string()),
                error: None,
            },
            Err(e) => Self {
                success: false,
                vote_id: None,
                transaction_hash: None,
                block_number: None,
                confirmation_id: None,
                message: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Record counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStatistics {
    pub pending: usize,
    pub processing: usize,
    pub confirmed: usize,
    pub failed: usize,
    pub rejected: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl SubmissionStatistics {
    pub(crate) fn count(&mut self, status: SubmissionStatus) {
        let bucket = match status {
            SubmissionStatus::Pending => &mut self.pending,
            SubmissionStatus::Processing => &mut self.processing,
            SubmissionStatus::Confirmed => &mut self.confirmed,
            SubmissionStatus::Failed => &mut self.failed,
            SubmissionStatus::Rejected => &mut self.rejected,
            SubmissionStatus::Cancelled => &mut self.cancelled,
        };
        *bucket += 1;
        self.total += 1;
    }

    pub fn get(&self, status: SubmissionStatus) -> usize {
        match status {
            SubmissionStatus::Pending => self.pending,
            SubmissionStatus::Processing => self.processing,
            SubmissionStatus::Confirmed => self.confirmed,
            SubmissionStatus::Failed => self.failed,
            SubmissionStatus::Rejected => self.rejected,
            SubmissionStatus::Cancelled => self.cancelled,
        }
    }
}
