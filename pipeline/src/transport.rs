//! Network round-trip that persists a vote server-side

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::ledger::SubmissionRequest;
use crate::utils::random_token;

/// What the backend returns once a vote is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub confirmation_id: String,
}

#[derive(Error, Debug)]
pub enum TransportError {
    /// Backend refused the vote
    #[error("{0}")]
    Rejected(String),
    #[error("cancelled")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Flips to `true` when the ledger wants the call abandoned. Honouring it is optional.
pub type CancelSignal = watch::Receiver<bool>;

#[async_trait]
pub trait VoteTransport: Send + Sync {
    async fn perform_submission(
        &self,
        request: &SubmissionRequest,
        cancel: CancelSignal,
    ) -> Result<TransactionReceipt, TransportError>;
}

/// In-process stand-in for the vote backend
#[derive(Clone, Debug, Default)]
pub struct SimulatedTransport {
    latency: Duration,
    failure_rate: f64,
    reject_reason: Option<String>,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Probability in `[0, 1]` that a call fails with a network error
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.reject_reason = Some(reason.into());
        self
    }
}

pub fn simulated_receipt() -> TransactionReceipt {
    let mut rng = rand::thread_rng();
    let hash_bytes: [u8; 32] = rng.gen();
    TransactionReceipt {
        transaction_hash: format!("0x{}", hex::encode(hash_bytes)),
        block_number: rng.gen_range(1_000_000..10_000_000),
        confirmation_id: format!("CONF-{}", random_token(10)),
    }
}

#[async_trait]
impl VoteTransport for SimulatedTransport {
    async fn perform_submission(
        &self,
        request: &SubmissionRequest,
        mut cancel: CancelSignal,
    ) -> Result<TransactionReceipt, TransportError> {
        debug!(
            "Simulated transport submitting vote for election {}",
            request.election_id
        );

        if !self.latency.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.latency) => {}
                Ok(_) = cancel.wait_for(|cancelled| *cancelled) => {
                    return Err(TransportError::Cancelled);
                }
            }
        }

        if let Some(reason) = &self.reject_reason {
            return Err(TransportError::Rejected(reason.clone()));
        }

        if self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate) {
            return Err(anyhow::anyhow!("network request timed out").into());
        }

        Ok(simulated_receipt())
    }
}
