//! Submission ledger: bookkeeping for every accepted vote attempt.
//!
//! One ledger is built at startup and shared by cloning the handle. Records
//! live in memory for the life of the process and are only removed by an
//! explicit [`SubmissionLedger::clear_old_submissions`] call.

pub mod metrics;
pub mod record;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use metrics::{Metrics, SubmitOutcome};
pub use record::*;

use crate::clock::Clock;
use crate::config::PipelineConfig;
use crate::error::{RequestError, Result, SystemError, VerificationError, VoteError};
use crate::transport::{CancelSignal, TransactionReceipt, TransportError, VoteTransport};

/// (voter_id, election_id)
type VoteKey = (String, String);

#[derive(Default)]
struct LedgerState {
    records: HashMap<String, SubmissionRecord>,
    /// Latest vote id per voter and election, used to refuse a second vote.
    /// Entries of evicted confirmed votes stay behind without a record.
    votes_by_voter: HashMap<VoteKey, String>,
    cancel_signals: HashMap<String, watch::Sender<bool>>,
    metrics: Metrics,
    shut_down: bool,
}

impl LedgerState {
    fn refuse(&mut self, err: VoteError) -> VoteError {
        self.metrics.record(SubmitOutcome::from(&err));
        err
    }

    fn holds_vote(&self, key: &VoteKey) -> bool {
        self.votes_by_voter
            .get(key)
            .is_some_and(|vote_id| match self.records.get(vote_id) {
                Some(record) => record.status.holds_vote(),
                None => true,
            })
    }
}

/// Fails the record if its submit call is dropped before the transport returns
struct SettleGuard<'a> {
    ledger: &'a SubmissionLedger,
    vote_id: &'a str,
    armed: bool,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ledger.abandon(self.vote_id);
        }
    }
}

#[derive(Clone)]
pub struct SubmissionLedger {
    inner: Arc<Mutex<LedgerState>>,
    transport: Arc<dyn VoteTransport>,
    clock: Arc<dyn Clock>,
    expiry_window: Duration,
    invalid_code_sentinel: String,
}

impl SubmissionLedger {
    pub fn new(
        config: &PipelineConfig,
        transport: Arc<dyn VoteTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState::default())),
            transport,
            clock,
            expiry_window: config.expiry_window,
            invalid_code_sentinel: config.invalid_code_sentinel.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.lock().expect("ledger mutex poisoned")
    }

    /// Validate, record and confirm a vote.
    ///
    /// Structural, code and freshness failures return before any record is
    /// created. Once a record exists its status always reaches a final value,
    /// including when this future is dropped or the transport panics.
    pub async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionReceipt> {
        let (vote_id, cancel) = self.admit(&request)?;

        {
            let now = self.clock.now();
            let mut guard = self.state();
            let state = &mut *guard;
            let started = match state.records.get_mut(&vote_id) {
                Some(record) if record.status == SubmissionStatus::Pending => {
                    record.status = SubmissionStatus::Processing;
                    record.updated_at = now;
                    true
                }
                _ => false,
            };
            if !started {
                state.cancel_signals.remove(&vote_id);
                return Err(state.refuse(SystemError::Cancelled.into()));
            }
        }

        let mut settle_guard = SettleGuard {
            ledger: self,
            vote_id: &vote_id,
            armed: true,
        };
        let result = self.transport.perform_submission(&request, cancel).await;
        settle_guard.armed = false;
        self.settle(&vote_id, result)
    }

    /// Settles a record whose transport call never returned a result
    fn abandon(&self, vote_id: &str) {
        let now = self.clock.now();
        let Ok(mut guard) = self.inner.lock() else {
            return;
        };
        let state = &mut *guard;
        state.cancel_signals.remove(vote_id);

        if let Some(record) = state.records.get_mut(vote_id) {
            if record.status.is_in_flight() {
                record.status = SubmissionStatus::Failed;
                record.error =
                    Some("Submission abandoned before the transport returned".to_string());
                record.updated_at = now;
                state.metrics.record(SubmitOutcome::Failed);
                warn!("Submission {} abandoned while in flight", vote_id);
            }
        }
    }

    fn check_request(&self, request: &SubmissionRequest, now: DateTime<Utc>) -> Result<()> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            debug!("Submission missing fields: {}", missing.join(", "));
            return Err(RequestError::MissingFields.into());
        }
        if request.verification_code == self.invalid_code_sentinel {
            return Err(VerificationError::InvalidCode.into());
        }
        if now - request.timestamp > self.expiry_window {
            debug!(
                "Submission for election {} is stale (timestamp {})",
                request.election_id, request.timestamp
            );
            return Err(RequestError::Expired.into());
        }
        Ok(())
    }

    /// Checks the request and inserts a pending record under one lock, so two
    /// concurrent requests for the same voter and election cannot both pass.
    fn admit(&self, request: &SubmissionRequest) -> Result<(String, CancelSignal)> {
        let now = self.clock.now();
        let mut state = self.state();

        if state.shut_down {
            return Err(state.refuse(SystemError::ShutDown.into()));
        }
        if let Err(e) = self.check_request(request, now) {
            return Err(state.refuse(e));
        }

        let key = (request.voter_id.clone(), request.election_id.clone());
        if state.holds_vote(&key) {
            debug!(
                "Voter {} already holds a vote in election {}",
                request.voter_id, request.election_id
            );
            return Err(state.refuse(RequestError::Duplicate.into()));
        }

        let vote_id = format!("vote_{}", uuid::Uuid::new_v4().simple());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        state.records.insert(
            vote_id.clone(),
            SubmissionRecord::pending(vote_id.clone(), request.clone(), now),
        );
        state.votes_by_voter.insert(key, vote_id.clone());
        state.cancel_signals.insert(vote_id.clone(), cancel_tx);

        info!(
            "Accepted submission {} for election {}",
            vote_id, request.election_id
        );
        Ok((vote_id, cancel_rx))
    }

    fn settle(
        &self,
        vote_id: &str,
        result: std::result::Result<TransactionReceipt, TransportError>,
    ) -> Result<SubmissionReceipt> {
        let now = self.clock.now();
        let mut guard = self.state();
        let state = &mut *guard;
        state.cancel_signals.remove(vote_id);

        // Evicted or cancelled records keep their bookkeeping; the late result is dropped
        let outcome = match state.records.get_mut(vote_id) {
            Some(record) if record.status != SubmissionStatus::Cancelled => {
                record.updated_at = now;
                apply_transport_result(record, result)
            }
            _ => {
                debug!("Discarding transport result for cancelled submission {}", vote_id);
                Err(SystemError::Cancelled.into())
            }
        };

        match &outcome {
            Ok(_) => state.metrics.record(SubmitOutcome::Confirmed),
            Err(e) => state.metrics.record(SubmitOutcome::from(e)),
        }
        outcome
    }

    pub fn get_submission_status(&self, vote_id: &str) -> Option<SubmissionRecord> {
        self.state().records.get(vote_id).cloned()
    }

    /// Records still pending or processing, oldest first
    pub fn get_pending_submissions(&self) -> Vec<SubmissionRecord> {
        let mut pending: Vec<SubmissionRecord> = self
            .state()
            .records
            .values()
            .filter(|r| r.status.is_in_flight())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending
    }

    /// Marks an in-flight record cancelled and signals its transport call.
    /// The call itself may still complete; its result is then discarded.
    pub fn cancel_submission(&self, vote_id: &str) -> bool {
        let now = self.clock.now();
        let mut guard = self.state();
        let state = &mut *guard;

        match state.records.get_mut(vote_id) {
            Some(record) if record.status.is_in_flight() => {
                record.status = SubmissionStatus::Cancelled;
                record.updated_at = now;
                if let Some(signal) = state.cancel_signals.get(vote_id) {
                    let _ = signal.send(true);
                }
                info!("Submission {} cancelled", vote_id);
                true
            }
            _ => false,
        }
    }

    pub fn get_statistics(&self) -> SubmissionStatistics {
        let state = self.state();
        let mut stats = SubmissionStatistics::default();
        for record in state.records.values() {
            stats.count(record.status);
        }
        stats
    }

    /// Evicts settled records created more than `max_age` ago and returns how
    /// many were removed. In-flight records are kept until their submit call
    /// settles them. An evicted confirmed vote keeps its index entry, so the
    /// voter still cannot vote twice in that election.
    pub fn clear_old_submissions(&self, max_age: Duration) -> usize {
        let cutoff = self.clock.now() - max_age;
        let mut guard = self.state();
        let state = &mut *guard;

        let before = state.records.len();
        let mut released = HashSet::new();
        state.records.retain(|vote_id, r| {
            let keep = r.status.is_in_flight() || r.created_at >= cutoff;
            if !keep && r.status != SubmissionStatus::Confirmed {
                released.insert(vote_id.clone());
            }
            keep
        });
        state
            .votes_by_voter
            .retain(|_, vote_id| !released.contains(vote_id));

        let removed = before - state.records.len();
        if removed > 0 {
            info!("Cleared {} old submissions", removed);
        }
        removed
    }

    pub fn metrics(&self) -> serde_json::Value {
        self.state().metrics.snapshot_as_json()
    }

    /// Refuse new submissions and signal every in-flight transport call.
    pub fn shutdown(&self) {
        let mut state = self.state();
        if state.shut_down {
            return;
        }
        state.shut_down = true;
        for signal in state.cancel_signals.values() {
            let _ = signal.send(true);
        }
        info!(
            "Submission ledger shut down with {} in-flight submissions",
            state.cancel_signals.len()
        );
    }

    pub fn is_shut_down(&self) -> bool {
        self.state().shut_down
    }
}

fn apply_transport_result(
    record: &mut SubmissionRecord,
    result: std::result::Result<TransactionReceipt, TransportError>,
) -> Result<SubmissionReceipt> {
    match result {
        Ok(receipt) => {
            record.status = SubmissionStatus::Confirmed;
            record.transaction_hash = Some(receipt.transaction_hash.clone());
            record.block_number = Some(receipt.block_number);
            record.confirmation_id = Some(receipt.confirmation_id.clone());
            info!(
                "Submission {} confirmed in block {}",
                record.vote_id, receipt.block_number
            );
            Ok(SubmissionReceipt {
                vote_id: record.vote_id.clone(),
                transaction_hash: receipt.transaction_hash,
                block_number: receipt.block_number,
                confirmation_id: receipt.confirmation_id,
            })
        }
        Err(TransportError::Rejected(reason)) => {
            record.status = SubmissionStatus::Rejected;
            record.error = Some(reason.clone());
            warn!("Submission {} rejected: {}", record.vote_id, reason);
            Err(SystemError::Rejected(reason).into())
        }
        Err(TransportError::Cancelled) => {
            record.status = SubmissionStatus::Cancelled;
            Err(SystemError::Cancelled.into())
        }
        Err(TransportError::Other(e)) => {
            record.status = SubmissionStatus::Failed;
            record.error = Some(e.to_string());
            warn!("Submission {} failed: {:#}", record.vote_id, e);
            Err(SystemError::Transport(e.to_string()).into())
        }
    }
}
