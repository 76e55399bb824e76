//! Application-level entry point, built once at startup and shared with the UI layer

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::biometric::BiometricAuthenticator;
use crate::clock::{Clock, SystemClock};
use crate::confirmation::{ConfirmationResult, ConfirmationStateMachine, VoterSession};
use crate::config::PipelineConfig;
use crate::election::{Candidate, Election};
use crate::eligibility::{Eligibility, EligibilityValidator};
use crate::error::{Result, VoteError};
use crate::history::{VoteAttempt, VoteHistoryTracker, VotingProgress};
use crate::ledger::{SubmissionLedger, SubmissionReceipt};
use crate::transport::VoteTransport;

pub type VoteResponse = ConfirmationResult;

pub struct VotingService {
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
    ledger: SubmissionLedger,
    history: VoteHistoryTracker,
    validator: EligibilityValidator,
    biometric: Arc<dyn BiometricAuthenticator>,
    /// Time of each voter's last confirmed vote, for the cooldown check
    last_attempts: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl VotingService {
    pub fn new(
        config: PipelineConfig,
        transport: Arc<dyn VoteTransport>,
        biometric: Arc<dyn BiometricAuthenticator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = SubmissionLedger::new(&config, transport, clock.clone());
        let validator = EligibilityValidator::new(clock.clone(), config.cooldown);
        info!(
            "Voting service initialized (cooldown={}s, expiry={}s, max_retries={})",
            config.cooldown.num_seconds(),
            config.expiry_window.num_seconds(),
            config.max_retries
        );
        Self {
            config,
            clock,
            ledger,
            history: VoteHistoryTracker::new(),
            validator,
            biometric,
            last_attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration from the environment and the system clock
    pub fn from_env(
        transport: Arc<dyn VoteTransport>,
        biometric: Arc<dyn BiometricAuthenticator>,
    ) -> Self {
        Self::new(PipelineConfig::from_env(), transport, biometric, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    pub fn history(&self) -> &VoteHistoryTracker {
        &self.history
    }

    pub fn validate(
        &self,
        election: &Election,
        candidate: &Candidate,
        last_attempt_at: Option<DateTime<Utc>>,
    ) -> Eligibility {
        self.validator.validate(election, candidate, last_attempt_at)
    }

    pub fn last_attempt_at(&self, voter_id: &str) -> Option<DateTime<Utc>> {
        self.last_attempts
            .lock()
            .expect("last attempts mutex poisoned")
            .get(voter_id)
            .copied()
    }

    /// New confirmation flow for one voter, sharing this service's ledger and history
    pub fn confirmation(&self, session: VoterSession) -> ConfirmationStateMachine {
        ConfirmationStateMachine::new(
            session,
            &self.config,
            self.ledger.clone(),
            self.biometric.clone(),
            self.history.clone(),
            self.clock.clone(),
        )
    }

    pub async fn cast_vote(
        &self,
        election: &Election,
        candidate_id: &str,
        confirmation: &ConfirmationStateMachine,
        code: &str,
    ) -> VoteResponse {
        self.try_cast_vote(election, candidate_id, confirmation, code)
            .await
            .into()
    }

    /// Eligibility gate followed by [`ConfirmationStateMachine::try_confirm_vote`].
    pub async fn try_cast_vote(
        &self,
        election: &Election,
        candidate_id: &str,
        confirmation: &ConfirmationStateMachine,
        code: &str,
    ) -> Result<SubmissionReceipt> {
        let voter_id = confirmation.session().voter_id.clone();
        // Unknown ids still go through the validator so the election window is reported first
        let candidate = election
            .candidate(candidate_id)
            .cloned()
            .unwrap_or_else(|| Candidate::new(candidate_id, ""));

        if let Err(e) = self
            .validator
            .check(election, &candidate, self.last_attempt_at(&voter_id))
        {
            debug!("Voter {} not eligible: {}", voter_id, e);
            let err = VoteError::from(e);
            self.history.record(VoteAttempt {
                election_id: election.id.clone(),
                candidate_id: candidate_id.to_string(),
                success: false,
                message: err.to_string(),
                vote_id: None,
                error: Some(err.to_string()),
                timestamp: self.clock.now(),
            });
            return Err(err);
        }

        let result = confirmation
            .try_confirm_vote(&election.id, candidate_id, code)
            .await;
        if result.is_ok() {
            self.last_attempts
                .lock()
                .expect("last attempts mutex poisoned")
                .insert(voter_id, self.clock.now());
        }
        result
    }

    pub fn get_voting_progress(&self, election: &Election) -> VotingProgress {
        self.history.get_voting_progress(election)
    }

    pub fn shutdown(&self) {
        self.ledger.shutdown();
        info!("Voting service shut down");
    }
}
