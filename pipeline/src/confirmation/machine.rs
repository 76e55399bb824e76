use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::{ConfirmationEvent, ConfirmationProgress, ConfirmationState, ConfirmationStep};
use crate::biometric::BiometricAuthenticator;
use crate::clock::Clock;
use crate::config::PipelineConfig;
use crate::error::{Result, SystemError, VerificationError, VoteError};
use crate::history::{VoteAttempt, VoteHistoryTracker};
use crate::ledger::{SubmissionLedger, SubmissionReceipt, SubmissionRequest};
use crate::utils::random_token;

/// Identity of the voter and device driving one confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterSession {
    pub voter_id: String,
    pub device_id: String,
    /// Ballot position the votes are cast for
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<SubmissionReceipt>> for ConfirmationResult {
    fn from(result: Result<SubmissionReceipt>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                vote_id: Some(receipt.vote_id),
                transaction_hash: Some(receipt.transaction_hash),
                confirmation_id: Some(receipt.confirmation_id),
                message: Some("Vote confirmed successfully".to_string()),
                error: None,
            },
            Err(e) => Self {
                success: false,
                vote_id: None,
                transaction_hash: None,
                confirmation_id: None,
                message: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Drives one vote confirmation: issues the biometric check and the ledger
/// submission, feeding their results into [`ConfirmationState::apply`].
pub struct ConfirmationStateMachine {
    state: Mutex<ConfirmationState>,
    session: VoterSession,
    ledger: SubmissionLedger,
    biometric: Arc<dyn BiometricAuthenticator>,
    history: VoteHistoryTracker,
    clock: Arc<dyn Clock>,
    code_length: usize,
    biometric_prompt: String,
}

impl ConfirmationStateMachine {
    pub fn new(
        session: VoterSession,
        config: &PipelineConfig,
        ledger: SubmissionLedger,
        biometric: Arc<dyn BiometricAuthenticator>,
        history: VoteHistoryTracker,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Mutex::new(ConfirmationState::new(config.max_retries)),
            session,
            ledger,
            biometric,
            history,
            clock,
            code_length: config.code_length,
            biometric_prompt: config.biometric_prompt.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, ConfirmationState> {
        self.state.lock().expect("confirmation mutex poisoned")
    }

    fn dispatch(&self, event: ConfirmationEvent) -> ConfirmationState {
        let mut state = self.state();
        transition(&mut state, event);
        state.clone()
    }

    pub fn session(&self) -> &VoterSession {
        &self.session
    }

    pub fn current_state(&self) -> ConfirmationState {
        self.state().clone()
    }

    pub fn generate_verification_code(&self) -> String {
        let code = random_token(self.code_length);
        self.dispatch(ConfirmationEvent::CodeGenerated(code.clone()));
        code
    }

    /// Runs the biometric capability. A failure leaves the step untouched.
    pub async fn check_biometric(&self) -> Result<()> {
        match self.biometric.authenticate(&self.biometric_prompt).await {
            Ok(auth) => {
                let kind = auth.biometric_type.as_deref().unwrap_or("biometric");
                let token = format!("{}_{}", kind, uuid::Uuid::new_v4().simple());
                self.dispatch(ConfirmationEvent::BiometricChecked(Some(token)));
                Ok(())
            }
            Err(e) => {
                debug!(
                    "Biometric check failed for voter {}: {}",
                    self.session.voter_id, e
                );
                self.dispatch(ConfirmationEvent::BiometricChecked(None));
                Err(VerificationError::Biometric(e.to_string()).into())
            }
        }
    }

    pub async fn verify_biometric(&self) -> bool {
        self.check_biometric().await.is_ok()
    }

    pub async fn confirm_vote(
        &self,
        election_id: &str,
        candidate_id: &str,
        code: &str,
    ) -> ConfirmationResult {
        self.try_confirm_vote(election_id, candidate_id, code)
            .await
            .into()
    }

    /// Every call is appended to the vote history. A wrong code never reaches
    /// the ledger.
    pub async fn try_confirm_vote(
        &self,
        election_id: &str,
        candidate_id: &str,
        code: &str,
    ) -> Result<SubmissionReceipt> {
        let mut attempt = AttemptGuard {
            machine: self,
            election_id,
            candidate_id,
            settled: false,
        };
        let result = self.submit_attempt(election_id, candidate_id, code).await;
        attempt.settled = true;
        self.record_attempt(election_id, candidate_id, &result);
        result
    }

    /// The attempt was dropped while its ledger call was in flight
    fn abandon_attempt(&self, election_id: &str, candidate_id: &str) {
        let err: VoteError = SystemError::Cancelled.into();
        if let Ok(mut state) = self.state.lock() {
            if state.confirmation_step == ConfirmationStep::Processing {
                transition(&mut state, ConfirmationEvent::SubmissionFailed(err.to_string()));
            }
        }
        debug!(
            "Confirmation for voter {} dropped before the ledger answered",
            self.session.voter_id
        );
        self.record_attempt(election_id, candidate_id, &Err(err));
    }

    async fn submit_attempt(
        &self,
        election_id: &str,
        candidate_id: &str,
        code: &str,
    ) -> Result<SubmissionReceipt> {
        let request = {
            let mut state = self.state();
            match state.confirmation_step {
                ConfirmationStep::Processing => return Err(SystemError::InProgress.into()),
                ConfirmationStep::Success => return Err(SystemError::AlreadyConfirmed.into()),
                _ if state.is_frozen() => return Err(SystemError::RetriesExhausted.into()),
                _ => {}
            }

            if state.verification_code.as_deref() != Some(code) {
                transition(&mut state, ConfirmationEvent::CodeRejected);
                return Err(VerificationError::InvalidCode.into());
            }

            let request = SubmissionRequest {
                election_id: election_id.to_string(),
                candidate_id: candidate_id.to_string(),
                voter_id: self.session.voter_id.clone(),
                verification_code: code.to_string(),
                biometric_hash: state.biometric_token.clone().unwrap_or_default(),
                device_id: self.session.device_id.clone(),
                timestamp: self.clock.now(),
                position: self.session.position.clone(),
            };
            transition(&mut state, ConfirmationEvent::SubmissionStarted);
            request
        };

        let result = self.ledger.submit(request).await;

        {
            let mut state = self.state();
            if state.confirmation_step == ConfirmationStep::Processing {
                let event = match &result {
                    Ok(_) => ConfirmationEvent::SubmissionSucceeded,
                    Err(e) => ConfirmationEvent::SubmissionFailed(e.to_string()),
                };
                transition(&mut state, event);
            } else {
                debug!("Confirmation was reset while its submission was in flight");
            }
        }
        result
    }

    fn record_attempt(
        &self,
        election_id: &str,
        candidate_id: &str,
        result: &Result<SubmissionReceipt>,
    ) {
        let (message, vote_id, error) = match result {
            Ok(receipt) => (
                "Vote submitted successfully".to_string(),
                Some(receipt.vote_id.clone()),
                None,
            ),
            Err(e) => (e.to_string(), None, Some(e.to_string())),
        };
        self.history.record(VoteAttempt {
            election_id: election_id.to_string(),
            candidate_id: candidate_id.to_string(),
            success: result.is_ok(),
            message,
            vote_id,
            error,
            timestamp: self.clock.now(),
        });
    }

    pub fn reset_confirmation(&self) {
        self.dispatch(ConfirmationEvent::Reset);
    }

    /// No-op once the retry budget is spent
    pub fn retry_confirmation(&self) {
        self.dispatch(ConfirmationEvent::Retry);
    }

    pub fn get_confirmation_progress(&self) -> ConfirmationProgress {
        self.state().progress()
    }
}

struct AttemptGuard<'a> {
    machine: &'a ConfirmationStateMachine,
    election_id: &'a str,
    candidate_id: &'a str,
    settled: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.machine.abandon_attempt(self.election_id, self.candidate_id);
        }
    }
}

fn transition(state: &mut ConfirmationState, event: ConfirmationEvent) {
    let next = state.apply(event);
    if next.confirmation_step != state.confirmation_step {
        debug!(
            "Confirmation step {:?} -> {:?}",
            state.confirmation_step, next.confirmation_step
        );
    }
    *state = next;
}
