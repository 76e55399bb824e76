use serde::{Deserialize, Serialize};

use crate::error::VerificationError;

pub const TOTAL_STEPS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStep {
    Verify,
    Biometric,
    Processing,
    Success,
    Error,
}

impl ConfirmationStep {
    /// (step number, percent). Error reports the processing level.
    pub fn progress(self) -> (u8, u8) {
        match self {
            ConfirmationStep::Verify => (1, 25),
            ConfirmationStep::Biometric => (2, 50),
            ConfirmationStep::Processing => (3, 75),
            ConfirmationStep::Success => (4, 100),
            ConfirmationStep::Error => (3, 75),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationProgress {
    pub step: u8,
    pub total_steps: u8,
    pub progress: u8,
}

/// Inputs to the confirmation state machine. Side effects happen outside;
/// their results come back in as events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationEvent {
    CodeGenerated(String),
    /// `Some(token)` on a successful biometric check
    BiometricChecked(Option<String>),
    SubmissionStarted,
    CodeRejected,
    SubmissionSucceeded,
    SubmissionFailed(String),
    Retry,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationState {
    pub verification_code: Option<String>,
    pub biometric_verified: bool,
    /// Proof of the last successful biometric check, sent as the request's biometric hash
    #[serde(skip)]
    pub biometric_token: Option<String>,
    pub confirmation_step: ConfirmationStep,
    pub error: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl ConfirmationState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            verification_code: None,
            biometric_verified: false,
            biometric_token: None,
            confirmation_step: ConfirmationStep::Verify,
            error: None,
            retry_count: 0,
            max_retries,
        }
    }

    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Stuck in error until an explicit reset
    pub fn is_frozen(&self) -> bool {
        self.confirmation_step == ConfirmationStep::Error && !self.can_retry()
    }

    pub fn progress(&self) -> ConfirmationProgress {
        let (step, progress) = self.confirmation_step.progress();
        ConfirmationProgress {
            step,
            total_steps: TOTAL_STEPS,
            progress,
        }
    }

    /// Pure transition function. Events that make no sense in the current
    /// step leave the state unchanged.
    pub fn apply(&self, event: ConfirmationEvent) -> Self {
        use ConfirmationEvent::*;
        use ConfirmationStep::*;

        let mut next = self.clone();
        match (self.confirmation_step, event) {
            (_, Reset) => return Self::new(self.max_retries),

            (Verify | Biometric, CodeGenerated(code)) => {
                next.verification_code = Some(code);
                next.error = None;
            }
            (Error, CodeGenerated(code)) if self.can_retry() => {
                next.clear_attempt();
                next.verification_code = Some(code);
            }

            (Verify | Biometric, BiometricChecked(token)) => {
                next.biometric_verified = token.is_some();
                if token.is_some() && self.confirmation_step == Verify {
                    next.confirmation_step = Biometric;
                }
                next.biometric_token = token;
            }

            (Verify | Biometric | Error, SubmissionStarted) => {
                next.confirmation_step = Processing;
                next.verification_code = None;
                next.error = None;
            }
            (Verify | Biometric | Error, CodeRejected) => {
                next.fail(VerificationError::InvalidCode.to_string());
            }

            (Processing, SubmissionSucceeded) => {
                next.confirmation_step = Success;
                next.retry_count = 0;
                next.error = None;
            }
            (Processing, SubmissionFailed(message)) => next.fail(message),

            (Verify | Biometric | Error, Retry) if self.can_retry() => next.clear_attempt(),

            _ => {}
        }
        next
    }

    fn fail(&mut self, message: String) {
        self.confirmation_step = ConfirmationStep::Error;
        self.error = Some(message);
        self.retry_count = self.retry_count.saturating_add(1);
    }

    fn clear_attempt(&mut self) {
        self.confirmation_step = ConfirmationStep::Verify;
        self.error = None;
        self.biometric_verified = false;
        self.biometric_token = None;
        self.verification_code = None;
    }
}
