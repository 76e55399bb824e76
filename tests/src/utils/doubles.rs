use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use vote_pipeline::{
    simulated_receipt, BiometricAuthentication, BiometricAuthenticator, BiometricError,
    CancelSignal, SubmissionRequest, TransactionReceipt, TransportError, VoteTransport,
};

/// Next answer of a [`ScriptedTransport`]
#[derive(Clone, Debug)]
pub enum Scripted {
    Confirm,
    Reject(String),
    Fail(String),
    /// Stays in flight until the ledger signals cancellation
    HoldUntilCancelled,
}

/// Plays back queued answers in order, confirming once the queue is empty
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SubmissionRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SubmissionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoteTransport for ScriptedTransport {
    async fn perform_submission(
        &self,
        request: &SubmissionRequest,
        mut cancel: CancelSignal,
    ) -> Result<TransactionReceipt, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Confirm);

        match step {
            Scripted::Confirm => Ok(simulated_receipt()),
            Scripted::Reject(reason) => Err(TransportError::Rejected(reason)),
            Scripted::Fail(message) => Err(anyhow::anyhow!(message).into()),
            Scripted::HoldUntilCancelled => {
                let _ = cancel.wait_for(|cancelled| *cancelled).await;
                Err(TransportError::Cancelled)
            }
        }
    }
}

/// Plays back queued biometric outcomes, approving with `face` once empty
#[derive(Default)]
pub struct ScriptedBiometric {
    script: Mutex<VecDeque<Result<BiometricAuthentication, BiometricError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBiometric {
    pub fn push_failure(&self, error: BiometricError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BiometricAuthenticator for ScriptedBiometric {
    async fn authenticate(&self, prompt: &str) -> Result<BiometricAuthentication, BiometricError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(BiometricAuthentication {
            biometric_type: Some("face".to_string()),
        }))
    }
}
