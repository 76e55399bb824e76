//! Biometric capability consumed by the confirmation flow

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricAuthentication {
    pub biometric_type: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BiometricError {
    #[error("biometric hardware not available")]
    Unavailable,
    #[error("user cancelled authentication")]
    UserCancelled,
    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    async fn authenticate(&self, prompt: &str) -> Result<BiometricAuthentication, BiometricError>;
}

/// Answers every prompt the same way
#[derive(Clone, Debug)]
pub struct SimulatedBiometric {
    outcome: Result<BiometricAuthentication, BiometricError>,
}

impl SimulatedBiometric {
    pub fn approving(biometric_type: impl Into<String>) -> Self {
        Self {
            outcome: Ok(BiometricAuthentication {
                biometric_type: Some(biometric_type.into()),
            }),
        }
    }

    pub fn failing(error: BiometricError) -> Self {
        Self { outcome: Err(error) }
    }
}

#[async_trait]
impl BiometricAuthenticator for SimulatedBiometric {
    async fn authenticate(&self, _prompt: &str) -> Result<BiometricAuthentication, BiometricError> {
        self.outcome.clone()
    }
}
