//! Pipeline configuration

use chrono::Duration;

use crate::utils::env_parse;

/// Default minimum gap between two voting attempts in one session (5 minutes)
pub const DEFAULT_COOLDOWN_SECS: i64 = 300;

/// Default maximum age of a submission request (5 minutes)
pub const DEFAULT_EXPIRY_SECS: i64 = 300;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Code value the ledger always treats as invalid
pub const DEFAULT_INVALID_CODE_SENTINEL: &str = "INVALID";

pub const DEFAULT_BIOMETRIC_PROMPT: &str = "Authenticate to cast your vote";

pub const ENV_COOLDOWN_SECS: &str = "VOTE_COOLDOWN_SECS";
pub const ENV_EXPIRY_SECS: &str = "SUBMISSION_EXPIRY_SECS";
pub const ENV_MAX_RETRIES: &str = "CONFIRMATION_MAX_RETRIES";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub cooldown: Duration,
    pub expiry_window: Duration,
    pub max_retries: u32,
    pub code_length: usize,
    pub invalid_code_sentinel: String,
    pub biometric_prompt: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::seconds(DEFAULT_COOLDOWN_SECS),
            expiry_window: Duration::seconds(DEFAULT_EXPIRY_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            code_length: VERIFICATION_CODE_LENGTH,
            invalid_code_sentinel: DEFAULT_INVALID_CODE_SENTINEL.to_string(),
            biometric_prompt: DEFAULT_BIOMETRIC_PROMPT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `VOTE_COOLDOWN_SECS`, `SUBMISSION_EXPIRY_SECS`
    /// and `CONFIRMATION_MAX_RETRIES` when set and parseable.
    pub fn from_env() -> Self {
        Self {
            cooldown: Duration::seconds(env_parse(ENV_COOLDOWN_SECS, DEFAULT_COOLDOWN_SECS)),
            expiry_window: Duration::seconds(env_parse(ENV_EXPIRY_SECS, DEFAULT_EXPIRY_SECS)),
            max_retries: env_parse(ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES),
            ..Self::default()
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_expiry_window(mut self, expiry_window: Duration) -> Self {
        self.expiry_window = expiry_window;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}
