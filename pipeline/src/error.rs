use thiserror::Error;

/// Election window, candidate and cooldown failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Election has not started yet")]
    NotStarted,
    #[error("Election has ended")]
    Ended,
    #[error("Election is not currently active")]
    NotActive,
    #[error("Selected candidate is not valid for this election")]
    InvalidCandidate,
    #[error("Please wait before voting again")]
    Cooldown,
}

/// Malformed, stale or duplicate submission requests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Submission expired")]
    Expired,
    #[error("A vote for this election is already pending or confirmed")]
    Duplicate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("Biometric verification failed: {0}")]
    Biometric(String),
}

/// Failures inside the confirmation step itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    #[error("Vote submission failed: {0}")]
    Transport(String),
    #[error("Vote rejected: {0}")]
    Rejected(String),
    #[error("Submission was cancelled")]
    Cancelled,
    #[error("Submission ledger is shut down")]
    ShutDown,
    #[error("A vote submission is already in progress")]
    InProgress,
    #[error("Vote has already been confirmed")]
    AlreadyConfirmed,
    #[error("Maximum retry attempts reached")]
    RetriesExhausted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    System(#[from] SystemError),
}

pub type Result<T> = std::result::Result<T, VoteError>;
