//! Vote-casting transaction pipeline for the mobile voting client.
//!
//! A candidate selection flows through the [`EligibilityValidator`], then the
//! [`ConfirmationStateMachine`] (verification code, biometric gate, retry
//! policy), which drives the [`SubmissionLedger`]. Outcomes are appended to the
//! [`VoteHistoryTracker`]. [`VotingService`] wires all of it together once at
//! startup.

pub mod biometric;
pub mod clock;
pub mod confirmation;
pub mod config;
pub mod election;
pub mod eligibility;
pub mod error;
pub mod history;
pub mod ledger;
pub mod service;
pub mod transport;
pub mod utils;

pub use biometric::*;
pub use clock::*;
pub use confirmation::*;
pub use config::PipelineConfig;
pub use election::*;
pub use eligibility::*;
pub use error::*;
pub use history::*;
pub use ledger::*;
pub use service::*;
pub use transport::*;
