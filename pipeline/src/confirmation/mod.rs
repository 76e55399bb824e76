//! Multi-step vote confirmation: verification code, biometric gate, retry policy

pub mod machine;
pub mod state;

pub use machine::*;
pub use state::*;
