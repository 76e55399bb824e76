use std::fmt::Debug;

use vote_pipeline::{ConfirmationResult, VoteError};

pub fn assert_vote_err<T: Debug>(res: Result<T, VoteError>, msg: &str) {
    assert!(res.unwrap_err().to_string().contains(msg))
}

pub fn assert_failed_with(result: &ConfirmationResult, msg: &str) {
    assert!(!result.success, "expected failure, got {:?}", result);
    assert_eq!(result.error.as_deref(), Some(msg));
}
