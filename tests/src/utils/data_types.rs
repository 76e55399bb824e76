use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use vote_pipeline::{
    Candidate, ConfirmationStateMachine, Election, ElectionStatus, ManualClock, PipelineConfig,
    VoterSession, VotingService,
};

use super::doubles::{Scripted, ScriptedBiometric, ScriptedTransport};

pub const ELECTION_ID: &str = "election-2027-presidential";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2027, 2, 25, 8, 0, 0).unwrap()
}

pub fn election(status: ElectionStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Election {
    let mut first = Candidate::new("cand-a", "Ada Nwosu");
    first.party_acronym = Some("PDP".to_string());
    first.vote_count = 400;
    let mut second = Candidate::new("cand-b", "Bayo Adeyemi");
    second.party_acronym = Some("APC".to_string());
    second.vote_count = 350;

    Election {
        id: ELECTION_ID.to_string(),
        title: "Presidential Election".to_string(),
        status,
        start_date: start,
        end_date: end,
        contestants: vec![first, second],
    }
}

pub fn session(voter_id: &str) -> VoterSession {
    VoterSession {
        voter_id: voter_id.to_string(),
        device_id: format!("{}-phone", voter_id),
        position: "president".to_string(),
    }
}

/// A service on a manual clock, one hour into an ongoing election
pub struct TestContext {
    pub clock: ManualClock,
    pub transport: Arc<ScriptedTransport>,
    pub biometric: Arc<ScriptedBiometric>,
    pub service: VotingService,
    pub election: Election,
}

impl TestContext {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self::with_config(PipelineConfig::default(), script)
    }

    pub fn with_config(config: PipelineConfig, script: Vec<Scripted>) -> Self {
        let clock = ManualClock::new(start_time() + Duration::hours(1));
        let transport = Arc::new(ScriptedTransport::new(script));
        let biometric = Arc::new(ScriptedBiometric::default());
        let service = VotingService::new(
            config,
            transport.clone(),
            biometric.clone(),
            Arc::new(clock.clone()),
        );
        let election = election(
            ElectionStatus::Ongoing,
            start_time(),
            start_time() + Duration::hours(10),
        );
        Self {
            clock,
            transport,
            biometric,
            service,
            election,
        }
    }

    pub fn machine(&self, voter_id: &str) -> ConfirmationStateMachine {
        self.service.confirmation(session(voter_id))
    }

    /// Code plus biometric, ready to confirm
    pub async fn prepared(&self, voter_id: &str) -> (ConfirmationStateMachine, String) {
        let machine = self.machine(voter_id);
        let code = machine.generate_verification_code();
        assert!(machine.verify_biometric().await);
        (machine, code)
    }
}

/// A structurally valid request stamped with the context clock
pub fn request(voter_id: &str, now: DateTime<Utc>) -> vote_pipeline::SubmissionRequest {
    vote_pipeline::SubmissionRequest {
        election_id: ELECTION_ID.to_string(),
        candidate_id: "cand-a".to_string(),
        voter_id: voter_id.to_string(),
        verification_code: "K7Q2ZD".to_string(),
        biometric_hash: "face_0f3a".to_string(),
        device_id: format!("{}-phone", voter_id),
        timestamp: now,
        position: "president".to_string(),
    }
}

/// Count recorded under `outcome` in a ledger metrics snapshot
pub fn outcome_count(metrics: &serde_json::Value, outcome: &str) -> u64 {
    metrics["submit_total"]
        .as_array()
        .and_then(|entries| entries.iter().find(|e| e["outcome"] == outcome))
        .and_then(|e| e["count"].as_u64())
        .unwrap_or(0)
}
