pub mod consts;
pub mod utils;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::Serialize;
use tokio::task::JoinSet;
use vote_pipeline::{
    BiometricError, Candidate, ConfirmationProgress, ConfirmationResult, ConfirmationState,
    Election, ElectionStatus, Eligibility, EligibilityValidator, PipelineConfig, SimulatedBiometric,
    SimulatedTransport, SubmissionLedger, SubmissionRequest, SubmissionStatistics, SystemClock,
    VoteAttempt, VoterSession, VotingProgress, VotingService,
};

use crate::consts::*;

/// Demo election whose window is placed relative to `now`
pub fn demo_election(
    status: ElectionStatus,
    now: DateTime<Utc>,
    start_offset: Duration,
    end_offset: Duration,
) -> Election {
    let contestants = DEMO_CANDIDATES
        .iter()
        .map(|(id, name, party, votes)| Candidate {
            id: id.to_string(),
            name: name.to_string(),
            party: Some(party.to_string()),
            party_acronym: Some(party.to_string()),
            vote_count: *votes,
        })
        .collect();

    Election {
        id: DEMO_ELECTION_ID.to_string(),
        title: DEMO_ELECTION_TITLE.to_string(),
        status,
        start_date: now + start_offset,
        end_date: now + end_offset,
        contestants,
    }
}

pub fn demo_session() -> VoterSession {
    VoterSession {
        voter_id: DEMO_VOTER_ID.to_string(),
        device_id: DEMO_DEVICE_ID.to_string(),
        position: DEMO_POSITION.to_string(),
    }
}

pub struct ValidateOptions {
    pub status: ElectionStatus,
    pub start_offset: Duration,
    pub end_offset: Duration,
    pub candidate_id: String,
    pub last_attempt_ago: Option<Duration>,
}

pub fn run_validate(config: &PipelineConfig, opts: &ValidateOptions) -> Eligibility {
    let now = Utc::now();
    let election = demo_election(opts.status, now, opts.start_offset, opts.end_offset);
    let candidate = election
        .candidate(&opts.candidate_id)
        .cloned()
        .unwrap_or_else(|| Candidate::new(opts.candidate_id.clone(), ""));
    let validator = EligibilityValidator::new(Arc::new(SystemClock), config.cooldown);
    validator.validate(&election, &candidate, opts.last_attempt_ago.map(|ago| now - ago))
}

pub struct CastOptions {
    pub candidate_id: String,
    pub attempts: u32,
    pub wrong_code: bool,
    pub biometric_fails: bool,
    pub failure_rate: f64,
    pub reject_reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastReport {
    pub results: Vec<ConfirmationResult>,
    pub state: ConfirmationState,
    pub progress: ConfirmationProgress,
    pub voting_progress: VotingProgress,
    pub history: Vec<VoteAttempt>,
    pub statistics: SubmissionStatistics,
    pub metrics: serde_json::Value,
}

/// Full flow against the simulated backend: code, biometric, confirm, retry on failure
pub async fn run_cast(config: PipelineConfig, opts: &CastOptions) -> CastReport {
    let mut transport = SimulatedTransport::new().with_failure_rate(opts.failure_rate);
    if let Some(reason) = &opts.reject_reason {
        transport = transport.rejecting(reason.clone());
    }
    let biometric = if opts.biometric_fails {
        SimulatedBiometric::failing(BiometricError::Failed(
            "fingerprint not recognised".to_string(),
        ))
    } else {
        SimulatedBiometric::approving("fingerprint")
    };

    let service = VotingService::new(
        config,
        Arc::new(transport),
        Arc::new(biometric),
        Arc::new(SystemClock),
    );
    let election = demo_election(
        ElectionStatus::Ongoing,
        Utc::now(),
        Duration::days(-1),
        Duration::days(1),
    );
    let machine = service.confirmation(demo_session());

    let mut results = Vec::new();
    for attempt in 1..=opts.attempts.max(1) {
        let code = machine.generate_verification_code();
        info!("Attempt {}: verification code {}", attempt, code);

        if !machine.verify_biometric().await {
            info!("Attempt {}: biometric check failed", attempt);
        }

        let entered = if opts.wrong_code { "WRONG0".to_string() } else { code };
        let result = service
            .cast_vote(&election, &opts.candidate_id, &machine, &entered)
            .await;
        info!(
            "Attempt {}: success={} {}",
            attempt,
            result.success,
            result.error.as_deref().unwrap_or("")
        );

        let confirmed = result.success;
        results.push(result);
        if confirmed {
            break;
        }
        machine.retry_confirmation();
    }

    let report = CastReport {
        results,
        state: machine.current_state(),
        progress: machine.get_confirmation_progress(),
        voting_progress: service.get_voting_progress(&election),
        history: service.history().get_vote_history(),
        statistics: service.ledger().get_statistics(),
        metrics: service.ledger().metrics(),
    };
    service.shutdown();
    report
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressReport {
    pub submissions: usize,
    pub successes: usize,
    pub errors: BTreeMap<String, usize>,
    pub statistics: SubmissionStatistics,
    pub metrics: serde_json::Value,
}

/// Fires `concurrency` identical submissions at one ledger at the same time
pub async fn run_stress(
    config: PipelineConfig,
    concurrency: usize,
    latency: StdDuration,
) -> anyhow::Result<StressReport> {
    let ledger = SubmissionLedger::new(
        &config,
        Arc::new(SimulatedTransport::new().with_latency(latency)),
        Arc::new(SystemClock),
    );
    let request = SubmissionRequest {
        election_id: DEMO_ELECTION_ID.to_string(),
        candidate_id: DEMO_CANDIDATES[0].0.to_string(),
        voter_id: DEMO_VOTER_ID.to_string(),
        verification_code: "STRESS".to_string(),
        biometric_hash: "stress-biometric".to_string(),
        device_id: DEMO_DEVICE_ID.to_string(),
        timestamp: Utc::now(),
        position: DEMO_POSITION.to_string(),
    };

    let mut set = JoinSet::new();
    for _ in 0..concurrency {
        let ledger = ledger.clone();
        let request = request.clone();
        set.spawn(async move { ledger.submit(request).await });
    }

    let mut successes = 0;
    let mut errors: BTreeMap<String, usize> = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        match joined? {
            Ok(receipt) => {
                info!("Submission {} confirmed", receipt.vote_id);
                successes += 1;
            }
            Err(e) => *errors.entry(e.to_string()).or_insert(0) += 1,
        }
    }

    let report = StressReport {
        submissions: concurrency,
        successes,
        errors,
        statistics: ledger.get_statistics(),
        metrics: ledger.metrics(),
    };
    ledger.shutdown();
    Ok(report)
}
