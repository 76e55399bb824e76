use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use cli::{run_cast, run_stress, run_validate, utils::*, CastOptions, ValidateOptions};
use log::info;
use tokio::runtime::Builder;
use vote_pipeline::{config, ElectionStatus, PipelineConfig};

#[derive(Clone, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, env = "VOTE_COOLDOWN_SECS", default_value_t = config::DEFAULT_COOLDOWN_SECS)]
    pub cooldown_secs: i64,

    #[arg(long, env = "SUBMISSION_EXPIRY_SECS", default_value_t = config::DEFAULT_EXPIRY_SECS)]
    pub expiry_secs: i64,

    #[arg(long, env = "CONFIRMATION_MAX_RETRIES", default_value_t = config::DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_cooldown(Duration::seconds(self.cooldown_secs))
            .with_expiry_window(Duration::seconds(self.expiry_secs))
            .with_max_retries(self.max_retries)
    }
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    /// Check whether a vote would be accepted for the demo election
    Validate {
        #[arg(long, value_parser = parse_status, default_value = "ongoing")]
        status: ElectionStatus,

        #[arg(
            long,
            default_value_t = -60,
            allow_hyphen_values = true,
            help = "Minutes from now until the election starts"
        )]
        start_in_mins: i64,

        #[arg(
            long,
            default_value_t = 60,
            allow_hyphen_values = true,
            help = "Minutes from now until the election ends"
        )]
        end_in_mins: i64,

        #[arg(long, default_value = "cand-1")]
        candidate: String,

        #[arg(long, help = "Seconds since the voter's last confirmed vote")]
        last_vote_secs_ago: Option<i64>,
    },
    /// Run the full confirmation flow against the simulated backend
    Cast {
        #[arg(long, default_value = "cand-1")]
        candidate: String,

        #[arg(long, default_value_t = 1)]
        attempts: u32,

        #[arg(long, help = "Enter a code that does not match the generated one")]
        wrong_code: bool,

        #[arg(long, help = "Make every biometric check fail")]
        biometric_fails: bool,

        #[arg(long, value_parser = parse_rate, default_value = "0")]
        failure_rate: f64,

        #[arg(long, help = "Have the backend reject every vote with this reason")]
        reject_reason: Option<String>,
    },
    /// Fire identical submissions concurrently and report how many were accepted
    Stress {
        #[arg(long, default_value_t = 10)]
        concurrency: usize,

        #[arg(long, default_value_t = 50)]
        latency_ms: u64,
    },
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(false)
        .try_init();

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let cli = Cli::parse();
    let config = cli.pipeline_config();

    match cli.command {
        Commands::Validate {
            status,
            start_in_mins,
            end_in_mins,
            candidate,
            last_vote_secs_ago,
        } => {
            let eligibility = run_validate(
                &config,
                &ValidateOptions {
                    status,
                    start_offset: Duration::minutes(start_in_mins),
                    end_offset: Duration::minutes(end_in_mins),
                    candidate_id: candidate,
                    last_attempt_ago: last_vote_secs_ago.map(Duration::seconds),
                },
            );
            info!("Eligible: {}", eligibility.valid);
            print_json("Eligibility", &eligibility)?;
        }
        Commands::Cast {
            candidate,
            attempts,
            wrong_code,
            biometric_fails,
            failure_rate,
            reject_reason,
        } => {
            let opts = CastOptions {
                candidate_id: candidate,
                attempts,
                wrong_code,
                biometric_fails,
                failure_rate,
                reject_reason,
            };
            let report = runtime.block_on(run_cast(config, &opts));
            info!(
                "== Cast finished after {} attempt(s) ==",
                report.results.len()
            );
            print_json("Results", &report.results)?;
            print_json("Confirmation progress", &report.progress)?;
            print_json("Voting progress", &report.voting_progress)?;
            print_json("History", &report.history)?;
            print_json("Statistics", &report.statistics)?;
            print_json("Metrics", &report.metrics)?;
        }
        Commands::Stress {
            concurrency,
            latency_ms,
        } => {
            let report = runtime.block_on(run_stress(
                config,
                concurrency,
                StdDuration::from_millis(latency_ms),
            ))?;
            info!(
                "== {} of {} submissions accepted ==",
                report.successes, report.submissions
            );
            print_json("Stress", &report)?;
        }
    }

    Ok(())
}
