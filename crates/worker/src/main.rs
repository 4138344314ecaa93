//! `turnaround-worker` -- generates one multi-shot sequence from a job file.
//!
//! Usage: `turnaround-worker <job.json>` (or set `JOB_FILE`). The run report
//! is printed to stdout as JSON; logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default     | Description                               |
//! |------------------------|----------|-------------|-------------------------------------------|
//! | `JOB_FILE`             | no       | --          | Job file path when no argument is given   |
//! | `PROVIDER`             | no       | `bria`      | `bria`, `fal` or `demo`                   |
//! | `PROVIDER_API_KEY`     | no       | --          | Empty selects the demo provider           |
//! | `IMAGE_SIZE`           | no       | `1024x1024` | Output resolution                         |
//! | `QUALITY_STEPS`        | no       | `50`        | Inference steps                           |
//! | `REQUEST_TIMEOUT_SECS` | no       | `300`       | Generation request timeout                |
//! | `DEMO_DELAY_MS`        | no       | `1000`      | Simulated demo latency                    |
//! | `LOG_FORMAT`           | no       | `text`      | `json` for structured log lines           |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnaround_pipeline::SequenceOptions;
use turnaround_provider::{build_provider, HttpImageSource, ProviderConfig};
use turnaround_worker::{run_job, JobSpec, RunnerSettings};

const DEFAULT_LOG_FILTER: &str =
    "turnaround_worker=info,turnaround_pipeline=info,turnaround_provider=info";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let job_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("JOB_FILE").ok())
        .unwrap_or_else(|| {
            tracing::error!("Usage: turnaround-worker <job.json> (or set JOB_FILE)");
            std::process::exit(1);
        });

    let job = JobSpec::load(&job_path).unwrap_or_else(|e| {
        tracing::error!(path = %job_path, error = %e, "Failed to load job");
        std::process::exit(1);
    });

    let config = ProviderConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid provider configuration");
        std::process::exit(1);
    });

    let provider = build_provider(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build provider");
        std::process::exit(1);
    });

    let source = HttpImageSource::new().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build image client");
        std::process::exit(1);
    });

    let settings = RunnerSettings {
        options: SequenceOptions::from(&config),
        ..RunnerSettings::default()
    };

    tracing::info!(
        path = %job_path,
        provider = provider.name(),
        seed = ?job.seed,
        "Starting job",
    );

    let report = match run_job(&job, provider, &source, &settings).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Job failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialise report");
            std::process::exit(1);
        }
    }

    tracing::info!(
        succeeded = report.succeeded,
        total = report.total,
        "Job finished",
    );
}
