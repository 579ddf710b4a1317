//! Command-line driver for the `apifuzz` engine: argument parsing, spec and
//! config loading, and wiring the concrete `reqwest`-backed collaborators
//! the transport-agnostic core crate needs.

mod auth_provider;
mod file_report;
mod http_sender;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use apifuzz_core::config::FuzzConfig;
use apifuzz_core::engine::FuzzEngine;
use apifuzz_core::sender::AuthProvider as _;
use apifuzz_core::spec::SpecModel;
use tracing::{info, warn};

use auth_provider::LoginAuthProvider;
use file_report::FileReportSink;
use http_sender::ReqwestSender;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let args = CliArgs::parse().context("parsing arguments")?;

    let spec_text = std::fs::read_to_string(&args.spec_path)
        .with_context(|| format!("reading spec file {}", args.spec_path.display()))?;
    let spec = SpecModel::parse(&spec_text).context("parsing OpenAPI/Swagger document")?;

    let config = load_config(&args.config_path);
    let base_url = config.base_url.clone().unwrap_or_else(|| args.base_url.clone());
    url::Url::parse(&base_url).with_context(|| format!("{base_url:?} is not a valid base URL"))?;

    let http_client = reqwest::Client::new();

    let auth_header = if config.has_auth_material() {
        let provider = LoginAuthProvider::new(http_client.clone(), base_url.clone(), config);
        provider.acquire().await
    } else {
        if spec.requires_auth() {
            warn!("spec declares a security requirement but no auth material was configured; fuzzing unauthenticated");
        }
        None
    };
    let auth_header_ref = auth_header.as_ref().map(|(name, value)| (name.as_str(), value.as_str()));

    let sender = ReqwestSender::new(http_client);
    let mut report = FileReportSink::new().context("setting up report output directories")?;
    let mut engine = FuzzEngine::new(spec, args.seed);

    info!(%base_url, seed = args.seed, time_budget_secs = args.time_budget.as_secs(), "starting fuzzing run");

    engine
        .run(&sender, &base_url, auth_header_ref, args.time_budget, &mut report)
        .await
        .context("fuzzing run failed")?;

    info!(iterations = engine.corpus().len(), mode = ?engine.mode(), "fuzzing run finished");
    Ok(())
}

/// Loads `config.json`, falling back to [`FuzzConfig::default`] on any
/// missing-file or parse error — matching the prototype's bare
/// `except Exception: return {}`.
fn load_config(path: &std::path::Path) -> FuzzConfig {
    let Ok(text) = std::fs::read_to_string(path) else {
        return FuzzConfig::default();
    };

    FuzzConfig::parse(&text).unwrap_or_else(|error| {
        warn!(%error, path = %path.display(), "config file was not valid JSON; running without auth material");
        FuzzConfig::default()
    })
}

/// Generates a seed from wall-clock time when the caller doesn't pin one
/// with `--seed`, logging it so the run can still be reproduced afterward.
fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos() as u64)
        .unwrap_or(0)
}

#[derive(Debug)]
struct CliArgs {
    spec_path: PathBuf,
    config_path: PathBuf,
    base_url: String,
    time_budget: Duration,
    seed: u64,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let spec_path: PathBuf = pargs
            .opt_value_from_str("--spec")
            .context("parsing --spec argument")?
            .unwrap_or_else(|| PathBuf::from("examples/target-ncs.json"));
        let base_url: String = pargs
            .opt_value_from_str("--base-url")
            .context("parsing --base-url argument")?
            .unwrap_or_else(|| "http://localhost:8080".to_string());
        let config_path: PathBuf = pargs
            .opt_value_from_str("--config")
            .context("parsing --config argument")?
            .unwrap_or_else(|| PathBuf::from("config.json"));
        let time_secs: u64 =
            pargs.opt_value_from_str("--time").context("parsing --time argument")?.unwrap_or(120);
        let seed: Option<u64> = pargs.opt_value_from_str("--seed").context("parsing --seed argument")?;
        let seed = seed.unwrap_or_else(entropy_seed);

        let result = Self { spec_path, config_path, base_url, time_budget: Duration::from_secs(time_secs), seed };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "unused arguments left");
        }
        Ok(result)
    }
}
