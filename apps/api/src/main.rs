mod accounts;
mod admin;
mod applications;
mod config;
mod db;
mod errors;
mod leaderboard;
mod llm_client;
mod models;
mod routes;
mod screening;
mod session;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::accounts::store::seed_admin;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::decision::load_decision_model;
use crate::screening::training::{
    accuracy, fit_logistic, generate_synthetic_data, DEFAULT_SAMPLES, DEFAULT_SEED,
};
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("api={0},recruiter_api={0}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("train") => train(&config, &args[1..]),
        Some("serve") | None => serve(config).await,
        Some(other) => bail!("Unknown command '{other}'. Usage: api [serve | train [--out PATH] [--samples N] [--seed N]]"),
    }
}

#[derive(Debug, PartialEq)]
struct TrainArgs {
    out: PathBuf,
    samples: usize,
    seed: u64,
}

fn parse_train_args(config: &Config, args: &[String]) -> Result<TrainArgs> {
    let mut parsed = TrainArgs {
        out: config.model_path.clone(),
        samples: DEFAULT_SAMPLES,
        seed: DEFAULT_SEED,
    };
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("Missing value for {flag}"))?;
        match flag.as_str() {
            "--out" => parsed.out = PathBuf::from(value),
            "--samples" => {
                parsed.samples = value
                    .parse()
                    .with_context(|| format!("Invalid --samples: {value}"))?
            }
            "--seed" => {
                parsed.seed = value
                    .parse()
                    .with_context(|| format!("Invalid --seed: {value}"))?
            }
            other => bail!("Unknown train option '{other}'"),
        }
    }
    if parsed.samples < 2 {
        bail!("--samples must be at least 2");
    }
    Ok(parsed)
}

/// Fits the decision model on synthetic data and writes it where the server loads it from.
fn train(config: &Config, args: &[String]) -> Result<()> {
    let args = parse_train_args(config, args)?;
    info!(
        "Training decision model on {} synthetic samples (seed {})",
        args.samples, args.seed
    );

    let samples = generate_synthetic_data(args.samples, args.seed);
    let model = fit_logistic(&samples);
    let train_accuracy = accuracy(&model, &samples);
    model.save(&args.out)?;

    info!(
        "Model saved to {} (training accuracy {:.3})",
        args.out.display(),
        train_accuracy
    );
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Recruiter API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    seed_admin(&db, &config.admin_username, &config.admin_password).await?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot create {}", config.upload_dir.display()))?;
    tokio::fs::create_dir_all(&config.static_dir)
        .await
        .with_context(|| format!("Cannot create {}", config.static_dir.display()))?;

    let llm = LlmClient::new(
        config.llm_url.clone(),
        config.llm_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let decision_model = load_decision_model(&config.model_path);

    let port = config.port;
    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
    let state = AppState {
        db,
        llm,
        config: Arc::new(config),
        decision_model,
        sessions,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
