use anyhow::{anyhow, Context};
use chrono::Utc;
use scoring_service::{
    config::Config,
    jobs::{RecommendationSweepJob, ScoreSweepJob, SweepMode},
    metrics,
    services::{
        credit::{InMemoryScoreStore, RedisScoreStore, ScoreStore},
        matching::{InMemoryJobRepository, RecommendationService},
        notifier::{LogNotificationSink, NotificationSink, RedisNotificationSink},
        profile::{AggregatorConfig, InMemoryProfileDatabase, ProfileAggregator, ProfileSnapshot},
        CreditScoreService, RecommendationNotifier,
    },
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    if json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    info!(
        service = %config.service.name,
        run_mode = %config.service.run_mode,
        "Starting {}",
        config.service.name
    );

    // Collaborator data
    let (db, jobs) = match &config.service.snapshot_path {
        Some(path) => ProfileSnapshot::load(path)?.into_parts(),
        None => {
            warn!("SERVICE_SNAPSHOT_PATH not set - running against an empty dataset");
            (InMemoryProfileDatabase::new(), Vec::new())
        }
    };
    let db = Arc::new(db);

    // Persistence and notification transport
    let (score_store, sink) = match &config.redis {
        Some(redis) => {
            let client =
                redis::Client::open(redis.url.clone()).context("Failed to create Redis client")?;
            info!("Using Redis score store and notification sink");
            let store: Arc<dyn ScoreStore> = Arc::new(RedisScoreStore::new(client.clone()));
            let sink: Arc<dyn NotificationSink> = Arc::new(RedisNotificationSink::new(client));
            (store, sink)
        }
        None => {
            info!("REDIS_URL not set - using in-memory score store and log notifications");
            let store: Arc<dyn ScoreStore> = Arc::new(InMemoryScoreStore::new());
            let sink: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink);
            (store, sink)
        }
    };

    let aggregator = Arc::new(
        ProfileAggregator::new(
            db,
            AggregatorConfig {
                default_salary_floor: config.matching.default_salary_floor,
            },
        )
        .with_score_store(score_store.clone()),
    );
    let notifier = Arc::new(RecommendationNotifier::new(sink, &config.notifier));

    let credit = Arc::new(CreditScoreService::new(
        aggregator.clone(),
        score_store,
        notifier.clone(),
        config.scoring.clone(),
    ));
    let recommendations = Arc::new(RecommendationService::new(
        aggregator,
        Arc::new(InMemoryJobRepository::new(jobs)),
        notifier,
        &config.matching,
    ));

    // Ctrl-C stops sweeps at the next subject boundary
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received, stopping after current subject");
            let _ = cancel_tx.send(true);
        }
    });

    let now = Utc::now();
    match config.service.run_mode.as_str() {
        "score-sweep" => {
            let job = ScoreSweepJob::new(credit, config.sweep.clone());
            let report = job.update_all(now, cancel_rx).await?;
            info!(report = %serde_json::to_string(&report)?, "Score sweep report");
        }
        "recommend-sweep" => {
            let mode: SweepMode = config.sweep.mode.parse().map_err(|e: String| anyhow!(e))?;
            let job = RecommendationSweepJob::new(recommendations, config.sweep.clone());
            let report = job.recommend_all(mode, now, cancel_rx).await?;
            info!(report = %serde_json::to_string(&report)?, "Recommendation sweep report");
        }
        "score" => {
            let seeker_id = seeker_id(&config)?;
            let update = credit.update_credit_score(seeker_id, now).await?;
            println!("{}", serde_json::to_string_pretty(&update.result)?);
        }
        "recommend" => {
            let seeker_id = seeker_id(&config)?;
            let outcome = recommendations.recommend_jobs(seeker_id, now).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        other => return Err(anyhow!("Unknown SERVICE_RUN_MODE: {}", other)),
    }

    debug!(metrics = %metrics::gather_text(), "Final metrics");
    info!("{} finished", config.service.name);
    Ok(())
}

fn seeker_id(config: &Config) -> anyhow::Result<Uuid> {
    let raw = config
        .service
        .seeker_id
        .as_deref()
        .ok_or_else(|| anyhow!("SERVICE_SEEKER_ID is required for single-seeker modes"))?;
    Uuid::parse_str(raw).with_context(|| format!("Invalid SERVICE_SEEKER_ID: {}", raw))
}
