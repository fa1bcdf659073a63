//! Score Cache - demo entry point
//!
//! Writes three sample items into the score-indexed cache and prints the
//! ones whose score falls in [120, 250].

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use score_cache::{
    spawn_cleanup_task, Backend, CacheConfig, CacheItem, Deadline, MemoryStore,
    ScoreIndexedCache, ScoreStore,
};

/// Sample entries written by the demo: (key, value, score).
const SAMPLE_ITEMS: [(&str, &str, f64); 3] = [
    ("item1", "Value for item 1", 100.0),
    ("item2", "Value for item 2", 200.0),
    ("item3", "Value for item 3", 150.0),
];

/// Main entry point for the score cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the cache to the configured backend
/// 4. Write the sample items and run the range query
/// 5. Close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "score_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting score cache demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: backend={:?}, address={}, db={}, index={}, default_ttl={}s",
        config.backend,
        config.address,
        config.database,
        config.index_name,
        config.default_ttl.as_secs()
    );

    match config.backend {
        Backend::Redis => {
            let cache = ScoreIndexedCache::connect(&config)
                .await
                .context("failed to initialize cache")?;
            run_demo(&cache, &config).await?;
            cache.close().await?;
        }
        Backend::Memory => {
            let store = Arc::new(MemoryStore::new());
            let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            let cache =
                ScoreIndexedCache::open(store, config.index_name.clone(), config.default_ttl)
                    .await
                    .context("failed to initialize cache")?;
            run_demo(&cache, &config).await?;
            cache.close().await?;
            cleanup_handle.abort();
        }
    }

    info!("Score cache demo complete");
    Ok(())
}

/// Writes the sample items and prints the [120, 250] range as JSON lines.
async fn run_demo<S: ScoreStore>(
    cache: &ScoreIndexedCache<S>,
    config: &CacheConfig,
) -> anyhow::Result<()> {
    for (key, value, score) in SAMPLE_ITEMS {
        let deadline = Deadline::after(config.op_timeout);
        if let Err(e) = cache.set(&deadline, key, &value.to_string(), score).await {
            warn!("Failed to add {}: {}", key, e);
        }
    }

    let deadline = Deadline::after(config.op_timeout);
    let items: Vec<CacheItem<String>> = cache
        .get_by_score_range(&deadline, 120.0, 250.0, 0, 10)
        .await
        .context("range query failed")?;

    info!("Items with score in [120, 250]: {}", items.len());
    for item in &items {
        println!("{}", serde_json::to_string(item)?);
    }

    Ok(())
}
