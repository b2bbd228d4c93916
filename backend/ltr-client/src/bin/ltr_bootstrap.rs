/// Prepare an Elasticsearch cluster for Learning to Rank
///
/// Creates the default LTR store when the cluster has none, then reports
/// the feature sets it holds. Meant to run once from deployment scripts
/// before any service uploads features or models.
///
/// Usage:
///   LTR_HOSTS=http://localhost:9200 cargo run --bin ltr-bootstrap
///
/// Environment variables:
///   - LTR_HOSTS: Comma-separated Elasticsearch endpoints (default: http://localhost:9200)
///   - LTR_USERNAME / LTR_PASSWORD: Basic auth credentials
///   - LTR_TIMEOUT_MS: Per-request timeout (default: 10000)
///   - LTR_MAX_RETRIES: Transport retries (default: 3)
///   - LTR_RETRY_ON_TIMEOUT: Retry timed out requests (default: false)
///   - LTR_FEATURESET_PREFIX: Only report feature sets starting with this prefix
///     (read by this tool only; not part of `LtrConfig`)
use anyhow::{Context, Result};
use ltr_client::{LtrClient, LtrConfig, RequestParams};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = LtrConfig::from_env().context("Failed to load LTR configuration")?;
    config.validate().context("Invalid LTR configuration")?;

    info!(hosts = ?config.hosts, "Connecting to Elasticsearch");

    let client = LtrClient::connect(&config).context("Failed to build LTR client")?;
    let params = RequestParams::default();

    if client
        .ensure_default_store(&params)
        .await
        .context("Failed to initialise default LTR store")?
    {
        info!("Default LTR store created");
    } else {
        info!("Default LTR store already present");
    }

    let prefix = featureset_prefix().context("Failed to read LTR_FEATURESET_PREFIX")?;
    let listing = client
        .features()
        .list_featuresets(prefix.as_deref(), &params)
        .await
        .context("Failed to list feature sets")?;

    let names = featureset_names(&listing);
    if names.is_empty() {
        warn!("No feature sets found");
    }
    for name in &names {
        info!(featureset = %name, "Found feature set");
    }

    info!(featuresets = names.len(), "Bootstrap complete");
    Ok(())
}

fn featureset_prefix() -> Result<Option<String>> {
    let source = config::Config::builder()
        .add_source(config::Environment::with_prefix("LTR"))
        .build()?;

    match source.get_string("featureset_prefix") {
        Ok(prefix) => Ok(Some(prefix)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn featureset_names(listing: &Value) -> Vec<String> {
    listing["hits"]["hits"]
        .as_array()
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit["_source"]["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
