use elasticsearch::{http::Method, Elasticsearch};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::LtrConfig;
use crate::error::Result;
use crate::params::RequestParams;
use crate::services::{FeatureSetClient, ModelClient};
use crate::transport::{make_path, LtrTransport};

const LTR: &str = "_ltr";

/// Entry point: one transport shared by the feature-set and model clients.
///
/// Construction performs no network I/O. Call
/// [`LtrClient::ensure_default_store`] once from startup code before the
/// first feature-set write.
#[derive(Clone)]
pub struct LtrClient {
    transport: LtrTransport,
    features: FeatureSetClient,
    models: ModelClient,
    // Set once the default store is known to exist.
    store_ready: Arc<Mutex<bool>>,
}

impl LtrClient {
    pub fn connect(config: &LtrConfig) -> Result<Self> {
        let transport = LtrTransport::new(config)?;

        Ok(Self {
            features: FeatureSetClient::new(transport.clone()),
            models: ModelClient::new(transport.clone()),
            transport,
            store_ready: Arc::new(Mutex::new(false)),
        })
    }

    pub fn features(&self) -> &FeatureSetClient {
        &self.features
    }

    pub fn models(&self) -> &ModelClient {
        &self.models
    }

    /// Underlying Elasticsearch client, for indexing and plain searches.
    pub fn elasticsearch(&self) -> &Elasticsearch {
        self.transport.elasticsearch()
    }

    /// Create the default `_ltr` store if the cluster has none.
    ///
    /// Returns `true` only when this call created the store. The probe runs
    /// at most once per client (clones included) until the store is deleted
    /// through [`LtrClient::delete_default_store`]; a failed attempt leaves
    /// the client unmarked so the next call tries again. Other clients may
    /// race the creation, which the server tolerates.
    pub async fn ensure_default_store(&self, params: &RequestParams) -> Result<bool> {
        let mut ready = self.store_ready.lock().await;
        if *ready {
            return Ok(false);
        }

        let created = self.bootstrap_default_store(params).await?;
        *ready = true;
        Ok(created)
    }

    async fn bootstrap_default_store(&self, params: &RequestParams) -> Result<bool> {
        let status = self
            .transport
            .perform_request(Method::Get, &make_path(&[LTR]), &params.to_query(), None)
            .await?;

        if has_stores(&status) {
            debug!("Default LTR store already exists");
            return Ok(false);
        }

        self.transport
            .perform_request(Method::Put, &make_path(&[LTR]), &params.to_query(), None)
            .await?;
        info!("Created default LTR store");

        Ok(true)
    }

    /// Drop the default `_ltr` store together with every feature set and model in it.
    pub async fn delete_default_store(&self, params: &RequestParams) -> Result<Value> {
        let mut ready = self.store_ready.lock().await;
        let response = self
            .transport
            .perform_request(Method::Delete, &make_path(&[LTR]), &params.to_query(), None)
            .await?;
        *ready = false;
        Ok(response)
    }
}

fn has_stores(status: &Value) -> bool {
    match status.get("stores") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(list)) => !list.is_empty(),
        Some(_) => true,
    }
}
