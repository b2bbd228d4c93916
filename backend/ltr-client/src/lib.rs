//! Client for the Elasticsearch Learning to Rank plugin.
//!
//! Feature sets, models, feature logging and model rescoring are exposed as
//! async methods over one shared Elasticsearch transport:
//!
//! ```rust,no_run
//! use ltr_client::{Feature, LtrClient, LtrConfig, RequestParams};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), ltr_client::LtrError> {
//! let client = LtrClient::connect(&LtrConfig::default())?;
//! let params = RequestParams::default();
//! client.ensure_default_store(&params).await?;
//!
//! let title = Feature::mustache("title_query", json!({ "match": { "title": "{{keywords}}" } }))
//!     .with_params(["keywords"]);
//! client
//!     .features()
//!     .create_featureset("movie_features", &[title], &params)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod params;
pub mod retry;
pub mod services;
pub mod transport;

pub use client::LtrClient;
pub use config::LtrConfig;
pub use error::{LtrError, Result};
pub use models::{
    Feature, FeatureLogRequest, FeatureParams, LoggedDocument, LoggedFeature, Model,
    RescoreRequest,
};
pub use params::{ActiveShards, RequestParams};
pub use retry::RetryPolicy;
pub use services::{FeatureSetClient, ModelClient};
pub use transport::LtrTransport;
