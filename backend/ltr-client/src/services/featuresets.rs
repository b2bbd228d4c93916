use elasticsearch::http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::error::{LtrError, Result};
use crate::models::{Feature, FeatureLogRequest, LoggedDocument, LoggedFeature};
use crate::params::RequestParams;
use crate::transport::{make_path, LtrTransport};

use super::require;

const LTR: &str = "_ltr";
const FEATURESET: &str = "_featureset";

// Names tying the sltr clause to its logging spec.
const LOGGED_QUERY_NAME: &str = "logged_featureset";
const LOG_ENTRY_NAME: &str = "log_entry1";

#[derive(Clone)]
pub struct FeatureSetClient {
    transport: LtrTransport,
}

impl FeatureSetClient {
    pub fn new(transport: LtrTransport) -> Self {
        Self { transport }
    }

    /// Create a feature set. Fails server-side if the name is taken.
    pub async fn create_featureset(
        &self,
        name: &str,
        features: &[Feature],
        params: &RequestParams,
    ) -> Result<Value> {
        require(name, "featureset")?;
        if features.is_empty() {
            return Err(LtrError::MissingArgument("features"));
        }

        let body = json!({ "featureset": { "features": features } });
        self.transport
            .perform_request(
                Method::Put,
                &make_path(&[LTR, FEATURESET, name]),
                &params.to_query(),
                Some(&body),
            )
            .await
    }

    /// Add features to an existing set; same-named features are replaced.
    pub async fn append_features(
        &self,
        name: &str,
        new_features: &[Feature],
        params: &RequestParams,
    ) -> Result<Value> {
        require(name, "featureset")?;

        let body = json!({ "features": new_features });
        self.transport
            .perform_request(
                Method::Post,
                &make_path(&[LTR, FEATURESET, name, "_addfeatures"]),
                &params.to_query(),
                Some(&body),
            )
            .await
    }

    pub async fn get_featureset(&self, name: &str, params: &RequestParams) -> Result<Value> {
        require(name, "featureset")?;

        self.transport
            .perform_request(
                Method::Get,
                &make_path(&[LTR, FEATURESET, name]),
                &params.to_query(),
                None,
            )
            .await
    }

    /// List feature sets, optionally only those whose name starts with `prefix`.
    pub async fn list_featuresets(
        &self,
        prefix: Option<&str>,
        params: &RequestParams,
    ) -> Result<Value> {
        let mut query = params.to_query();
        query.prefix = prefix.filter(|p| !p.is_empty()).map(str::to_string);

        self.transport
            .perform_request(Method::Get, &make_path(&[LTR, FEATURESET]), &query, None)
            .await
    }

    pub async fn delete_featureset(&self, name: &str, params: &RequestParams) -> Result<Value> {
        require(name, "featureset")?;

        self.transport
            .perform_request(
                Method::Delete,
                &make_path(&[LTR, FEATURESET, name]),
                &params.to_query(),
                None,
            )
            .await
    }

    /// Compute feature values for the given documents under one query context.
    ///
    /// Results follow hit order; documents that do not match are left out.
    pub async fn log_features(
        &self,
        request: &FeatureLogRequest,
        params: &RequestParams,
    ) -> Result<Vec<LoggedDocument>> {
        require(&request.index, "index")?;
        require(&request.featureset, "featureset")?;
        if request.documents.is_empty() {
            return Err(LtrError::MissingArgument("documents"));
        }

        let response = self
            .transport
            .perform_request(
                Method::Get,
                &make_path(&[request.index.as_str(), "_search"]),
                &params.to_query(),
                Some(&log_query_body(request)),
            )
            .await?;

        extract_logged_documents(response)
    }
}

fn log_query_body(request: &FeatureLogRequest) -> Value {
    json!({
        "size": request.documents.len(),
        "query": {
            "bool": {
                "filter": {
                    "terms": { "_id": request.documents }
                },
                "must": {
                    "sltr": {
                        "_name": LOGGED_QUERY_NAME,
                        "featureset": request.featureset,
                        "params": request.feature_params
                    }
                }
            }
        },
        "ext": {
            "ltr_log": {
                "log_specs": {
                    "name": LOG_ENTRY_NAME,
                    "named_query": LOGGED_QUERY_NAME
                }
            }
        }
    })
}

fn extract_logged_documents(response: Value) -> Result<Vec<LoggedDocument>> {
    let search_response: LogSearchResponse = serde_json::from_value(response)?;

    search_response
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            let features = hit
                .fields
                .ltr_log
                .into_iter()
                .next()
                .and_then(|mut entry| entry.remove(LOG_ENTRY_NAME))
                .ok_or_else(|| {
                    LtrError::MalformedResponse(format!(
                        "hit {} has no {LOG_ENTRY_NAME} feature log",
                        hit.id
                    ))
                })?;

            Ok(LoggedDocument {
                id: hit.id,
                features,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct LogSearchResponse {
    hits: LogInnerHits,
}

#[derive(Debug, Deserialize)]
struct LogInnerHits {
    #[serde(default)]
    hits: Vec<LogHit>,
}

#[derive(Debug, Deserialize)]
struct LogHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    fields: LogFields,
}

#[derive(Debug, Default, Deserialize)]
struct LogFields {
    #[serde(rename = "_ltrlog", default)]
    ltr_log: Vec<HashMap<String, Vec<LoggedFeature>>>,
}
