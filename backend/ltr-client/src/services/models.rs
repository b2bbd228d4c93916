use elasticsearch::http::Method;
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::{Model, RescoreRequest};
use crate::params::RequestParams;
use crate::transport::{make_path, LtrTransport};

use super::require;

const LTR: &str = "_ltr";

#[derive(Clone)]
pub struct ModelClient {
    transport: LtrTransport,
}

impl ModelClient {
    pub fn new(transport: LtrTransport) -> Self {
        Self { transport }
    }

    /// Store a model against an existing feature set.
    pub async fn upload_model(
        &self,
        featureset: &str,
        model: &Model,
        params: &RequestParams,
    ) -> Result<Value> {
        require(featureset, "featureset")?;
        require(&model.name, "model.name")?;

        let body = json!({
            "model": {
                "name": model.name,
                "model": {
                    "type": model.model_type,
                    "definition": model.definition
                }
            }
        });

        self.transport
            .perform_request(
                Method::Post,
                &make_path(&[LTR, "_featureset", featureset, "_createmodel"]),
                &params.to_query(),
                Some(&body),
            )
            .await
    }

    pub async fn get_model(&self, name: &str, params: &RequestParams) -> Result<Value> {
        require(name, "model_name")?;

        self.transport
            .perform_request(
                Method::Get,
                &make_path(&[LTR, "_model", name]),
                &params.to_query(),
                None,
            )
            .await
    }

    pub async fn delete_model(&self, name: &str, params: &RequestParams) -> Result<Value> {
        require(name, "model_name")?;

        self.transport
            .perform_request(
                Method::Delete,
                &make_path(&[LTR, "_model", name]),
                &params.to_query(),
                None,
            )
            .await
    }

    /// Run the base query and reorder its top `window_size` hits by the model.
    pub async fn rescore_query(
        &self,
        request: &RescoreRequest,
        params: &RequestParams,
    ) -> Result<Value> {
        require(&request.index, "index")?;
        require(&request.model, "model_name")?;

        self.transport
            .perform_request(
                Method::Get,
                &make_path(&[request.index.as_str(), "_search"]),
                &params.to_query(),
                Some(&rescore_body(request)),
            )
            .await
    }
}

fn rescore_body(request: &RescoreRequest) -> Value {
    let mut sltr = json!({
        "params": request.feature_params,
        "model": request.model
    });

    if let Some(features) = request.active_features.as_ref().filter(|f| !f.is_empty()) {
        sltr["active_features"] = json!(features);
    }

    json!({
        "query": request.query,
        "rescore": {
            "window_size": request.window_size,
            "query": {
                "rescore_query": { "sltr": sltr }
            }
        }
    })
}
