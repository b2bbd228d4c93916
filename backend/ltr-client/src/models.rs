use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named query template evaluated by the LTR plugin to produce one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub template_language: String,
    pub template: Value,
}

impl Feature {
    pub const MUSTACHE: &'static str = "mustache";
    pub const DERIVED_EXPRESSION: &'static str = "derived_expression";
    pub const SCRIPT_FEATURE: &'static str = "script_feature";

    /// Mustache-templated query feature, the plugin's default dialect.
    pub fn mustache(name: impl Into<String>, template: Value) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            template_language: Self::MUSTACHE.to_string(),
            template,
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }
}

/// Ranking model bound to a feature set when uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub definition: String,
}

impl Model {
    pub const LINEAR: &'static str = "model/linear";
    pub const XGBOOST: &'static str = "model/xgboost+json";
    pub const RANKLIB: &'static str = "model/ranklib";

    pub fn new(
        name: impl Into<String>,
        model_type: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model_type: model_type.into(),
            definition: definition.into(),
        }
    }
}

/// Query-time parameters substituted into feature templates.
pub type FeatureParams = Map<String, Value>;

/// Documents whose feature values should be computed under one query context.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLogRequest {
    pub index: String,
    pub documents: Vec<String>,
    pub featureset: String,
    pub feature_params: FeatureParams,
}

impl FeatureLogRequest {
    pub fn new<I, S>(index: impl Into<String>, documents: I, featureset: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index: index.into(),
            documents: documents.into_iter().map(Into::into).collect(),
            featureset: featureset.into(),
            feature_params: FeatureParams::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.feature_params.insert(key.into(), value.into());
        self
    }
}

/// One logged feature value. `value` is absent when the feature did not
/// match the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFeature {
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Feature values computed for one matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedDocument {
    pub id: String,
    pub features: Vec<LoggedFeature>,
}

/// Search whose top hits are re-ordered by a stored model.
#[derive(Debug, Clone, PartialEq)]
pub struct RescoreRequest {
    pub index: String,
    pub query: Value,
    pub model: String,
    pub feature_params: FeatureParams,
    /// Number of top hits to rescore. Passed to the server unvalidated.
    pub window_size: i64,
    /// Restrict evaluation to these features of the model.
    pub active_features: Option<Vec<String>>,
}

impl RescoreRequest {
    pub const DEFAULT_WINDOW_SIZE: i64 = 1000;

    pub fn new(index: impl Into<String>, query: Value, model: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query,
            model: model.into(),
            feature_params: FeatureParams::new(),
            window_size: Self::DEFAULT_WINDOW_SIZE,
            active_features: None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.feature_params.insert(key.into(), value.into());
        self
    }

    pub fn window_size(mut self, window_size: i64) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn active_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_features = Some(features.into_iter().map(Into::into).collect());
        self
    }
}
