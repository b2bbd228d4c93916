use serde::Deserialize;
use std::time::Duration;

use crate::error::{LtrError, Result};
use crate::retry::RetryPolicy;

const DEFAULT_HOST: &str = "http://localhost:9200";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LtrConfig {
    // Cluster endpoints
    pub hosts: Vec<String>,

    // Basic auth
    pub username: Option<String>,
    pub password: Option<String>,

    // Transport resilience
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_on_timeout: bool,
    pub retry_on_status: Vec<u16>,
    pub retry_backoff_ms: u64,
}

impl Default for LtrConfig {
    fn default() -> Self {
        Self {
            hosts: vec![DEFAULT_HOST.to_string()],
            username: None,
            password: None,
            timeout_ms: 10_000,
            max_retries: 3,
            retry_on_timeout: false,
            retry_on_status: vec![502, 503, 504],
            retry_backoff_ms: 100,
        }
    }
}

impl LtrConfig {
    /// Load `LTR_*` variables, falling back to the defaults above.
    ///
    /// `LTR_HOSTS` and `LTR_RETRY_ON_STATUS` are comma-separated lists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("hosts", vec![DEFAULT_HOST])?
            .set_default("timeout_ms", 10_000)?
            .set_default("max_retries", 3)?
            .set_default("retry_on_timeout", false)?
            .set_default("retry_on_status", vec![502, 503, 504])?
            .set_default("retry_backoff_ms", 100)?
            .add_source(
                // Values stay strings until deserialization so credentials
                // such as "007" are not coerced into numbers.
                config::Environment::with_prefix("LTR")
                    .list_separator(",")
                    .with_list_parse_key("hosts")
                    .with_list_parse_key("retry_on_status"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(invalid("at least one host is required"));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(invalid("username and password must be set together"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_on_timeout: self.retry_on_timeout,
            retry_on_status: self.retry_on_status.clone(),
            initial_backoff: Duration::from_millis(self.retry_backoff_ms),
            ..RetryPolicy::default()
        }
    }
}

fn invalid(message: &str) -> LtrError {
    LtrError::Config(config::ConfigError::Message(message.to_string()))
}
