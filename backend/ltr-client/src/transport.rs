use elasticsearch::{
    auth::Credentials,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        transport::{MultiNodeConnectionPool, SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    Elasticsearch,
};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::LtrConfig;
use crate::error::{LtrError, Result};
use crate::params::QueryString;
use crate::retry::RetryPolicy;

/// Shared handle over one Elasticsearch connection pool.
///
/// Cloning is cheap; every clone talks to the same pool.
#[derive(Clone)]
pub struct LtrTransport {
    client: Elasticsearch,
    retry: RetryPolicy,
}

impl LtrTransport {
    pub fn new(config: &LtrConfig) -> Result<Self> {
        config.validate()?;

        let mut urls = config
            .hosts
            .iter()
            .map(|host| Url::parse(host))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut builder = if urls.len() == 1 {
            TransportBuilder::new(SingleNodeConnectionPool::new(urls.remove(0)))
        } else {
            TransportBuilder::new(MultiNodeConnectionPool::round_robin(urls, None))
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }

        let transport = builder.timeout(config.timeout()).build()?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            retry: config.retry_policy(),
        })
    }

    pub fn elasticsearch(&self) -> &Elasticsearch {
        &self.client
    }

    /// Send one request and decode the JSON reply.
    ///
    /// Transport failures and the configured retryable statuses are retried
    /// per the policy; every other outcome is final. 404 maps to
    /// [`LtrError::NotFound`], other non-2xx statuses to [`LtrError::Remote`].
    pub(crate) async fn perform_request(
        &self,
        method: Method,
        path: &str,
        query: &QueryString,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut attempt = 0;

        loop {
            debug!(?method, path, attempt, "Sending LTR request");

            let outcome = self
                .client
                .send(
                    method.clone(),
                    path,
                    HeaderMap::new(),
                    Some(query),
                    body.map(|b| JsonBody::new(b.clone())),
                    None,
                )
                .await;

            let retry_reason = match outcome {
                Ok(response) => {
                    let status = response.status_code();
                    let text = response.text().await?;

                    if status.is_success() {
                        return decode_body(&text);
                    }

                    let status = status.as_u16();
                    let body = error_body(&text);

                    if !(self.retry.retries_status(status) && attempt < self.retry.max_retries) {
                        return Err(if status == 404 {
                            LtrError::NotFound {
                                path: path.to_string(),
                                body,
                            }
                        } else {
                            LtrError::Remote { status, body }
                        });
                    }

                    format!("HTTP {status}")
                }
                Err(err) => {
                    if !(self.retry.retries_error(&err) && attempt < self.retry.max_retries) {
                        return Err(err.into());
                    }

                    err.to_string()
                }
            };

            attempt += 1;
            let delay = self.retry.backoff(attempt);

            warn!(
                path,
                reason = %retry_reason,
                "Retry attempt {}/{}, waiting {:?}",
                attempt,
                self.retry.max_retries,
                delay
            );

            tokio::time::sleep(delay).await;
        }
    }
}

fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

// Error replies are kept verbatim; plain-text bodies survive as strings.
fn error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Build an absolute path from individually percent-encoded segments.
pub(crate) fn make_path(segments: &[&str]) -> String {
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(&urlencoding::encode(segment).replace("%2C", ","));
    }
    path
}
