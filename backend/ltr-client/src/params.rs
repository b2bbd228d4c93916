//! Query-string parameters shared by every LTR operation.

use serde::Serialize;
use std::time::Duration;

/// How many shard copies must be active before a write proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveShards {
    All,
    Count(u32),
}

impl ActiveShards {
    fn as_param(&self) -> String {
        match self {
            ActiveShards::All => "all".to_string(),
            ActiveShards::Count(n) => n.to_string(),
        }
    }
}

/// Optional parameters forwarded verbatim as query-string arguments.
///
/// Unset fields are left off the request so the server applies its own
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Timeout for the connection to the master node.
    pub master_timeout: Option<Duration>,
    /// Explicit operation timeout.
    pub timeout: Option<Duration>,
    /// Number of active shards to wait for before the operation returns.
    pub wait_for_active_shards: Option<ActiveShards>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_master_timeout(mut self, timeout: Duration) -> Self {
        self.master_timeout = Some(timeout);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_wait_for_active_shards(mut self, shards: ActiveShards) -> Self {
        self.wait_for_active_shards = Some(shards);
        self
    }

    pub(crate) fn to_query(&self) -> QueryString {
        QueryString {
            master_timeout: self.master_timeout.map(format_duration),
            timeout: self.timeout.map(format_duration),
            wait_for_active_shards: self.wait_for_active_shards.map(|s| s.as_param()),
            prefix: None,
        }
    }
}

/// Wire form of [`RequestParams`], plus the per-operation `prefix` filter.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub(crate) struct QueryString {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_active_shards: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

// Elasticsearch time units; milliseconds keep sub-second precision.
fn format_duration(d: Duration) -> String {
    format!("{}ms", d.as_millis())
}
