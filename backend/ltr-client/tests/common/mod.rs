#![allow(dead_code)]

use ltr_client::{LtrClient, LtrConfig};
use wiremock::MockServer;

pub fn config_for(server: &MockServer) -> LtrConfig {
    LtrConfig {
        hosts: vec![server.uri()],
        retry_backoff_ms: 1,
        ..Default::default()
    }
}

pub fn client_for(server: &MockServer) -> LtrClient {
    LtrClient::connect(&config_for(server)).expect("client should build")
}

pub fn query_value(request: &wiremock::Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
