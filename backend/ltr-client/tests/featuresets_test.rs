mod common;

use common::{client_for, query_value};
use ltr_client::{ActiveShards, Feature, FeatureLogRequest, LtrError, RequestParams};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn title_feature() -> Feature {
    Feature::mustache("title_query", json!({ "match": { "title": "{{keywords}}" } }))
        .with_params(["keywords"])
}

fn rating_feature() -> Feature {
    Feature::mustache(
        "user_rating",
        json!({
            "function_score": {
                "field_value_factor": { "field": "vote_average" },
                "query": { "match_all": {} }
            }
        }),
    )
}

#[tokio::test]
async fn test_create_featureset_puts_features_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/_ltr/_featureset/test_featureset"))
        .and(body_json(json!({
            "featureset": {
                "features": [
                    {
                        "name": "title_query",
                        "params": ["keywords"],
                        "template_language": "mustache",
                        "template": { "match": { "title": "{{keywords}}" } }
                    },
                    {
                        "name": "user_rating",
                        "params": [],
                        "template_language": "mustache",
                        "template": {
                            "function_score": {
                                "field_value_factor": { "field": "vote_average" },
                                "query": { "match_all": {} }
                            }
                        }
                    }
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_index": ".ltrstore",
            "_id": "featureset-test_featureset",
            "result": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ack = client
        .features()
        .create_featureset(
            "test_featureset",
            &[title_feature(), rating_feature()],
            &RequestParams::default(),
        )
        .await
        .unwrap();

    assert_eq!(ack["result"], "created");
}

#[tokio::test]
async fn test_create_featureset_forwards_request_params() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/_ltr/_featureset/test_featureset"))
        .and(query_param("master_timeout", "30000ms"))
        .and(query_param("timeout", "5000ms"))
        .and(query_param("wait_for_active_shards", "all"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "created" })))
        .expect(1)
        .mount(&server)
        .await;

    let params = RequestParams::new()
        .with_master_timeout(Duration::from_secs(30))
        .with_timeout(Duration::from_secs(5))
        .with_wait_for_active_shards(ActiveShards::All);

    let client = client_for(&server);
    client
        .features()
        .create_featureset("test_featureset", &[title_feature()], &params)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_featureset_conflict_is_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/_ltr/_featureset/test_featureset"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "type": "version_conflict_engine_exception",
                "reason": "[featureset-test_featureset]: version conflict, document already exists"
            },
            "status": 409
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .features()
        .create_featureset("test_featureset", &[title_feature()], &RequestParams::default())
        .await
        .unwrap_err();

    match err {
        LtrError::Remote { status, body } => {
            assert_eq!(status, 409);
            assert_eq!(body["error"]["type"], "version_conflict_engine_exception");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_featureset_requires_name_and_features() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let params = RequestParams::default();

    let err = client
        .features()
        .create_featureset("", &[title_feature()], &params)
        .await
        .unwrap_err();
    assert!(matches!(err, LtrError::MissingArgument("featureset")));

    let err = client
        .features()
        .create_featureset("test_featureset", &[], &params)
        .await
        .unwrap_err();
    assert!(matches!(err, LtrError::MissingArgument("features")));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_append_features_posts_to_addfeatures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_ltr/_featureset/test_featureset/_addfeatures"))
        .and(body_json(json!({
            "features": [{
                "name": "user_rating",
                "params": [],
                "template_language": "mustache",
                "template": {
                    "function_score": {
                        "field_value_factor": { "field": "vote_average" },
                        "query": { "match_all": {} }
                    }
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "updated" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ack = client
        .features()
        .append_features("test_featureset", &[rating_feature()], &RequestParams::default())
        .await
        .unwrap();

    assert_eq!(ack["result"], "updated");
}

#[tokio::test]
async fn test_append_to_missing_featureset_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_ltr/_featureset/missing/_addfeatures"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "resource_not_found_exception" },
            "status": 404
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .features()
        .append_features("missing", &[rating_feature()], &RequestParams::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_featureset_returns_server_json() {
    let server = MockServer::start().await;

    let stored = json!({
        "_index": ".ltrstore",
        "_id": "featureset-test_featureset",
        "found": true,
        "_source": {
            "name": "test_featureset",
            "type": "featureset",
            "featureset": { "features": [serde_json::to_value(title_feature()).unwrap()] }
        }
    });

    Mock::given(method("GET"))
        .and(path("/_ltr/_featureset/test_featureset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let featureset = client
        .features()
        .get_featureset("test_featureset", &RequestParams::default())
        .await
        .unwrap();

    assert_eq!(featureset, stored);
}

#[tokio::test]
async fn test_get_deleted_featureset_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/_ltr/_featureset/test_featureset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_ltr/_featureset/test_featureset"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "_index": ".ltrstore",
            "_id": "featureset-test_featureset",
            "found": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = RequestParams::default();

    let ack = client
        .features()
        .delete_featureset("test_featureset", &params)
        .await
        .unwrap();
    assert_eq!(ack["result"], "deleted");

    let err = client
        .features()
        .get_featureset("test_featureset", &params)
        .await
        .unwrap_err();
    match err {
        LtrError::NotFound { path, body } => {
            assert_eq!(path, "/_ltr/_featureset/test_featureset");
            assert_eq!(body["found"], false);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_featuresets_with_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_ltr/_featureset"))
        .and(query_param("prefix", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [{ "_source": { "name": "test_featureset", "type": "featureset" } }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let listing = client
        .features()
        .list_featuresets(Some("test"), &RequestParams::default())
        .await
        .unwrap();

    assert_eq!(listing["hits"]["hits"][0]["_source"]["name"], "test_featureset");
}

#[tokio::test]
async fn test_list_featuresets_without_prefix_sends_no_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_ltr/_featureset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = RequestParams::default();

    let listing = client.features().list_featuresets(None, &params).await.unwrap();
    assert!(listing["hits"]["hits"].as_array().unwrap().is_empty());

    // An empty prefix means "no filter".
    client.features().list_featuresets(Some(""), &params).await.unwrap();

    for request in server.received_requests().await.unwrap() {
        assert_eq!(query_value(&request, "prefix"), None);
    }
}

#[tokio::test]
async fn test_log_features_builds_sltr_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lorem/_search"))
        .and(body_json(json!({
            "size": 2,
            "query": {
                "bool": {
                    "filter": { "terms": { "_id": ["doc1", "doc2"] } },
                    "must": {
                        "sltr": {
                            "_name": "logged_featureset",
                            "featureset": "test_featureset",
                            "params": { "keywords": "lorem" }
                        }
                    }
                }
            },
            "ext": {
                "ltr_log": {
                    "log_specs": { "name": "log_entry1", "named_query": "logged_featureset" }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    {
                        "_index": "lorem",
                        "_id": "doc1",
                        "_score": 1.2876821,
                        "fields": { "_ltrlog": [{ "log_entry1": [
                            { "name": "title_query", "value": 0.2876821 },
                            { "name": "user_rating", "value": 1.0 }
                        ] }] }
                    },
                    {
                        "_index": "lorem",
                        "_id": "doc2",
                        "_score": 2.0,
                        "fields": { "_ltrlog": [{ "log_entry1": [
                            { "name": "title_query" },
                            { "name": "user_rating", "value": 2.0 }
                        ] }] }
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = FeatureLogRequest::new("lorem", ["doc1", "doc2"], "test_featureset")
        .param("keywords", "lorem");

    let client = client_for(&server);
    let logged = client
        .features()
        .log_features(&request, &RequestParams::default())
        .await
        .unwrap();

    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].id, "doc1");
    assert_eq!(logged[0].features[0].name, "title_query");
    assert_eq!(logged[0].features[0].value, Some(0.2876821));
    assert_eq!(logged[1].id, "doc2");
    assert_eq!(logged[1].features[0].value, None);
    assert_eq!(logged[1].features[1].value, Some(2.0));
}

#[tokio::test]
async fn test_log_features_omits_unmatched_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lorem/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [{
                    "_id": "doc1",
                    "fields": { "_ltrlog": [{ "log_entry1": [
                        { "name": "title_query", "value": 0.5 }
                    ] }] }
                }]
            }
        })))
        .mount(&server)
        .await;

    let request = FeatureLogRequest::new("lorem", ["doc1", "doc2"], "test_featureset")
        .param("keywords", "lorem");

    let client = client_for(&server);
    let logged = client
        .features()
        .log_features(&request, &RequestParams::default())
        .await
        .unwrap();

    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].id, "doc1");
}

#[tokio::test]
async fn test_log_features_requires_documents() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let request = FeatureLogRequest::new("lorem", Vec::<String>::new(), "test_featureset");
    let err = client
        .features()
        .log_features(&request, &RequestParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LtrError::MissingArgument("documents")));
}
