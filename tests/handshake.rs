//! End-to-end handshake scenarios against a mock portal.

use rust_jionet_auth::auth::Negotiator;
use rust_jionet_auth::config::{Credentials, PortalConfig};
use rust_jionet_auth::error::{PortalError, Step};
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PORTAL_PATH: &str = "/portal/auth/login";

fn test_config(server: &MockServer) -> PortalConfig {
    PortalConfig {
        endpoint: Url::parse(&format!("{}{}", server.uri(), PORTAL_PATH)).unwrap(),
        timeout: Duration::from_secs(5),
        ..PortalConfig::default()
    }
}

fn test_credentials() -> Credentials {
    Credentials {
        jio_id: "9876543210".to_string(),
        password: "hunter2".to_string(),
        account: "ACC-77".to_string(),
    }
}

/// A response with the token buried in the portal's usual widget tree.
fn widget_tree(token: &str) -> serde_json::Value {
    json!({"result": {"raw": {"children": [
        {"data": {"name": "username", "value": ""}},
        {"children": [
            {"data": {"name": "terms", "value": "true"}},
            {"data": {"name": "csrf_token", "value": token}}
        ]}
    ]}}})
}

#[tokio::test]
async fn test_full_handshake_threads_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .and(query_param("auth", "auth1"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_tree("tok-1")))
        .expect(1)
        .named("fetch")
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=login"))
        .and(body_string_contains("jioId=9876543210"))
        .and(body_string_contains("terms=true"))
        .and(body_string_contains("csrf_token=tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_tree("tok-2")))
        .expect(1)
        .named("login")
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=connect"))
        .and(body_string_contains("account=ACC-77"))
        .and(body_string_contains("csrf_token=tok-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": {"status": "CONNECTED"}})),
        )
        .expect(1)
        .named("connect")
        .mount(&server)
        .await;

    let negotiator = Negotiator::new(test_config(&server), test_credentials()).unwrap();
    let document = negotiator.run().await.unwrap();

    assert_eq!(document["result"]["status"], "CONNECTED");
}

#[tokio::test]
async fn test_fetch_transport_failure_stops_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .named("fetch returns 500")
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .named("no POST may follow a failed fetch")
        .mount(&server)
        .await;

    let negotiator = Negotiator::new(test_config(&server), test_credentials()).unwrap();
    let err = negotiator.run().await.unwrap_err();

    assert!(matches!(
        err,
        PortalError::Transport {
            step: Step::Fetch,
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_without_token_stops_run() {
    let server = MockServer::start().await;

    let tokenless = json!({"result": {"raw": {"children": [
        {"data": {"name": "username", "value": ""}}
    ]}}});

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokenless.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .named("no POST without a fetch token")
        .mount(&server)
        .await;

    let negotiator = Negotiator::new(test_config(&server), test_credentials()).unwrap();
    let err = negotiator.run().await.unwrap_err();

    match err {
        PortalError::TokenNotFound { step, response } => {
            assert_eq!(step, Step::Fetch);
            // The offending document is retained for diagnostics.
            assert_eq!(response, tokenless);
        }
        other => panic!("expected token-not-found, got {other}"),
    }
}

#[tokio::test]
async fn test_unparseable_fetch_response_stops_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let negotiator = Negotiator::new(test_config(&server), test_credentials()).unwrap();
    let err = negotiator.run().await.unwrap_err();

    assert!(matches!(
        err,
        PortalError::Parse {
            step: Step::Fetch,
            ..
        }
    ));
}

#[tokio::test]
async fn test_login_token_found_under_fallback_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_tree("tok-1")))
        .mount(&server)
        .await;

    // Login response carries no widget tree at all; the token hides under a
    // camel-cased field at the top of the document.
    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"children": [
            {"data": {"name": "csrfToken", "value": "alt-token"}}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=connect"))
        .and(body_string_contains("csrf_token=alt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .expect(1)
        .named("connect carries the fallback token")
        .mount(&server)
        .await;

    let negotiator = Negotiator::new(test_config(&server), test_credentials()).unwrap();
    let document = negotiator.run().await.unwrap();

    assert_eq!(document["result"], "ok");
}

#[tokio::test]
async fn test_login_without_token_stops_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_tree("tok-1")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"code": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("action=connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .named("no connect without a login token")
        .mount(&server)
        .await;

    let negotiator = Negotiator::new(test_config(&server), test_credentials()).unwrap();
    let err = negotiator.run().await.unwrap_err();

    assert!(matches!(
        err,
        PortalError::TokenNotFound {
            step: Step::Login,
            ..
        }
    ));
}

#[tokio::test]
async fn test_secret_is_percent_encoded_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PORTAL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_tree("tok-1")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=login"))
        .and(body_string_contains("password=p%26ss%3Dw%20rd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_tree("tok-2")))
        .expect(1)
        .named("login body escapes the secret")
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PORTAL_PATH))
        .and(body_string_contains("action=connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .mount(&server)
        .await;

    let mut credentials = test_credentials();
    credentials.password = "p&ss=w rd".to_string();

    let negotiator = Negotiator::new(test_config(&server), credentials).unwrap();
    negotiator.run().await.unwrap();
}
