// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the Atome client using wiremock.

use std::time::Duration;

use keyatome::protocol::{API_ENDPOINT_LOGIN, COOKIE_NAME, MAX_RETRIES};
use keyatome::error::ParseError;
use keyatome::{
    AtomeClient, AuthenticationError, ClientConfig, Error, FixedUserAgent, LinkyNumber, Period,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "keyatome-tests/1.0";
const SESSION_ID: &str = "TEST";
const LIVE_PATH: &str = "/api/subscription/12345/101234567/measure/live.json";
const CONSUMPTION_PATH: &str = "/api/subscription/12345/101234567/consumption.json";

// ============================================================================
// Fixtures
// ============================================================================

fn login_body() -> Value {
    json!({
        "id": 12345,
        "email": "test_login",
        "firstname": "Test",
        "subscriptions": [
            {
                "reference": "101234567",
                "name": "Home",
                "isActive": true
            },
            {
                "reference": "109876543",
                "name": "Cottage",
                "isActive": true
            }
        ]
    })
}

fn live_body() -> Value {
    json!({
        "last": 2289,
        "subscription": "101234567",
        "isConnected": true,
        "startPeriod": 0,
        "endPeriod": 0,
        "time": "2024-01-01T12:00:00+0100"
    })
}

fn consumption_body(total: u32) -> Value {
    json!({
        "total": total,
        "price": f64::from(total) * 0.15,
        "startPeriod": "2024-01-01T00:00:00+0100",
        "endPeriod": "2024-01-01T12:00:00+0100",
        "imgId": "1"
    })
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(server.uri())
        .with_user_agent(FixedUserAgent::new(USER_AGENT))
        .with_timeout(Duration::from_secs(5))
}

fn client(server: &MockServer) -> AtomeClient {
    AtomeClient::with_config("test_login", "test_password", config(server))
}

fn session_cookie() -> String {
    format!("{COOKIE_NAME}={SESSION_ID}")
}

fn login_ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("set-cookie", format!("{}; Path=/", session_cookie()).as_str())
        .set_body_json(login_body())
}

async fn mount_login(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(API_ENDPOINT_LOGIN))
        .respond_with(login_ok())
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn logged_in_client(server: &MockServer) -> AtomeClient {
    let mut client = client(server);
    client.login().await.unwrap();
    client
}

// ============================================================================
// Login
// ============================================================================

mod login {
    use super::*;

    #[tokio::test]
    async fn stores_identity() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        let mut client = client(&server);
        let profile = client.login().await.unwrap();

        assert_eq!(profile.subscriptions.len(), 2);
        assert_eq!(profile.extra["firstname"], "Test");
        assert_eq!(profile.subscriptions[1].extra["name"], "Cottage");
        assert_eq!(client.user_id(), Some("12345"));
        assert_eq!(client.user_reference(), Some("101234567"));
        assert!(client.has_session());
    }

    #[tokio::test]
    async fn sends_credentials_as_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", USER_AGENT))
            .and(body_json(json!({
                "email": "test_login",
                "plainPassword": "test_password"
            })))
            .respond_with(login_ok())
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client(&server);
        assert!(client.login().await.is_ok());
    }

    #[tokio::test]
    async fn string_id_is_accepted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "12345",
                "subscriptions": [{ "reference": "101234567" }]
            })))
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.login().await.unwrap();
        assert_eq!(client.user_id(), Some("12345"));
    }

    #[tokio::test]
    async fn binds_selected_linky_number() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        let config = config(&server).with_linky_number(LinkyNumber::new(2).unwrap());
        let mut client = AtomeClient::with_config("test_login", "test_password", config);
        client.login().await.unwrap();

        assert_eq!(client.user_reference(), Some("109876543"));
    }

    #[tokio::test]
    async fn linky_number_out_of_range_is_protocol_error() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        let config = config(&server).with_linky_number(LinkyNumber::new(3).unwrap());
        let mut client = AtomeClient::with_config("test_login", "test_password", config);

        match client.login().await {
            Err(Error::Protocol {
                status,
                body,
                source,
            }) => {
                assert_eq!(status, 200);
                assert!(body.contains("101234567"));
                assert!(matches!(
                    source,
                    ParseError::SubscriptionOutOfRange {
                        linky: 3,
                        available: 2
                    }
                ));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        assert!(client.identity().is_none());
    }

    #[tokio::test]
    async fn missing_subscriptions_is_protocol_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12345 })))
            .mount(&server)
            .await;

        let mut client = client(&server);
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, Error::Protocol { status: 200, .. }));
        assert!(client.user_id().is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_protocol_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let mut client = client(&server);
        match client.login().await {
            Err(Error::Protocol { body, .. }) => assert_eq!(body, "<html>maintenance</html>"),
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_credentials_are_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
            )
            .mount(&server)
            .await;

        let mut client = client(&server);
        match client.login().await {
            Err(Error::Authentication(AuthenticationError::Rejected { status, body })) => {
                assert_eq!(status, 401);
                assert!(body.contains("Bad credentials"));
            }
            other => panic!("expected rejected login, got {other:?}"),
        }
        assert!(client.identity().is_none());
    }

    #[tokio::test]
    async fn unreachable_server_is_authentication_error() {
        let config = ClientConfig::new()
            .with_base_url("http://127.0.0.1:1")
            .with_user_agent(FixedUserAgent::new(USER_AGENT))
            .with_timeout(Duration::from_secs(2));
        let mut client = AtomeClient::with_config("test_login", "test_password", config);

        let err = client.login().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_identity() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(login_ok())
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.login().await.unwrap();
        assert!(client.login().await.is_err());
        assert_eq!(client.user_id(), Some("12345"));
        assert_eq!(client.user_reference(), Some("101234567"));
    }

    #[tokio::test]
    async fn injected_session_is_used() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .and(header("user-agent", "injected-agent"))
            .respond_with(login_ok())
            .expect(1)
            .mount(&server)
            .await;

        let session = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent("injected-agent")
            .build()
            .unwrap();
        let mut client = client(&server).with_session(session);
        client.login().await.unwrap();
    }
}

// ============================================================================
// Data retrieval
// ============================================================================

mod data {
    use super::*;

    #[tokio::test]
    async fn get_live() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let live = client.get_live().await.unwrap();

        assert_eq!(live["last"], 2289);
        assert_eq!(live, live_body());
    }

    #[tokio::test]
    async fn live_request_carries_session_cookie() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .and(header("cookie", session_cookie().as_str()))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        assert!(client.get_live().await.is_ok());
    }

    #[tokio::test]
    async fn consumption_for_every_period() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        for (code, total) in [("sod", 10), ("sow", 70), ("som", 300), ("soy", 3650)] {
            Mock::given(method("GET"))
                .and(path(CONSUMPTION_PATH))
                .and(query_param("period", code))
                .respond_with(ResponseTemplate::new(200).set_body_json(consumption_body(total)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let mut client = logged_in_client(&server).await;

        let day = client.get_consumption(Period::Day).await.unwrap();
        assert_eq!(day["total"], 10);

        let week = client.get_consumption(Period::Week).await.unwrap();
        assert_eq!(week["total"], 70);

        let month = client.get_consumption(Period::Month).await.unwrap();
        assert_eq!(month["total"], 300);

        let year = client.get_consumption(Period::Year).await.unwrap();
        assert_eq!(year["total"], 3650);
        assert_eq!(year, consumption_body(3650));
    }

    #[tokio::test]
    async fn empty_body_is_empty_response() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let err = client.get_live().await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse { status: 200 }));
    }

    #[tokio::test]
    async fn whitespace_body_is_empty_response() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(CONSUMPTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let err = client.get_consumption(Period::Week).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn non_json_body_is_protocol_error() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let err = client.get_live().await.unwrap_err();

        let chained = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<ParseError>())
            .and_then(std::error::Error::source)
            .and_then(|e| e.downcast_ref::<serde_json::Error>());
        assert!(chained.is_some());

        match err {
            Error::Protocol {
                status,
                body,
                source: ParseError::Json(_),
            } => {
                assert_eq!(status, 200);
                assert_eq!(body, "not json");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_protocol_error() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let err = client.get_live().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(matches!(
            err,
            Error::Protocol {
                source: ParseError::UnexpectedStatus(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn timeout_is_network_error() {
        let server = MockServer::start().await;
        mount_login(&server, 1).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(live_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = config(&server).with_timeout(Duration::from_millis(200));
        let mut client = AtomeClient::with_config("test_login", "test_password", config);
        client.login().await.unwrap();

        let err = client.get_live().await.unwrap_err();
        assert_eq!(err.status(), None);
        match err {
            Error::Network(e) => assert!(e.is_timeout()),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // not pooled, so dropping it closes the port
        let server = MockServer::builder().start().await;
        mount_login(&server, 1).await;

        let mut client = logged_in_client(&server).await;
        drop(server);

        let err = client.get_live().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
        assert_eq!(err.status(), None);
    }
}

// ============================================================================
// Session expiry
// ============================================================================

mod session_expiry {
    use super::*;

    #[tokio::test]
    async fn single_403_triggers_one_relogin_and_one_retry() {
        let server = MockServer::start().await;
        // initial login + one re-login
        mount_login(&server, 2).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("Wrong session"))
            .up_to_n_times(1)
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let live = client.get_live().await.unwrap();
        assert_eq!(live["last"], 2289);
    }

    #[tokio::test]
    async fn repeated_403_exhausts_retries() {
        let server = MockServer::start().await;
        let relogins = u64::from(MAX_RETRIES) + 1;
        mount_login(&server, 1 + relogins).await;

        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("Wrong session"))
            .expect(relogins)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let err = client.get_live().await.unwrap_err();
        assert!(matches!(err, Error::RetryExhausted { attempts: 4 }));
    }

    #[tokio::test]
    async fn last_allowed_retry_still_succeeds() {
        let server = MockServer::start().await;
        mount_login(&server, 1 + u64::from(MAX_RETRIES)).await;

        Mock::given(method("GET"))
            .and(path(CONSUMPTION_PATH))
            .respond_with(ResponseTemplate::new(403))
            .up_to_n_times(u64::from(MAX_RETRIES))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(CONSUMPTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(consumption_body(10)))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let day = client.get_consumption(Period::Day).await.unwrap();
        assert_eq!(day["total"], 10);
    }

    #[tokio::test]
    async fn failed_relogin_is_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(login_ok())
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(API_ENDPOINT_LOGIN))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        let err = client.get_live().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::Rejected { status: 401, .. })
        ));
    }
}

// ============================================================================
// Session lifecycle
// ============================================================================

mod session_lifecycle {
    use super::*;

    #[tokio::test]
    async fn closed_session_is_recreated_on_next_request() {
        let server = MockServer::start().await;
        mount_login(&server, 2).await;

        // a fresh session has no cookie and is treated as expired
        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .and(header("cookie", session_cookie().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_body()))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LIVE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("Wrong session"))
            .with_priority(10)
            .expect(1)
            .mount(&server)
            .await;

        let mut client = logged_in_client(&server).await;
        client.close_session();
        assert!(!client.has_session());
        assert_eq!(client.user_id(), Some("12345"));

        let live = client.get_live().await.unwrap();
        assert_eq!(live["last"], 2289);
        assert!(client.has_session());
    }

    #[tokio::test]
    async fn closed_session_without_login_fails() {
        let server = MockServer::start().await;

        let mut client = client(&server);
        client.close_session();

        assert!(matches!(client.get_live().await, Err(Error::NotLoggedIn)));
        assert!(matches!(
            client.get_consumption(Period::Month).await,
            Err(Error::NotLoggedIn)
        ));
        assert!(!client.has_session());

        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn login_after_close_opens_new_session() {
        let server = MockServer::start().await;
        mount_login(&server, 2).await;

        let mut client = logged_in_client(&server).await;
        client.close_session();
        client.login().await.unwrap();

        assert!(client.has_session());
        assert_eq!(client.user_reference(), Some("101234567"));
    }
}
