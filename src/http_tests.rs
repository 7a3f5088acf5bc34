// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the shared HTTP helpers.

#[cfg(test)]
mod tests {
    use crate::config::ApiConfig;
    use crate::errors::SyncError;
    use crate::http::{build_client, send, status_error, ApiResponse};
    use reqwest::{Method, StatusCode};
    use serde::Deserialize;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        pong: bool,
    }

    fn response(status: StatusCode, body: &str) -> ApiResponse {
        ApiResponse {
            url: Url::parse("https://api.example.test/thing").unwrap(),
            status,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_uses_bearer_token_and_reads_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pong": true})))
            .expect(1)
            .mount(&server)
            .await;

        let config = ApiConfig::new("secret", &server.uri()).unwrap();
        let client = build_client(&config).unwrap();
        let url = config.endpoint(&["ping"]).unwrap();

        let response = send(&client, &config.token, Method::GET, url, None::<&()>)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        let pong: Pong = response.decode().unwrap();
        assert!(pong.pong);
    }

    #[tokio::test]
    async fn test_send_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(body_json(json!({"name": "alice"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let config = ApiConfig::new("secret", &server.uri()).unwrap();
        let client = build_client(&config).unwrap();
        let url = config.endpoint(&["echo"]).unwrap();

        let response = send(
            &client,
            &config.token,
            Method::POST,
            url,
            Some(&json!({"name": "alice"})),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_send_returns_error_statuses_to_caller() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let config = ApiConfig::new("secret", &server.uri()).unwrap();
        let client = build_client(&config).unwrap();
        let url = config.endpoint(&["missing"]).unwrap();

        let response = send(&client, &config.token, Method::GET, url, None::<&()>)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, "nope");
    }

    #[tokio::test]
    async fn test_send_reports_transport_failure() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let config = ApiConfig::new("secret", &uri).unwrap();
        let client = build_client(&config).unwrap();
        let url = config.endpoint(&["ping"]).unwrap();

        let err = send(&client, &config.token, Method::GET, url, None::<&()>)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Transport { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_decode_failure_is_malformed_response() {
        let err = response(StatusCode::OK, r#"{"ping": 1}"#)
            .decode::<Pong>()
            .unwrap_err();

        match err {
            SyncError::MalformedResponse { endpoint, reason } => {
                assert_eq!(endpoint, "https://api.example.test/thing");
                assert!(reason.contains("pong"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_status_error_maps_auth_failures() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = status_error("zerotier", response(status, ""));
            assert!(matches!(err, SyncError::Authentication { ref provider } if provider == "zerotier"));
        }
    }

    #[test]
    fn test_status_error_keeps_other_statuses() {
        let err = status_error("cloudflare", response(StatusCode::BAD_GATEWAY, "upstream"));

        match err {
            SyncError::Http { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }
}
