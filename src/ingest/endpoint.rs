//! Gateway endpoint derivation.
//!
//! The receive stream lives at `<ws-scheme>://<host>/v1/receive/<account>`,
//! derived from the configured HTTP(S) base URL. An optional bearer token is
//! attached to the WebSocket upgrade request.

use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use super::traits::{IngestError, IngestResult};

/// Derive the WebSocket receive URL from an HTTP(S) base URL and account.
///
/// `ws://` and `wss://` bases pass through unchanged; trailing slashes on
/// the base are tolerated.
pub fn receive_url(base_url: &str, account: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };

    format!("{}/v1/receive/{}", ws_base, account)
}

/// Build the WebSocket upgrade request, attaching `Authorization: Bearer`
/// when a token is configured.
pub fn client_request(url: &str, auth_token: Option<&str>) -> IngestResult<Request> {
    let mut request = url
        .into_client_request()
        .map_err(|e| IngestError::Config(format!("Invalid gateway URL '{}': {}", url, e)))?;

    if let Some(token) = auth_token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| IngestError::Config(format!("Invalid auth token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_base_becomes_wss() {
        assert_eq!(
            receive_url("https://signal.example.org", "+16135550123"),
            "wss://signal.example.org/v1/receive/+16135550123"
        );
    }

    #[test]
    fn test_http_base_becomes_ws() {
        assert_eq!(
            receive_url("http://localhost:8080", "+1555"),
            "ws://localhost:8080/v1/receive/+1555"
        );
    }

    #[test]
    fn test_ws_base_passes_through() {
        assert_eq!(
            receive_url("ws://127.0.0.1:9000", "acct"),
            "ws://127.0.0.1:9000/v1/receive/acct"
        );
    }

    #[test]
    fn test_trailing_slash_tolerated() {
        assert_eq!(
            receive_url("https://signal.example.org/", "+1555"),
            "wss://signal.example.org/v1/receive/+1555"
        );
    }

    #[test]
    fn test_request_with_token_has_bearer_header() {
        let request = client_request("ws://localhost:8080/v1/receive/x", Some("s3cret")).unwrap();
        let auth = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer s3cret");
    }

    #[test]
    fn test_request_without_token_has_no_auth_header() {
        let request = client_request("ws://localhost:8080/v1/receive/x", None).unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = client_request("not a url", None).unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn test_invalid_token_is_config_error() {
        let err = client_request("ws://localhost:8080", Some("bad\ntoken")).unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }
}
