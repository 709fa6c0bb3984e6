//! Gateway-proxy event shapes.
//!
//! Handlers consume a `GatewayRequest` and produce a `GatewayResponse`
//! instead of touching framework types. The axum layer adapts between the
//! two at the route boundary.

use crate::errors::ApiError;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Inbound event, API-Gateway proxy style. All fields are optional on the
/// wire and default when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayRequest {
    pub path_parameters: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl GatewayRequest {
    /// Build an event from an incoming HTTP request. The body is carried
    /// base64-encoded so binary payloads survive the string field.
    pub fn from_http(
        path_parameters: HashMap<String, String>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        Self {
            path_parameters,
            headers,
            body: general_purpose::STANDARD.encode(&body),
            is_base64_encoded: true,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }

    /// Raw request bytes: base64-decoded when flagged, otherwise a latin-1
    /// encoding of the body string with unencodable characters dropped.
    pub fn raw_body(&self) -> Result<Vec<u8>, ApiError> {
        if self.is_base64_encoded {
            general_purpose::STANDARD
                .decode(self.body.trim())
                .map_err(|err| ApiError::MalformedMultipart(format!("invalid base64 body: {err}")))
        } else {
            Ok(self
                .body
                .chars()
                .filter(|c| (*c as u32) <= 0xff)
                .map(|c| c as u8)
                .collect())
        }
    }
}

/// Outbound event. Always carries a JSON body plus the CORS header the
/// original gateway exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    fn default_headers() -> HashMap<String, String> {
        HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ])
    }

    /// Serialize `body` as the JSON response payload.
    pub fn json(status_code: u16, body: &impl Serialize) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status_code,
                headers: Self::default_headers(),
                body,
            },
            Err(err) => Self {
                status_code: 500,
                headers: Self::default_headers(),
                body: json!({ "error": format!("response serialization failed: {err}") })
                    .to_string(),
            },
        }
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status_code: err.status_code(),
            headers: Self::default_headers(),
            body: json!({ "error": err.to_string() }).to_string(),
        }
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let event = GatewayRequest {
            headers: HashMap::from([(
                "Content-Type".to_string(),
                "multipart/form-data".to_string(),
            )]),
            ..Default::default()
        };
        assert_eq!(event.header("content-type"), Some("multipart/form-data"));
        assert_eq!(event.header("CONTENT-TYPE"), Some("multipart/form-data"));
        assert_eq!(event.header("accept"), None);
    }

    #[test]
    fn raw_body_decodes_base64() {
        let event = GatewayRequest {
            body: general_purpose::STANDARD.encode(b"\x00\x01binary"),
            is_base64_encoded: true,
            ..Default::default()
        };
        assert_eq!(event.raw_body().expect("decode"), b"\x00\x01binary");
    }

    #[test]
    fn raw_body_rejects_invalid_base64() {
        let event = GatewayRequest {
            body: "not base64 !!".to_string(),
            is_base64_encoded: true,
            ..Default::default()
        };
        assert!(event.raw_body().is_err());
    }

    #[test]
    fn raw_body_latin1_encodes_plain_strings() {
        let event = GatewayRequest {
            body: "caf\u{e9}\u{1f600}".to_string(),
            is_base64_encoded: false,
            ..Default::default()
        };
        // the emoji is unencodable in latin-1 and gets dropped
        assert_eq!(event.raw_body().expect("encode"), b"caf\xe9");
    }

    #[test]
    fn from_http_round_trips_binary_bodies() {
        let event = GatewayRequest::from_http(
            HashMap::new(),
            &HeaderMap::new(),
            Bytes::from_static(b"\xff\xfe\x00payload"),
        );
        assert!(event.is_base64_encoded);
        assert_eq!(event.raw_body().expect("decode"), b"\xff\xfe\x00payload");
    }

    #[test]
    fn responses_carry_json_and_cors_headers() {
        let response = GatewayResponse::json(200, &json!({ "ok": true }));
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(
            response
                .headers
                .get("Access-Control-Allow-Origin")
                .map(String::as_str),
            Some("*")
        );
        assert_eq!(response.body, r#"{"ok":true}"#);
    }

    #[test]
    fn error_responses_map_status_and_message() {
        let response = GatewayResponse::from_error(&ApiError::NotFound);
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, r#"{"error":"Not found"}"#);
    }
}
