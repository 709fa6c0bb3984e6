//! Signed-URL object download.
//!
//! `GET /files/{key}?expires={epoch}&sig={hex}` serves the raw payload the
//! view handler's signed URLs point at. This is the object store's own
//! surface, so it speaks plain HTTP rather than the gateway event shape:
//! 403 for a missing, invalid, or expired signature, 404 for a missing
//! object, and a streamed body otherwise.

use crate::services::{StoreClients, object_store::ObjectStoreError};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header, HeaderValue},
    response::Response,
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
    pub expires: Option<i64>,
    pub sig: Option<String>,
}

pub async fn download(
    State(stores): State<StoreClients>,
    Path(key): Path<String>,
    Query(query): Query<SignedUrlQuery>,
) -> Response {
    let (Some(expires), Some(sig)) = (query.expires, query.sig.as_deref()) else {
        return error_response(StatusCode::FORBIDDEN, "missing signature");
    };
    if !stores.objects.verify_signature(&key, expires, sig) {
        return error_response(StatusCode::FORBIDDEN, "invalid or expired signature");
    }

    match stores.objects.open_reader(&key).await {
        Ok(file) => {
            let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            response
        }
        Err(ObjectStoreError::NotFound(_)) | Err(ObjectStoreError::InvalidKey) => {
            error_response(StatusCode::NOT_FOUND, "no such object")
        }
        Err(err) => {
            error!("object read failed for `{key}`: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "object read failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let mut response = Response::new(Body::from(
        serde_json::json!({ "error": message }).to_string(),
    ));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
