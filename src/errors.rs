//! Request-level error taxonomy.
//!
//! Every handler resolves to one of these variants and maps it to an HTTP
//! status at the gateway boundary. Validation failures are detected before
//! any store call; store failures carry the underlying message.

use crate::multipart::MultipartError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Content-Type must be multipart/form-data")]
    InvalidContentType,

    #[error("Empty body")]
    EmptyBody,

    #[error("Missing file field (expected field name='file')")]
    MissingFilePart,

    #[error("malformed multipart payload: {0}")]
    MalformedMultipart(String),

    #[error("Missing id")]
    MissingId,

    #[error("Not found")]
    NotFound,

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("store read failed: {0}")]
    StoreRead(String),
}

impl ApiError {
    /// Status code this error maps to in a gateway response.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidContentType
            | ApiError::EmptyBody
            | ApiError::MissingFilePart
            | ApiError::MalformedMultipart(_)
            | ApiError::MissingId => 400,
            ApiError::NotFound => 404,
            ApiError::StoreWrite(_) | ApiError::StoreRead(_) => 500,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::InvalidContentType => ApiError::InvalidContentType,
            MultipartError::EmptyBody => ApiError::EmptyBody,
            MultipartError::MissingFilePart => ApiError::MissingFilePart,
            MultipartError::Malformed(detail) => ApiError::MalformedMultipart(detail),
        }
    }
}
