//! Defines routes for all image-hosting operations.
//!
//! ## Structure
//! - **Image endpoints** (gateway-event handlers)
//!   - `POST   /images` — multipart upload
//!   - `GET    /images` — list all records
//!   - `GET    /images/{id}` — view one record (with signed URL)
//!   - `DELETE /images/{id}` — delete record and payload
//!
//! - **Service endpoints** (plain HTTP)
//!   - `GET /files/{key}` — signed-URL object download
//!   - `GET /healthz`, `GET /readyz` — probes
//!
//! The one-line adapters below translate each HTTP request into a
//! `GatewayRequest` so the image handlers stay framework-free.

use crate::{
    handlers::{
        file_handlers::download,
        health_handlers::{healthz, readyz},
        image_handlers, upload_handlers,
    },
    models::gateway::{GatewayRequest, GatewayResponse},
    services::StoreClients,
};
use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};
use std::collections::HashMap;

/// Build the router for all image-host routes. The router carries the
/// shared `StoreClients` state into every handler.
pub fn routes() -> Router<StoreClients> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/images", post(upload).get(list))
        .route("/images/{id}", get(view).delete(delete))
        .route("/files/{key}", get(download))
}

async fn upload(
    State(stores): State<StoreClients>,
    headers: HeaderMap,
    body: Bytes,
) -> GatewayResponse {
    let event = GatewayRequest::from_http(HashMap::new(), &headers, body);
    upload_handlers::upload(&stores, &event).await
}

async fn list(State(stores): State<StoreClients>, headers: HeaderMap) -> GatewayResponse {
    let event = GatewayRequest::from_http(HashMap::new(), &headers, Bytes::new());
    image_handlers::list(&stores, &event).await
}

async fn view(
    State(stores): State<StoreClients>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResponse {
    let event = GatewayRequest::from_http(id_param(id), &headers, Bytes::new());
    image_handlers::view(&stores, &event).await
}

async fn delete(
    State(stores): State<StoreClients>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResponse {
    let event = GatewayRequest::from_http(id_param(id), &headers, Bytes::new());
    image_handlers::delete(&stores, &event).await
}

fn id_param(id: String) -> HashMap<String, String> {
    HashMap::from([("id".to_string(), id)])
}
