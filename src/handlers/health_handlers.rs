//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks DB connectivity and disk I/O

use crate::services::StoreClients;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;
use tokio::fs;
use uuid::Uuid;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that:
/// 1. Runs a lightweight query against the metadata database (`SELECT 1`).
/// 2. Performs a best-effort write/read/delete under the object-store root.
///
/// Returns JSON describing each check. HTTP 200 when all checks pass,
/// HTTP 503 when any check fails.
pub async fn readyz(State(stores): State<StoreClients>) -> impl IntoResponse {
    let (sqlite_ok, sqlite_err) = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*stores.metadata.db)
        .await
    {
        Ok(1) => (true, None),
        Ok(v) => (false, Some(format!("unexpected result: {v}"))),
        Err(e) => (false, Some(format!("error: {e}"))),
    };

    let (disk_ok, disk_err) = disk_check(&stores).await;

    let overall_ok = sqlite_ok && disk_ok;
    let mut checks = HashMap::new();
    checks.insert(
        "sqlite",
        CheckStatus {
            ok: sqlite_ok,
            error: sqlite_err,
        },
    );
    checks.insert(
        "disk",
        CheckStatus {
            ok: disk_ok,
            error: disk_err,
        },
    );

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadyResponse {
            status: if overall_ok { "ok" } else { "error" }.into(),
            checks,
        }),
    )
}

/// Write, read back, and remove a temp file under the object-store root.
async fn disk_check(stores: &StoreClients) -> (bool, Option<String>) {
    let tmp_path = stores
        .objects
        .base_path
        .join(format!(".readyz-{}", Uuid::new_v4()));
    match fs::write(&tmp_path, b"readyz").await {
        Ok(_) => {
            let outcome = match fs::read(&tmp_path).await {
                Ok(bytes) if bytes == b"readyz" => (true, None),
                Ok(_) => (false, Some("file content mismatch".to_string())),
                Err(e) => (false, Some(format!("could not read tmp file: {e}"))),
            };
            let _ = fs::remove_file(&tmp_path).await;
            outcome
        }
        Err(e) => (false, Some(format!("could not write tmp file: {e}"))),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
