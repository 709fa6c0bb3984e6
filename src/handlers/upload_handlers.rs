//! Upload pipeline: decode the multipart event, derive the object key,
//! write the payload, then register the metadata record. The object write
//! always happens first so no record ever references a key that was not
//! stored. A metadata failure after the object write is not rolled back;
//! the orphaned object is logged for out-of-band cleanup.

use crate::{
    errors::ApiError,
    models::{
        gateway::{GatewayRequest, GatewayResponse},
        image::ImageRecord,
    },
    multipart,
    services::StoreClients,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct UploadResponse {
    id: String,
    key: String,
    bucket: String,
    message: String,
}

pub async fn upload(stores: &StoreClients, event: &GatewayRequest) -> GatewayResponse {
    match run_upload(stores, event).await {
        Ok(body) => GatewayResponse::json(200, &body),
        Err(err) => GatewayResponse::from_error(&err),
    }
}

async fn run_upload(
    stores: &StoreClients,
    event: &GatewayRequest,
) -> Result<UploadResponse, ApiError> {
    // Provisioning is idempotent and non-fatal; the write below surfaces
    // any real storage failure.
    if let Err(err) = stores.objects.ensure_bucket().await {
        warn!("bucket provisioning check failed: {err}");
    }

    let content_type = event
        .header("content-type")
        .ok_or(ApiError::InvalidContentType)?;
    let raw = event.raw_body()?;
    let form = multipart::decode(content_type, &raw)?;

    let user = form
        .fields
        .get("user")
        .cloned()
        .unwrap_or_else(|| "anonymous".to_string());
    let description = form.fields.get("description").cloned().unwrap_or_default();

    let id = Uuid::new_v4().to_string();
    let key = format!("{id}{}", extension_of(form.file_name.as_deref()));

    stores
        .objects
        .put(&key, &form.file_bytes)
        .await
        .map_err(|err| ApiError::StoreWrite(err.to_string()))?;

    let record = ImageRecord {
        id: id.clone(),
        filename: key.clone(),
        user,
        description,
        created_at: Utc::now().timestamp(),
        original_name: form.file_name.unwrap_or_default(),
    };
    if let Err(err) = stores.metadata.put_item(&record).await {
        error!("metadata write failed after object write, `{key}` is orphaned: {err}");
        return Err(ApiError::StoreWrite(err.to_string()));
    }

    Ok(UploadResponse {
        id,
        key,
        bucket: stores.objects.bucket.clone(),
        message: "Upload successful".to_string(),
    })
}

/// Extension of the declared filename: the substring after its last `.`,
/// prefixed with `.`. Empty when the name is absent, empty, or dotless.
fn extension_of(original: Option<&str>) -> String {
    match original {
        Some(name) if !name.is_empty() => match name.rsplit_once('.') {
            Some((_, ext)) => format!(".{ext}"),
            None => String::new(),
        },
        _ => String::new(),
    }
}
