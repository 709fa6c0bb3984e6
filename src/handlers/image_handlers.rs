//! View, list, and delete handlers — thin wrappers over the two stores.

use crate::{
    errors::ApiError,
    models::{
        gateway::{GatewayRequest, GatewayResponse},
        image::ImageRecord,
    },
    services::StoreClients,
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
struct ViewResponse {
    #[serde(flatten)]
    record: ImageRecord,
    /// Time-limited retrieval URL for the stored object.
    url: String,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: String,
    key: String,
}

pub async fn view(stores: &StoreClients, event: &GatewayRequest) -> GatewayResponse {
    match run_view(stores, event).await {
        Ok(body) => GatewayResponse::json(200, &body),
        Err(err) => GatewayResponse::from_error(&err),
    }
}

async fn run_view(stores: &StoreClients, event: &GatewayRequest) -> Result<ViewResponse, ApiError> {
    let id = event.path_param("id").ok_or(ApiError::MissingId)?;
    let record = stores
        .metadata
        .get_item(id)
        .await
        .map_err(|err| ApiError::StoreRead(err.to_string()))?
        .ok_or(ApiError::NotFound)?;

    let url = stores
        .objects
        .get_signed_url(&record.filename, stores.objects.url_ttl_secs);
    Ok(ViewResponse { record, url })
}

pub async fn list(stores: &StoreClients, _event: &GatewayRequest) -> GatewayResponse {
    match stores.metadata.scan().await {
        Ok(records) => GatewayResponse::json(200, &records),
        Err(err) => GatewayResponse::from_error(&ApiError::StoreRead(err.to_string())),
    }
}

pub async fn delete(stores: &StoreClients, event: &GatewayRequest) -> GatewayResponse {
    match run_delete(stores, event).await {
        Ok(body) => GatewayResponse::json(200, &body),
        Err(err) => GatewayResponse::from_error(&err),
    }
}

async fn run_delete(
    stores: &StoreClients,
    event: &GatewayRequest,
) -> Result<DeleteResponse, ApiError> {
    let id = event.path_param("id").ok_or(ApiError::MissingId)?;
    let record = stores
        .metadata
        .get_item(id)
        .await
        .map_err(|err| ApiError::StoreRead(err.to_string()))?
        .ok_or(ApiError::NotFound)?;

    // Object removal is best-effort; the metadata row is the primary
    // success criterion.
    if let Err(err) = stores.objects.delete(&record.filename).await {
        warn!("failed to delete object `{}`: {err}", record.filename);
    }

    let removed = stores
        .metadata
        .delete_item(id)
        .await
        .map_err(|err| ApiError::StoreWrite(err.to_string()))?;
    if !removed {
        // a racing delete got there first
        return Err(ApiError::NotFound);
    }

    Ok(DeleteResponse {
        deleted: id.to_string(),
        key: record.filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StoreClients;
    use crate::test_support::test_stores;
    use bytes::Bytes;
    use serde_json::Value;
    use std::collections::HashMap;

    fn event_with_id(id: &str) -> GatewayRequest {
        GatewayRequest {
            path_parameters: HashMap::from([("id".to_string(), id.to_string())]),
            ..Default::default()
        }
    }

    fn parse_body(response: &GatewayResponse) -> Value {
        serde_json::from_str(&response.body).expect("json body")
    }

    async fn seed_image(stores: &StoreClients, id: &str) -> ImageRecord {
        let record = ImageRecord {
            id: id.to_string(),
            filename: format!("{id}.png"),
            user: "alice".to_string(),
            description: "seeded".to_string(),
            created_at: 1_700_000_000,
            original_name: "photo.png".to_string(),
        };
        stores
            .objects
            .put(&record.filename, &Bytes::from_static(b"pixels"))
            .await
            .expect("seed object");
        stores.metadata.put_item(&record).await.expect("seed record");
        record
    }

    #[tokio::test]
    async fn view_returns_record_with_signed_url() {
        let (stores, _dir) = test_stores().await;
        seed_image(&stores, "id-1").await;

        let response = view(&stores, &event_with_id("id-1")).await;
        assert_eq!(response.status_code, 200);

        let body = parse_body(&response);
        assert_eq!(body["id"], "id-1");
        assert_eq!(body["filename"], "id-1.png");
        assert_eq!(body["user"], "alice");
        assert_eq!(body["description"], "seeded");
        assert!(body["created_at"].is_i64());
        let url = body["url"].as_str().expect("url");
        assert!(url.starts_with("/files/id-1.png?expires="));
        assert!(url.contains("&sig="));
    }

    #[tokio::test]
    async fn view_without_id_is_a_client_error() {
        let (stores, _dir) = test_stores().await;
        let response = view(&stores, &GatewayRequest::default()).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(parse_body(&response)["error"], "Missing id");
    }

    #[tokio::test]
    async fn view_unknown_id_is_not_found() {
        let (stores, _dir) = test_stores().await;
        let response = view(&stores, &event_with_id("ghost")).await;
        assert_eq!(response.status_code, 404);
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let (stores, _dir) = test_stores().await;
        seed_image(&stores, "id-1").await;
        seed_image(&stores, "id-2").await;

        let response = list(&stores, &GatewayRequest::default()).await;
        assert_eq!(response.status_code, 200);
        let body = parse_body(&response);
        assert_eq!(body.as_array().expect("array").len(), 2);
    }

    #[tokio::test]
    async fn list_is_empty_before_any_upload() {
        let (stores, _dir) = test_stores().await;
        let response = list(&stores, &GatewayRequest::default()).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "[]");
    }

    #[tokio::test]
    async fn delete_removes_object_and_record() {
        let (stores, _dir) = test_stores().await;
        let record = seed_image(&stores, "id-1").await;

        let response = delete(&stores, &event_with_id("id-1")).await;
        assert_eq!(response.status_code, 200);
        let body = parse_body(&response);
        assert_eq!(body["deleted"], "id-1");
        assert_eq!(body["key"], "id-1.png");

        assert!(stores.metadata.get_item("id-1").await.expect("get").is_none());
        assert!(stores.objects.open_reader(&record.filename).await.is_err());
    }

    #[tokio::test]
    async fn deleting_a_missing_id_is_always_not_found() {
        let (stores, _dir) = test_stores().await;
        for _ in 0..3 {
            let response = delete(&stores, &event_with_id("ghost")).await;
            assert_eq!(response.status_code, 404);
            assert_eq!(parse_body(&response)["error"], "Not found");
        }
    }

    #[tokio::test]
    async fn delete_without_id_makes_no_store_calls() {
        let (stores, _dir) = test_stores().await;
        seed_image(&stores, "id-1").await;

        let response = delete(&stores, &GatewayRequest::default()).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(parse_body(&response)["error"], "Missing id");

        // the seeded entry is untouched
        assert!(stores.metadata.get_item("id-1").await.expect("get").is_some());
        assert!(stores.objects.open_reader("id-1.png").await.is_ok());
    }

    #[tokio::test]
    async fn delete_succeeds_when_object_is_already_gone() {
        let (stores, _dir) = test_stores().await;
        let record = seed_image(&stores, "id-1").await;
        stores.objects.delete(&record.filename).await.expect("pre-delete");

        let response = delete(&stores, &event_with_id("id-1")).await;
        assert_eq!(response.status_code, 200);
        assert!(stores.metadata.get_item("id-1").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn view_after_delete_is_not_found() {
        let (stores, _dir) = test_stores().await;
        seed_image(&stores, "id-1").await;

        assert_eq!(delete(&stores, &event_with_id("id-1")).await.status_code, 200);
        assert_eq!(view(&stores, &event_with_id("id-1")).await.status_code, 404);
    }

    #[tokio::test]
    async fn upload_then_view_round_trip() {
        use crate::handlers::upload_handlers::upload;
        use base64::{Engine as _, engine::general_purpose};

        let (stores, _dir) = test_stores().await;
        let boundary = "roundTripBoundary";
        let mut raw = Vec::new();
        raw.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"user\"\r\n\r\nbob\r\n"
            )
            .as_bytes(),
        );
        raw.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nround trip\r\n"
            )
            .as_bytes(),
        );
        raw.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"trip.png\"\r\n\r\npng-bytes\r\n"
            )
            .as_bytes(),
        );
        raw.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let upload_event = GatewayRequest {
            headers: HashMap::from([(
                "Content-Type".to_string(),
                format!("multipart/form-data; boundary={boundary}"),
            )]),
            body: general_purpose::STANDARD.encode(&raw),
            is_base64_encoded: true,
            ..Default::default()
        };

        let uploaded = parse_body(&upload(&stores, &upload_event).await);
        let id = uploaded["id"].as_str().expect("id");

        let viewed = parse_body(&view(&stores, &event_with_id(id)).await);
        assert_eq!(viewed["filename"], uploaded["key"]);
        assert_eq!(viewed["user"], "bob");
        assert_eq!(viewed["description"], "round trip");
        assert_eq!(viewed["original_name"], "trip.png");
    }
}
