//! HTTP handlers for listing, folder creation, deletion, and transfer
//! grants. Payload bytes never pass through these handlers; uploads and
//! downloads go browser-to-store with the issued credential.

use crate::{
    errors::AppError,
    models::{grant::UploadGrant, listing::ListingPage},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use tracing::info;

/// Query params accepted by `GET /objects`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub prefix: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderReq {
    pub prefix: Option<String>,
    pub folder_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReq {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrantReq {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub prefix: Option<String>,
}

/// GET `/objects?prefix=&cursor=` — one listing page of direct children.
pub async fn list_objects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListingPage>, AppError> {
    let prefix = query.prefix.unwrap_or_default();
    // The client sends `cursor=` for the first page; treat it as absent.
    let cursor = query.cursor.filter(|c| !c.is_empty());
    info!(prefix = %prefix, cursor = cursor.as_deref(), "listing objects");

    let page = state.listing.list(&prefix, cursor.as_deref()).await?;
    Ok(Json(page))
}

/// POST `/objects/folder` — write a zero-byte folder marker.
pub async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<CreateFolderReq>,
) -> Result<StatusCode, AppError> {
    let name = req
        .folder_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::bad_request("Folder name is required"))?;
    let prefix = req.prefix.unwrap_or_default();

    state.folders.create_folder(&prefix, &name).await?;
    Ok(StatusCode::CREATED)
}

/// DELETE `/objects` — unconditional delete; absent keys succeed.
pub async fn delete_object(
    State(state): State<AppState>,
    Json(req): Json<DeleteReq>,
) -> Result<StatusCode, AppError> {
    let key = req
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::bad_request("Key is required"))?;
    info!(key = %key, "deleting object");

    state.store.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/objects/download?key=` — redirect to a one-hour signed GET URL.
pub async fn download_grant(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Redirect, AppError> {
    let key = query
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::bad_request("Key is required"))?;

    let url = state.transfer.authorize_download(&key).await?;
    Ok(Redirect::temporary(&url))
}

/// POST `/objects/upload` — issue a signed form-POST policy.
pub async fn upload_grant(
    State(state): State<AppState>,
    Json(req): Json<UploadGrantReq>,
) -> Result<Json<UploadGrant>, AppError> {
    let (Some(file_name), Some(file_type)) = (
        req.file_name.filter(|n| !n.is_empty()),
        req.file_type.filter(|t| !t.is_empty()),
    ) else {
        return Err(AppError::bad_request("File name and type are required"));
    };
    let prefix = req.prefix.unwrap_or_default();

    let grant = state
        .transfer
        .authorize_upload(&prefix, &file_name, &file_type)
        .await?;
    Ok(Json(grant))
}
