//! Route handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::agent::{RunStatus, ToolInvocation};
use crate::inference::ConnectionStatus;
use crate::tabular::SheetInfo;

use super::errors::ApiError;
use super::upload;
use super::AppState;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

// ─── Request / response bodies ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub filename: String,
    pub sheet_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectSheetRequest {
    pub sheet_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectSheetResponse {
    pub message: String,
    pub sheet_name: String,
    pub num_rows: usize,
    pub num_cols: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub result: String,
    pub tool_calls: Vec<ToolInvocation>,
}

// ─── Service ────────────────────────────────────────────────────────────────

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!("{} is running", state.config.app_name),
        "version": state.config.app_version,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn test_connection(State(state): State<AppState>) -> Json<ConnectionStatus> {
    let status = state.sessions.engine().probe().await;
    tracing::info!(status = %status.status, "connection test");
    Json(status)
}

// ─── Sessions ───────────────────────────────────────────────────────────────

/// Store the file, load it into a fresh session and register the session.
///
/// Nothing is registered and the stored file is removed if loading fails.
/// Sessions evicted to make room lose their upload directories.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (raw_name, bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
            .ok_or_else(|| ApiError::BadRequest(format!("missing '{UPLOAD_FIELD}' field")))?;
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let raw_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        break (raw_name, bytes);
    };

    let filename = upload::validate_filename(&raw_name)?;
    let mut session = state.sessions.new_session();
    let session_id = session.id();
    let upload_dir = state.config.upload_dir.clone();
    let path = upload::store(&upload_dir, session_id, &filename, &bytes).await?;

    let (session, loaded) = tokio::task::spawn_blocking(move || {
        let loaded = session.load(&path);
        (session, loaded)
    })
    .await?;

    let sheet_names = match loaded {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "upload rejected");
            upload::discard(&upload_dir, session_id).await;
            return Err(e.into());
        }
    };

    let (_, evicted) = state.sessions.insert(session);
    for id in evicted {
        upload::discard(&upload_dir, id).await;
    }
    Ok(Json(UploadResponse {
        session_id,
        filename,
        sheet_names,
    }))
}

pub async fn select_sheet(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectSheetRequest>,
) -> Result<Json<SelectSheetResponse>, ApiError> {
    let handle = state.sessions.get(session_id)?;
    let mut session = handle.lock_owned().await;
    let sheet_name = request.sheet_name;

    let name = sheet_name.clone();
    let sheet = tokio::task::spawn_blocking(move || session.select_sheet(&name)).await??;

    Ok(Json(SelectSheetResponse {
        message: format!("sheet '{sheet_name}' loaded"),
        sheet_name,
        num_rows: sheet.num_rows(),
        num_cols: sheet.num_cols(),
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }

    let handle = state.sessions.get(session_id)?;
    let session = handle.lock().await;
    let reply = session.analyze(query).await?;

    let status = match reply.status {
        RunStatus::Error => "error",
        RunStatus::Success | RunStatus::Incomplete => "success",
    };
    Ok(Json(AnalyzeResponse {
        status,
        result: reply.answer,
        tool_calls: reply.invocations,
    }))
}

pub async fn sheet_info(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SheetInfo>, ApiError> {
    let handle = state.sessions.get(session_id)?;
    let session = handle.lock().await;
    Ok(Json(session.sheet_info()?))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(session_id)?;
    upload::discard(&state.config.upload_dir, session_id).await;
    Ok(StatusCode::NO_CONTENT)
}
