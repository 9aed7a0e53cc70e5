//! Multipart upload endpoint.
//!
//! Form fields may arrive in any order (the web client sends `file` first), so the file
//! part is spooled to the staging directory while the remaining fields are collected;
//! placement happens once the whole form has been read.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::sandbox::{self, SpooledUpload, UploadOutcome, UploadRequest};
use super::{blocking, AppState};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Stored { success: bool, message: String },
    Conflict { success: bool, error: String, conflict: bool, filename: String },
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Stored(_) => UploadResponse::Stored { success: true, message: "File uploaded successfully".into() },
            UploadOutcome::Conflict { filename } => UploadResponse::Conflict {
                success: false,
                error: "File already exists".into(),
                conflict: true,
                filename,
            },
        }
    }
}

fn bad_form(err: MultipartError) -> AppError { form_error(err.status(), err.body_text()) }

/// A body over the configured limit keeps its 413; anything else is a malformed form.
fn form_error(status: StatusCode, detail: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::too_large("payload_too_large", format!("Upload exceeds the size limit: {}", detail))
    } else {
        AppError::user("bad_form", format!("Error parsing form: {}", detail))
    }
}

fn is_true(value: &str) -> bool { value.trim() == "true" }

pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|rej| form_error(rej.status(), rej.body_text()))?;
    let mut req = UploadRequest { path: "/".to_string(), ..Default::default() };
    let mut spooled: Option<SpooledUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                if spooled.is_some() {
                    return Err(AppError::user("bad_form", "only one file may be uploaded per request"));
                }
                let declared = field.file_name().unwrap_or_default().to_string();
                let chunks = field.map(|chunk| chunk.map_err(bad_form));
                spooled = Some(sandbox::spool(&state.staging_dir, &declared, chunks).await?);
            }
            Some("path") => {
                let value = field.text().await.map_err(bad_form)?;
                if !value.is_empty() {
                    req.path = value;
                }
            }
            Some("overwrite") => req.overwrite = is_true(&field.text().await.map_err(bad_form)?),
            Some("createPath") => req.create_path = is_true(&field.text().await.map_err(bad_form)?),
            _ => {}
        }
    }

    let Some(upload) = spooled else {
        return Err(AppError::user("missing_file", "Error getting uploaded file"));
    };
    if upload.is_empty() {
        debug!(file = %upload.declared_name(), "upload has an empty body");
    }
    info!(
        path = %req.path, file = %upload.declared_name(), bytes = upload.len(),
        overwrite = req.overwrite, create_path = req.create_path, "upload received"
    );

    let root = state.root.clone();
    let outcome = blocking(move || sandbox::store_upload(&root, &req, upload)).await?;
    if let UploadOutcome::Conflict { filename } = &outcome {
        warn!("Upload conflict, file already exists: {}", filename);
    }
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn conflict_body_shape() {
        let body = serde_json::to_value(UploadResponse::from(UploadOutcome::Conflict { filename: "a.txt".into() })).unwrap();
        assert_eq!(body, serde_json::json!({
            "success": false, "error": "File already exists", "conflict": true, "filename": "a.txt"
        }));
    }

    #[test]
    fn stored_body_shape() {
        let body = serde_json::to_value(UploadResponse::from(UploadOutcome::Stored(PathBuf::from("/x")))).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "message": "File uploaded successfully"}));
    }

    #[test]
    fn oversized_body_maps_to_payload_too_large() {
        let err = form_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert_eq!(err.http_status(), 413);
        assert_eq!(err.code_str(), "payload_too_large");

        let err = form_error(StatusCode::BAD_REQUEST, "missing boundary".into());
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.code_str(), "bad_form");
    }

    #[test]
    fn only_literal_true_enables_flags() {
        assert!(is_true("true"));
        assert!(is_true(" true\n"));
        assert!(!is_true("1"));
        assert!(!is_true("false"));
        assert!(!is_true(""));
    }
}
