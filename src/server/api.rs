//! JSON endpoints: list, ls, delete, rename, mkdir, move.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::sandbox::{self, DirectoryListing, ListMode};
use super::{blocking, ActionResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePayload {
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePayload {
    pub old_path: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MkdirPayload {
    #[serde(default)]
    pub path: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MovePayload {
    pub from: String,
    pub to: String,
}

/// Unwrap a JSON body, turning any rejection (syntax, missing field, content type) into a 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(rej) => {
            warn!("Error decoding request body: {}", rej.body_text());
            Err(AppError::user("invalid_json", format!("Invalid JSON: {}", rej.body_text())))
        }
    }
}

pub async fn list_handler(State(state): State<AppState>, Query(q): Query<PathQuery>) -> AppResult<Json<DirectoryListing>> {
    info!("Listing directory: {}", display_path(&q.path));
    let root = state.root.clone();
    let listing = blocking(move || sandbox::list_directory(&root, &q.path, ListMode::Full)).await?;
    Ok(Json(listing))
}

pub async fn ls_handler(State(state): State<AppState>, Query(q): Query<PathQuery>) -> AppResult<Json<DirectoryListing>> {
    let root = state.root.clone();
    let listing = blocking(move || sandbox::list_directory(&root, &q.path, ListMode::DirectoriesOnly)).await?;
    Ok(Json(listing))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeletePayload>, JsonRejection>,
) -> AppResult<Json<ActionResult>> {
    let req = json_body(payload)?;
    info!("Delete request for path: {}", req.path);
    let root = state.root.clone();
    let path = req.path.clone();
    let removed = blocking(move || sandbox::delete_entry(&root, &path)).await.inspect_err(|e| {
        warn!("Delete of {} failed: {}", req.path, e);
    })?;
    info!("Successfully deleted: {}", removed.display());
    Ok(ActionResult::ok("File deleted successfully"))
}

pub async fn rename_handler(
    State(state): State<AppState>,
    payload: Result<Json<RenamePayload>, JsonRejection>,
) -> AppResult<Json<ActionResult>> {
    let req = json_body(payload)?;
    let root = state.root.clone();
    blocking(move || sandbox::rename_entry(&root, &req.old_path, &req.new_name)).await?;
    Ok(ActionResult::ok("File renamed successfully"))
}

pub async fn mkdir_handler(
    State(state): State<AppState>,
    payload: Result<Json<MkdirPayload>, JsonRejection>,
) -> AppResult<Json<ActionResult>> {
    let req = json_body(payload)?;
    let root = state.root.clone();
    blocking(move || sandbox::make_directory(&root, &req.path, &req.name)).await?;
    Ok(ActionResult::ok("Directory created successfully"))
}

pub async fn move_handler(
    State(state): State<AppState>,
    payload: Result<Json<MovePayload>, JsonRejection>,
) -> AppResult<Json<ActionResult>> {
    let req = json_body(payload)?;
    let root = state.root.clone();
    blocking(move || sandbox::move_entry(&root, &req.from, &req.to)).await?;
    Ok(ActionResult::ok("File moved successfully"))
}

fn display_path(p: &str) -> &str { if p.is_empty() { "/" } else { p } }
