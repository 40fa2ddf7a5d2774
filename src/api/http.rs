//! Thin JSON facade over `GraphEngine`, one route per `ADBMS/server.py`
//! endpoint. The engine stays fully synchronous — handlers take the shared
//! `Mutex` lock for the duration of one call, mirroring the reference
//! server's single-process, single-writer model rather than introducing
//! any concurrency the engine itself doesn't have.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::engine::GraphEngine;
use crate::error::DBError;
use crate::value::Value;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<GraphEngine>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/databases", get(list_databases).post(create_database))
        .route("/api/databases/:name", delete(delete_database).put(use_database))
        .route("/api/databases/:name/rename", put(rename_database))
        .route("/api/nodes", post(add_node).get(list_nodes))
        .route("/api/nodes/:id", get(get_node).put(update_node).delete(delete_node))
        .route("/api/nodes/find/:name", get(find_by_name))
        .route("/api/edges", post(add_edge).delete(delete_edge))
        .route("/api/query", post(run_query))
        .route("/api/indexes", get(list_indexes).post(create_index))
        .route("/api/indexes/:attribute", delete(drop_index))
        .route("/api/path", post(find_path))
        .route("/api/transaction", post(begin_transaction))
        .route("/api/transaction/commit", post(commit_transaction))
        .route("/api/transaction/rollback", post(rollback_transaction))
        .route("/api/transaction/stop", post(stop_transaction))
        .route("/api/backup", post(backup_database))
        .route("/api/restore", post(restore_database))
        .route("/api/export", post(export_database))
        .route("/api/import", post(import_database))
        .with_state(state)
}

pub struct ApiError(DBError);

impl From<DBError> for ApiError {
    fn from(err: DBError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DBError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn lock(state: &AppState) -> std::sync::MutexGuard<'_, GraphEngine> {
    state.engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Deserialize)]
struct NameRequest {
    name: String,
}

async fn list_databases(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(lock(&state).list_databases())
}

async fn create_database(State(state): State<AppState>, Json(req): Json<NameRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).create_database(&req.name)?;
    Ok(Json(json!({ "created": req.name })))
}

async fn delete_database(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<serde_json::Value> {
    lock(&state).delete_database(&name)?;
    Ok(Json(json!({ "deleted": name })))
}

async fn use_database(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<serde_json::Value> {
    lock(&state).use_database(&name)?;
    Ok(Json(json!({ "active": name })))
}

#[derive(Deserialize)]
struct RenameRequest {
    new_name: String,
}

async fn rename_database(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<serde_json::Value> {
    lock(&state).rename_database(&name, &req.new_name)?;
    Ok(Json(json!({ "renamed_to": req.new_name })))
}

async fn add_node(State(state): State<AppState>, Json(value): Json<HashMap<String, Value>>) -> ApiResult<serde_json::Value> {
    let id = lock(&state).add_node(value)?;
    Ok(Json(json!({ "id": id })))
}

async fn list_nodes(State(state): State<AppState>) -> ApiResult<HashMap<Uuid, HashMap<String, Value>>> {
    Ok(Json(lock(&state).list_all_nodes()?))
}

async fn get_node(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<HashMap<String, Value>> {
    Ok(Json(lock(&state).get_value(id)?))
}

async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(value): Json<HashMap<String, Value>>,
) -> ApiResult<serde_json::Value> {
    lock(&state).update_node(id, value)?;
    Ok(Json(json!({ "updated": id })))
}

async fn delete_node(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<serde_json::Value> {
    lock(&state).delete_node(id)?;
    Ok(Json(json!({ "deleted": id })))
}

async fn find_by_name(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Vec<Uuid>> {
    Ok(Json(lock(&state).find_by_name(&name)?))
}

#[derive(Deserialize)]
struct EdgeRequest {
    source: Uuid,
    target: Uuid,
    label: Option<String>,
    weight: Option<f64>,
}

async fn add_edge(State(state): State<AppState>, Json(req): Json<EdgeRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).add_edge(req.source, req.target, req.label, req.weight)?;
    Ok(Json(json!({ "linked": true })))
}

#[derive(Deserialize)]
struct EdgeEndpoints {
    source: Uuid,
    target: Uuid,
}

async fn delete_edge(State(state): State<AppState>, Json(req): Json<EdgeEndpoints>) -> ApiResult<serde_json::Value> {
    lock(&state).delete_edge(req.source, req.target)?;
    Ok(Json(json!({ "unlinked": true })))
}

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
    #[serde(default)]
    cast_non_strings: bool,
    #[serde(default)]
    case_sensitive: bool,
}

#[derive(Serialize)]
struct QueryHit {
    id: Uuid,
    value: HashMap<String, Value>,
}

async fn run_query(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> ApiResult<Vec<QueryHit>> {
    let hits = lock(&state).query(&req.query, req.cast_non_strings, req.case_sensitive)?;
    Ok(Json(hits.into_iter().map(|(id, value)| QueryHit { id, value }).collect()))
}

async fn list_indexes(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(lock(&state).list_indexes()?))
}

#[derive(Deserialize)]
struct AttributeRequest {
    attribute: String,
}

async fn create_index(State(state): State<AppState>, Json(req): Json<AttributeRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).create_index(&req.attribute)?;
    Ok(Json(json!({ "indexed": req.attribute })))
}

async fn drop_index(State(state): State<AppState>, Path(attribute): Path<String>) -> ApiResult<serde_json::Value> {
    lock(&state).drop_index(&attribute)?;
    Ok(Json(json!({ "dropped": attribute })))
}

async fn find_path(State(state): State<AppState>, Json(req): Json<EdgeEndpoints>) -> ApiResult<Option<Vec<Uuid>>> {
    Ok(Json(lock(&state).find_path(req.source, req.target)?))
}

async fn begin_transaction(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    lock(&state).begin()?;
    Ok(Json(json!({ "transaction": "started" })))
}

async fn commit_transaction(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    lock(&state).commit()?;
    Ok(Json(json!({ "transaction": "committed" })))
}

async fn rollback_transaction(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    lock(&state).rollback()?;
    Ok(Json(json!({ "transaction": "rolled_back" })))
}

async fn stop_transaction(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    lock(&state).stop()?;
    Ok(Json(json!({ "transaction": "stopped" })))
}

#[derive(Deserialize)]
struct BackupRequest {
    db_name: String,
    backup_file: String,
}

async fn backup_database(State(state): State<AppState>, Json(req): Json<BackupRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).backup_database(&req.db_name, &req.backup_file)?;
    Ok(Json(json!({ "backed_up": req.db_name })))
}

#[derive(Deserialize)]
struct RestoreRequest {
    db_name: String,
    backup_file: String,
}

async fn restore_database(State(state): State<AppState>, Json(req): Json<RestoreRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).restore_database(&req.db_name, &req.backup_file)?;
    Ok(Json(json!({ "restored": req.db_name })))
}

#[derive(Deserialize)]
struct ExportRequest {
    db_name: String,
    export_file: String,
}

async fn export_database(State(state): State<AppState>, Json(req): Json<ExportRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).export_database(&req.db_name, &req.export_file)?;
    Ok(Json(json!({ "exported": req.db_name })))
}

#[derive(Deserialize)]
struct ImportRequest {
    db_name: String,
    import_file: String,
    #[serde(default)]
    merge: bool,
}

async fn import_database(State(state): State<AppState>, Json(req): Json<ImportRequest>) -> ApiResult<serde_json::Value> {
    lock(&state).import_database(&req.db_name, &req.import_file, req.merge)?;
    Ok(Json(json!({ "imported": req.db_name })))
}
