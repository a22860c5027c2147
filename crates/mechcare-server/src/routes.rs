use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mechcare_core::repository::today;
use mechcare_core::{
    Dataset, Log, Machine, MachineHealth, MachinePatch, NewLog, NewMachine, NumericInput,
    Repository,
};

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
}

type ApiResult<T> = Result<T, ApiError>;

/// Build the full router: the JSON API under `/api` plus a liveness probe.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/machines", get(list_machines).post(create_machine))
        .route(
            "/machines/{id}",
            get(get_machine).put(update_machine).delete(delete_machine),
        )
        .route("/machines/{id}/logs", get(list_machine_logs))
        .route("/machines/{id}/runtime", post(add_runtime))
        .route("/machines/{id}/health", get(machine_health))
        .route("/logs", post(create_log))
        .route("/data", get(export_data).post(import_data));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /api/machines`
async fn list_machines(State(state): State<AppState>) -> ApiResult<Json<Vec<Machine>>> {
    Ok(Json(state.repo.list_machines().await?))
}

/// `GET /api/machines/{id}`
async fn get_machine(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<Machine>> {
    Ok(Json(state.repo.get_machine(&id).await?))
}

/// `POST /api/machines`
async fn create_machine(
    State(state): State<AppState>,
    body: Result<Json<NewMachine>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Machine>)> {
    let Json(input) = body?;
    let machine = state.repo.create_machine(input).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

/// `PUT /api/machines/{id}`
async fn update_machine(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<MachinePatch>, JsonRejection>,
) -> ApiResult<Json<Machine>> {
    let Json(patch) = body?;
    Ok(Json(state.repo.update_machine(&id, patch).await?))
}

/// `DELETE /api/machines/{id}`
async fn delete_machine(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let removed_logs = state.repo.delete_machine(&id).await?;
    Ok(Json(json!({
        "message": "Machine deleted successfully",
        "removedLogs": removed_logs,
    })))
}

/// `GET /api/machines/{id}/logs`: newest service date first.
async fn list_machine_logs(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Log>>> {
    Ok(Json(state.repo.list_logs_for_machine(&id).await?))
}

#[derive(Debug, Deserialize)]
struct RuntimeRequest {
    hours: NumericInput,
}

/// `POST /api/machines/{id}/runtime`: add operating hours.
async fn add_runtime(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<RuntimeRequest>, JsonRejection>,
) -> ApiResult<Json<Machine>> {
    let Json(req) = body?;
    Ok(Json(state.repo.accumulate_runtime(&id, &req.hours).await?))
}

#[derive(Debug, Deserialize)]
struct HealthQuery {
    today: Option<NaiveDate>,
}

/// `GET /api/machines/{id}/health[?today=YYYY-MM-DD]`
async fn machine_health(
    Path(id): Path<String>,
    State(state): State<AppState>,
    query: Result<Query<HealthQuery>, QueryRejection>,
) -> ApiResult<Json<MachineHealth>> {
    let Query(query) = query?;
    let on = query.today.unwrap_or_else(today);
    Ok(Json(state.repo.machine_health(&id, on).await?))
}

/// `POST /api/logs`: may advance the machine's last maintenance date.
async fn create_log(
    State(state): State<AppState>,
    body: Result<Json<NewLog>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Log>)> {
    let Json(input) = body?;
    let log = state.repo.create_log(input).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// `GET /api/data`: full dataset export.
async fn export_data(State(state): State<AppState>) -> ApiResult<Json<Dataset>> {
    Ok(Json(state.repo.export().await?))
}

/// `POST /api/data`: replace the whole dataset.
async fn import_data(
    State(state): State<AppState>,
    body: Result<Json<Dataset>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(dataset) = body?;
    state.repo.import(dataset).await?;
    Ok(Json(json!({ "message": "Data saved successfully" })))
}
