//! Generic handlers shared by every clinic record collection.
//!
//! The collection comes from the guard's access decision, so one set of
//! handlers serves `/api/patients`, `/api/lab-tests` and the rest.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use clinic_application::RecordUpdateMode;
use clinic_core::{AppError, Principal};
use serde_json::Value;
use uuid::Uuid;

use crate::dto::RecordResponse;
use crate::error::ApiResult;
use crate::middleware::ResolvedAccess;
use crate::state::AppState;

pub async fn list_records_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(access): Extension<ResolvedAccess>,
) -> ApiResult<Json<Vec<RecordResponse>>> {
    let records = state
        .record_service
        .list_records(&principal, access.record_collection()?)
        .await?
        .into_iter()
        .map(RecordResponse::from)
        .collect();

    Ok(Json(records))
}

pub async fn get_record_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(access): Extension<ResolvedAccess>,
    Path(record_id): Path<String>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .record_service
        .get_record(&principal, access.record_collection()?, parse_record_id(&record_id)?)
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

pub async fn create_record_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(access): Extension<ResolvedAccess>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let record = state
        .record_service
        .create_record(&principal, access.record_collection()?, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

pub async fn replace_record_handler(
    state: State<AppState>,
    principal: Extension<Principal>,
    access: Extension<ResolvedAccess>,
    record_id: Path<String>,
    payload: Json<Value>,
) -> ApiResult<Json<RecordResponse>> {
    update_record(state, principal, access, record_id, payload, RecordUpdateMode::Replace).await
}

pub async fn merge_record_handler(
    state: State<AppState>,
    principal: Extension<Principal>,
    access: Extension<ResolvedAccess>,
    record_id: Path<String>,
    payload: Json<Value>,
) -> ApiResult<Json<RecordResponse>> {
    update_record(state, principal, access, record_id, payload, RecordUpdateMode::Merge).await
}

pub async fn delete_record_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(access): Extension<ResolvedAccess>,
    Path(record_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .record_service
        .delete_record(&principal, access.record_collection()?, parse_record_id(&record_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn update_record(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(access): Extension<ResolvedAccess>,
    Path(record_id): Path<String>,
    Json(payload): Json<Value>,
    mode: RecordUpdateMode,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .record_service
        .update_record(
            &principal,
            access.record_collection()?,
            parse_record_id(&record_id)?,
            payload,
            mode,
        )
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

fn parse_record_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| AppError::Validation(format!("record id '{value}' is not a valid UUID")))
}
