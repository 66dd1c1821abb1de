use axum::Json;
use axum::extract::{Extension, State};
use clinic_core::Principal;
use serde_json::Value;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_settings_handler(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.settings_service.get_settings().await?))
}

pub async fn replace_settings_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    let settings = state
        .settings_service
        .replace_settings(&principal, payload)
        .await?;

    Ok(Json(settings))
}
