use axum::Json;
use axum::extract::State;
use tracing::info;

use crate::dto::{LoginRequest, LoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let outcome = state
        .authentication_service
        .login(payload.email.as_str(), payload.password.as_str())
        .await?;

    info!(user_id = %outcome.principal.user_id(), "user signed in");
    Ok(Json(LoginResponse::from(outcome)))
}
