use axum::Json;
use axum::extract::{Extension, State};
use clinic_core::{AppError, ClinicId, Principal};
use tower_sessions::Session;

use crate::dto::{PrincipalResponse, SelectClinicRequest, SessionClinicResponse, SessionResponse};
use crate::error::ApiResult;
use crate::middleware::SESSION_CLINIC_KEY;
use crate::state::AppState;

pub async fn session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(build_session_response(&state, &principal).await?))
}

/// Stores the selected clinic in the cookie session once membership is confirmed.
pub async fn select_clinic_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    session: Session,
    Json(payload): Json<SelectClinicRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let clinic_id = ClinicId::parse(payload.clinic_id.as_str())?;
    state
        .membership_service
        .ensure_can_enter(&principal, clinic_id)
        .await?;

    session
        .insert(SESSION_CLINIC_KEY, clinic_id)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store session clinic: {error}")))?;

    let principal = principal.with_clinic(Some(clinic_id));
    Ok(Json(build_session_response(&state, &principal).await?))
}

async fn build_session_response(
    state: &AppState,
    principal: &Principal,
) -> Result<SessionResponse, AppError> {
    let clinics = state
        .membership_service
        .list_user_clinics(principal.user_id())
        .await?
        .into_iter()
        .map(SessionClinicResponse::from)
        .collect();
    let permissions = state
        .authorization_service
        .effective_permissions(principal, principal.clinic_id())
        .await?
        .iter()
        .map(|permission| permission.name())
        .collect();

    Ok(SessionResponse {
        user: PrincipalResponse::from(principal),
        clinic_id: principal.clinic_id().map(|clinic_id| clinic_id.to_string()),
        clinics,
        permissions,
    })
}
