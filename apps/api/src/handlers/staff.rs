use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use clinic_application::{GrantInput, StaffAssignmentInput};
use clinic_core::{Principal, UserId};

use crate::dto::{AddStaffRequest, PermissionGrantDto, StaffMemberResponse, UpdateStaffRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_staff_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<StaffMemberResponse>>> {
    let clinic_id = principal.require_clinic()?;
    let staff = state
        .membership_service
        .list_staff(clinic_id)
        .await?
        .into_iter()
        .map(StaffMemberResponse::from)
        .collect();

    Ok(Json(staff))
}

pub async fn add_staff_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AddStaffRequest>,
) -> ApiResult<(StatusCode, Json<StaffMemberResponse>)> {
    let clinic_id = principal.require_clinic()?;
    let user_id = UserId::parse(payload.user_id.as_str())?;

    let member = state
        .membership_service
        .add_staff(
            &principal,
            clinic_id,
            user_id,
            assignment(payload.role_name, payload.permission_overrides),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(StaffMemberResponse::from(member))))
}

pub async fn update_staff_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateStaffRequest>,
) -> ApiResult<Json<StaffMemberResponse>> {
    let clinic_id = principal.require_clinic()?;
    let user_id = UserId::parse(user_id.as_str())?;

    let member = state
        .membership_service
        .update_staff(
            &principal,
            clinic_id,
            user_id,
            assignment(payload.role_name, payload.permission_overrides),
        )
        .await?;

    Ok(Json(StaffMemberResponse::from(member)))
}

pub async fn remove_staff_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let clinic_id = principal.require_clinic()?;
    let user_id = UserId::parse(user_id.as_str())?;

    state
        .membership_service
        .remove_staff(&principal, clinic_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn assignment(role_name: String, overrides: Vec<PermissionGrantDto>) -> StaffAssignmentInput {
    StaffAssignmentInput {
        role_name,
        permission_overrides: overrides.into_iter().map(GrantInput::from).collect(),
    }
}
