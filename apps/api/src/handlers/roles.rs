use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use clinic_application::CreateRoleInput;
use clinic_core::Principal;

use crate::dto::{CreateRoleRequest, RoleResponse, UpdateRolePermissionsRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.role_service.get_role(role_name.as_str()).await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let display_name = payload
        .display_name
        .unwrap_or_else(|| payload.name.clone());

    let role = state
        .role_service
        .create_role(
            &principal,
            CreateRoleInput {
                name: payload.name,
                display_name,
                permissions: payload.permissions,
                priority: payload.priority.unwrap_or_default(),
                base_roles: payload.base_roles,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

/// Replaces the role's own grants. Sending the same list twice is a no-op.
pub async fn update_role_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_name): Path<String>,
    Json(payload): Json<UpdateRolePermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .replace_permissions(&principal, role_name.as_str(), &payload.permissions)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .delete_role(&principal, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
