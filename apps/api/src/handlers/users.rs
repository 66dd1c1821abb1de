use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use clinic_application::{CreateUserInput, UpdateUserInput};
use clinic_core::{GlobalRole, Principal, UserId};

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let global_role = payload.global_role.parse::<GlobalRole>()?;
    let user = state
        .user_service
        .create_user(
            &principal,
            CreateUserInput {
                email: payload.email,
                password: payload.password,
                display_name: payload.display_name,
                global_role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let global_role = payload.global_role.parse::<GlobalRole>()?;
    let user = state
        .user_service
        .update_user(
            &principal,
            user_id,
            UpdateUserInput {
                display_name: payload.display_name,
                global_role,
                is_active: payload.is_active,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}
