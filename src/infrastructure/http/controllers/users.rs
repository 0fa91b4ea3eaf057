use crate::domain::entities::{
    CreateUserRequest, ListUsersQuery, RoleResponse, UpdateUserAccessRequest, UserListResponse,
    UserResponse,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser, JsonBody};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(request), _): JsonBody<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let (users, total) = state.user_service.list_users(page, per_page).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total,
        page,
        per_page,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.user_service.get_user(&id).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user_access(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    WithRejection(Json(request), _): JsonBody<UpdateUserAccessRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .update_access(&auth_user.user.id, &id, request)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleResponse>> {
    Json(
        state
            .registry
            .definitions()
            .into_iter()
            .map(RoleResponse::from)
            .collect(),
    )
}
