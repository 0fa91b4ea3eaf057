use crate::domain::entities::{LoginRequest, LoginResponse, UserResponse};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser, JsonBody};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let auth_result = state
        .auth_service
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: auth_result.session.token,
        expires_at: auth_result.session.expires_at,
        user: UserResponse::from(auth_result.user),
        redirect_to: auth_result.redirect_to,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.auth_service.logout(&auth_user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> Json<UserResponse> {
    Json(UserResponse::from(auth_user.user))
}
