use crate::domain::entities::{
    CertificateResponse, CertificateVerification, IssueCertificateRequest,
    UpdateCertificateRequest,
};
use crate::infrastructure::http::middleware::{
    ApiError, ApiResult, AppState, AuthenticatedUser, JsonBody,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

pub async fn issue_certificate(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    WithRejection(Json(request), _): JsonBody<IssueCertificateRequest>,
) -> ApiResult<(StatusCode, Json<CertificateResponse>)> {
    tracing::debug!(
        "User {} issuing certificate for {} / {}",
        auth_user.user.id,
        request.user_id,
        request.sub_course_id
    );
    let certificate = state.certificate_service.issue(request).await?;
    Ok((StatusCode::CREATED, Json(CertificateResponse::from(certificate))))
}

pub async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CertificateResponse>> {
    let certificate = state.certificate_service.get(&id).await?;
    Ok(Json(CertificateResponse::from(certificate)))
}

pub async fn update_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(request), _): JsonBody<UpdateCertificateRequest>,
) -> ApiResult<Json<CertificateResponse>> {
    let certificate = state.certificate_service.update(&id, request).await?;
    Ok(Json(CertificateResponse::from(certificate)))
}

pub async fn delete_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.certificate_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public endpoint, no authentication.
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<CertificateVerification>> {
    let verification = state.certificate_service.verify(&code).await?;
    Ok(Json(verification))
}

/// A user may list their own certificates; admins may list anyone's.
pub async fn list_user_certificates(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<CertificateResponse>>> {
    if auth_user.user.id != user_id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(
            "You can only view your own certificates".to_string(),
        ));
    }

    let certificates = state.certificate_service.list_by_user(&user_id).await?;
    Ok(Json(
        certificates
            .into_iter()
            .map(CertificateResponse::from)
            .collect(),
    ))
}
