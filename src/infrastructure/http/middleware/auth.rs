use crate::application::services::{AuthService, CertificateService, CourseService, UserService};
use crate::domain::entities::{Role, User};
use crate::domain::services::role_registry::RoleRegistry;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Clone)]
pub struct AppState {
    pub session_duration_hours: i64,
    pub registry: Arc<RoleRegistry>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub certificate_service: CertificateService,
}

/// The current principal, populated by [`load_principal`].
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

/// Bearer token first, then the session cookie.
fn session_token(request: &Request) -> Option<String> {
    let bearer = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(request.headers())
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Resolve the session (if any) into an [`AuthenticatedUser`] extension.
///
/// Never rejects: guards further down decide what an anonymous request may do.
pub async fn load_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(&request) {
        match state.auth_service.principal_for_token(&token).await {
            Ok(Some(user)) => {
                request
                    .extensions_mut()
                    .insert(AuthenticatedUser { user, token });
            }
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to resolve session: {}", e),
        }
    }

    next.run(request).await
}
