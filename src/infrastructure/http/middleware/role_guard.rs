use crate::domain::entities::Role;
use crate::domain::services::access_policy::{decide, AccessDecision, Requirement};
use crate::domain::services::role_registry::RoleRegistry;
use crate::infrastructure::http::middleware::auth::AuthenticatedUser;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use http::{header, HeaderMap, StatusCode};
use serde_json::json;
use std::sync::Arc;

/// Guard configuration for one group of routes.
#[derive(Clone)]
pub struct RoleGate {
    pub requirement: Requirement,
    pub registry: Arc<RoleRegistry>,
}

impl RoleGate {
    pub fn role(role: Role, registry: Arc<RoleRegistry>) -> Self {
        Self {
            requirement: Requirement::Role(role),
            registry,
        }
    }

    pub fn authenticated(registry: Arc<RoleRegistry>) -> Self {
        Self {
            requirement: Requirement::Authenticated,
            registry,
        }
    }
}

/// Whether the caller wants a machine-readable answer rather than a page.
pub fn expects_json(headers: &HeaderMap) -> bool {
    let header_contains = |name: header::HeaderName, needle: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains(needle))
            .unwrap_or(false)
    };

    let xhr = headers
        .get("X-Requested-With")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
        .unwrap_or(false);

    xhr || header_contains(header::ACCEPT, "json") || header_contains(header::CONTENT_TYPE, "json")
}

pub async fn require_role(State(gate): State<RoleGate>, request: Request, next: Next) -> Response {
    let principal_role = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.role());
    let wants_json = expects_json(request.headers());

    match decide(principal_role, gate.requirement, wants_json, &gate.registry) {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::Deny(reason) => {
            metrics::counter!("access_denied_total", "reason" => reason.as_str()).increment(1);
            tracing::warn!(
                "Access denied ({}) to {} for role {:?}",
                reason.as_str(),
                request.uri().path(),
                principal_role
            );
            (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Forbidden",
                    "message": "You do not have access to this resource",
                })),
            )
                .into_response()
        }
        AccessDecision::Redirect(location) => {
            tracing::debug!(
                "Redirecting {} to {} for role {:?}",
                request.uri().path(),
                location,
                principal_role
            );
            Redirect::to(&location).into_response()
        }
    }
}
