use crate::domain::entities::Role;
use crate::domain::services::role_registry::RoleRegistry;

pub const LOGIN_PATH: &str = "/login";

/// What a route guard requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated principal.
    Authenticated,
    /// Exactly this role.
    Role(Role),
}

/// Where a single request stands relative to a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    AuthenticatedWrongRole(Role),
    AuthenticatedCorrectRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// 403 for machine-readable callers.
    Deny(DenyReason),
    /// Browser callers are sent somewhere useful instead of an error page.
    Redirect(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    WrongRole,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::WrongRole => "wrong_role",
        }
    }
}

pub fn classify(principal_role: Option<Role>, requirement: Requirement) -> AccessState {
    match (principal_role, requirement) {
        (None, _) => AccessState::Unauthenticated,
        (Some(_), Requirement::Authenticated) => AccessState::AuthenticatedCorrectRole,
        (Some(role), Requirement::Role(required)) if role == required => {
            AccessState::AuthenticatedCorrectRole
        }
        (Some(role), Requirement::Role(_)) => AccessState::AuthenticatedWrongRole(role),
    }
}

pub fn decide(
    principal_role: Option<Role>,
    requirement: Requirement,
    expects_json: bool,
    registry: &RoleRegistry,
) -> AccessDecision {
    match classify(principal_role, requirement) {
        AccessState::AuthenticatedCorrectRole => AccessDecision::Allow,
        AccessState::Unauthenticated if expects_json => {
            AccessDecision::Deny(DenyReason::Unauthenticated)
        }
        AccessState::Unauthenticated => AccessDecision::Redirect(LOGIN_PATH.to_string()),
        AccessState::AuthenticatedWrongRole(_) if expects_json => {
            AccessDecision::Deny(DenyReason::WrongRole)
        }
        AccessState::AuthenticatedWrongRole(role) => {
            AccessDecision::Redirect(registry.landing_path(role).to_string())
        }
    }
}
