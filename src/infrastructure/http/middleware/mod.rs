pub mod auth;
pub mod error;
pub mod role_guard;

pub use auth::{load_principal, AppState, AuthenticatedUser, SESSION_COOKIE};
pub use error::{ApiError, ApiResult, JsonBody};
pub use role_guard::{expects_json, require_role, RoleGate};
