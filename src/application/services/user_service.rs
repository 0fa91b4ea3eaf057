use crate::application::services::auth::{hash_password, validate_password};
use crate::domain::entities::{CreateUserRequest, UpdateUserAccessRequest, User, UserStatus};
use crate::domain::errors::FieldError;
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::domain::services::role_registry::RoleRegistry;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::email_validator::validate_and_normalize_email;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    registry: Arc<RoleRegistry>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        registry: Arc<RoleRegistry>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            registry,
        }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> ApiResult<User> {
        let mut errors = Vec::new();

        if request.name.trim().is_empty() {
            errors.push(FieldError::new("name", "The name field is required"));
        }
        let email = match validate_and_normalize_email(&request.email) {
            Ok(email) => Some(email),
            Err(err) => {
                errors.push(err);
                None
            }
        };
        if let Err(ApiError::Unprocessable { errors: pw, .. }) =
            validate_password(&request.password)
        {
            errors.extend(pw);
        }

        let email = match email {
            Some(email) if errors.is_empty() => email,
            _ => {
                return Err(ApiError::Unprocessable {
                    message: "The given data was invalid".to_string(),
                    errors,
                })
            }
        };

        if self.user_repo.get_user_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let role = request
            .role
            .as_deref()
            .map(|name| self.registry.resolve(name))
            .unwrap_or(crate::domain::entities::Role::User);

        let password_hash = hash_password(&request.password)?;
        let phone = request
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let user = User::new(
            request.name.trim().to_string(),
            email,
            phone,
            role,
            password_hash,
        );

        self.user_repo.create_user(&user).await?;
        tracing::info!("Created user {} with role {}", user.id, user.role);

        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> ApiResult<User> {
        self.user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    pub async fn list_users(&self, page: i64, per_page: i64) -> ApiResult<(Vec<User>, i64)> {
        let per_page = per_page.clamp(1, 100);
        let offset = (page.max(1) - 1) * per_page;
        Ok(self.user_repo.list_users(per_page, offset).await?)
    }

    /// Change another user's role and/or status.
    ///
    /// Deactivation logs the target out everywhere.
    pub async fn update_access(
        &self,
        actor_id: &str,
        target_id: &str,
        request: UpdateUserAccessRequest,
    ) -> ApiResult<User> {
        if actor_id == target_id {
            return Err(ApiError::Forbidden(
                "You cannot change your own role or status".to_string(),
            ));
        }

        let mut user = self.get_user(target_id).await?;

        if let Some(role) = request.role.as_deref() {
            user.role = self.registry.resolve(role);
        }
        if let Some(status) = request.status {
            user.status = status;
        }
        user.updated_at = chrono::Utc::now().to_rfc3339();

        self.user_repo
            .update_user_access(&user.id, user.role, user.status, &user.updated_at)
            .await?;

        if user.status == UserStatus::Inactive {
            let removed = self.session_repo.delete_user_sessions(&user.id).await?;
            tracing::info!("Deactivated user {}, removed {} sessions", user.id, removed);
        }

        Ok(user)
    }
}
