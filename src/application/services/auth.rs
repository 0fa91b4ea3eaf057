use crate::application::services::rate_limiter::AuthRateLimiter;
use crate::domain::entities::{Session, User};
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::domain::services::role_registry::RoleRegistry;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::email_validator::validate_and_normalize_email;
use crate::shared::utils::generate_session_token;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use std::sync::Arc;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Unprocessable {
            message: "The given data was invalid".to_string(),
            errors: vec![crate::domain::errors::FieldError::new(
                "password",
                format!(
                    "The password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                ),
            )],
        });
    }
    Ok(())
}

/// Hash password using Argon2id (m_cost = 19 MiB, t_cost = 2, p_cost = 1)
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19456)
        .t_cost(2)
        .p_cost(1)
        .build()
        .map_err(|_| ApiError::Internal("Failed to build Argon2 params".to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Result of a successful login
pub struct AuthResult {
    pub session: Session,
    pub user: User,
    pub redirect_to: String,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    rate_limiter: AuthRateLimiter,
    registry: Arc<RoleRegistry>,
    session_duration_hours: i64,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        rate_limiter: AuthRateLimiter,
        registry: Arc<RoleRegistry>,
        session_duration_hours: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            rate_limiter,
            registry,
            session_duration_hours,
        }
    }

    /// Email/password login.
    ///
    /// Unknown email, wrong password and inactive accounts all yield the same 401.
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<AuthResult> {
        let email = validate_and_normalize_email(email).map_err(|_| ApiError::Unauthorized)?;

        if let Err(wait) = self.rate_limiter.check(&email).await {
            tracing::warn!("Login rate limit exceeded for {}", email);
            return Err(ApiError::TooManyRequests(format!(
                "Too many login attempts. Try again in {} seconds",
                wait.as_secs().max(1)
            )));
        }

        let user = self
            .user_repo
            .get_user_by_email(&email)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!("Failed login for user {}", user.id);
            return Err(ApiError::Unauthorized);
        }

        if !user.is_active() {
            tracing::info!("Login refused for inactive user {}", user.id);
            return Err(ApiError::Unauthorized);
        }

        self.rate_limiter.reset(&email).await;

        let session = Session::new(
            user.id.clone(),
            generate_session_token(),
            self.session_duration_hours,
        );
        self.session_repo.create_session(&session).await?;

        tracing::info!("User {} logged in as {}", user.id, user.role);

        let redirect_to = self.registry.landing_path(user.role).to_string();
        Ok(AuthResult {
            session,
            user,
            redirect_to,
        })
    }

    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        self.session_repo.delete_session(token).await?;
        Ok(())
    }

    /// Resolve a session token to its active user. Expired sessions are removed on sight.
    pub async fn principal_for_token(&self, token: &str) -> ApiResult<Option<User>> {
        let Some(session) = self.session_repo.get_session_by_token(token).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.session_repo.delete_session(token).await?;
            return Ok(None);
        }

        let user = self.user_repo.get_user_by_id(&session.user_id).await?;
        Ok(user.filter(|u| u.is_active()))
    }
}
