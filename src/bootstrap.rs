use crate::application::services::auth::{hash_password, validate_password};
use crate::application::services::*;
use crate::config::Config;
use crate::domain::entities::{Role, User};
use crate::domain::ports::certificate_repository::CertificateRepository;
use crate::domain::ports::clock::{Clock, SystemClock};
use crate::domain::ports::course_repository::CourseRepository;
use crate::domain::ports::session_repository::SessionRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::domain::services::certificate_code::CertificateCodeGenerator;
use crate::domain::services::role_registry::RoleRegistry;
use crate::infrastructure::http::middleware::{ApiError, AppState};
use crate::infrastructure::persistence::Database;
use crate::shared::utils::email_validator::validate_and_normalize_email;
use std::sync::Arc;

pub fn build_app_state(db: Database, config: &Config) -> Result<AppState, ApiError> {
    build_app_state_with_clock(db, config, Arc::new(SystemClock))
}

/// Wire every service onto one database handle. The clock stamps certificate codes and
/// decides expiry on verification.
pub fn build_app_state_with_clock(
    db: Database,
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<AppState, ApiError> {
    let user_repo: Arc<dyn UserRepository> = Arc::new(db.clone());
    let session_repo: Arc<dyn SessionRepository> = Arc::new(db.clone());
    let course_repo: Arc<dyn CourseRepository> = Arc::new(db.clone());
    let certificate_repo: Arc<dyn CertificateRepository> = Arc::new(db);

    let registry = Arc::new(RoleRegistry::default());

    let rate_limiter =
        AuthRateLimiter::with_config(config.login_max_attempts, config.login_window_minutes);
    tracing::info!(
        "Rate limiter initialized ({} attempts per {} minutes)",
        config.login_max_attempts,
        config.login_window_minutes
    );

    let generator = CertificateCodeGenerator::new(&config.certificate_code_prefix, clock.clone())?;

    let auth_service = AuthService::new(
        user_repo.clone(),
        session_repo.clone(),
        rate_limiter,
        registry.clone(),
        config.session_duration_hours,
    );
    let user_service = UserService::new(user_repo.clone(), session_repo, registry.clone());
    let course_service = CourseService::new(course_repo.clone());
    let certificate_service = CertificateService::new(
        certificate_repo,
        user_repo,
        course_repo,
        generator,
        clock,
        config.certificate_code_max_attempts,
    );
    tracing::info!(
        "Certificate service initialized (prefix {}, {} code attempts)",
        config.certificate_code_prefix,
        config.certificate_code_max_attempts
    );

    Ok(AppState {
        session_duration_hours: config.session_duration_hours,
        registry,
        auth_service,
        user_service,
        course_service,
        certificate_service,
    })
}

/// Ensure the configured administrator exists. Idempotent.
pub async fn initialize_admin(db: &Database, config: &Config) -> Result<(), ApiError> {
    tracing::info!("Checking for admin user initialization");

    let email = validate_and_normalize_email(&config.admin_email).map_err(|e| {
        ApiError::BadRequest(format!("ADMIN_EMAIL is invalid: {}", e.message))
    })?;

    if db.get_user_by_email(&email).await?.is_some() {
        tracing::info!("Admin user already exists: {}", email);
        return Ok(());
    }

    tracing::info!("Creating admin user: {}", email);

    validate_password(&config.admin_password)?;
    let password_hash = hash_password(&config.admin_password)?;

    let user = User::new(
        config.admin_name.clone(),
        email,
        None,
        Role::Admin,
        password_hash,
    );
    db.create_user(&user).await?;

    tracing::info!("Admin user created successfully: {}", user.email);

    Ok(())
}
