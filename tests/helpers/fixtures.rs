use axum::Router;
use chrono::NaiveDate;
use coursehub::application::services::auth::hash_password;
use coursehub::bootstrap::build_app_state_with_clock;
use coursehub::config::Config;
use coursehub::domain::entities::{Course, Role, Session, SubCourse, User};
use coursehub::domain::ports::clock::{Clock, FixedClock};
use coursehub::domain::ports::course_repository::CourseRepository;
use coursehub::domain::ports::session_repository::SessionRepository;
use coursehub::domain::ports::user_repository::UserRepository;
use coursehub::infrastructure::http::middleware::AppState;
use coursehub::infrastructure::http::router::build_router;
use coursehub::infrastructure::persistence::Database;
use coursehub::shared::utils::generate_session_token;
use std::sync::Arc;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite://unused.db".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_email: "admin@example.com".to_string(),
        admin_password: "admin-password".to_string(),
        admin_name: "Administrator".to_string(),
        session_duration_hours: 9,
        otel_exporter_endpoint: None,
        service_name: "coursehub-test".to_string(),
        metrics_port: 0,
        certificate_code_prefix: "AW".to_string(),
        certificate_code_max_attempts: 3,
        login_max_attempts: 5,
        login_window_minutes: 15,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fixed_clock(y: i32, m: u32, d: u32) -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(date(y, m, d)))
}

pub fn build_test_state(db: &Database, clock: Arc<dyn Clock>) -> AppState {
    build_app_state_with_clock(db.clone(), &test_config(), clock).expect("Failed to build state")
}

pub fn build_test_app(db: &Database, clock: Arc<dyn Clock>) -> Router {
    build_router(build_test_state(db, clock))
}

/// User whose password is never checked.
pub async fn create_test_user(db: &Database, name: &str, email: &str, role: Role) -> User {
    let user = User::new(
        name.to_string(),
        email.to_string(),
        None,
        role,
        "unused-password-hash".to_string(),
    );
    db.create_user(&user).await.expect("Failed to create user");
    user
}

/// User that can log in with [`TEST_PASSWORD`].
pub async fn create_login_user(db: &Database, name: &str, email: &str, role: Role) -> User {
    let user = User::new(
        name.to_string(),
        email.to_string(),
        None,
        role,
        hash_password(TEST_PASSWORD).expect("Failed to hash password"),
    );
    db.create_user(&user).await.expect("Failed to create user");
    user
}

/// Session token for `user`, without going through the login flow.
pub async fn create_session_for(db: &Database, user: &User) -> String {
    let session = Session::new(user.id.clone(), generate_session_token(), 9);
    db.create_session(&session)
        .await
        .expect("Failed to create session");
    session.token
}

pub async fn create_course_with_sub_course(
    db: &Database,
    course_title: &str,
    sub_course_title: &str,
) -> (Course, SubCourse) {
    let course = Course::new(
        course_title.to_string(),
        format!("course-{}", uuid::Uuid::new_v4()),
        None,
    );
    db.create_course(&course)
        .await
        .expect("Failed to create course");

    let sub_course = SubCourse::new(
        course.id.clone(),
        sub_course_title.to_string(),
        format!("sub-course-{}", uuid::Uuid::new_v4()),
        1,
    );
    db.create_sub_course(&sub_course)
        .await
        .expect("Failed to create sub-course");

    (course, sub_course)
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

pub fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
