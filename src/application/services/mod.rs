pub mod auth;
pub mod certificate_service;
pub mod course_service;
pub mod rate_limiter;
pub mod user_service;

pub use auth::AuthService;
pub use certificate_service::CertificateService;
pub use course_service::CourseService;
pub use rate_limiter::AuthRateLimiter;
pub use user_service::UserService;
