pub mod certificate_repository;
pub mod clock;
pub mod course_repository;
pub mod session_repository;
pub mod user_repository;
