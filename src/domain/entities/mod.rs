pub mod certificate;
pub mod course;
pub mod role;
pub mod session;
pub mod user;

pub use certificate::*;
pub use course::*;
pub use role::*;
pub use session::*;
pub use user::*;
