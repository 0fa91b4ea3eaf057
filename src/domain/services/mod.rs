pub mod access_policy;
pub mod certificate_code;
pub mod role_registry;
pub mod slug;
