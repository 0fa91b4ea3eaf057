/// Utility modules
pub mod email_validator;

use rand::Rng;

/// Generate a session token: 32 random bytes, hex encoded (64 characters).
pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
