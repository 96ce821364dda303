//! Credential handling: password hashing and session token issuance.

mod password_hasher;
mod session_token;

pub use password_hasher::PasswordHasher;
pub use session_token::SessionTokenGenerator;
