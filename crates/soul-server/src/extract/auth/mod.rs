//! Bearer token authentication.
//!
//! - [`AuthHeader`] parses `Authorization: Bearer <token>` without touching
//!   the database.
//! - [`AuthState`] looks the token up and yields the owning account.

mod auth_header;
mod auth_state;

pub use self::auth_header::AuthHeader;
pub use self::auth_state::AuthState;
