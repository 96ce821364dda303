//! Response types for HTTP handlers.

mod authentications;
mod errors;
mod senses;

pub use authentications::*;
pub use errors::*;
pub use senses::*;
