//! Application state, configuration and credential services.

mod config;
mod registration;
mod security;
mod state;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::registration::RegistrationPolicy;
pub use crate::service::security::{PasswordHasher, SessionTokenGenerator};
pub use crate::service::state::ServiceState;
