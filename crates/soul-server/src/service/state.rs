//! Application state and dependency injection.

use soul_postgres::PgClient;

use crate::Result;
use crate::service::{PasswordHasher, RegistrationPolicy, ServiceConfig, SessionTokenGenerator};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pg_client: PgClient,

    password_hasher: PasswordHasher,
    session_tokens: SessionTokenGenerator,
    registration: RegistrationPolicy,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres and applies migrations when enabled.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let pg_client = config.connect_postgres().await?;
        Ok(Self::new(pg_client, config))
    }

    /// Assembles state around an existing database client.
    pub fn new(pg_client: PgClient, config: &ServiceConfig) -> Self {
        Self {
            pg_client,
            password_hasher: PasswordHasher::new(),
            session_tokens: SessionTokenGenerator::new(),
            registration: RegistrationPolicy::new(config.registration_enabled),
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);

impl_di!(password_hasher: PasswordHasher);
impl_di!(session_tokens: SessionTokenGenerator);
impl_di!(registration: RegistrationPolicy);
