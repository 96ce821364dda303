//! Repositories implemented on [`PgConnection`](crate::PgConnection).

mod account;
mod account_session;
mod sense;

pub use account::AccountRepository;
pub use account_session::AccountSessionRepository;
pub use sense::{SensePageSource, SenseRepository};
