//! Database models mapped onto the schema tables.

mod account;
mod account_session;
mod sense;

pub use account::{Account, NewAccount};
pub use account_session::{AccountSession, NewAccountSession};
pub use sense::{NewSense, Sense, UpdateSense};
