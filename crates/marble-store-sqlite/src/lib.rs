//! SQLite backend for the marble shop.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. One file holds the four
//! document collections plus the credentials used by [`SqliteAuth`].

mod auth;
mod encode;
mod schema;
mod store;

pub mod error;

pub use auth::SqliteAuth;
pub use error::{Error, Result};
pub use store::SqliteStore;
