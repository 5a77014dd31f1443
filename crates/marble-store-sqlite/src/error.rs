//! Error type for `marble-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] marble_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unreadable column value: {0}")]
  Decode(String),

  #[error("user profile already exists: {0}")]
  UserExists(Uuid),

  #[error("user profile not found: {0}")]
  UserNotFound(Uuid),

  #[error("inventory item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("email already in use: {0}")]
  EmailInUse(String),

  #[error("no account for {0}")]
  UnknownAccount(String),

  #[error("incorrect password")]
  WrongPassword,

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
