//! Error types for `marble-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{field} must be a positive number, got {value}")]
  NotPositive { field: &'static str, value: f64 },

  #[error("{field} cannot be negative, got {value}")]
  Negative { field: &'static str, value: f64 },

  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("email is invalid: {0:?}")]
  InvalidEmail(String),

  #[error("password must be at least {min} characters")]
  WeakPassword { min: usize },

  #[error("unknown unit: {0:?}")]
  UnknownUnit(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
