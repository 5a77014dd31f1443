//! Error type for `marble-shop`.
//!
//! Variants fall into three groups: validation problems the operator fixes
//! by correcting input, remote failures from the store, and a sale that was
//! recorded but whose follow-up writes did not all land.

use marble_core::sale::Sale;
use strum::Display;
use thiserror::Error;

use crate::workflow::Step;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The write that failed after a sale document was already created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CommitStage {
  #[strum(serialize = "inventory update")]
  InventoryUpdate,
  #[strum(serialize = "customer update")]
  CustomerUpdate,
  Reload,
}

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────────
  #[error(transparent)]
  Invalid(#[from] marble_core::Error),

  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("{field} is invalid: {reason}")]
  InvalidValue { field: &'static str, reason: String },

  #[error(
    "stock not available: requested {requested:.2} sq.ft, available {available:.2} sq.ft"
  )]
  InsufficientStock { requested: f64, available: f64 },

  #[error("customer with phone {0} already exists")]
  DuplicatePhone(String),

  #[error("{0} is out of stock")]
  OutOfStock(String),

  #[error("not signed in")]
  NotSignedIn,

  #[error("no {kind} matching {key:?}")]
  NotFound { kind: &'static str, key: String },

  #[error("cannot do that while {actual}; the sale must be at {expected}")]
  WrongStep { expected: Step, actual: Step },

  #[error("a sale is already being committed")]
  Busy,

  // ── Remote ────────────────────────────────────────────────────────────────
  #[error("store error: {0}")]
  Store(#[source] BoxError),

  // ── Partial ───────────────────────────────────────────────────────────────
  /// `sale` is the document as written; it can still be invoiced.
  #[error("sale {} was recorded but the {stage} failed: {source}", sale.invoice_number)]
  PartialSale {
    sale:   Box<Sale>,
    stage:  CommitStage,
    #[source]
    source: BoxError,
  },
}

impl Error {
  /// Wrap a store backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  /// Whether the operator can fix this by changing what they entered.
  pub fn is_validation(&self) -> bool {
    !matches!(self, Self::Store(_) | Self::PartialSale { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
