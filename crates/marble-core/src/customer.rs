//! Customers and their running purchase aggregate.
//!
//! The phone number is the lookup key. The store does not enforce its
//! uniqueness; callers check for an existing customer before creating one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A customer of the shop, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
  pub customer_id:     Uuid,
  pub owner_id:        Uuid,
  pub name:            String,
  pub phone:           String,
  pub address:         Option<String>,
  /// Number of completed sales to this phone number.
  pub total_purchases: u32,
  /// Running sum of those sales' amounts.
  pub total_amount:    f64,
  pub last_purchase:   Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Customer {
  /// Case-insensitive name substring or phone substring match. An empty
  /// term matches everyone.
  pub fn matches(&self, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
      return true;
    }
    self.name.to_lowercase().contains(&term.to_lowercase())
      || self.phone.contains(term)
  }
}

// ─── NewCustomer ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::ShopStore::add_customer`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
  pub name:            String,
  pub phone:           String,
  pub address:         Option<String>,
  pub total_purchases: u32,
  pub total_amount:    f64,
  /// When set, the store stamps `last_purchase` with its own clock.
  pub mark_purchase:   bool,
}

impl NewCustomer {
  /// A customer registered by hand, with no purchases yet. Name and phone
  /// are both required.
  pub fn new(
    name: impl Into<String>,
    phone: impl Into<String>,
    address: Option<String>,
  ) -> Result<Self> {
    let name = name.into().trim().to_owned();
    let phone = phone.into().trim().to_owned();
    if name.is_empty() {
      return Err(Error::MissingField("customer name"));
    }
    if phone.is_empty() {
      return Err(Error::MissingField("customer phone"));
    }
    Ok(Self {
      name,
      phone,
      address: address
        .map(|a| a.trim().to_owned())
        .filter(|a| !a.is_empty()),
      total_purchases: 0,
      total_amount: 0.0,
      mark_purchase: false,
    })
  }

  /// A customer created implicitly by their first sale.
  pub fn from_first_sale(name: &str, phone: &str, amount: f64) -> Self {
    Self {
      name:            name.trim().to_owned(),
      phone:           phone.trim().to_owned(),
      address:         None,
      total_purchases: 1,
      total_amount:    amount,
      mark_purchase:   true,
    }
  }
}

// ─── CustomerPatch ───────────────────────────────────────────────────────────

/// Field-level update for [`crate::store::ShopStore::update_customer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerPatch {
  pub name:            Option<String>,
  pub address:         Option<Option<String>>,
  pub total_purchases: Option<u32>,
  pub total_amount:    Option<f64>,
  pub mark_purchase:   bool,
}

impl CustomerPatch {
  /// Fold one more sale of `amount` into the aggregate read from `current`.
  ///
  /// This is a read-then-write against whatever snapshot the caller holds;
  /// two concurrent writers can lose an update.
  pub fn record_sale(current: &Customer, amount: f64) -> Self {
    Self {
      total_purchases: Some(current.total_purchases.saturating_add(1)),
      total_amount: Some(current.total_amount + amount),
      mark_purchase: true,
      ..Self::default()
    }
  }
}
