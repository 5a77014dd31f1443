//! Sale records and invoice numbers.
//!
//! A sale copies everything it needs from the inventory item and customer at
//! commit time. Later edits to either never rewrite history.

use std::fmt;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  inventory::{InventoryItem, MarbleType},
  pricing::SaleQuote,
};

// ─── InvoiceNumber ───────────────────────────────────────────────────────────

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `INV-<unix millis>-<9 base36 chars>`, e.g. `INV-1718000000000-k3j9x0a2b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  /// Generate a number for a sale committed at `at`, drawing the suffix
  /// from `rng`.
  pub fn generate(at: DateTime<Utc>, rng: &mut impl RngCore) -> Self {
    // 36^9 fits comfortably in a u64.
    let space = 36u64.pow(SUFFIX_LEN as u32);
    let mut n = rng.next_u64() % space;
    let mut suffix = [b'0'; SUFFIX_LEN];
    for slot in suffix.iter_mut().rev() {
      *slot = BASE36[(n % 36) as usize];
      n /= 36;
    }
    let suffix: String = suffix.iter().map(|&b| b as char).collect();
    Self(format!("INV-{}-{suffix}", at.timestamp_millis()))
  }

  /// Generate a number stamped with the current time, using the OS RNG.
  pub fn now() -> Self { Self::generate(Utc::now(), &mut OsRng) }

  /// Wrap a number read back from storage.
  pub fn from_stored(s: impl Into<String>) -> Self { Self(s.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Sale ────────────────────────────────────────────────────────────────────

/// A completed sale. Prices, item details and customer details are copies,
/// not references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
  pub sale_id:         Uuid,
  pub owner_id:        Uuid,
  /// The item the stock came from. Not a foreign key; the item may since
  /// have been deleted.
  pub inventory_id:    Uuid,
  pub customer_name:   String,
  pub customer_phone:  Option<String>,
  pub marble_type:     MarbleType,
  pub item_name:       String,
  /// e.g. `24 × 60 inches`
  pub dimensions:      String,
  /// Square feet sold.
  pub quantity:        f64,
  pub purchase_price:  f64,
  pub sale_price:      f64,
  pub profit_per_sqft: f64,
  pub total_profit:    f64,
  pub total_amount:    f64,
  pub remarks:         String,
  pub cement_info:     String,
  pub invoice_number:  InvoiceNumber,
  pub created_at:      DateTime<Utc>,
}

impl Sale {
  pub fn quote(&self) -> SaleQuote {
    SaleQuote {
      profit_per_sqft: self.profit_per_sqft,
      total_profit:    self.total_profit,
      total_amount:    self.total_amount,
    }
  }

  /// Whether this sale was made to `name` at `phone`. Sales without a phone
  /// match on name alone against a phone-less lookup.
  pub fn is_for(&self, name: &str, phone: &str) -> bool {
    self.customer_name == name && self.customer_phone.as_deref().unwrap_or("") == phone
  }
}

// ─── NewSale ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::ShopStore::add_sale`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
  pub inventory_id:    Uuid,
  pub customer_name:   String,
  pub customer_phone:  Option<String>,
  pub marble_type:     MarbleType,
  pub item_name:       String,
  pub dimensions:      String,
  pub quantity:        f64,
  pub purchase_price:  f64,
  pub sale_price:      f64,
  pub profit_per_sqft: f64,
  pub total_profit:    f64,
  pub total_amount:    f64,
  pub remarks:         String,
  pub cement_info:     String,
  pub invoice_number:  InvoiceNumber,
}

impl NewSale {
  /// Assemble a sale record from the item as it was when selected. The
  /// purchase price is frozen from `item`; profit and amount derive from
  /// the same `quantity`.
  #[allow(clippy::too_many_arguments)]
  pub fn assemble(
    item: &InventoryItem,
    customer_name: &str,
    customer_phone: Option<&str>,
    quantity: f64,
    sale_price: f64,
    remarks: &str,
    cement_info: &str,
    invoice_number: InvoiceNumber,
  ) -> Self {
    let quote = SaleQuote::compute(item.purchase_price, sale_price, quantity);
    Self {
      inventory_id: item.item_id,
      customer_name: customer_name.trim().to_owned(),
      customer_phone: customer_phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned),
      marble_type: item.marble_type.clone(),
      item_name: item.name.clone(),
      dimensions: item.dimensions().label(),
      quantity,
      purchase_price: item.purchase_price,
      sale_price,
      profit_per_sqft: quote.profit_per_sqft,
      total_profit: quote.total_profit,
      total_amount: quote.total_amount,
      remarks: remarks.trim().to_owned(),
      cement_info: cement_info.trim().to_owned(),
      invoice_number,
    }
  }
}
