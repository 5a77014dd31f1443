//! Area, stock value and sale arithmetic.
//!
//! Every figure is kept at full `f64` precision. Rounding happens only when a
//! value is formatted for display, via [`format_money`] and [`format_sqft`].

use serde::{Deserialize, Serialize};

use crate::inventory::Unit;

/// Square inches in one square foot.
pub const SQ_INCHES_PER_SQ_FOOT: f64 = 144.0;

/// Multiplier applied to the purchase price to seed the sale-price field.
/// A UI default only; the operator is free to overwrite it.
pub const SUGGESTED_MARKUP: f64 = 1.2;

/// Area of a `width × height` slab in square feet.
pub fn area_sqft(width: f64, height: f64, unit: Unit) -> f64 {
  match unit {
    Unit::Inches => width * height / SQ_INCHES_PER_SQ_FOOT,
    Unit::Feet => width * height,
  }
}

/// Value of stock on hand: price per square foot times square feet.
pub fn stock_value(purchase_price: f64, quantity: f64) -> f64 {
  purchase_price * quantity
}

/// Suggested sale price for an item bought at `purchase_price`, rounded to
/// whole paisa the way the price field displays it.
pub fn suggested_sale_price(purchase_price: f64) -> f64 {
  round2(purchase_price * SUGGESTED_MARKUP)
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

// ─── Quote ───────────────────────────────────────────────────────────────────

/// Derived figures of a sale. All three use the same operator-entered
/// quantity; nothing is rounded in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleQuote {
  pub profit_per_sqft: f64,
  pub total_profit:    f64,
  pub total_amount:    f64,
}

impl SaleQuote {
  pub fn compute(purchase_price: f64, sale_price: f64, quantity: f64) -> Self {
    let profit_per_sqft = sale_price - purchase_price;
    Self {
      profit_per_sqft,
      total_profit: profit_per_sqft * quantity,
      total_amount: sale_price * quantity,
    }
  }

  /// Purchase cost of the sold quantity.
  pub fn cost(&self) -> f64 { self.total_amount - self.total_profit }
}

// ─── Display ─────────────────────────────────────────────────────────────────

/// `2600` → `"2600.00 PKR"`.
pub fn format_money(amount: f64) -> String { format!("{amount:.2} PKR") }

/// `12.5` → `"12.50 sq.ft"`.
pub fn format_sqft(quantity: f64) -> String { format!("{quantity:.2} sq.ft") }

/// Format a dimension the way an operator typed it: whole numbers without a
/// trailing `.0`, fractional values as-is.
pub fn format_dimension(value: f64) -> String {
  if value.fract() == 0.0 && value.abs() < 1e15 {
    format!("{}", value as i64)
  } else {
    format!("{value}")
  }
}
