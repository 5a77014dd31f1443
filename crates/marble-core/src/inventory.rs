//! Inventory items: stock held by the shop, measured in square feet.
//!
//! Quantity on hand is the only field that changes routinely: a completed
//! sale decrements it and a restock increments it. Area and total value are
//! derived and recomputed by whoever writes the dimensions or quantity.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  pricing::{area_sqft, format_dimension, stock_value},
};

// ─── Unit ────────────────────────────────────────────────────────────────────

/// The unit the slab dimensions were entered in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Unit {
  #[default]
  Inches,
  Feet,
}

// ─── MarbleType ──────────────────────────────────────────────────────────────

/// Stone category. The presets cover what the shop stocks; anything else is
/// kept verbatim as free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarbleType {
  Granite,
  Graphite,
  Tiles,
  LargeSheets,
  Custom,
  Other(String),
}

impl MarbleType {
  pub const PRESETS: [MarbleType; 5] = [
    MarbleType::Granite,
    MarbleType::Graphite,
    MarbleType::Tiles,
    MarbleType::LargeSheets,
    MarbleType::Custom,
  ];

  pub fn as_str(&self) -> &str {
    match self {
      Self::Granite => "Granite",
      Self::Graphite => "Graphite",
      Self::Tiles => "Tiles",
      Self::LargeSheets => "Large Sheets",
      Self::Custom => "Custom",
      Self::Other(s) => s,
    }
  }
}

impl Default for MarbleType {
  fn default() -> Self { Self::Granite }
}

impl fmt::Display for MarbleType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for MarbleType {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let trimmed = s.trim();
    let preset = Self::PRESETS
      .into_iter()
      .find(|p| p.as_str().eq_ignore_ascii_case(trimmed));
    Ok(preset.unwrap_or_else(|| Self::Other(trimmed.to_owned())))
  }
}

impl From<String> for MarbleType {
  fn from(s: String) -> Self {
    match s.parse() {
      Ok(t) => t,
      Err(never) => match never {},
    }
  }
}

impl From<MarbleType> for String {
  fn from(t: MarbleType) -> Self {
    match t {
      MarbleType::Other(s) => s,
      preset => preset.as_str().to_owned(),
    }
  }
}

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// Slab size as entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
  pub width:  f64,
  pub height: f64,
  pub unit:   Unit,
}

impl Dimensions {
  /// Both sides must be finite and strictly positive.
  pub fn new(width: f64, height: f64, unit: Unit) -> Result<Self> {
    for (field, value) in [("width", width), ("height", height)] {
      if !value.is_finite() || value <= 0.0 {
        return Err(Error::NotPositive { field, value });
      }
    }
    Ok(Self { width, height, unit })
  }

  pub fn area_sqft(&self) -> f64 {
    area_sqft(self.width, self.height, self.unit)
  }

  /// Human-readable size, e.g. `24 × 60 inches`. Copied into sale records.
  pub fn label(&self) -> String {
    format!(
      "{} × {} {}",
      format_dimension(self.width),
      format_dimension(self.height),
      self.unit
    )
  }

  /// Whether `query` names this size as `WxH` or `W*H`. Whitespace in the
  /// query is ignored, so `"24 * 60"` matches too.
  pub fn matches_size_query(&self, query: &str) -> bool {
    let compact: String = query
      .chars()
      .filter(|c| !c.is_whitespace())
      .collect::<String>()
      .to_lowercase();
    if compact.is_empty() {
      return false;
    }
    let w = format_dimension(self.width);
    let h = format_dimension(self.height);
    format!("{w}*{h}").contains(&compact) || format!("{w}x{h}").contains(&compact)
  }
}

// ─── InventoryItem ───────────────────────────────────────────────────────────

/// A stocked stone product, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
  pub item_id:        Uuid,
  pub owner_id:       Uuid,
  pub marble_type:    MarbleType,
  pub name:           String,
  pub width:          f64,
  pub height:         f64,
  pub unit:           Unit,
  /// Area of one slab in square feet; derived from the dimensions.
  pub sqft:           f64,
  /// Cost per square foot.
  pub purchase_price: f64,
  /// Square feet on hand.
  pub quantity:       f64,
  /// `purchase_price × quantity` as of the last write.
  pub total_value:    f64,
  pub supplier:       Option<String>,
  /// Store-assigned entry timestamp.
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl InventoryItem {
  pub fn dimensions(&self) -> Dimensions {
    Dimensions { width: self.width, height: self.height, unit: self.unit }
  }

  pub fn in_stock(&self) -> bool { self.quantity > 0.0 }

  pub fn is_low_stock(&self, threshold: f64) -> bool { self.quantity < threshold }
}

// ─── NewInventoryItem ────────────────────────────────────────────────────────

/// Input to [`crate::store::ShopStore::add_item`]. The derived `sqft` and
/// `total_value` fields are computed by [`NewInventoryItem::new`]; ids and
/// timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
  pub marble_type:    MarbleType,
  pub name:           String,
  pub width:          f64,
  pub height:         f64,
  pub unit:           Unit,
  pub sqft:           f64,
  pub purchase_price: f64,
  pub quantity:       f64,
  pub total_value:    f64,
  pub supplier:       Option<String>,
}

impl NewInventoryItem {
  pub fn new(
    marble_type: MarbleType,
    name: impl Into<String>,
    dimensions: Dimensions,
    purchase_price: f64,
    quantity: f64,
    supplier: Option<String>,
  ) -> Result<Self> {
    let name = name.into();
    if name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    if !purchase_price.is_finite() || purchase_price < 0.0 {
      return Err(Error::Negative { field: "purchase price", value: purchase_price });
    }
    if !quantity.is_finite() || quantity < 0.0 {
      return Err(Error::Negative { field: "quantity", value: quantity });
    }
    Ok(Self {
      marble_type,
      name: name.trim().to_owned(),
      width: dimensions.width,
      height: dimensions.height,
      unit: dimensions.unit,
      sqft: dimensions.area_sqft(),
      purchase_price,
      quantity,
      total_value: stock_value(purchase_price, quantity),
      supplier: supplier
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty()),
    })
  }
}

// ─── InventoryPatch ──────────────────────────────────────────────────────────

/// Field-level update for [`crate::store::ShopStore::update_item`]. Only
/// `Some` fields are written; `updated_at` is always refreshed by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryPatch {
  pub marble_type:    Option<MarbleType>,
  pub name:           Option<String>,
  pub width:          Option<f64>,
  pub height:         Option<f64>,
  pub unit:           Option<Unit>,
  pub sqft:           Option<f64>,
  pub purchase_price: Option<f64>,
  pub quantity:       Option<f64>,
  pub total_value:    Option<f64>,
  /// `Some(None)` clears the supplier.
  pub supplier:       Option<Option<String>>,
}

impl InventoryPatch {
  /// Overwrite every editable field with the values of `item`.
  pub fn replace_with(item: NewInventoryItem) -> Self {
    Self {
      marble_type:    Some(item.marble_type),
      name:           Some(item.name),
      width:          Some(item.width),
      height:         Some(item.height),
      unit:           Some(item.unit),
      sqft:           Some(item.sqft),
      purchase_price: Some(item.purchase_price),
      quantity:       Some(item.quantity),
      total_value:    Some(item.total_value),
      supplier:       Some(item.supplier),
    }
  }

  /// Set the quantity on hand and the matching total value.
  pub fn set_quantity(purchase_price: f64, quantity: f64) -> Self {
    Self {
      quantity: Some(quantity),
      total_value: Some(stock_value(purchase_price, quantity)),
      ..Self::default()
    }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }
}
