//! Inventory manager helpers: searching, low-stock filtering, edits and
//! restocks.

use marble_core::inventory::{InventoryItem, InventoryPatch, NewInventoryItem};

use crate::{Error, Result};

/// Default quantity, in square feet, below which an item counts as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 10.0;

/// Manager search: case-insensitive substring of name, type or supplier.
pub fn search<'a>(items: &'a [InventoryItem], term: &str) -> Vec<&'a InventoryItem> {
  let term = term.trim().to_lowercase();
  items
    .iter()
    .filter(|item| {
      term.is_empty()
        || item.name.to_lowercase().contains(&term)
        || item.marble_type.as_str().to_lowercase().contains(&term)
        || item
          .supplier
          .as_deref()
          .is_some_and(|s| s.to_lowercase().contains(&term))
    })
    .collect()
}

/// Items offered in the sales workflow: in stock, and matching the query by
/// name, type, or a `WxH` / `W*H` size.
pub fn sellable<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
  let term = query.trim().to_lowercase();
  items
    .iter()
    .filter(|item| item.in_stock())
    .filter(|item| {
      term.is_empty()
        || item.name.to_lowercase().contains(&term)
        || item.marble_type.as_str().to_lowercase().contains(&term)
        || item.dimensions().matches_size_query(&term)
    })
    .collect()
}

pub fn low_stock(items: &[InventoryItem], threshold: f64) -> Vec<&InventoryItem> {
  items.iter().filter(|i| i.is_low_stock(threshold)).collect()
}

/// Patch that replaces every editable field of an item with `form`. Area
/// and total value were already derived by [`NewInventoryItem::new`].
pub fn edit_patch(form: NewInventoryItem) -> InventoryPatch {
  InventoryPatch::replace_with(form)
}

/// Patch adding `delta` square feet to `item`'s last-loaded quantity.
pub fn restock_patch(item: &InventoryItem, delta: f64) -> Result<InventoryPatch> {
  if !delta.is_finite() || delta <= 0.0 {
    return Err(Error::InvalidValue {
      field:  "restock quantity",
      reason: format!("must be greater than zero, got {delta}"),
    });
  }
  Ok(InventoryPatch::set_quantity(item.purchase_price, item.quantity + delta))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use marble_core::inventory::{MarbleType, Unit};
  use uuid::Uuid;

  use super::*;

  fn item(name: &str, t: MarbleType, w: f64, h: f64, qty: f64) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
      item_id: Uuid::new_v4(),
      owner_id: Uuid::nil(),
      marble_type: t,
      name: name.into(),
      width: w,
      height: h,
      unit: Unit::Inches,
      sqft: w * h / 144.0,
      purchase_price: 100.0,
      quantity: qty,
      total_value: 100.0 * qty,
      supplier: Some("Karachi Stone Co".into()),
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn sellable_hides_empty_stock_and_matches_sizes() {
    let items = vec![
      item("Black Galaxy", MarbleType::Granite, 24.0, 60.0, 50.0),
      item("Sunny Beige", MarbleType::Tiles, 12.0, 12.0, 0.0),
      item("Ziarat White", MarbleType::LargeSheets, 48.0, 96.0, 5.0),
    ];
    assert_eq!(sellable(&items, "").len(), 2);
    assert!(sellable(&items, "sunny").is_empty());
    assert_eq!(sellable(&items, "24x60")[0].name, "Black Galaxy");
    assert_eq!(sellable(&items, "48 * 96")[0].name, "Ziarat White");
    assert_eq!(sellable(&items, "large")[0].name, "Ziarat White");
  }

  #[test]
  fn manager_search_includes_supplier_and_out_of_stock() {
    let items = vec![
      item("Black Galaxy", MarbleType::Granite, 24.0, 60.0, 50.0),
      item("Sunny Beige", MarbleType::Tiles, 12.0, 12.0, 0.0),
    ];
    assert_eq!(search(&items, "karachi").len(), 2);
    assert_eq!(search(&items, "TILES")[0].name, "Sunny Beige");
  }

  #[test]
  fn low_stock_is_strictly_below_threshold() {
    let items = vec![
      item("a", MarbleType::Granite, 1.0, 1.0, 9.99),
      item("b", MarbleType::Granite, 1.0, 1.0, 10.0),
    ];
    let low = low_stock(&items, DEFAULT_LOW_STOCK_THRESHOLD);
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].name, "a");
  }

  #[test]
  fn restock_adds_delta_and_rejects_non_positive() {
    let it = item("a", MarbleType::Granite, 1.0, 1.0, 30.0);
    let patch = restock_patch(&it, 20.0).unwrap();
    assert_eq!(patch.quantity, Some(50.0));
    assert_eq!(patch.total_value, Some(5000.0));
    assert!(restock_patch(&it, 0.0).is_err());
    assert!(restock_patch(&it, -5.0).is_err());
  }
}
