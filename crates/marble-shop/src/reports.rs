//! Aggregate views over the loaded collections.
//!
//! Sale dates are compared as UTC calendar days. Averages over an empty set
//! are zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use marble_core::{inventory::InventoryItem, sale::Sale};

use crate::{Error, Result};

const TOP_PROFIT_SALES: usize = 10;
const TOP_TYPES: usize = 5;
const RECENT_SALES: usize = 5;

fn ratio(numerator: f64, denominator: f64) -> f64 {
  if denominator > 0.0 { numerator / denominator } else { 0.0 }
}

/// Sum `value` per key, then order by that sum, largest first.
fn ranked<'a, T>(
  rows: impl IntoIterator<Item = &'a T>,
  key: impl Fn(&T) -> String,
  value: impl Fn(&T) -> f64,
) -> Vec<(String, f64)>
where
  T: 'a,
{
  let mut totals: BTreeMap<String, f64> = BTreeMap::new();
  for row in rows {
    *totals.entry(key(row)).or_default() += value(row);
  }
  let mut ranked: Vec<_> = totals.into_iter().collect();
  ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
  ranked
}

// ─── Date range ──────────────────────────────────────────────────────────────

/// Inclusive range of UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

impl DateRange {
  pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
    if from > to {
      return Err(Error::InvalidValue {
        field:  "date range",
        reason: format!("{from} is after {to}"),
      });
    }
    Ok(Self { from, to })
  }

  pub fn contains(&self, sale: &Sale) -> bool {
    let day = sale.created_at.date_naive();
    self.from <= day && day <= self.to
  }
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryReport {
  pub item_count:      usize,
  pub total_sqft:      f64,
  pub total_value:     f64,
  pub low_stock_count: usize,
  /// Square feet on hand per marble type, largest first.
  pub sqft_by_type:    Vec<(String, f64)>,
}

pub fn inventory_report(items: &[InventoryItem], low_stock_threshold: f64) -> InventoryReport {
  InventoryReport {
    item_count:      items.len(),
    total_sqft:      items.iter().map(|i| i.quantity).sum(),
    total_value:     items.iter().map(|i| i.total_value).sum(),
    low_stock_count: items.iter().filter(|i| i.is_low_stock(low_stock_threshold)).count(),
    sqft_by_type:    ranked(items, |i| i.marble_type.to_string(), |i| i.quantity),
  }
}

// ─── Sales ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
  pub range:                DateRange,
  pub sale_count:           usize,
  pub total_quantity:       f64,
  pub total_amount:         f64,
  pub total_profit:         f64,
  pub quantity_by_type:     Vec<(String, f64)>,
  pub quantity_by_customer: Vec<(String, f64)>,
  /// Sales in the range, oldest first.
  pub sales:                Vec<Sale>,
}

pub fn sales_report(sales: &[Sale], range: DateRange) -> SalesReport {
  let selected: Vec<Sale> = sales.iter().filter(|s| range.contains(s)).cloned().collect();
  SalesReport {
    range,
    sale_count: selected.len(),
    total_quantity: selected.iter().map(|s| s.quantity).sum(),
    total_amount: selected.iter().map(|s| s.total_amount).sum(),
    total_profit: selected.iter().map(|s| s.total_profit).sum(),
    quantity_by_type: ranked(&selected, |s| s.marble_type.to_string(), |s| s.quantity),
    quantity_by_customer: ranked(&selected, |s| s.customer_name.clone(), |s| s.quantity),
    sales: selected,
  }
}

// ─── Profit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ProfitReport {
  pub total_profit:            f64,
  pub average_profit_per_sqft: f64,
  pub average_profit_per_sale: f64,
  /// Most profitable sales first.
  pub top_sales:               Vec<Sale>,
}

/// Profit figures over the sales in `range`, or over all sales.
pub fn profit_report(sales: &[Sale], range: Option<DateRange>) -> ProfitReport {
  let mut selected: Vec<Sale> = sales
    .iter()
    .filter(|s| range.is_none_or(|r| r.contains(s)))
    .cloned()
    .collect();
  let total_profit: f64 = selected.iter().map(|s| s.total_profit).sum();
  let total_quantity: f64 = selected.iter().map(|s| s.quantity).sum();
  let count = selected.len() as f64;

  selected.sort_by(|a, b| b.total_profit.total_cmp(&a.total_profit));
  selected.truncate(TOP_PROFIT_SALES);

  ProfitReport {
    total_profit,
    average_profit_per_sqft: ratio(total_profit, total_quantity),
    average_profit_per_sale: ratio(total_profit, count),
    top_sales: selected,
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
  pub inventory_value:  f64,
  pub inventory_sqft:   f64,
  pub today_sale_count: usize,
  pub today_amount:     f64,
  pub today_profit:     f64,
  /// Marble types by total square feet sold, best first.
  pub top_types:        Vec<(String, f64)>,
  pub low_stock:        Vec<InventoryItem>,
  /// Newest first.
  pub recent_sales:     Vec<Sale>,
}

pub fn dashboard(
  items: &[InventoryItem],
  sales: &[Sale],
  today: NaiveDate,
  low_stock_threshold: f64,
) -> Dashboard {
  let todays: Vec<&Sale> = sales
    .iter()
    .filter(|s| s.created_at.date_naive() == today)
    .collect();

  let mut top_types = ranked(sales, |s| s.marble_type.to_string(), |s| s.quantity);
  top_types.truncate(TOP_TYPES);

  let mut recent_sales = sales.to_vec();
  recent_sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  recent_sales.truncate(RECENT_SALES);

  Dashboard {
    inventory_value: items.iter().map(|i| i.total_value).sum(),
    inventory_sqft: items.iter().map(|i| i.quantity).sum(),
    today_sale_count: todays.len(),
    today_amount: todays.iter().map(|s| s.total_amount).sum(),
    today_profit: todays.iter().map(|s| s.total_profit).sum(),
    top_types,
    low_stock: items
      .iter()
      .filter(|i| i.is_low_stock(low_stock_threshold))
      .cloned()
      .collect(),
    recent_sales,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};
  use marble_core::{
    inventory::{MarbleType, Unit},
    sale::InvoiceNumber,
  };
  use uuid::Uuid;

  use super::*;

  const EPS: f64 = 1e-6;

  fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
  }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  fn sale(t: MarbleType, customer: &str, qty: f64, price: f64, cost: f64, when: DateTime<Utc>) -> Sale {
    Sale {
      sale_id:         Uuid::new_v4(),
      owner_id:        Uuid::nil(),
      inventory_id:    Uuid::new_v4(),
      customer_name:   customer.into(),
      customer_phone:  None,
      marble_type:     t,
      item_name:       "slab".into(),
      dimensions:      "1 × 1 feet".into(),
      quantity:        qty,
      purchase_price:  cost,
      sale_price:      price,
      profit_per_sqft: price - cost,
      total_profit:    (price - cost) * qty,
      total_amount:    price * qty,
      remarks:         String::new(),
      cement_info:     String::new(),
      invoice_number:  InvoiceNumber::now(),
      created_at:      when,
    }
  }

  fn item(t: MarbleType, qty: f64) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
      item_id: Uuid::new_v4(),
      owner_id: Uuid::nil(),
      marble_type: t,
      name: "slab".into(),
      width: 1.0,
      height: 1.0,
      unit: Unit::Feet,
      sqft: 1.0,
      purchase_price: 100.0,
      quantity: qty,
      total_value: 100.0 * qty,
      supplier: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn inventory_report_totals_and_groups() {
    let items = vec![
      item(MarbleType::Granite, 30.0),
      item(MarbleType::Tiles, 5.0),
      item(MarbleType::Granite, 20.0),
    ];
    let r = inventory_report(&items, 10.0);
    assert_eq!(r.item_count, 3);
    assert!((r.total_sqft - 55.0).abs() < EPS);
    assert!((r.total_value - 5500.0).abs() < EPS);
    assert_eq!(r.low_stock_count, 1);
    assert_eq!(r.sqft_by_type[0], ("Granite".to_owned(), 50.0));
  }

  #[test]
  fn sales_report_range_is_inclusive() {
    let sales = vec![
      sale(MarbleType::Granite, "Ali", 20.0, 130.0, 100.0, at(2024, 6, 1, 0)),
      sale(MarbleType::Tiles, "Bilal", 5.0, 50.0, 40.0, at(2024, 6, 30, 23)),
      sale(MarbleType::Granite, "Ali", 1.0, 130.0, 100.0, at(2024, 7, 1, 0)),
    ];
    let range = DateRange::new(day(2024, 6, 1), day(2024, 6, 30)).unwrap();
    let r = sales_report(&sales, range);
    assert_eq!(r.sale_count, 2);
    assert!((r.total_amount - 2850.0).abs() < EPS);
    assert!((r.total_profit - 650.0).abs() < EPS);
    assert_eq!(r.quantity_by_customer[0].0, "Ali");
    assert!(DateRange::new(day(2024, 7, 1), day(2024, 6, 1)).is_err());
  }

  #[test]
  fn profit_report_averages_and_ranks() {
    let sales = vec![
      sale(MarbleType::Granite, "Ali", 20.0, 130.0, 100.0, at(2024, 6, 1, 9)),
      sale(MarbleType::Tiles, "Bilal", 10.0, 50.0, 40.0, at(2024, 6, 2, 9)),
    ];
    let r = profit_report(&sales, None);
    assert!((r.total_profit - 700.0).abs() < EPS);
    assert!((r.average_profit_per_sqft - 700.0 / 30.0).abs() < EPS);
    assert!((r.average_profit_per_sale - 350.0).abs() < EPS);
    assert_eq!(r.top_sales[0].customer_name, "Ali");

    let empty = profit_report(&[], None);
    assert_eq!(empty.average_profit_per_sqft, 0.0);
    assert_eq!(empty.average_profit_per_sale, 0.0);
  }

  #[test]
  fn dashboard_today_top_types_and_recent() {
    let sales: Vec<Sale> = (0..7)
      .map(|h| sale(MarbleType::Granite, "Ali", 1.0, 130.0, 100.0, at(2024, 6, 10, h)))
      .chain([sale(MarbleType::Tiles, "Bilal", 2.0, 50.0, 40.0, at(2024, 6, 9, 12))])
      .collect();
    let items = vec![item(MarbleType::Granite, 3.0), item(MarbleType::Tiles, 40.0)];
    let d = dashboard(&items, &sales, day(2024, 6, 10), 10.0);
    assert_eq!(d.today_sale_count, 7);
    assert!((d.today_amount - 910.0).abs() < EPS);
    assert!((d.today_profit - 210.0).abs() < EPS);
    assert_eq!(d.top_types[0].0, "Granite");
    assert_eq!(d.low_stock.len(), 1);
    assert_eq!(d.recent_sales.len(), 5);
    assert_eq!(d.recent_sales[0].created_at, at(2024, 6, 10, 6));
    assert!((d.inventory_value - 4300.0).abs() < EPS);
  }
}
