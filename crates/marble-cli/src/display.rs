//! Plain-text tables and summaries for the terminal.

use marble_core::{
  customer::Customer,
  inventory::InventoryItem,
  pricing::{format_money, format_sqft},
  sale::Sale,
  user::UserProfile,
};
use marble_shop::{
  customers::Statement,
  reports::{Dashboard, InventoryReport, ProfitReport, SalesReport},
};
use uuid::Uuid;

/// First eight hex digits of an id, enough to pick a row by prefix.
pub fn short_id(id: Uuid) -> String { id.simple().to_string()[..8].to_owned() }

fn print_breakdown(title: &str, rows: &[(String, f64)]) {
  if rows.is_empty() {
    return;
  }
  println!("\n{title}:");
  for (label, qty) in rows {
    println!("  {label:<24} {:>14}", format_sqft(*qty));
  }
}

pub fn print_profile(profile: &UserProfile) {
  println!("{} <{}>", profile.name, profile.email);
  println!("role:       {}", profile.role);
  println!("member since {}", profile.created_at.format("%Y-%m-%d"));
  println!("last login  {}", profile.last_login.format("%Y-%m-%d %H:%M UTC"));
}

pub fn print_items<'a>(items: impl IntoIterator<Item = &'a InventoryItem>, threshold: f64) {
  println!(
    "{:<8}  {:<14} {:<22} {:<18} {:>14} {:>14} {:>16}",
    "ID", "TYPE", "NAME", "SIZE", "RATE", "ON HAND", "VALUE"
  );
  for item in items {
    let flag = if item.is_low_stock(threshold) { " !" } else { "" };
    println!(
      "{:<8}  {:<14} {:<22} {:<18} {:>14} {:>14} {:>16}{flag}",
      short_id(item.item_id),
      item.marble_type.as_str(),
      item.name,
      item.dimensions().label(),
      format_money(item.purchase_price),
      format_sqft(item.quantity),
      format_money(item.total_value),
    );
  }
}

pub fn print_customers<'a>(customers: impl IntoIterator<Item = &'a Customer>) {
  println!(
    "{:<8}  {:<22} {:<16} {:>9} {:>16}  {}",
    "ID", "NAME", "PHONE", "PURCHASES", "TOTAL", "LAST PURCHASE"
  );
  for c in customers {
    println!(
      "{:<8}  {:<22} {:<16} {:>9} {:>16}  {}",
      short_id(c.customer_id),
      c.name,
      c.phone,
      c.total_purchases,
      format_money(c.total_amount),
      c.last_purchase
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into()),
    );
  }
}

pub fn print_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) {
  println!(
    "{:<28} {:<10} {:<18} {:<20} {:>12} {:>16} {:>14}",
    "INVOICE", "DATE", "CUSTOMER", "ITEM", "QTY", "AMOUNT", "PROFIT"
  );
  for s in sales {
    println!(
      "{:<28} {:<10} {:<18} {:<20} {:>12} {:>16} {:>14}",
      s.invoice_number.as_str(),
      s.created_at.format("%Y-%m-%d"),
      s.customer_name,
      s.item_name,
      format_sqft(s.quantity),
      format_money(s.total_amount),
      format_money(s.total_profit),
    );
  }
}

pub fn print_statement(st: &Statement) {
  let c = &st.customer;
  println!("{} ({})", c.name, c.phone);
  if let Some(address) = &c.address {
    println!("{address}");
  }
  println!(
    "purchases: {}   total: {}   profit: {}   avg profit/sale: {}\n",
    st.purchase_count,
    format_money(st.total_amount),
    format_money(st.total_profit),
    format_money(st.average_profit),
  );
  print_sales(&st.sales);
}

pub fn print_inventory_report(r: &InventoryReport) {
  println!("items:          {}", r.item_count);
  println!("total stock:    {}", format_sqft(r.total_sqft));
  println!("total value:    {}", format_money(r.total_value));
  println!("low stock:      {}", r.low_stock_count);
  print_breakdown("stock by type", &r.sqft_by_type);
}

pub fn print_sales_report(r: &SalesReport) {
  println!("{} to {}", r.range.from, r.range.to);
  println!("sales:          {}", r.sale_count);
  println!("quantity sold:  {}", format_sqft(r.total_quantity));
  println!("revenue:        {}", format_money(r.total_amount));
  println!("profit:         {}", format_money(r.total_profit));
  print_breakdown("quantity by type", &r.quantity_by_type);
  print_breakdown("quantity by customer", &r.quantity_by_customer);
  if !r.sales.is_empty() {
    println!();
    print_sales(&r.sales);
  }
}

pub fn print_profit_report(r: &ProfitReport) {
  println!("total profit:        {}", format_money(r.total_profit));
  println!("avg profit / sq.ft:  {}", format_money(r.average_profit_per_sqft));
  println!("avg profit / sale:   {}", format_money(r.average_profit_per_sale));
  if !r.top_sales.is_empty() {
    println!("\nmost profitable sales:");
    print_sales(&r.top_sales);
  }
}

pub fn print_dashboard(d: &Dashboard, threshold: f64) {
  println!("inventory value:  {}", format_money(d.inventory_value));
  println!("stock on hand:    {}", format_sqft(d.inventory_sqft));
  println!(
    "today:            {} sales, {} revenue, {} profit",
    d.today_sale_count,
    format_money(d.today_amount),
    format_money(d.today_profit)
  );
  print_breakdown("top selling types", &d.top_types);
  if !d.low_stock.is_empty() {
    println!("\nlow stock:");
    print_items(&d.low_stock, threshold);
  }
  if !d.recent_sales.is_empty() {
    println!("\nrecent sales:");
    print_sales(&d.recent_sales);
  }
}
