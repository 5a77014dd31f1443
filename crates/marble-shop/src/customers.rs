//! Customer resolution, search and the per-customer ledger.

use marble_core::{
  customer::{Customer, CustomerPatch, NewCustomer},
  sale::Sale,
  store::ShopStore,
};
use uuid::Uuid;

/// What [`find_or_create_customer`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerOutcome {
  /// No phone number, so nothing was persisted.
  Skipped,
  Updated(Customer),
  Created(Customer),
}

impl CustomerOutcome {
  pub fn customer(&self) -> Option<&Customer> {
    match self {
      Self::Skipped => None,
      Self::Updated(c) | Self::Created(c) => Some(c),
    }
  }
}

/// Fold a sale of `amount` into the customer with this exact phone number,
/// creating the customer on their first sale.
///
/// The aggregate is read then written back; two concurrent sales to the
/// same phone can lose one increment.
pub async fn find_or_create_customer<S: ShopStore>(
  store: &S,
  owner_id: Uuid,
  name: &str,
  phone: &str,
  amount: f64,
) -> Result<CustomerOutcome, S::Error> {
  let phone = phone.trim();
  if phone.is_empty() {
    return Ok(CustomerOutcome::Skipped);
  }

  match store.find_customer_by_phone(owner_id, phone.to_owned()).await? {
    Some(existing) => {
      let patch = CustomerPatch::record_sale(&existing, amount);
      let updated = store.update_customer(existing.customer_id, patch).await?;
      Ok(CustomerOutcome::Updated(updated))
    }
    None => {
      let created = store
        .add_customer(owner_id, NewCustomer::from_first_sale(name, phone, amount))
        .await?;
      Ok(CustomerOutcome::Created(created))
    }
  }
}

/// Customers whose name contains `term` (ignoring case) or whose phone
/// contains it.
pub fn search<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
  customers.iter().filter(|c| c.matches(term)).collect()
}

pub fn find_by_phone<'a>(customers: &'a [Customer], phone: &str) -> Option<&'a Customer> {
  let phone = phone.trim();
  customers.iter().find(|c| c.phone == phone)
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A customer's purchase history as derived from the sales themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub customer:       Customer,
  /// Newest first.
  pub sales:          Vec<Sale>,
  pub purchase_count: usize,
  pub total_amount:   f64,
  pub total_profit:   f64,
  pub average_profit: f64,
}

/// Build the statement for `customer` from the sales made to their name and
/// phone.
pub fn statement(customer: &Customer, sales: &[Sale]) -> Statement {
  let mut matched: Vec<Sale> = sales
    .iter()
    .filter(|s| s.is_for(&customer.name, &customer.phone))
    .cloned()
    .collect();
  matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

  let total_amount: f64 = matched.iter().map(|s| s.total_amount).sum();
  let total_profit: f64 = matched.iter().map(|s| s.total_profit).sum();
  let average_profit = if matched.is_empty() {
    0.0
  } else {
    total_profit / matched.len() as f64
  };

  Statement {
    customer: customer.clone(),
    purchase_count: matched.len(),
    sales: matched,
    total_amount,
    total_profit,
    average_profit,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};
  use marble_core::{
    inventory::MarbleType,
    sale::InvoiceNumber,
  };

  use super::*;

  fn customer(name: &str, phone: &str) -> Customer {
    let now = Utc::now();
    Customer {
      customer_id:     Uuid::new_v4(),
      owner_id:        Uuid::nil(),
      name:            name.into(),
      phone:           phone.into(),
      address:         None,
      total_purchases: 0,
      total_amount:    0.0,
      last_purchase:   None,
      created_at:      now,
      updated_at:      now,
    }
  }

  fn sale(name: &str, phone: Option<&str>, amount: f64, profit: f64, age_days: i64) -> Sale {
    Sale {
      sale_id:         Uuid::new_v4(),
      owner_id:        Uuid::nil(),
      inventory_id:    Uuid::new_v4(),
      customer_name:   name.into(),
      customer_phone:  phone.map(Into::into),
      marble_type:     MarbleType::Granite,
      item_name:       "Black Galaxy".into(),
      dimensions:      "24 × 60 inches".into(),
      quantity:        1.0,
      purchase_price:  amount - profit,
      sale_price:      amount,
      profit_per_sqft: profit,
      total_profit:    profit,
      total_amount:    amount,
      remarks:         String::new(),
      cement_info:     String::new(),
      invoice_number:  InvoiceNumber::now(),
      created_at:      Utc::now() - Duration::days(age_days),
    }
  }

  #[test]
  fn search_by_name_or_phone() {
    let list = vec![customer("Ali Raza", "0300-1111111"), customer("Bilal", "0321-2222222")];
    let names: Vec<_> = search(&list, "ali").iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Ali Raza"]);
    assert_eq!(search(&list, "0321").len(), 1);
    assert_eq!(search(&list, "").len(), 2);
    assert!(find_by_phone(&list, " 0321-2222222 ").is_some());
    assert!(find_by_phone(&list, "0321").is_none());
  }

  #[test]
  fn statement_matches_name_and_phone_newest_first() {
    let ali = customer("Ali", "0300");
    let sales = vec![
      sale("Ali", Some("0300"), 2600.0, 600.0, 2),
      sale("Ali", Some("0311"), 999.0, 99.0, 1),
      sale("Ali", Some("0300"), 1000.0, 200.0, 0),
      sale("Bilal", Some("0300"), 500.0, 50.0, 0),
    ];
    let st = statement(&ali, &sales);
    assert_eq!(st.purchase_count, 2);
    assert_eq!(st.sales[0].total_amount, 1000.0);
    assert!((st.total_amount - 3600.0).abs() < 1e-6);
    assert!((st.total_profit - 800.0).abs() < 1e-6);
    assert!((st.average_profit - 400.0).abs() < 1e-6);
  }

  #[test]
  fn empty_statement_has_zero_average() {
    let st = statement(&customer("Nobody", "0000"), &[]);
    assert_eq!(st.purchase_count, 0);
    assert_eq!(st.average_profit, 0.0);
  }
}
