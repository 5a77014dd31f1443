//! The guided sale: pick a customer, pick an item, enter the terms, commit.
//!
//! All entered values live in the workflow until commit. Going back never
//! clears them. After a commit the workflow shows the result for
//! [`RESET_DELAY`] and then starts over.

use std::time::Duration;

use marble_core::{
  customer::{Customer, NewCustomer},
  inventory::InventoryItem,
  pricing::{SaleQuote, format_money, suggested_sale_price},
  sale::Sale,
};
use strum::Display;
use tokio::time::Instant;
use tracing::debug;

use crate::{
  Error, Result,
  writers::{CustomerWriter, SaleOrder, SaleRecorder},
};

/// How long the committed state stays on screen before the form resets.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Step {
  #[strum(serialize = "selecting a customer")]
  SelectCustomer,
  #[strum(serialize = "selecting an item")]
  SelectItem,
  #[strum(serialize = "entering sale terms")]
  EnterTerms,
  #[strum(serialize = "committed")]
  Committed,
}

/// The customer a sale is for, as copied onto the sale record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerChoice {
  pub name:  String,
  pub phone: String,
}

impl From<&Customer> for CustomerChoice {
  fn from(c: &Customer) -> Self { Self { name: c.name.clone(), phone: c.phone.clone() } }
}

/// Operator-entered terms. The sale price is `None` until it is seeded by an
/// item selection or entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleTerms {
  pub quantity:    f64,
  pub sale_price:  Option<f64>,
  pub remarks:     String,
  pub cement_info: String,
}

#[derive(Debug)]
pub struct SalesWorkflow {
  step:         Step,
  customer:     Option<CustomerChoice>,
  item:         Option<InventoryItem>,
  terms:        SaleTerms,
  last_sale:    Option<Sale>,
  committed_at: Option<Instant>,
  in_flight:    bool,
  notice:       Option<String>,
}

impl Default for SalesWorkflow {
  fn default() -> Self { Self::new() }
}

impl SalesWorkflow {
  pub fn new() -> Self {
    Self {
      step:         Step::SelectCustomer,
      customer:     None,
      item:         None,
      terms:        SaleTerms::default(),
      last_sale:    None,
      committed_at: None,
      in_flight:    false,
      notice:       None,
    }
  }

  pub fn step(&self) -> Step { self.step }

  pub fn customer(&self) -> Option<&CustomerChoice> { self.customer.as_ref() }

  pub fn item(&self) -> Option<&InventoryItem> { self.item.as_ref() }

  pub fn terms(&self) -> &SaleTerms { &self.terms }

  /// The last committed sale, while the committed state is showing.
  pub fn committed_sale(&self) -> Option<&Sale> { self.last_sale.as_ref() }

  /// Message for the operator: the outcome of the last commit or failure.
  pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

  /// Whether a commit is outstanding; the commit control is disabled.
  pub fn is_busy(&self) -> bool { self.in_flight }

  fn expect_step(&self, expected: Step) -> Result<()> {
    if self.step == expected {
      Ok(())
    } else {
      Err(Error::WrongStep { expected, actual: self.step })
    }
  }

  // ── Step 1: customer ──────────────────────────────────────────────────────

  /// Use an existing customer and advance.
  pub fn select_customer(&mut self, customer: &Customer) -> Result<()> {
    self.choose(CustomerChoice::from(customer))
  }

  /// Use a name and phone typed by the operator, for a customer that may or
  /// may not be on file yet. Both are required.
  pub fn enter_customer(&mut self, name: &str, phone: &str) -> Result<()> {
    self.choose(CustomerChoice { name: name.trim().to_owned(), phone: phone.trim().to_owned() })
  }

  /// Register a new customer, then select it and advance.
  pub async fn create_customer<W: CustomerWriter>(
    &mut self,
    writer: &mut W,
    form: NewCustomer,
  ) -> Result<Customer> {
    self.expect_step(Step::SelectCustomer)?;
    let customer = writer.add_customer(form).await?;
    self.choose(CustomerChoice::from(&customer))?;
    Ok(customer)
  }

  fn choose(&mut self, choice: CustomerChoice) -> Result<()> {
    self.expect_step(Step::SelectCustomer)?;
    if choice.name.is_empty() {
      return Err(Error::MissingField("customer name"));
    }
    if choice.phone.is_empty() {
      return Err(Error::MissingField("customer phone"));
    }
    debug!(customer = %choice.name, "customer selected");
    self.customer = Some(choice);
    self.step = Step::SelectItem;
    Ok(())
  }

  // ── Step 2: item ──────────────────────────────────────────────────────────

  /// Select an item with stock on hand and advance. Picking a different item
  /// than before, or one with no price entered yet, seeds the suggested sale
  /// price.
  pub fn select_item(&mut self, item: &InventoryItem) -> Result<()> {
    self.expect_step(Step::SelectItem)?;
    if !item.in_stock() {
      return Err(Error::OutOfStock(item.name.clone()));
    }
    let same_item = self.item.as_ref().is_some_and(|i| i.item_id == item.item_id);
    if !same_item || self.terms.sale_price.is_none() {
      self.terms.sale_price = Some(suggested_sale_price(item.purchase_price));
    }
    debug!(item = %item.name, available = item.quantity, "item selected");
    self.item = Some(item.clone());
    self.step = Step::EnterTerms;
    Ok(())
  }

  // ── Step 3: terms ─────────────────────────────────────────────────────────

  pub fn set_quantity(&mut self, quantity: f64) { self.terms.quantity = quantity; }

  pub fn set_sale_price(&mut self, price: f64) { self.terms.sale_price = Some(price); }

  pub fn set_remarks(&mut self, remarks: impl Into<String>) { self.terms.remarks = remarks.into(); }

  pub fn set_cement_info(&mut self, info: impl Into<String>) {
    self.terms.cement_info = info.into();
  }

  /// Live profit preview for the entered terms.
  pub fn quote(&self) -> Option<SaleQuote> {
    let item = self.item.as_ref()?;
    let price = self.terms.sale_price?;
    Some(SaleQuote::compute(item.purchase_price, price, self.terms.quantity))
  }

  /// Step back one screen, keeping everything entered.
  pub fn back(&mut self) -> Result<()> {
    self.step = match self.step {
      Step::SelectCustomer => Step::SelectCustomer,
      Step::SelectItem => Step::SelectCustomer,
      Step::EnterTerms => Step::SelectItem,
      Step::Committed => {
        return Err(Error::WrongStep { expected: Step::EnterTerms, actual: Step::Committed });
      }
    };
    Ok(())
  }

  /// Validate the terms against the selected item and record the sale.
  ///
  /// A sale that was written but whose follow-up writes failed still moves
  /// the workflow to [`Step::Committed`], so it cannot be submitted twice.
  pub async fn commit<R: SaleRecorder>(&mut self, recorder: &mut R) -> Result<Sale> {
    self.expect_step(Step::EnterTerms)?;
    if self.in_flight {
      return Err(Error::Busy);
    }
    let order = self.order()?;

    self.in_flight = true;
    self.notice = None;
    let result = recorder.record_sale(order).await;
    self.in_flight = false;

    match result {
      Ok(sale) => {
        self.notice = Some(format!(
          "Sale completed. Invoice {}. Profit: {}",
          sale.invoice_number,
          format_money(sale.total_profit)
        ));
        self.last_sale = Some(sale.clone());
        self.committed_at = Some(Instant::now());
        self.step = Step::Committed;
        Ok(sale)
      }
      Err(Error::PartialSale { sale, stage, source }) => {
        let err = Error::PartialSale { sale: sale.clone(), stage, source };
        self.notice = Some(err.to_string());
        self.last_sale = Some(*sale);
        self.committed_at = Some(Instant::now());
        self.step = Step::Committed;
        Err(err)
      }
      Err(err) => {
        self.notice = Some(err.to_string());
        Err(err)
      }
    }
  }

  fn order(&self) -> Result<SaleOrder> {
    let customer = self.customer.as_ref().ok_or(Error::MissingField("customer"))?;
    let item = self.item.as_ref().ok_or(Error::MissingField("item"))?;
    let terms = &self.terms;
    if !terms.quantity.is_finite() || terms.quantity <= 0.0 {
      return Err(Error::MissingField("quantity"));
    }
    let sale_price = terms.sale_price.ok_or(Error::MissingField("sale price"))?;
    if !sale_price.is_finite() || sale_price <= 0.0 {
      return Err(Error::InvalidValue {
        field:  "sale price",
        reason: format!("must be greater than zero, got {sale_price}"),
      });
    }
    if terms.quantity > item.quantity {
      return Err(Error::InsufficientStock {
        requested: terms.quantity,
        available: item.quantity,
      });
    }
    Ok(SaleOrder {
      item:           item.clone(),
      customer_name:  customer.name.clone(),
      customer_phone: customer.phone.clone(),
      quantity:       terms.quantity,
      sale_price,
      remarks:        terms.remarks.clone(),
      cement_info:    terms.cement_info.clone(),
    })
  }

  // ── Reset ─────────────────────────────────────────────────────────────────

  /// Reset if the committed state has been showing for [`RESET_DELAY`].
  /// Returns whether a reset happened.
  pub fn tick(&mut self, now: Instant) -> bool {
    if self.step != Step::Committed {
      return false;
    }
    let due = self
      .committed_at
      .is_none_or(|at| now.duration_since(at) >= RESET_DELAY);
    if due {
      self.reset();
    }
    due
  }

  /// Wait out the display delay, then reset.
  pub async fn settle(&mut self) {
    if let Some(at) = self.committed_at {
      tokio::time::sleep_until(at + RESET_DELAY).await;
    }
    self.tick(Instant::now());
  }

  /// Clear all workflow-local state and return to the first step.
  pub fn reset(&mut self) { *self = Self::new(); }
}
