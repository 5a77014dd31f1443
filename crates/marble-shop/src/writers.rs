//! Narrow write contracts handed to each view.
//!
//! Every successful write is followed by a full reload before the call
//! returns, so its effect is visible to the next action.

use std::future::Future;

use marble_core::{
  customer::{Customer, NewCustomer},
  inventory::{InventoryItem, InventoryPatch, NewInventoryItem},
  sale::Sale,
};
use uuid::Uuid;

use crate::Result;

pub trait InventoryWriter {
  fn add_item(
    &mut self,
    item: NewInventoryItem,
  ) -> impl Future<Output = Result<InventoryItem>> + Send;

  fn update_item(
    &mut self,
    item_id: Uuid,
    patch: InventoryPatch,
  ) -> impl Future<Output = Result<InventoryItem>> + Send;

  fn delete_item(&mut self, item_id: Uuid) -> impl Future<Output = Result<()>> + Send;

  /// Add `delta` square feet to the quantity last loaded for `item_id`.
  fn restock(
    &mut self,
    item_id: Uuid,
    delta: f64,
  ) -> impl Future<Output = Result<InventoryItem>> + Send;
}

pub trait CustomerWriter {
  /// Rejects a phone number already on file.
  fn add_customer(
    &mut self,
    customer: NewCustomer,
  ) -> impl Future<Output = Result<Customer>> + Send;
}

/// Everything needed to record one sale. `item` is the snapshot taken when
/// the item was selected.
#[derive(Debug, Clone)]
pub struct SaleOrder {
  pub item:           InventoryItem,
  pub customer_name:  String,
  pub customer_phone: String,
  pub quantity:       f64,
  pub sale_price:     f64,
  pub remarks:        String,
  pub cement_info:    String,
}

pub trait SaleRecorder {
  /// Create the sale, decrement stock, update the customer aggregate and
  /// reload, in that order. Nothing is undone if a later step fails.
  fn record_sale(&mut self, order: SaleOrder) -> impl Future<Output = Result<Sale>> + Send;
}
