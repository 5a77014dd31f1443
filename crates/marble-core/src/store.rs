//! The `ShopStore` trait, the document store every other layer talks to.
//!
//! Four collections live behind it: users, inventory, customers and sales.
//! Every inventory, customer and sale document carries the id of the user
//! that created it, and every list operation is scoped by that owner id.
//! The store assigns ids and all timestamps; callers never supply them.
//!
//! There are no cross-collection transactions. Each method is one
//! independent write or read, and concurrent writers are last-write-wins.

use std::future::Future;

use uuid::Uuid;

use crate::{
  customer::{Customer, CustomerPatch, NewCustomer},
  inventory::{InventoryItem, InventoryPatch, NewInventoryItem},
  sale::{NewSale, Sale},
  user::{NewUserProfile, UserProfile},
};

/// Abstraction over the shop's document store backend.
///
/// All methods return `Send` futures so the trait can be driven from a
/// multi-threaded tokio runtime.
pub trait ShopStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Fetch the profile keyed by `user_id`. Returns `None` if absent.
  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Create a profile under the caller-supplied `user_id`. Both timestamps
  /// are set to the store's clock. Errors if the id is already taken.
  fn put_user(
    &self,
    profile: NewUserProfile,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Number of profiles ever created.
  fn count_users(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Stamp `last_login` with the store's clock.
  fn touch_last_login(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Inventory ─────────────────────────────────────────────────────────

  fn add_item(
    &self,
    owner_id: Uuid,
    item: NewInventoryItem,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  /// All items owned by `owner_id`, oldest first.
  fn list_items(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// Write the `Some` fields of `patch` and return the updated item.
  /// Errors if no item has this id.
  fn update_item(
    &self,
    item_id: Uuid,
    patch: InventoryPatch,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  /// Errors if no item has this id. Sales referencing it are untouched.
  fn delete_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Customers ─────────────────────────────────────────────────────────

  fn add_customer(
    &self,
    owner_id: Uuid,
    customer: NewCustomer,
  ) -> impl Future<Output = Result<Customer, Self::Error>> + Send + '_;

  /// All customers owned by `owner_id`, oldest first.
  fn list_customers(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  /// The oldest customer of `owner_id` whose phone equals `phone` exactly.
  fn find_customer_by_phone(
    &self,
    owner_id: Uuid,
    phone: String,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// Write the `Some` fields of `patch` and return the updated customer.
  /// Errors if no customer has this id.
  fn update_customer(
    &self,
    customer_id: Uuid,
    patch: CustomerPatch,
  ) -> impl Future<Output = Result<Customer, Self::Error>> + Send + '_;

  // ── Sales ─────────────────────────────────────────────────────────────

  fn add_sale(
    &self,
    owner_id: Uuid,
    sale: NewSale,
  ) -> impl Future<Output = Result<Sale, Self::Error>> + Send + '_;

  /// All sales owned by `owner_id`, oldest first.
  fn list_sales(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Sale>, Self::Error>> + Send + '_;
}
