//! End-to-end tests of the session and sales workflow against an in-memory
//! SQLite store.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use marble_core::{
  auth::{Credentials, IdentityProvider, SignUp},
  customer::{Customer, CustomerPatch, NewCustomer},
  inventory::{Dimensions, InventoryItem, InventoryPatch, MarbleType, NewInventoryItem, Unit},
  sale::{NewSale, Sale},
  store::ShopStore,
  user::{NewUserProfile, Role, UserProfile},
};
use marble_store_sqlite::{SqliteAuth, SqliteStore};
use uuid::Uuid;

use crate::{
  CommitStage, Error, SalesWorkflow, Session, Step,
  customers::{self, CustomerOutcome},
  inventory,
  workflow::RESET_DELAY,
  writers::{CustomerWriter, InventoryWriter},
};

const EPS: f64 = 1e-6;

fn sign_up(email: &str, name: &str) -> SignUp {
  SignUp {
    email:        email.into(),
    password:     "secret1".into(),
    display_name: name.into(),
  }
}

async fn signed_in() -> (Session<SqliteStore>, SqliteAuth) {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let auth = store.identity_provider();
  let mut rx = auth.subscribe();
  let mut session = Session::new(Arc::new(store));
  auth.register(sign_up("owner@shop.pk", "Owner")).await.unwrap();
  session.follow(&mut rx).await.unwrap();
  (session, auth)
}

fn granite(purchase_price: f64, quantity: f64) -> NewInventoryItem {
  NewInventoryItem::new(
    MarbleType::Granite,
    "Black Galaxy",
    Dimensions::new(24.0, 60.0, Unit::Inches).unwrap(),
    purchase_price,
    quantity,
    None,
  )
  .unwrap()
}

/// Run the workflow from customer entry to commit.
async fn sell<W>(
  session: &mut Session<W>,
  item_id: Uuid,
  name: &str,
  phone: &str,
  quantity: f64,
  price: f64,
) -> crate::Result<Sale>
where
  W: ShopStore,
{
  let mut flow = SalesWorkflow::new();
  flow.enter_customer(name, phone)?;
  let item = session.state().item(item_id).cloned().expect("item loaded");
  flow.select_item(&item)?;
  flow.set_quantity(quantity);
  flow.set_sale_price(price);
  flow.commit(session).await
}

fn only_item(session: &Session<impl ShopStore>) -> InventoryItem {
  assert_eq!(session.state().inventory().len(), 1);
  session.state().inventory()[0].clone()
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_profile_is_admin_later_ones_staff() {
  let (mut session, auth) = signed_in().await;
  let owner = session.profile().cloned().unwrap();
  assert_eq!(owner.role, Role::Admin);
  assert_eq!(owner.name, "Owner");

  let mut rx = auth.subscribe();
  auth.register(sign_up("staff@shop.pk", "Sana")).await.unwrap();
  session.follow(&mut rx).await.unwrap();
  assert_eq!(session.profile().unwrap().role, Role::Staff);

  auth
    .login(Credentials { email: "owner@shop.pk".into(), password: "secret1".into() })
    .await
    .unwrap();
  session.follow(&mut rx).await.unwrap();
  let again = session.profile().unwrap();
  assert_eq!(again.user_id, owner.user_id);
  assert_eq!(again.role, Role::Admin);
  assert!(again.last_login >= owner.last_login);
}

#[tokio::test]
async fn sign_out_clears_collections() {
  let (mut session, auth) = signed_in().await;
  session.add_item(granite(100.0, 50.0)).await.unwrap();
  assert_eq!(session.state().inventory().len(), 1);

  let mut rx = auth.subscribe();
  auth.logout().await.unwrap();
  session.follow(&mut rx).await.unwrap();
  assert!(session.profile().is_none());
  assert!(session.state().inventory().is_empty());
  assert!(matches!(
    session.add_item(granite(1.0, 1.0)).await,
    Err(Error::NotSignedIn)
  ));
}

#[tokio::test]
async fn data_is_partitioned_by_owner() {
  let (mut session, auth) = signed_in().await;
  session.add_item(granite(100.0, 50.0)).await.unwrap();

  let mut rx = auth.subscribe();
  auth.register(sign_up("other@shop.pk", "Other")).await.unwrap();
  session.follow(&mut rx).await.unwrap();
  assert!(session.state().inventory().is_empty());
}

#[tokio::test]
async fn items_of_another_owner_cannot_be_changed() {
  let (mut session, auth) = signed_in().await;
  let theirs = session.add_item(granite(100.0, 50.0)).await.unwrap();
  let owner = session.profile().unwrap().user_id;

  let mut rx = auth.subscribe();
  auth.register(sign_up("other@shop.pk", "Other")).await.unwrap();
  session.follow(&mut rx).await.unwrap();

  let patch = InventoryPatch::set_quantity(100.0, 0.0);
  assert!(matches!(
    session.update_item(theirs.item_id, patch).await,
    Err(Error::NotFound { kind: "item", .. })
  ));
  assert!(matches!(
    session.delete_item(theirs.item_id).await,
    Err(Error::NotFound { kind: "item", .. })
  ));
  assert!(matches!(
    session.restock(theirs.item_id, 5.0).await,
    Err(Error::NotFound { kind: "item", .. })
  ));

  let untouched = session.store().list_items(owner).await.unwrap();
  assert_eq!(untouched.len(), 1);
  assert_eq!(untouched[0].quantity, 50.0);
}

#[tokio::test]
async fn reloading_twice_yields_the_same_collections() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();
  sell(&mut session, item.item_id, "Ali", "0300", 5.0, 130.0).await.unwrap();

  session.reload().await.unwrap();
  let first = session.state().collections().clone();
  session.reload().await.unwrap();
  assert_eq!(&first, session.state().collections());
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn restock_edit_and_delete() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 30.0)).await.unwrap();

  let restocked = session.restock(item.item_id, 20.0).await.unwrap();
  assert_eq!(restocked.quantity, 50.0);
  assert_eq!(restocked.total_value, 5000.0);
  assert_eq!(only_item(&session).quantity, 50.0);
  assert!(matches!(
    session.restock(item.item_id, 0.0).await,
    Err(Error::InvalidValue { .. })
  ));

  let form = NewInventoryItem::new(
    MarbleType::Tiles,
    "Sunny Beige",
    Dimensions::new(2.0, 2.0, Unit::Feet).unwrap(),
    80.0,
    50.0,
    Some("Multan Tiles".into()),
  )
  .unwrap();
  let edited = session
    .update_item(item.item_id, inventory::edit_patch(form))
    .await
    .unwrap();
  assert_eq!(edited.marble_type, MarbleType::Tiles);
  assert_eq!(edited.sqft, 4.0);
  assert_eq!(edited.total_value, 4000.0);

  session.delete_item(item.item_id).await.unwrap();
  assert!(session.state().inventory().is_empty());
  assert!(matches!(
    session.restock(item.item_id, 1.0).await,
    Err(Error::NotFound { .. })
  ));
}

// ─── Sales workflow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_sale_decrements_stock_and_records_profit() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();

  let sale = sell(&mut session, item.item_id, "Ali", "0300-1234567", 20.0, 130.0)
    .await
    .unwrap();
  assert!((sale.total_amount - 2600.0).abs() < EPS);
  assert!((sale.total_profit - 600.0).abs() < EPS);
  assert!((sale.profit_per_sqft - 30.0).abs() < EPS);
  assert_eq!(sale.purchase_price, 100.0);
  assert_eq!(sale.dimensions, "24 × 60 inches");

  let after = only_item(&session);
  assert!((after.quantity - 30.0).abs() < EPS);
  assert!((after.total_value - 3000.0).abs() < EPS);
  assert_eq!(session.state().sales().len(), 1);
}

#[tokio::test]
async fn scenario_b_customer_aggregate_accumulates() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();

  sell(&mut session, item.item_id, "Ali", "0300-1234567", 20.0, 130.0).await.unwrap();
  let customers = session.state().customers();
  assert_eq!(customers.len(), 1);
  assert_eq!(customers[0].total_purchases, 1);
  assert!((customers[0].total_amount - 2600.0).abs() < EPS);
  assert!(customers[0].last_purchase.is_some());

  sell(&mut session, item.item_id, "Ali", "0300-1234567", 10.0, 100.0).await.unwrap();
  let customers = session.state().customers();
  assert_eq!(customers.len(), 1);
  assert_eq!(customers[0].total_purchases, 2);
  assert!((customers[0].total_amount - 3600.0).abs() < EPS);

  let st = customers::statement(&customers[0], session.state().sales());
  assert_eq!(st.purchase_count, 2);
  assert!((st.total_amount - 3600.0).abs() < EPS);
}

#[tokio::test]
async fn scenario_c_oversell_is_rejected_before_any_write() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();
  sell(&mut session, item.item_id, "Ali", "0300", 20.0, 130.0).await.unwrap();

  let err = sell(&mut session, item.item_id, "Ali", "0300", 60.0, 130.0)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::InsufficientStock { requested, available } if requested == 60.0 && available == 30.0
  ));
  assert_eq!(session.state().sales().len(), 1);
  assert!((only_item(&session).quantity - 30.0).abs() < EPS);
  assert_eq!(session.state().customers()[0].total_purchases, 1);
}

#[tokio::test]
async fn restock_after_selection_survives_the_sale() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();

  let mut flow = SalesWorkflow::new();
  flow.enter_customer("Ali", "0300").unwrap();
  flow.select_item(&item).unwrap();
  session.restock(item.item_id, 20.0).await.unwrap();

  flow.set_quantity(10.0);
  flow.commit(&mut session).await.unwrap();
  let after = only_item(&session);
  assert!((after.quantity - 60.0).abs() < EPS);
  assert!((after.total_value - 6000.0).abs() < EPS);
}

#[tokio::test]
async fn scenario_d_area_of_inch_slab() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();
  assert_eq!(format!("{:.2}", item.sqft), "10.00");
}

#[tokio::test]
async fn selling_exact_stock_leaves_zero_and_hides_item() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();
  sell(&mut session, item.item_id, "Ali", "0300", 50.0, 130.0).await.unwrap();

  assert_eq!(only_item(&session).quantity, 0.0);
  assert!(inventory::sellable(session.state().inventory(), "").is_empty());

  let mut flow = SalesWorkflow::new();
  flow.enter_customer("Ali", "0300").unwrap();
  assert!(matches!(
    flow.select_item(&only_item(&session)),
    Err(Error::OutOfStock(_))
  ));
}

#[tokio::test]
async fn workflow_guards_and_back_navigation() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();
  let mut flow = SalesWorkflow::new();

  assert!(matches!(
    flow.select_item(&item),
    Err(Error::WrongStep { expected: Step::SelectItem, actual: Step::SelectCustomer })
  ));
  assert!(matches!(
    flow.enter_customer("Ali", " "),
    Err(Error::MissingField("customer phone"))
  ));

  let created = flow
    .create_customer(&mut session, NewCustomer::new("Ali", "0300", None).unwrap())
    .await
    .unwrap();
  assert_eq!(flow.step(), Step::SelectItem);
  assert_eq!(flow.customer().unwrap().phone, created.phone);

  flow.select_item(&item).unwrap();
  assert_eq!(flow.terms().sale_price, Some(120.0));
  flow.set_quantity(5.0);
  flow.set_sale_price(125.0);
  let quote = flow.quote().unwrap();
  assert!((quote.total_amount - 625.0).abs() < EPS);

  flow.back().unwrap();
  flow.back().unwrap();
  assert_eq!(flow.step(), Step::SelectCustomer);
  assert_eq!(flow.terms().quantity, 5.0);
  assert_eq!(flow.customer().unwrap().name, "Ali");

  flow.select_customer(&created).unwrap();
  flow.select_item(&item).unwrap();
  assert_eq!(flow.terms().sale_price, Some(125.0));

  flow.set_quantity(0.0);
  assert!(matches!(
    flow.commit(&mut session).await,
    Err(Error::MissingField("quantity"))
  ));
  assert_eq!(flow.step(), Step::EnterTerms);
  assert!(flow.notice().is_none());
}

#[tokio::test]
async fn entered_zero_price_is_not_reseeded() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();

  let mut flow = SalesWorkflow::new();
  assert_eq!(flow.terms().sale_price, None);
  assert!(flow.quote().is_none());
  flow.enter_customer("Ali", "0300").unwrap();
  flow.select_item(&item).unwrap();
  flow.set_quantity(5.0);
  flow.set_sale_price(0.0);

  flow.back().unwrap();
  flow.select_item(&item).unwrap();
  assert_eq!(flow.terms().sale_price, Some(0.0));
  assert!(matches!(
    flow.commit(&mut session).await,
    Err(Error::InvalidValue { field: "sale price", .. })
  ));
  assert!(session.state().sales().is_empty());
}

#[tokio::test]
async fn duplicate_phone_is_rejected() {
  let (mut session, _auth) = signed_in().await;
  session
    .add_customer(NewCustomer::new("Ali", "0300", None).unwrap())
    .await
    .unwrap();
  let mut flow = SalesWorkflow::new();
  let err = flow
    .create_customer(&mut session, NewCustomer::new("Other Ali", "0300", None).unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicatePhone(p) if p == "0300"));
  assert_eq!(flow.step(), Step::SelectCustomer);
  assert_eq!(session.state().customers().len(), 1);
}

#[tokio::test]
async fn committed_workflow_resets_after_delay() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();

  let mut flow = SalesWorkflow::new();
  flow.enter_customer("Ali", "0300").unwrap();
  flow.select_item(&item).unwrap();
  flow.set_quantity(1.0);
  let sale = flow.commit(&mut session).await.unwrap();
  assert_eq!(flow.step(), Step::Committed);
  assert_eq!(flow.committed_sale(), Some(&sale));
  assert!(flow.notice().unwrap().contains(sale.invoice_number.as_str()));
  assert!(flow.back().is_err());

  let committed_at = tokio::time::Instant::now();
  assert!(!flow.tick(committed_at));
  assert_eq!(flow.step(), Step::Committed);
  assert!(flow.tick(committed_at + RESET_DELAY));
  assert_eq!(flow.step(), Step::SelectCustomer);
  assert!(flow.customer().is_none());
  assert!(flow.item().is_none());
  assert_eq!(flow.terms().quantity, 0.0);
}

#[tokio::test(start_paused = true)]
async fn settle_waits_out_the_display_delay() {
  let (mut session, _auth) = signed_in().await;
  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();

  let mut flow = SalesWorkflow::new();
  flow.enter_customer("Ali", "0300").unwrap();
  flow.select_item(&item).unwrap();
  flow.set_quantity(1.0);
  flow.commit(&mut session).await.unwrap();

  let before = tokio::time::Instant::now();
  flow.settle().await;
  assert!(before.elapsed() >= RESET_DELAY - std::time::Duration::from_millis(1));
  assert_eq!(flow.step(), Step::SelectCustomer);
}

// ─── Customer resolution ─────────────────────────────────────────────────────

#[tokio::test]
async fn empty_phone_skips_customer_persistence() {
  let (session, _auth) = signed_in().await;
  let owner = session.profile().unwrap().user_id;
  let outcome = customers::find_or_create_customer(session.store(), owner, "Walk-in", "  ", 500.0)
    .await
    .unwrap();
  assert_eq!(outcome, CustomerOutcome::Skipped);
  assert!(session.store().list_customers(owner).await.unwrap().is_empty());

  let created = customers::find_or_create_customer(session.store(), owner, "Ali", "0300", 500.0)
    .await
    .unwrap();
  assert!(matches!(created, CustomerOutcome::Created(_)));
  let updated = customers::find_or_create_customer(session.store(), owner, "Ali", "0300", 250.0)
    .await
    .unwrap();
  let c = updated.customer().unwrap();
  assert_eq!(c.total_purchases, 2);
  assert!((c.total_amount - 750.0).abs() < EPS);
}

// ─── Partial failure ─────────────────────────────────────────────────────────

/// Delegates to SQLite but can be told to fail inventory updates.
struct FlakyStore {
  inner:             SqliteStore,
  fail_item_updates: AtomicBool,
}

impl ShopStore for FlakyStore {
  type Error = marble_store_sqlite::Error;

  async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, Self::Error> {
    self.inner.get_user(user_id).await
  }

  async fn put_user(&self, profile: NewUserProfile) -> Result<UserProfile, Self::Error> {
    self.inner.put_user(profile).await
  }

  async fn count_users(&self) -> Result<u64, Self::Error> { self.inner.count_users().await }

  async fn touch_last_login(&self, user_id: Uuid) -> Result<(), Self::Error> {
    self.inner.touch_last_login(user_id).await
  }

  async fn add_item(
    &self,
    owner_id: Uuid,
    item: NewInventoryItem,
  ) -> Result<InventoryItem, Self::Error> {
    self.inner.add_item(owner_id, item).await
  }

  async fn list_items(&self, owner_id: Uuid) -> Result<Vec<InventoryItem>, Self::Error> {
    self.inner.list_items(owner_id).await
  }

  async fn update_item(
    &self,
    item_id: Uuid,
    patch: InventoryPatch,
  ) -> Result<InventoryItem, Self::Error> {
    if self.fail_item_updates.load(Ordering::SeqCst) {
      return Err(marble_store_sqlite::Error::ItemNotFound(item_id));
    }
    self.inner.update_item(item_id, patch).await
  }

  async fn delete_item(&self, item_id: Uuid) -> Result<(), Self::Error> {
    self.inner.delete_item(item_id).await
  }

  async fn add_customer(
    &self,
    owner_id: Uuid,
    customer: NewCustomer,
  ) -> Result<Customer, Self::Error> {
    self.inner.add_customer(owner_id, customer).await
  }

  async fn list_customers(&self, owner_id: Uuid) -> Result<Vec<Customer>, Self::Error> {
    self.inner.list_customers(owner_id).await
  }

  async fn find_customer_by_phone(
    &self,
    owner_id: Uuid,
    phone: String,
  ) -> Result<Option<Customer>, Self::Error> {
    self.inner.find_customer_by_phone(owner_id, phone).await
  }

  async fn update_customer(
    &self,
    customer_id: Uuid,
    patch: CustomerPatch,
  ) -> Result<Customer, Self::Error> {
    self.inner.update_customer(customer_id, patch).await
  }

  async fn add_sale(&self, owner_id: Uuid, sale: NewSale) -> Result<Sale, Self::Error> {
    self.inner.add_sale(owner_id, sale).await
  }

  async fn list_sales(&self, owner_id: Uuid) -> Result<Vec<Sale>, Self::Error> {
    self.inner.list_sales(owner_id).await
  }
}

#[tokio::test]
async fn failed_stock_update_leaves_sale_without_rollback() {
  let inner = SqliteStore::open_in_memory().await.unwrap();
  let auth = inner.identity_provider();
  let store = Arc::new(FlakyStore { inner, fail_item_updates: AtomicBool::new(false) });
  let mut session = Session::new(Arc::clone(&store));
  let mut rx = auth.subscribe();
  auth.register(sign_up("owner@shop.pk", "Owner")).await.unwrap();
  session.follow(&mut rx).await.unwrap();

  let item = session.add_item(granite(100.0, 50.0)).await.unwrap();
  store.fail_item_updates.store(true, Ordering::SeqCst);

  let mut flow = SalesWorkflow::new();
  flow.enter_customer("Ali", "0300").unwrap();
  flow.select_item(&item).unwrap();
  flow.set_quantity(20.0);
  flow.set_sale_price(130.0);
  let err = flow.commit(&mut session).await.unwrap_err();

  let Error::PartialSale { sale, stage, .. } = &err else {
    panic!("expected a partial sale, got {err:?}");
  };
  assert_eq!(*stage, CommitStage::InventoryUpdate);
  assert!(!err.is_validation());
  assert!(err.to_string().contains(sale.invoice_number.as_str()));
  assert_eq!(flow.step(), Step::Committed);
  assert_eq!(flow.committed_sale(), Some(&**sale));

  let owner = session.profile().unwrap().user_id;
  let sales = store.list_sales(owner).await.unwrap();
  assert_eq!(sales.len(), 1);
  assert_eq!(sales[0].invoice_number, sale.invoice_number);
  assert_eq!(session.state().sales(), sales.as_slice());
  assert_eq!(store.list_items(owner).await.unwrap()[0].quantity, 50.0);
  assert!(store.list_customers(owner).await.unwrap().is_empty());
}
