//! [`Session`], the data controller between the views and the store.

use std::sync::Arc;

use marble_core::{
  auth::Identity,
  customer::{Customer, NewCustomer},
  inventory::{InventoryItem, InventoryPatch, NewInventoryItem},
  sale::{InvoiceNumber, NewSale, Sale},
  store::ShopStore,
  user::{NewUserProfile, Role, UserProfile},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Action, CommitStage, Error, Result, ShopState,
  customers::{self, CustomerOutcome},
  inventory::{DEFAULT_LOW_STOCK_THRESHOLD, restock_patch},
  state::Collections,
  writers::{CustomerWriter, InventoryWriter, SaleOrder, SaleRecorder},
};

/// Owns the signed-in user's state and performs every write on their behalf.
pub struct Session<S> {
  store:               Arc<S>,
  state:               ShopState,
  low_stock_threshold: f64,
}

impl<S: ShopStore> Session<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      state: ShopState::default(),
      low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
    }
  }

  pub fn with_low_stock_threshold(mut self, threshold: f64) -> Self {
    self.low_stock_threshold = threshold;
    self
  }

  pub fn state(&self) -> &ShopState { &self.state }

  pub fn store(&self) -> &S { &self.store }

  pub fn low_stock_threshold(&self) -> f64 { self.low_stock_threshold }

  pub fn profile(&self) -> Option<&UserProfile> { self.state.profile() }

  fn owner_id(&self) -> Result<Uuid> { self.state.owner_id().ok_or(Error::NotSignedIn) }

  /// An item from the signed-in user's loaded inventory. Items of other
  /// owners are never in it.
  fn owned_item(&self, item_id: Uuid) -> Result<&InventoryItem> {
    self.owner_id()?;
    self
      .state
      .item(item_id)
      .ok_or_else(|| Error::NotFound { kind: "item", key: item_id.to_string() })
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// Apply the latest value of an identity subscription.
  pub async fn follow(&mut self, rx: &mut watch::Receiver<Option<Identity>>) -> Result<()> {
    let identity = rx.borrow_and_update().clone();
    self.handle_identity(identity).await
  }

  /// React to the identity changing: resolve the profile and load its data,
  /// or clear everything on sign-out.
  pub async fn handle_identity(&mut self, identity: Option<Identity>) -> Result<()> {
    let Some(identity) = identity else {
      info!("signed out");
      self.state.apply(Action::SignedOut);
      return Ok(());
    };

    let profile = self.resolve_profile(&identity).await?;
    info!(email = %profile.email, role = %profile.role, "signed in");
    self.state.apply(Action::SignedIn(profile));
    self.reload().await
  }

  async fn resolve_profile(&self, identity: &Identity) -> Result<UserProfile> {
    let store = &*self.store;
    if store.get_user(identity.uid).await.map_err(Error::store)?.is_some() {
      store.touch_last_login(identity.uid).await.map_err(Error::store)?;
      return store
        .get_user(identity.uid)
        .await
        .map_err(Error::store)?
        .ok_or_else(|| Error::NotFound { kind: "user", key: identity.uid.to_string() });
    }

    // Bootstrap convention only: nothing downstream enforces roles.
    let role = if store.count_users().await.map_err(Error::store)? == 0 {
      Role::Admin
    } else {
      Role::Staff
    };
    let profile = store
      .put_user(NewUserProfile {
        user_id: identity.uid,
        email:   identity.email.clone(),
        name:    identity.name(),
        role,
      })
      .await
      .map_err(Error::store)?;
    info!(email = %profile.email, %role, "created user profile");
    Ok(profile)
  }

  /// Replace the three owned collections with a fresh read.
  pub async fn reload(&mut self) -> Result<()> {
    let owner = self.owner_id()?;
    let store = &*self.store;
    let (inventory, customers, sales) = tokio::try_join!(
      store.list_items(owner),
      store.list_customers(owner),
      store.list_sales(owner),
    )
    .map_err(Error::store)?;
    debug!(
      items = inventory.len(),
      customers = customers.len(),
      sales = sales.len(),
      "reloaded"
    );
    self.state.apply(Action::Reloaded(Collections { inventory, customers, sales }));
    Ok(())
  }
}

// ─── Inventory ───────────────────────────────────────────────────────────────

impl<S: ShopStore> InventoryWriter for Session<S> {
  async fn add_item(&mut self, item: NewInventoryItem) -> Result<InventoryItem> {
    let owner = self.owner_id()?;
    let added = self.store.add_item(owner, item).await.map_err(Error::store)?;
    info!(item = %added.name, quantity = added.quantity, "added inventory item");
    self.reload().await?;
    Ok(added)
  }

  async fn update_item(&mut self, item_id: Uuid, patch: InventoryPatch) -> Result<InventoryItem> {
    self.owned_item(item_id)?;
    let updated = self
      .store
      .update_item(item_id, patch)
      .await
      .map_err(Error::store)?;
    info!(item = %updated.name, "updated inventory item");
    self.reload().await?;
    Ok(updated)
  }

  async fn delete_item(&mut self, item_id: Uuid) -> Result<()> {
    self.owned_item(item_id)?;
    self.store.delete_item(item_id).await.map_err(Error::store)?;
    info!(%item_id, "deleted inventory item");
    self.reload().await
  }

  async fn restock(&mut self, item_id: Uuid, delta: f64) -> Result<InventoryItem> {
    let patch = restock_patch(self.owned_item(item_id)?, delta)?;
    self.update_item(item_id, patch).await
  }
}

// ─── Customers ───────────────────────────────────────────────────────────────

impl<S: ShopStore> CustomerWriter for Session<S> {
  async fn add_customer(&mut self, customer: NewCustomer) -> Result<Customer> {
    let owner = self.owner_id()?;
    if customers::find_by_phone(self.state.customers(), &customer.phone).is_some() {
      return Err(Error::DuplicatePhone(customer.phone));
    }
    let added = self
      .store
      .add_customer(owner, customer)
      .await
      .map_err(Error::store)?;
    info!(customer = %added.name, phone = %added.phone, "added customer");
    self.reload().await?;
    Ok(added)
  }
}

// ─── Sales ───────────────────────────────────────────────────────────────────

impl<S: ShopStore> SaleRecorder for Session<S> {
  async fn record_sale(&mut self, order: SaleOrder) -> Result<Sale> {
    let owner = self.owner_id()?;
    validate_order(&order)?;

    let new_sale = NewSale::assemble(
      &order.item,
      &order.customer_name,
      Some(order.customer_phone.as_str()),
      order.quantity,
      order.sale_price,
      &order.remarks,
      &order.cement_info,
      InvoiceNumber::now(),
    );
    let sale = self
      .store
      .add_sale(owner, new_sale)
      .await
      .map_err(Error::store)?;
    info!(
      invoice = %sale.invoice_number,
      quantity = sale.quantity,
      amount = sale.total_amount,
      "sale recorded"
    );

    // Decrement from the last-loaded stock so writes made in this session
    // since the item was selected are kept.
    let current = self.state.item(order.item.item_id).unwrap_or(&order.item);
    let patch = InventoryPatch::set_quantity(
      current.purchase_price,
      current.quantity - order.quantity,
    );
    let decremented = self.store.update_item(order.item.item_id, patch).await;
    if let Err(e) = decremented {
      return Err(self.partial(sale, CommitStage::InventoryUpdate, e).await);
    }

    let outcome = customers::find_or_create_customer(
      &*self.store,
      owner,
      &order.customer_name,
      &order.customer_phone,
      sale.total_amount,
    )
    .await;
    match outcome {
      Ok(CustomerOutcome::Created(c)) => {
        debug!(customer = %c.name, "created customer from first sale");
      }
      Ok(_) => {}
      Err(e) => return Err(self.partial(sale, CommitStage::CustomerUpdate, e).await),
    }

    let reloaded = self.reload().await;
    if let Err(e) = reloaded {
      return Err(self.partial(sale, CommitStage::Reload, e).await);
    }
    Ok(sale)
  }
}

impl<S: ShopStore> Session<S> {
  /// Report a sale whose follow-up write failed. The state is reloaded
  /// first, when possible, so it includes the sale that did land.
  async fn partial(
    &mut self,
    sale: Sale,
    stage: CommitStage,
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Error {
    warn!(
      invoice_number = %sale.invoice_number,
      %stage,
      error = %source,
      "sale recorded but a follow-up write failed"
    );
    if stage != CommitStage::Reload
      && let Err(e) = self.reload().await
    {
      warn!(error = %e, "reload after partial sale failed");
    }
    Error::PartialSale { sale: Box::new(sale), stage, source: Box::new(source) }
  }
}

/// Checks made against the selection-time snapshot before anything is
/// written. The stock may have changed remotely since; that race is
/// accepted.
fn validate_order(order: &SaleOrder) -> Result<()> {
  if order.customer_name.trim().is_empty() {
    return Err(Error::MissingField("customer name"));
  }
  if !order.quantity.is_finite() || order.quantity <= 0.0 {
    return Err(Error::InvalidValue {
      field:  "quantity",
      reason: format!("must be greater than zero, got {}", order.quantity),
    });
  }
  if !order.sale_price.is_finite() || order.sale_price <= 0.0 {
    return Err(Error::InvalidValue {
      field:  "sale price",
      reason: format!("must be greater than zero, got {}", order.sale_price),
    });
  }
  if order.quantity > order.item.quantity {
    return Err(Error::InsufficientStock {
      requested: order.quantity,
      available: order.item.quantity,
    });
  }
  Ok(())
}
