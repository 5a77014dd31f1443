//! The in-memory application state and the actions that change it.
//!
//! [`ShopState`] is only ever modified through [`ShopState::apply`]. The
//! session applies an action after every store round-trip, so the state is
//! always a whole snapshot: there is no partially merged view.

use marble_core::{
  customer::Customer,
  inventory::InventoryItem,
  sale::Sale,
  user::UserProfile,
};
use uuid::Uuid;

/// The three owned collections, as last loaded from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
  pub inventory: Vec<InventoryItem>,
  pub customers: Vec<Customer>,
  pub sales:     Vec<Sale>,
}

#[derive(Debug, Clone)]
pub enum Action {
  /// A profile was resolved for a newly signed-in identity.
  SignedIn(UserProfile),
  /// A full reload finished.
  Reloaded(Collections),
  SignedOut,
}

#[derive(Debug, Clone, Default)]
pub struct ShopState {
  profile: Option<UserProfile>,
  data:    Collections,
}

impl ShopState {
  pub fn apply(&mut self, action: Action) {
    match action {
      Action::SignedIn(profile) => {
        let same_user = self
          .profile
          .as_ref()
          .is_some_and(|p| p.user_id == profile.user_id);
        if !same_user {
          self.data = Collections::default();
        }
        self.profile = Some(profile);
      }
      // A reload racing a sign-out must not resurrect data.
      Action::Reloaded(data) => {
        if self.profile.is_some() {
          self.data = data;
        }
      }
      Action::SignedOut => *self = Self::default(),
    }
  }

  pub fn profile(&self) -> Option<&UserProfile> { self.profile.as_ref() }

  pub fn owner_id(&self) -> Option<Uuid> { self.profile.as_ref().map(|p| p.user_id) }

  pub fn collections(&self) -> &Collections { &self.data }

  pub fn inventory(&self) -> &[InventoryItem] { &self.data.inventory }

  pub fn customers(&self) -> &[Customer] { &self.data.customers }

  pub fn sales(&self) -> &[Sale] { &self.data.sales }

  pub fn item(&self, item_id: Uuid) -> Option<&InventoryItem> {
    self.data.inventory.iter().find(|i| i.item_id == item_id)
  }

  pub fn customer(&self, customer_id: Uuid) -> Option<&Customer> {
    self.data.customers.iter().find(|c| c.customer_id == customer_id)
  }

  /// Look a sale up by id or by invoice number.
  pub fn find_sale(&self, key: &str) -> Option<&Sale> {
    let key = key.trim();
    let by_id = key.parse::<Uuid>().ok();
    self
      .data
      .sales
      .iter()
      .find(|s| Some(s.sale_id) == by_id || s.invoice_number.as_str() == key)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use marble_core::user::Role;

  use super::*;

  fn profile(user_id: Uuid) -> UserProfile {
    UserProfile {
      user_id,
      email: "owner@shop.pk".into(),
      name: "Owner".into(),
      role: Role::Admin,
      created_at: Utc::now(),
      last_login: Utc::now(),
    }
  }

  fn customer(owner_id: Uuid) -> Customer {
    let now = Utc::now();
    Customer {
      customer_id: Uuid::new_v4(),
      owner_id,
      name: "Ali".into(),
      phone: "0300".into(),
      address: None,
      total_purchases: 0,
      total_amount: 0.0,
      last_purchase: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn reload_is_ignored_while_signed_out() {
    let mut state = ShopState::default();
    state.apply(Action::Reloaded(Collections {
      customers: vec![customer(Uuid::new_v4())],
      ..Collections::default()
    }));
    assert!(state.customers().is_empty());
  }

  #[test]
  fn sign_out_clears_everything() {
    let uid = Uuid::new_v4();
    let mut state = ShopState::default();
    state.apply(Action::SignedIn(profile(uid)));
    state.apply(Action::Reloaded(Collections {
      customers: vec![customer(uid)],
      ..Collections::default()
    }));
    assert_eq!(state.customers().len(), 1);
    assert_eq!(state.owner_id(), Some(uid));

    state.apply(Action::SignedOut);
    assert!(state.profile().is_none());
    assert!(state.customers().is_empty());
  }

  #[test]
  fn switching_user_drops_previous_data() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut state = ShopState::default();
    state.apply(Action::SignedIn(profile(a)));
    state.apply(Action::Reloaded(Collections {
      customers: vec![customer(a)],
      ..Collections::default()
    }));

    state.apply(Action::SignedIn(profile(a)));
    assert_eq!(state.customers().len(), 1);

    state.apply(Action::SignedIn(profile(b)));
    assert!(state.customers().is_empty());
  }
}
