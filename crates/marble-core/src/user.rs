//! User profiles, one per authenticated identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Coarse role label. The first profile ever created becomes `Admin` by
/// bootstrap convention; nothing in the core enforces access by role.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Staff,
}

/// A stored user profile, keyed by the identity's uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:    Uuid,
  pub email:      String,
  pub name:       String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
  pub last_login: DateTime<Utc>,
}

/// Input to [`crate::store::ShopStore::put_user`]. Timestamps are set by
/// the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserProfile {
  pub user_id: Uuid,
  pub email:   String,
  pub name:    String,
  pub role:    Role,
}
