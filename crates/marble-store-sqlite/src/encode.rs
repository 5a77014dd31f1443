//! Conversions between domain types and the plain values stored in SQLite
//! columns.
//!
//! Timestamps are RFC 3339 strings with fixed microsecond precision, so they
//! sort lexically in insertion order. UUIDs are hyphenated lowercase strings.
//! Enums are stored by their display name.

use chrono::{DateTime, SecondsFormat, Utc};
use marble_core::{
  customer::Customer,
  inventory::{InventoryItem, MarbleType, Unit},
  sale::{InvoiceNumber, Sale},
  user::{Role, UserProfile},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_unit(s: &str) -> Result<Unit> {
  s.parse()
    .map_err(|_| Error::Core(marble_core::Error::UnknownUnit(s.to_owned())))
}

fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Core(marble_core::Error::UnknownRole(s.to_owned())))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, email, name, role, created_at, last_login";

pub const ITEM_COLUMNS: &str = "item_id, owner_id, marble_type, name, width, height, \
   unit, sqft, purchase_price, quantity, total_value, supplier, created_at, updated_at";

pub const CUSTOMER_COLUMNS: &str = "customer_id, owner_id, name, phone, address, \
   total_purchases, total_amount, last_purchase, created_at, updated_at";

pub const SALE_COLUMNS: &str = "sale_id, owner_id, inventory_id, customer_name, \
   customer_phone, marble_type, item_name, dimensions, quantity, purchase_price, \
   sale_price, profit_per_sqft, total_profit, total_amount, remarks, cement_info, \
   invoice_number, created_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `users` row, read in [`USER_COLUMNS`] order.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub name:       String,
  pub role:       String,
  pub created_at: String,
  pub last_login: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      email:      row.get(1)?,
      name:       row.get(2)?,
      role:       row.get(3)?,
      created_at: row.get(4)?,
      last_login: row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      name:       self.name,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
      last_login: decode_dt(&self.last_login)?,
    })
  }
}

/// An `inventory` row, read in [`ITEM_COLUMNS`] order.
pub struct RawItem {
  pub item_id:        String,
  pub owner_id:       String,
  pub marble_type:    String,
  pub name:           String,
  pub width:          f64,
  pub height:         f64,
  pub unit:           String,
  pub sqft:           f64,
  pub purchase_price: f64,
  pub quantity:       f64,
  pub total_value:    f64,
  pub supplier:       Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:        row.get(0)?,
      owner_id:       row.get(1)?,
      marble_type:    row.get(2)?,
      name:           row.get(3)?,
      width:          row.get(4)?,
      height:         row.get(5)?,
      unit:           row.get(6)?,
      sqft:           row.get(7)?,
      purchase_price: row.get(8)?,
      quantity:       row.get(9)?,
      total_value:    row.get(10)?,
      supplier:       row.get(11)?,
      created_at:     row.get(12)?,
      updated_at:     row.get(13)?,
    })
  }

  pub fn into_item(self) -> Result<InventoryItem> {
    Ok(InventoryItem {
      item_id:        decode_uuid(&self.item_id)?,
      owner_id:       decode_uuid(&self.owner_id)?,
      marble_type:    MarbleType::from(self.marble_type),
      name:           self.name,
      width:          self.width,
      height:         self.height,
      unit:           decode_unit(&self.unit)?,
      sqft:           self.sqft,
      purchase_price: self.purchase_price,
      quantity:       self.quantity,
      total_value:    self.total_value,
      supplier:       self.supplier,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// A `customers` row, read in [`CUSTOMER_COLUMNS`] order.
pub struct RawCustomer {
  pub customer_id:     String,
  pub owner_id:        String,
  pub name:            String,
  pub phone:           String,
  pub address:         Option<String>,
  pub total_purchases: i64,
  pub total_amount:    f64,
  pub last_purchase:   Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawCustomer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      customer_id:     row.get(0)?,
      owner_id:        row.get(1)?,
      name:            row.get(2)?,
      phone:           row.get(3)?,
      address:         row.get(4)?,
      total_purchases: row.get(5)?,
      total_amount:    row.get(6)?,
      last_purchase:   row.get(7)?,
      created_at:      row.get(8)?,
      updated_at:      row.get(9)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    let total_purchases = u32::try_from(self.total_purchases).map_err(|_| {
      Error::Decode(format!("total_purchases out of range: {}", self.total_purchases))
    })?;
    Ok(Customer {
      customer_id: decode_uuid(&self.customer_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      name: self.name,
      phone: self.phone,
      address: self.address,
      total_purchases,
      total_amount: self.total_amount,
      last_purchase: self.last_purchase.as_deref().map(decode_dt).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A `sales` row, read in [`SALE_COLUMNS`] order.
pub struct RawSale {
  pub sale_id:         String,
  pub owner_id:        String,
  pub inventory_id:    String,
  pub customer_name:   String,
  pub customer_phone:  Option<String>,
  pub marble_type:     String,
  pub item_name:       String,
  pub dimensions:      String,
  pub quantity:        f64,
  pub purchase_price:  f64,
  pub sale_price:      f64,
  pub profit_per_sqft: f64,
  pub total_profit:    f64,
  pub total_amount:    f64,
  pub remarks:         String,
  pub cement_info:     String,
  pub invoice_number:  String,
  pub created_at:      String,
}

impl RawSale {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sale_id:         row.get(0)?,
      owner_id:        row.get(1)?,
      inventory_id:    row.get(2)?,
      customer_name:   row.get(3)?,
      customer_phone:  row.get(4)?,
      marble_type:     row.get(5)?,
      item_name:       row.get(6)?,
      dimensions:      row.get(7)?,
      quantity:        row.get(8)?,
      purchase_price:  row.get(9)?,
      sale_price:      row.get(10)?,
      profit_per_sqft: row.get(11)?,
      total_profit:    row.get(12)?,
      total_amount:    row.get(13)?,
      remarks:         row.get(14)?,
      cement_info:     row.get(15)?,
      invoice_number:  row.get(16)?,
      created_at:      row.get(17)?,
    })
  }

  pub fn into_sale(self) -> Result<Sale> {
    Ok(Sale {
      sale_id:         decode_uuid(&self.sale_id)?,
      owner_id:        decode_uuid(&self.owner_id)?,
      inventory_id:    decode_uuid(&self.inventory_id)?,
      customer_name:   self.customer_name,
      customer_phone:  self.customer_phone,
      marble_type:     MarbleType::from(self.marble_type),
      item_name:       self.item_name,
      dimensions:      self.dimensions,
      quantity:        self.quantity,
      purchase_price:  self.purchase_price,
      sale_price:      self.sale_price,
      profit_per_sqft: self.profit_per_sqft,
      total_profit:    self.total_profit,
      total_amount:    self.total_amount,
      remarks:         self.remarks,
      cement_info:     self.cement_info,
      invoice_number:  InvoiceNumber::from_stored(self.invoice_number),
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
