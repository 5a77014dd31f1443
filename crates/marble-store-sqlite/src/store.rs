//! [`SqliteStore`], the SQLite implementation of [`ShopStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use marble_core::{
  customer::{Customer, CustomerPatch, NewCustomer},
  inventory::{InventoryItem, InventoryPatch, NewInventoryItem},
  sale::{NewSale, Sale},
  store::ShopStore,
  user::{NewUserProfile, UserProfile},
};

use crate::{
  Error, Result, SqliteAuth,
  encode::{
    CUSTOMER_COLUMNS, ITEM_COLUMNS, RawCustomer, RawItem, RawSale, RawUser,
    SALE_COLUMNS, USER_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Column assignments for a field-level `UPDATE`.
type Assignments = Vec<(&'static str, Value)>;

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn opt_text(s: Option<String>) -> Value { s.map_or(Value::Null, Value::Text) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A shop store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// An identity provider backed by the `credentials` table of this file.
  pub fn identity_provider(&self) -> SqliteAuth { SqliteAuth::new(self.conn.clone()) }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `UPDATE <table> SET ... WHERE <key> = id`, returning the number of
  /// rows touched.
  async fn update_row(
    &self,
    table: &'static str,
    key: &'static str,
    id: Uuid,
    assignments: Assignments,
  ) -> Result<usize> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        let set_clause = assignments
          .iter()
          .enumerate()
          .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "UPDATE {table} SET {set_clause} WHERE {key} = ?{}",
          assignments.len() + 1
        );
        let mut params: Vec<Value> =
          assignments.into_iter().map(|(_, value)| value).collect();
        params.push(Value::Text(id_str));
        Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?)
      })
      .await?;
    Ok(changed)
  }

  async fn get_item(&self, item_id: Uuid) -> Result<Option<InventoryItem>> {
    let id_str = encode_uuid(item_id);
    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ITEM_COLUMNS} FROM inventory WHERE item_id = ?1"),
              rusqlite::params![id_str],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawItem::into_item).transpose()
  }

  async fn get_customer(&self, customer_id: Uuid) -> Result<Option<Customer>> {
    let id_str = encode_uuid(customer_id);
    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = ?1"),
              rusqlite::params![id_str],
              RawCustomer::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCustomer::into_customer).transpose()
  }
}

// ─── ShopStore impl ──────────────────────────────────────────────────────────

impl ShopStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(user_id);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_profile).transpose()
  }

  async fn put_user(&self, profile: NewUserProfile) -> Result<UserProfile> {
    let now = Utc::now();
    let user = UserProfile {
      user_id:    profile.user_id,
      email:      profile.email,
      name:       profile.name,
      role:       profile.role,
      created_at: now,
      last_login: now,
    };

    let id_str = encode_uuid(user.user_id);
    let email = user.email.clone();
    let name = user.name.clone();
    let role = user.role.as_ref().to_owned();
    let at_str = encode_dt(now);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO users (user_id, email, name, role, created_at, last_login)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, email, name, role, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::UserExists(user.user_id));
    }
    Ok(user)
  }

  async fn count_users(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn touch_last_login(&self, user_id: Uuid) -> Result<()> {
    let changed = self
      .update_row("users", "user_id", user_id, vec![(
        "last_login",
        text(encode_dt(Utc::now())),
      )])
      .await?;
    if changed == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    Ok(())
  }

  // ── Inventory ─────────────────────────────────────────────────────────────

  async fn add_item(
    &self,
    owner_id: Uuid,
    item: NewInventoryItem,
  ) -> Result<InventoryItem> {
    let now = Utc::now();
    let item = InventoryItem {
      item_id: Uuid::new_v4(),
      owner_id,
      marble_type: item.marble_type,
      name: item.name,
      width: item.width,
      height: item.height,
      unit: item.unit,
      sqft: item.sqft,
      purchase_price: item.purchase_price,
      quantity: item.quantity,
      total_value: item.total_value,
      supplier: item.supplier,
      created_at: now,
      updated_at: now,
    };

    let row = item.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO inventory ({ITEM_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)"
          ),
          rusqlite::params![
            encode_uuid(row.item_id),
            encode_uuid(row.owner_id),
            String::from(row.marble_type),
            row.name,
            row.width,
            row.height,
            row.unit.as_ref(),
            row.sqft,
            row.purchase_price,
            row.quantity,
            row.total_value,
            row.supplier,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(item)
  }

  async fn list_items(&self, owner_id: Uuid) -> Result<Vec<InventoryItem>> {
    let owner_str = encode_uuid(owner_id);
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM inventory
           WHERE owner_id = ?1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn update_item(
    &self,
    item_id: Uuid,
    patch: InventoryPatch,
  ) -> Result<InventoryItem> {
    let mut sets: Assignments = Vec::new();
    if let Some(t) = patch.marble_type {
      sets.push(("marble_type", text(t)));
    }
    if let Some(name) = patch.name {
      sets.push(("name", text(name)));
    }
    if let Some(w) = patch.width {
      sets.push(("width", Value::Real(w)));
    }
    if let Some(h) = patch.height {
      sets.push(("height", Value::Real(h)));
    }
    if let Some(unit) = patch.unit {
      sets.push(("unit", text(unit.as_ref())));
    }
    if let Some(sqft) = patch.sqft {
      sets.push(("sqft", Value::Real(sqft)));
    }
    if let Some(p) = patch.purchase_price {
      sets.push(("purchase_price", Value::Real(p)));
    }
    if let Some(q) = patch.quantity {
      sets.push(("quantity", Value::Real(q)));
    }
    if let Some(v) = patch.total_value {
      sets.push(("total_value", Value::Real(v)));
    }
    if let Some(supplier) = patch.supplier {
      sets.push(("supplier", opt_text(supplier)));
    }
    sets.push(("updated_at", text(encode_dt(Utc::now()))));

    if self.update_row("inventory", "item_id", item_id, sets).await? == 0 {
      return Err(Error::ItemNotFound(item_id));
    }
    self
      .get_item(item_id)
      .await?
      .ok_or(Error::ItemNotFound(item_id))
  }

  async fn delete_item(&self, item_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(item_id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM inventory WHERE item_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    if deleted == 0 {
      return Err(Error::ItemNotFound(item_id));
    }
    Ok(())
  }

  // ── Customers ─────────────────────────────────────────────────────────────

  async fn add_customer(
    &self,
    owner_id: Uuid,
    customer: NewCustomer,
  ) -> Result<Customer> {
    let now = Utc::now();
    let customer = Customer {
      customer_id: Uuid::new_v4(),
      owner_id,
      name: customer.name,
      phone: customer.phone,
      address: customer.address,
      total_purchases: customer.total_purchases,
      total_amount: customer.total_amount,
      last_purchase: customer.mark_purchase.then_some(now),
      created_at: now,
      updated_at: now,
    };

    let row = customer.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO customers ({CUSTOMER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"
          ),
          rusqlite::params![
            encode_uuid(row.customer_id),
            encode_uuid(row.owner_id),
            row.name,
            row.phone,
            row.address,
            row.total_purchases,
            row.total_amount,
            row.last_purchase.map(encode_dt),
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(customer)
  }

  async fn list_customers(&self, owner_id: Uuid) -> Result<Vec<Customer>> {
    let owner_str = encode_uuid(owner_id);
    let raws: Vec<RawCustomer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CUSTOMER_COLUMNS} FROM customers
           WHERE owner_id = ?1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawCustomer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawCustomer::into_customer).collect()
  }

  async fn find_customer_by_phone(
    &self,
    owner_id: Uuid,
    phone: String,
  ) -> Result<Option<Customer>> {
    let owner_str = encode_uuid(owner_id);
    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers
                 WHERE owner_id = ?1 AND phone = ?2
                 ORDER BY created_at, rowid LIMIT 1"
              ),
              rusqlite::params![owner_str, phone],
              RawCustomer::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn update_customer(
    &self,
    customer_id: Uuid,
    patch: CustomerPatch,
  ) -> Result<Customer> {
    let now = encode_dt(Utc::now());
    let mut sets: Assignments = Vec::new();
    if let Some(name) = patch.name {
      sets.push(("name", text(name)));
    }
    if let Some(address) = patch.address {
      sets.push(("address", opt_text(address)));
    }
    if let Some(n) = patch.total_purchases {
      sets.push(("total_purchases", Value::Integer(i64::from(n))));
    }
    if let Some(amount) = patch.total_amount {
      sets.push(("total_amount", Value::Real(amount)));
    }
    if patch.mark_purchase {
      sets.push(("last_purchase", text(now.clone())));
    }
    sets.push(("updated_at", text(now)));

    if self.update_row("customers", "customer_id", customer_id, sets).await? == 0 {
      return Err(Error::CustomerNotFound(customer_id));
    }
    self
      .get_customer(customer_id)
      .await?
      .ok_or(Error::CustomerNotFound(customer_id))
  }

  // ── Sales ─────────────────────────────────────────────────────────────────

  async fn add_sale(&self, owner_id: Uuid, sale: NewSale) -> Result<Sale> {
    let sale = Sale {
      sale_id: Uuid::new_v4(),
      owner_id,
      inventory_id: sale.inventory_id,
      customer_name: sale.customer_name,
      customer_phone: sale.customer_phone,
      marble_type: sale.marble_type,
      item_name: sale.item_name,
      dimensions: sale.dimensions,
      quantity: sale.quantity,
      purchase_price: sale.purchase_price,
      sale_price: sale.sale_price,
      profit_per_sqft: sale.profit_per_sqft,
      total_profit: sale.total_profit,
      total_amount: sale.total_amount,
      remarks: sale.remarks,
      cement_info: sale.cement_info,
      invoice_number: sale.invoice_number,
      created_at: Utc::now(),
    };

    let row = sale.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO sales ({SALE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                     ?15, ?16, ?17, ?18)"
          ),
          rusqlite::params![
            encode_uuid(row.sale_id),
            encode_uuid(row.owner_id),
            encode_uuid(row.inventory_id),
            row.customer_name,
            row.customer_phone,
            String::from(row.marble_type),
            row.item_name,
            row.dimensions,
            row.quantity,
            row.purchase_price,
            row.sale_price,
            row.profit_per_sqft,
            row.total_profit,
            row.total_amount,
            row.remarks,
            row.cement_info,
            row.invoice_number.as_str(),
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(sale)
  }

  async fn list_sales(&self, owner_id: Uuid) -> Result<Vec<Sale>> {
    let owner_str = encode_uuid(owner_id);
    let raws: Vec<RawSale> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SALE_COLUMNS} FROM sales
           WHERE owner_id = ?1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawSale::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawSale::into_sale).collect()
  }
}
