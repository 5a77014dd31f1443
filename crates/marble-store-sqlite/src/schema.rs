//! SQL schema for the marble SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Login accounts. Separate from profiles: an account exists from sign-up,
-- a profile from the first session that sees it.
CREATE TABLE IF NOT EXISTS credentials (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- trimmed, lowercased
    display_name  TEXT,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,         -- the identity uid, caller-supplied
    email       TEXT NOT NULL,
    name        TEXT NOT NULL,
    role        TEXT NOT NULL,            -- 'admin' | 'staff'
    created_at  TEXT NOT NULL,
    last_login  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory (
    item_id        TEXT PRIMARY KEY,
    owner_id       TEXT NOT NULL,
    marble_type    TEXT NOT NULL,
    name           TEXT NOT NULL,
    width          REAL NOT NULL,
    height         REAL NOT NULL,
    unit           TEXT NOT NULL,         -- 'inches' | 'feet'
    sqft           REAL NOT NULL,
    purchase_price REAL NOT NULL,
    quantity       REAL NOT NULL,
    total_value    REAL NOT NULL,
    supplier       TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

-- phone is a lookup key only; uniqueness is the caller's job.
CREATE TABLE IF NOT EXISTS customers (
    customer_id     TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL,
    name            TEXT NOT NULL,
    phone           TEXT NOT NULL,
    address         TEXT,
    total_purchases INTEGER NOT NULL DEFAULT 0,
    total_amount    REAL NOT NULL DEFAULT 0,
    last_purchase   TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- inventory_id deliberately has no REFERENCES clause: deleting an item
-- leaves its sales intact.
CREATE TABLE IF NOT EXISTS sales (
    sale_id         TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL,
    inventory_id    TEXT NOT NULL,
    customer_name   TEXT NOT NULL,
    customer_phone  TEXT,
    marble_type     TEXT NOT NULL,
    item_name       TEXT NOT NULL,
    dimensions      TEXT NOT NULL,
    quantity        REAL NOT NULL,
    purchase_price  REAL NOT NULL,
    sale_price      REAL NOT NULL,
    profit_per_sqft REAL NOT NULL,
    total_profit    REAL NOT NULL,
    total_amount    REAL NOT NULL,
    remarks         TEXT NOT NULL DEFAULT '',
    cement_info     TEXT NOT NULL DEFAULT '',
    invoice_number  TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS inventory_owner_idx ON inventory(owner_id);
CREATE INDEX IF NOT EXISTS customers_owner_idx ON customers(owner_id);
CREATE INDEX IF NOT EXISTS customers_phone_idx ON customers(owner_id, phone);
CREATE INDEX IF NOT EXISTS sales_owner_idx     ON sales(owner_id);
CREATE INDEX IF NOT EXISTS sales_invoice_idx   ON sales(invoice_number);

PRAGMA user_version = 1;
";
