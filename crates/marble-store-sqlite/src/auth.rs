//! [`SqliteAuth`], an email/password identity provider over the
//! `credentials` table.
//!
//! Passwords are stored as argon2 PHC strings. The signed-in identity lives
//! in memory only, so every process starts signed out.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::Utc;
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;
use uuid::Uuid;

use marble_core::auth::{Credentials, Identity, IdentityProvider, SignUp};

use crate::{
  Error, Result,
  encode::{decode_uuid, encode_dt, encode_uuid},
};

/// One `credentials` row.
struct Account {
  user_id:       String,
  email:         String,
  display_name:  Option<String>,
  password_hash: String,
}

fn normalise_email(email: &str) -> String { email.trim().to_lowercase() }

/// Identity provider sharing a connection with a
/// [`SqliteStore`](crate::SqliteStore).
#[derive(Clone)]
pub struct SqliteAuth {
  conn:    tokio_rusqlite::Connection,
  current: Arc<watch::Sender<Option<Identity>>>,
}

impl SqliteAuth {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    let (current, _) = watch::channel(None);
    Self { conn, current: Arc::new(current) }
  }

  /// The identity signed in right now, if any.
  pub fn current(&self) -> Option<Identity> { self.current.borrow().clone() }

  async fn find_account(&self, email: String) -> Result<Option<Account>> {
    let account = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, display_name, password_hash
               FROM credentials WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(Account {
                  user_id:       row.get(0)?,
                  email:         row.get(1)?,
                  display_name:  row.get(2)?,
                  password_hash: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(account)
  }
}

impl IdentityProvider for SqliteAuth {
  type Error = Error;

  async fn register(&self, form: SignUp) -> Result<Identity> {
    form.validate()?;
    let email = normalise_email(&form.email);
    if self.find_account(email.clone()).await?.is_some() {
      return Err(Error::EmailInUse(email));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(form.password.as_bytes(), &salt)
      .map_err(|e| Error::PasswordHash(e.to_string()))?
      .to_string();

    let identity = Identity {
      uid:          Uuid::new_v4(),
      email:        email.clone(),
      display_name: Some(form.display_name.trim().to_owned()),
    };

    let id_str = encode_uuid(identity.uid);
    let display_name = identity.display_name.clone();
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO credentials (user_id, email, display_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, display_name, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(email = %identity.email, "registered account");
    self.current.send_replace(Some(identity.clone()));
    Ok(identity)
  }

  async fn login(&self, credentials: Credentials) -> Result<Identity> {
    credentials.validate()?;
    let email = normalise_email(&credentials.email);
    let account = self
      .find_account(email.clone())
      .await?
      .ok_or(Error::UnknownAccount(email))?;

    let parsed = PasswordHash::new(&account.password_hash)
      .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Argon2::default()
      .verify_password(credentials.password.as_bytes(), &parsed)
      .map_err(|_| Error::WrongPassword)?;

    let identity = Identity {
      uid:          decode_uuid(&account.user_id)?,
      email:        account.email,
      display_name: account.display_name,
    };
    tracing::debug!(email = %identity.email, "signed in");
    self.current.send_replace(Some(identity.clone()));
    Ok(identity)
  }

  async fn logout(&self) -> Result<()> {
    self.current.send_replace(None);
    Ok(())
  }

  fn subscribe(&self) -> watch::Receiver<Option<Identity>> { self.current.subscribe() }
}
