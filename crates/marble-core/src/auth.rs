//! The identity-provider abstraction and the credential checks shared by
//! every implementation.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{Error, Result};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Who is signed in, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub uid:          Uuid,
  pub email:        String,
  pub display_name: Option<String>,
}

impl Identity {
  /// The display name, falling back to the local part of the email.
  pub fn name(&self) -> String {
    match self.display_name.as_deref().map(str::trim) {
      Some(n) if !n.is_empty() => n.to_owned(),
      _ => self
        .email
        .split('@')
        .next()
        .unwrap_or(&self.email)
        .to_owned(),
    }
  }
}

/// Email and password as typed on the login form.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl Credentials {
  pub fn validate(&self) -> Result<()> {
    validate_email(&self.email)?;
    if self.password.is_empty() {
      return Err(Error::MissingField("password"));
    }
    Ok(())
  }
}

/// The sign-up form.
#[derive(Debug, Clone)]
pub struct SignUp {
  pub email:        String,
  pub password:     String,
  pub display_name: String,
}

impl SignUp {
  pub fn validate(&self) -> Result<()> {
    validate_email(&self.email)?;
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::WeakPassword { min: MIN_PASSWORD_LEN });
    }
    if self.display_name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    Ok(())
  }
}

/// Loose shape check: something, `@`, something, `.`, something, with no
/// whitespace anywhere.
pub fn validate_email(email: &str) -> Result<()> {
  if email.is_empty() {
    return Err(Error::MissingField("email"));
  }
  let ok = !email.chars().any(char::is_whitespace)
    && email.split_once('@').is_some_and(|(local, domain)| {
      !local.is_empty()
        && domain
          .rsplit_once('.')
          .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
    });
  if ok { Ok(()) } else { Err(Error::InvalidEmail(email.to_owned())) }
}

/// Abstraction over the authentication collaborator.
///
/// The current identity is published on a [`watch`] channel: a receiver
/// sees the value at subscribe time and every change after it.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an account and sign it in.
  fn register(
    &self,
    form: SignUp,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  fn login(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  fn logout(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}
