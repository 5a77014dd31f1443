//! Runtime configuration: an optional TOML file layered under `MARBLE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use marble_shop::{inventory::DEFAULT_LOW_STOCK_THRESHOLD, invoice::Company};
use serde::Deserialize;

/// Shop settings, deserialised from `marble.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
  pub store_path:          PathBuf,
  pub low_stock_threshold: f64,
  pub company:             Company,
}

impl Default for ShopConfig {
  fn default() -> Self {
    Self {
      store_path:          PathBuf::from("marble.db"),
      low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
      company:             Company::default(),
    }
  }
}

impl ShopConfig {
  /// Read `path` if it exists, then apply environment overrides such as
  /// `MARBLE_STORE_PATH` or `MARBLE_COMPANY__NAME`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("MARBLE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: ShopConfig = settings
      .try_deserialize()
      .context("failed to deserialise ShopConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
