//! `marble`, the shop's command-line front end.
//!
//! # Usage
//!
//! ```text
//! marble --email owner@shop.pk --password secret signup --name "Owner"
//! marble inventory add --type granite --name "Black Galaxy" \
//!   --width 24 --height 60 --price 100 --quantity 50
//! marble sell --phone 0300-1234567 --name Ali --item "24x60" --quantity 20 --price 130
//! marble invoice INV-1718000000123-k3j9x0a2b --out invoice.html
//! ```

mod commands;
mod config;
mod display;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use clap::Parser;
use marble_core::auth::{Credentials, IdentityProvider, SignUp};
use marble_shop::Session;
use marble_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, config::ShopConfig};

#[derive(Parser)]
#[command(name = "marble", version, about = "Inventory, sales and invoicing for a marble shop")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "marble.toml", global = true)]
  config: PathBuf,

  /// Account email.
  #[arg(long, env = "MARBLE_EMAIL", global = true)]
  email: Option<String>,

  /// Account password.
  #[arg(long, env = "MARBLE_PASSWORD", hide_env_values = true, global = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ShopConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let auth = store.identity_provider();
  let mut identity = auth.subscribe();

  let (Some(email), Some(password)) = (cli.email, cli.password) else {
    bail!("--email and --password (or MARBLE_EMAIL / MARBLE_PASSWORD) are required");
  };

  match &cli.command {
    Command::Signup { name } => {
      auth
        .register(SignUp { email, password, display_name: name.clone() })
        .await
        .context("sign-up failed")?;
    }
    _ => {
      auth
        .login(Credentials { email, password })
        .await
        .context("sign-in failed")?;
    }
  }

  let mut session =
    Session::new(Arc::new(store)).with_low_stock_threshold(cfg.low_stock_threshold);
  session
    .follow(&mut identity)
    .await
    .context("failed to load shop data")?;

  commands::run(cli.command, &mut session, &cfg).await
}
