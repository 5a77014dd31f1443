//! Subcommands and their handlers.

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use chrono::{Datelike as _, NaiveDate, Utc};
use clap::{Args, Subcommand};
use marble_core::{
  customer::NewCustomer,
  inventory::{Dimensions, InventoryItem, MarbleType, NewInventoryItem, Unit},
  pricing::{format_money, format_sqft},
  store::ShopStore,
};
use marble_shop::{
  SalesWorkflow, Session, customers,
  inventory::{self, edit_patch},
  invoice::render_invoice,
  reports::{self, DateRange},
  writers::{CustomerWriter, InventoryWriter},
};
use tracing::info;

use crate::{config::ShopConfig, display};

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub enum Command {
  /// Create an account with --email/--password and sign in.
  Signup {
    #[arg(long)]
    name: String,
  },
  /// Show the signed-in profile.
  Whoami,
  /// Manage stock.
  Inventory {
    #[command(subcommand)]
    command: InventoryCommand,
  },
  /// Manage customers.
  Customers {
    #[command(subcommand)]
    command: CustomerCommand,
  },
  /// Record a sale: customer, then item, then terms.
  Sell(SellArgs),
  /// List all sales, oldest first.
  Sales,
  /// Write a printable HTML invoice for a sale.
  Invoice {
    /// Sale id or invoice number.
    key: String,
    /// Output file; defaults to `<invoice number>.html`.
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Aggregate reports.
  Report {
    #[command(subcommand)]
    command: ReportCommand,
  },
}

#[derive(Subcommand)]
pub enum InventoryCommand {
  List {
    /// Filter by name, type or supplier.
    #[arg(long)]
    search: Option<String>,
    /// Only items below the low-stock threshold.
    #[arg(long)]
    low: bool,
  },
  Add(ItemArgs),
  /// Replace every field of an item.
  Edit {
    /// Item id or id prefix.
    id: String,
    #[command(flatten)]
    item: ItemArgs,
  },
  /// Add square feet to an item's stock.
  Restock { id: String, quantity: f64 },
  Delete { id: String },
}

#[derive(Args)]
pub struct ItemArgs {
  /// Granite, Graphite, Tiles, Large Sheets, Custom, or any other name.
  #[arg(long = "type", default_value = "Granite")]
  marble_type: MarbleType,
  #[arg(long)]
  name:        String,
  #[arg(long)]
  width:       f64,
  #[arg(long)]
  height:      f64,
  /// inches or feet.
  #[arg(long, default_value = "inches")]
  unit:        Unit,
  /// Purchase price per square foot.
  #[arg(long)]
  price:       f64,
  /// Square feet on hand.
  #[arg(long)]
  quantity:    f64,
  #[arg(long)]
  supplier:    Option<String>,
}

impl ItemArgs {
  fn into_new_item(self) -> anyhow::Result<NewInventoryItem> {
    let dims = Dimensions::new(self.width, self.height, self.unit)?;
    Ok(NewInventoryItem::new(
      self.marble_type,
      self.name,
      dims,
      self.price,
      self.quantity,
      self.supplier,
    )?)
  }
}

#[derive(Subcommand)]
pub enum CustomerCommand {
  List {
    /// Filter by name or phone.
    #[arg(long)]
    search: Option<String>,
  },
  Add {
    #[arg(long)]
    name:    String,
    #[arg(long)]
    phone:   String,
    #[arg(long)]
    address: Option<String>,
  },
  /// Show a customer's statement.
  Show {
    /// Phone number or customer id prefix.
    key: String,
  },
}

#[derive(Args)]
pub struct SellArgs {
  #[arg(long)]
  phone:    String,
  /// Required when the phone number is not on file yet.
  #[arg(long)]
  name:     Option<String>,
  /// Item id prefix, or a name / type / `WxH` query matching one item.
  #[arg(long)]
  item:     String,
  /// Square feet sold.
  #[arg(long)]
  quantity: f64,
  /// Sale price per square foot; defaults to the suggested price.
  #[arg(long)]
  price:    Option<f64>,
  #[arg(long, default_value = "")]
  remarks:  String,
  /// Cement supplied with the order, printed on the invoice.
  #[arg(long, default_value = "")]
  cement:   String,
}

#[derive(Subcommand)]
pub enum ReportCommand {
  Inventory,
  Sales {
    /// First day, inclusive; defaults to the start of this month.
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day, inclusive; defaults to today.
    #[arg(long)]
    to:   Option<NaiveDate>,
  },
  Profit {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to:   Option<NaiveDate>,
  },
  Dashboard,
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Pick one item by id prefix, or by a name / type / size query that matches
/// exactly one of `items`.
fn find_item<'a>(items: &[&'a InventoryItem], key: &str) -> anyhow::Result<&'a InventoryItem> {
  let key = key.trim().to_lowercase();
  if key.len() >= 4
    && let [item] = items
      .iter()
      .copied()
      .filter(|i| i.item_id.simple().to_string().starts_with(&key))
      .collect::<Vec<_>>()
      .as_slice()
  {
    return Ok(*item);
  }

  let matched: Vec<&'a InventoryItem> = items
    .iter()
    .copied()
    .filter(|i| {
      i.name.to_lowercase().contains(&key)
        || i.marble_type.as_str().to_lowercase().contains(&key)
        || i.dimensions().matches_size_query(&key)
    })
    .collect();
  match matched.as_slice() {
    [] => bail!("no item matches {key:?}"),
    [one] => Ok(*one),
    many => bail!("{} items match {key:?}; use an id prefix", many.len()),
  }
}

fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> anyhow::Result<DateRange> {
  let today = Utc::now().date_naive();
  let to = to.unwrap_or(today);
  let from = from.unwrap_or_else(|| to.with_day(1).unwrap_or(to));
  Ok(DateRange::new(from, to)?)
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run<S: ShopStore>(
  command: Command,
  session: &mut Session<S>,
  cfg: &ShopConfig,
) -> anyhow::Result<()> {
  let threshold = session.low_stock_threshold();
  match command {
    Command::Signup { .. } | Command::Whoami => {
      let profile = session.profile().context("not signed in")?;
      display::print_profile(profile);
    }
    Command::Inventory { command } => inventory_command(command, session).await?,
    Command::Customers { command } => customer_command(command, session).await?,
    Command::Sell(args) => sell(args, session).await?,
    Command::Sales => display::print_sales(session.state().sales()),
    Command::Invoice { key, out } => {
      let state = session.state();
      let sale = state
        .find_sale(&key)
        .with_context(|| format!("no sale with id or invoice number {key:?}"))?;
      let phone = sale.customer_phone.as_deref().unwrap_or_default();
      let address = customers::find_by_phone(state.customers(), phone)
        .and_then(|c| c.address.as_deref());
      let html = render_invoice(sale, &cfg.company, address);
      let out = out.unwrap_or_else(|| PathBuf::from(format!("{}.html", sale.invoice_number)));
      tokio::fs::write(&out, html)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;
      println!("wrote {}", out.display());
    }
    Command::Report { command } => {
      let state = session.state();
      match command {
        ReportCommand::Inventory => {
          display::print_inventory_report(&reports::inventory_report(state.inventory(), threshold));
        }
        ReportCommand::Sales { from, to } => {
          let range = date_range(from, to)?;
          display::print_sales_report(&reports::sales_report(state.sales(), range));
        }
        ReportCommand::Profit { from, to } => {
          let range = if from.is_none() && to.is_none() {
            None
          } else {
            Some(date_range(from, to)?)
          };
          display::print_profit_report(&reports::profit_report(state.sales(), range));
        }
        ReportCommand::Dashboard => {
          let today = Utc::now().date_naive();
          let d = reports::dashboard(state.inventory(), state.sales(), today, threshold);
          display::print_dashboard(&d, threshold);
        }
      }
    }
  }
  Ok(())
}

async fn inventory_command<S: ShopStore>(
  command: InventoryCommand,
  session: &mut Session<S>,
) -> anyhow::Result<()> {
  let threshold = session.low_stock_threshold();
  match command {
    InventoryCommand::List { search, low } => {
      let items = inventory::search(session.state().inventory(), search.as_deref().unwrap_or(""));
      let items = items.into_iter().filter(|i| !low || i.is_low_stock(threshold));
      display::print_items(items, threshold);
    }
    InventoryCommand::Add(args) => {
      let item = session.add_item(args.into_new_item()?).await?;
      println!(
        "added {} ({}), {} on hand",
        item.name,
        display::short_id(item.item_id),
        format_sqft(item.quantity)
      );
    }
    InventoryCommand::Edit { id, item } => {
      let all: Vec<&InventoryItem> = session.state().inventory().iter().collect();
      let item_id = find_item(&all, &id)?.item_id;
      let updated = session.update_item(item_id, edit_patch(item.into_new_item()?)).await?;
      println!("updated {}", updated.name);
    }
    InventoryCommand::Restock { id, quantity } => {
      let all: Vec<&InventoryItem> = session.state().inventory().iter().collect();
      let item_id = find_item(&all, &id)?.item_id;
      let item = session.restock(item_id, quantity).await?;
      println!("{} now has {}", item.name, format_sqft(item.quantity));
    }
    InventoryCommand::Delete { id } => {
      let all: Vec<&InventoryItem> = session.state().inventory().iter().collect();
      let item = find_item(&all, &id)?;
      let (item_id, name) = (item.item_id, item.name.clone());
      session.delete_item(item_id).await?;
      println!("deleted {name}");
    }
  }
  Ok(())
}

async fn customer_command<S: ShopStore>(
  command: CustomerCommand,
  session: &mut Session<S>,
) -> anyhow::Result<()> {
  match command {
    CustomerCommand::List { search } => {
      let found = customers::search(session.state().customers(), search.as_deref().unwrap_or(""));
      display::print_customers(found);
    }
    CustomerCommand::Add { name, phone, address } => {
      let c = session.add_customer(NewCustomer::new(name, phone, address)?).await?;
      println!("added {} ({})", c.name, c.phone);
    }
    CustomerCommand::Show { key } => {
      let state = session.state();
      let customer = customers::find_by_phone(state.customers(), &key)
        .or_else(|| {
          let key = key.to_lowercase();
          state
            .customers()
            .iter()
            .find(|c| key.len() >= 4 && c.customer_id.simple().to_string().starts_with(&key))
        })
        .with_context(|| format!("no customer with phone or id {key:?}"))?;
      display::print_statement(&customers::statement(customer, state.sales()));
    }
  }
  Ok(())
}

async fn sell<S: ShopStore>(args: SellArgs, session: &mut Session<S>) -> anyhow::Result<()> {
  let mut flow = SalesWorkflow::new();

  // Step 1: customer.
  match customers::find_by_phone(session.state().customers(), &args.phone) {
    Some(existing) => flow.select_customer(existing)?,
    None => {
      let name = args
        .name
        .as_deref()
        .with_context(|| format!("no customer with phone {}; pass --name", args.phone))?;
      flow.enter_customer(name, &args.phone)?;
    }
  }

  // Step 2: item.
  let in_stock = inventory::sellable(session.state().inventory(), "");
  let item = find_item(&in_stock, &args.item)?;
  flow.select_item(item)?;
  info!(
    item = %item.name,
    suggested = %format_money(flow.terms().sale_price.unwrap_or_default()),
    "item selected"
  );

  // Step 3: terms.
  flow.set_quantity(args.quantity);
  if let Some(price) = args.price {
    flow.set_sale_price(price);
  }
  flow.set_remarks(args.remarks);
  flow.set_cement_info(args.cement);
  if let (Some(quote), Some(price)) = (flow.quote(), flow.terms().sale_price) {
    println!(
      "{} at {} = {} (profit {})",
      format_sqft(args.quantity),
      format_money(price),
      format_money(quote.total_amount),
      format_money(quote.total_profit),
    );
  }

  let sale = flow.commit(session).await?;
  if let Some(notice) = flow.notice() {
    println!("{notice}");
  }
  println!("run `marble invoice {}` to print it", sale.invoice_number);
  Ok(())
}
