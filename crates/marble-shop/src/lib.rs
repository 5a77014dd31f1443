//! Application layer of the marble shop.
//!
//! [`Session`] owns the signed-in user's in-memory [`ShopState`] and is the
//! only thing that writes to the store. Views receive read-only slices of the
//! state plus one of the narrow writer contracts in [`writers`]. The
//! [`SalesWorkflow`] drives a sale from customer selection to commit.

#![allow(async_fn_in_trait)]

pub mod customers;
pub mod error;
pub mod inventory;
pub mod invoice;
pub mod reports;
pub mod session;
pub mod state;
pub mod workflow;
pub mod writers;

pub use error::{CommitStage, Error, Result};
pub use session::Session;
pub use state::{Action, Collections, ShopState};
pub use workflow::{SalesWorkflow, Step};

#[cfg(test)]
mod tests;
