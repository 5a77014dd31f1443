//! Core types and trait definitions for the marble shop ledger.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! The store backend, the application layer and the CLI all depend on it.

// Native `async fn` in traits is used throughout; the `Send` bounds that
// matter are spelled out on the store and identity traits.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod customer;
pub mod error;
pub mod inventory;
pub mod pricing;
pub mod sale;
pub mod store;
pub mod user;

pub use error::{Error, Result};
