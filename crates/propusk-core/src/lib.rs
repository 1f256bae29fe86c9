//! Core types and trait definitions for the propusk pass service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends, token verifiers and object stores implement the traits
//! defined here; the engine in `propusk-service` depends only on them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod building;
pub mod error;
pub mod filter;
pub mod media;
pub mod pass;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use store::StoreError;
