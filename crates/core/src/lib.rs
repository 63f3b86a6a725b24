//! Product Graph Core - Shared types library.
//!
//! This crate provides the types shared by every Product Graph component:
//! - `server` - GraphQL API over the product document collection
//! - `cli` - Command-line tools for migrations, seeding and schema export
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! The server decides how documents are persisted; this crate only describes
//! what a document, its key, and its namespace look like.
//!
//! # Modules
//!
//! - [`types`] - Document keys, keyspaces, and the `Product` document body

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
