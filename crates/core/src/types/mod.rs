//! Core types for Product Graph.

pub mod key;
pub mod keyspace;
pub mod product;

pub use key::{DocumentKey, KeyError};
pub use keyspace::Keyspace;
pub use product::Product;
