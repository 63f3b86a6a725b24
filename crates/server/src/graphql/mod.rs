//! GraphQL schema for the product collection.
//!
//! ```graphql
//! type Query {
//!     getProduct(id: String): Product
//! }
//!
//! type Mutation {
//!     createProduct(product: ProductInput): Product
//!     deleteProduct(id: String): Boolean
//!     updateProduct(id: String, product: ProductInput): Product
//! }
//! ```
//!
//! The schema carries no data of its own. Every request attaches a
//! [`RequestContext`] holding a handle to the shared document store.

pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};
use product_graph_core::DocumentKey;

use crate::db::{Collection, DocumentStore};
use crate::error::ApiError;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::{ProductInput, ProductObject};

/// The executable product schema.
pub type ProductSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Deepest selection set a query may nest.
pub const MAX_QUERY_DEPTH: usize = 8;

/// Response header carrying the key generated by `createProduct`.
pub const PRODUCT_ID_HEADER: &str = "x-product-id";

/// Build the executable schema.
#[must_use]
pub fn build_schema() -> ProductSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}

/// Export the schema in SDL form.
#[must_use]
pub fn sdl() -> String {
    build_schema().sdl()
}

/// Per-request data made available to every resolver.
#[derive(Debug, Clone)]
pub struct RequestContext {
    store: DocumentStore,
    request_id: String,
}

impl RequestContext {
    /// Create the context for one request.
    #[must_use]
    pub fn new(store: DocumentStore, request_id: impl Into<String>) -> Self {
        Self {
            store,
            request_id: request_id.into(),
        }
    }

    /// Handle to the product collection.
    #[must_use]
    pub fn products(&self) -> Collection {
        self.store.products()
    }

    /// Correlation id of the request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

/// Turn a nullable `id` argument into a document key.
fn parse_id(id: Option<String>) -> Result<DocumentKey, ApiError> {
    let id = id.ok_or(ApiError::MissingArgument("id"))?;
    Ok(DocumentKey::parse(&id)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdl_matches_wire_contract() {
        let sdl = sdl();

        assert!(sdl.contains("getProduct(id: String): Product"));
        assert!(sdl.contains("createProduct(product: ProductInput): Product"));
        assert!(sdl.contains("deleteProduct(id: String): Boolean"));
        assert!(sdl.contains("updateProduct(id: String, product: ProductInput): Product"));
        assert!(sdl.contains("type Query {"));
        assert!(sdl.contains("type Mutation {"));
        assert!(!sdl.contains("QueryRoot"));
        assert!(!sdl.contains("MutationRoot"));
        assert!(sdl.contains("type Product {"));
        assert!(sdl.contains("input ProductInput {"));
        assert!(sdl.contains("name: String\n"));
        assert!(sdl.contains("price: Float\n"));
        assert!(sdl.contains("quantity: Int\n"));
        assert!(sdl.contains("tags: [String]\n"));
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id(Some("product-1".to_string())).is_ok());
        assert!(matches!(
            parse_id(None),
            Err(ApiError::MissingArgument("id"))
        ));
        assert!(matches!(
            parse_id(Some(String::new())),
            Err(ApiError::InvalidId(_))
        ));
    }

    #[test]
    fn test_sdl_has_no_subscriptions() {
        assert!(!sdl().contains("type Subscription"));
    }
}
