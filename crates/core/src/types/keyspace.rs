//! Keyspace: the bucket / scope / collection triple a document lives under.

use core::fmt;

/// Namespace of a collection inside the document store.
///
/// Documents are grouped into collections, collections into scopes, and
/// scopes into buckets. A key is only unique within its keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keyspace {
    /// Top-level bucket name.
    pub bucket: &'static str,
    /// Scope within the bucket.
    pub scope: &'static str,
    /// Collection within the scope.
    pub collection: &'static str,
}

impl Keyspace {
    /// The keyspace holding every product document.
    pub const PRODUCTS: Self = Self::new("store-bucket", "products-scope", "products");

    /// Create a keyspace from its three components.
    #[must_use]
    pub const fn new(bucket: &'static str, scope: &'static str, collection: &'static str) -> Self {
        Self {
            bucket,
            scope,
            collection,
        }
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.bucket, self.scope, self.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_keyspace() {
        assert_eq!(Keyspace::PRODUCTS.bucket, "store-bucket");
        assert_eq!(Keyspace::PRODUCTS.scope, "products-scope");
        assert_eq!(Keyspace::PRODUCTS.collection, "products");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Keyspace::PRODUCTS.to_string(),
            "store-bucket.products-scope.products"
        );
    }
}
