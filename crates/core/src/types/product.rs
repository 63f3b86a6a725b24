//! The `Product` document body.

use serde::{Deserialize, Serialize};

/// A product as stored in the `products` collection.
///
/// Every field is optional. Absent fields are omitted from the stored JSON,
/// so a whole-document replace with a sparse product leaves those fields
/// absent rather than keeping previous values. The product's key is not part
/// of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Option<String>>>,
}
