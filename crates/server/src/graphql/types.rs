//! GraphQL object and input types.
//!
//! All fields are nullable on the wire. The document body type lives in
//! `product_graph_core`; these wrappers only add the GraphQL derive.

use async_graphql::{InputObject, SimpleObject};
use product_graph_core::Product;

/// A product as returned to clients.
#[derive(SimpleObject, Debug, Clone, Default, PartialEq)]
#[graphql(name = "Product")]
pub struct ProductObject {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub tags: Option<Vec<Option<String>>>,
}

/// Product payload for `createProduct` and `updateProduct`.
#[derive(InputObject, Debug, Clone, Default, PartialEq)]
#[graphql(name = "ProductInput")]
pub struct ProductInput {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub tags: Option<Vec<Option<String>>>,
}

impl From<Product> for ProductObject {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            price: product.price,
            quantity: product.quantity,
            tags: product.tags,
        }
    }
}

impl From<ProductInput> for Product {
    fn from(input: ProductInput) -> Self {
        Self {
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            tags: input.tags,
        }
    }
}
