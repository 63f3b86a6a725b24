//! Query resolvers.

use async_graphql::{Context, Object, Result};
use product_graph_core::Product;

use super::types::ProductObject;
use super::{RequestContext, parse_id};
use crate::error::ApiError;

/// Root query type.
#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    /// Fetch the product stored under `id`.
    async fn get_product(
        &self,
        ctx: &Context<'_>,
        id: Option<String>,
    ) -> Result<Option<ProductObject>> {
        let context = ctx.data::<RequestContext>()?;

        get_product(context, id)
            .await
            .map(|product| Some(product.into()))
            .map_err(|e| e.into_graphql("getProduct", context.request_id()))
    }
}

async fn get_product(context: &RequestContext, id: Option<String>) -> Result<Product, ApiError> {
    let key = parse_id(id)?;
    let document = context.products().get(&key).await?;
    Ok(document.content_as::<Product>()?)
}
