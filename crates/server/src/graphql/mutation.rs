//! Mutation resolvers.
//!
//! `createProduct` and `updateProduct` echo the caller's input back instead
//! of re-reading the stored document. The store never transforms bodies, so
//! the echo is what a read-back would return.

use async_graphql::{Context, Object, Result};
use product_graph_core::{DocumentKey, Product};

use super::types::{ProductInput, ProductObject};
use super::{PRODUCT_ID_HEADER, RequestContext, parse_id};
use crate::error::ApiError;

/// Root mutation type.
#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object(name = "Mutation")]
impl MutationRoot {
    /// Store a new product under a freshly generated id.
    ///
    /// The id is returned in the `x-product-id` response header.
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        product: Option<ProductInput>,
    ) -> Result<Option<ProductObject>> {
        let context = ctx.data::<RequestContext>()?;

        match create_product(context, product).await {
            Ok((key, product)) => {
                ctx.append_http_header(PRODUCT_ID_HEADER, key.as_str());
                Ok(Some(product.into()))
            }
            Err(e) => Err(e.into_graphql("createProduct", context.request_id())),
        }
    }

    /// Delete the product stored under `id`.
    ///
    /// Deleting an id that does not exist is an error, never `false`.
    async fn delete_product(&self, ctx: &Context<'_>, id: Option<String>) -> Result<Option<bool>> {
        let context = ctx.data::<RequestContext>()?;

        delete_product(context, id)
            .await
            .map(|()| Some(true))
            .map_err(|e| e.into_graphql("deleteProduct", context.request_id()))
    }

    /// Replace the whole product stored under `id`.
    ///
    /// Fields omitted from `product` are cleared, not merged.
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: Option<String>,
        product: Option<ProductInput>,
    ) -> Result<Option<ProductObject>> {
        let context = ctx.data::<RequestContext>()?;

        update_product(context, id, product)
            .await
            .map(|product| Some(product.into()))
            .map_err(|e| e.into_graphql("updateProduct", context.request_id()))
    }
}

fn require_product(product: Option<ProductInput>) -> Result<Product, ApiError> {
    product
        .map(Product::from)
        .ok_or(ApiError::MissingArgument("product"))
}

async fn create_product(
    context: &RequestContext,
    product: Option<ProductInput>,
) -> Result<(DocumentKey, Product), ApiError> {
    let product = require_product(product)?;
    let key = DocumentKey::generate();

    let products = context.products();
    let result = products.insert(&key, &product).await?;
    tracing::info!(keyspace = %products.keyspace(), key = %key, cas = result.cas, "Product created");

    Ok((key, product))
}

async fn delete_product(context: &RequestContext, id: Option<String>) -> Result<(), ApiError> {
    let key = parse_id(id)?;

    let products = context.products();
    let result = products.remove(&key).await?;
    tracing::info!(keyspace = %products.keyspace(), key = %key, cas = result.cas, "Product deleted");

    Ok(())
}

async fn update_product(
    context: &RequestContext,
    id: Option<String>,
    product: Option<ProductInput>,
) -> Result<Product, ApiError> {
    let key = parse_id(id)?;
    let product = require_product(product)?;

    let products = context.products();
    let result = products.replace(&key, &product).await?;
    tracing::info!(keyspace = %products.keyspace(), key = %key, cas = result.cas, "Product replaced");

    Ok(product)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_graphql::{Request, Response, Variables};
    use product_graph_core::Keyspace;
    use serde_json::{Value, json};

    use super::*;
    use crate::db::{
        Document, DocumentBackend, DocumentStore, MemoryBackend, MutationResult, StoreError,
    };
    use crate::graphql::build_schema;

    const CREATE: &str = r"
        mutation Create($product: ProductInput) {
            createProduct(product: $product) { name price quantity tags }
        }
    ";
    const GET: &str = r"
        query Get($id: String) {
            getProduct(id: $id) { name price quantity tags }
        }
    ";
    const UPDATE: &str = r"
        mutation Update($id: String, $product: ProductInput) {
            updateProduct(id: $id, product: $product) { name price quantity tags }
        }
    ";
    const DELETE: &str = r"
        mutation Delete($id: String) {
            deleteProduct(id: $id)
        }
    ";

    async fn execute(store: &DocumentStore, query: &str, variables: Value) -> Response {
        let request = Request::new(query)
            .variables(Variables::from_json(variables))
            .data(RequestContext::new(store.clone(), "test-request"));
        build_schema().execute(request).await
    }

    fn data(response: Response) -> Value {
        response.data.into_json().unwrap()
    }

    fn error_code(response: &Response) -> Option<String> {
        let error = response.errors.first()?;
        match error.extensions.as_ref()?.get("code")? {
            async_graphql::Value::String(code) => Some(code.clone()),
            _ => None,
        }
    }

    fn widget() -> Value {
        json!({ "name": "Widget", "price": 9.99, "quantity": 10, "tags": ["tools"] })
    }

    async fn create(store: &DocumentStore, product: Value) -> String {
        let response = execute(store, CREATE, json!({ "product": product })).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response
            .http_headers
            .get(PRODUCT_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_create_echoes_input_and_reads_back() {
        let store = DocumentStore::memory();

        let response = execute(&store, CREATE, json!({ "product": widget() })).await;
        assert!(response.errors.is_empty());
        let id = response
            .http_headers
            .get(PRODUCT_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(data(response), json!({ "createProduct": widget() }));
        assert!(DocumentKey::parse(&id).is_ok());

        let response = execute(&store, GET, json!({ "id": id })).await;
        assert!(response.errors.is_empty());
        assert_eq!(data(response), json!({ "getProduct": widget() }));
    }

    #[tokio::test]
    async fn test_each_create_gets_a_new_id() {
        let store = DocumentStore::memory();
        let first = create(&store, widget()).await;
        let second = create(&store, widget()).await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = DocumentStore::memory();

        let response = execute(&store, GET, json!({ "id": "no-such-product" })).await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
        assert_eq!(data(response), json!({ "getProduct": null }));
    }

    #[tokio::test]
    async fn test_update_replaces_without_merging() {
        let store = DocumentStore::memory();
        let id = create(&store, widget()).await;
        let replacement = json!({ "name": "Gadget", "price": null, "quantity": 3, "tags": null });

        let response = execute(
            &store,
            UPDATE,
            json!({ "id": id, "product": { "name": "Gadget", "quantity": 3 } }),
        )
        .await;
        assert!(response.errors.is_empty());
        assert_eq!(data(response), json!({ "updateProduct": replacement }));

        let response = execute(&store, GET, json!({ "id": id })).await;
        assert_eq!(data(response), json!({ "getProduct": replacement }));
    }

    #[tokio::test]
    async fn test_update_missing_is_error_with_null_data() {
        let store = DocumentStore::memory();

        let response = execute(
            &store,
            UPDATE,
            json!({ "id": "no-such-product", "product": widget() }),
        )
        .await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
        assert_eq!(data(response), json!({ "updateProduct": null }));

        let response = execute(&store, GET, json!({ "id": "no-such-product" })).await;
        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = DocumentStore::memory();
        let id = create(&store, widget()).await;

        let response = execute(&store, DELETE, json!({ "id": id })).await;
        assert!(response.errors.is_empty());
        assert_eq!(data(response), json!({ "deleteProduct": true }));

        let response = execute(&store, GET, json!({ "id": id })).await;
        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_delete_missing_is_error_not_false() {
        let store = DocumentStore::memory();

        let response = execute(&store, DELETE, json!({ "id": "no-such-product" })).await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
        assert_eq!(data(response), json!({ "deleteProduct": null }));
    }

    #[tokio::test]
    async fn test_missing_arguments_are_bad_user_input() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DocumentStore::shared(backend.clone());

        let response = execute(&store, CREATE, json!({})).await;
        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));

        let response = execute(&store, GET, json!({})).await;
        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));

        let response = execute(&store, UPDATE, json!({ "id": "p-1" })).await;
        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));

        let response = execute(&store, DELETE, json!({ "id": "" })).await;
        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));

        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_sanitized() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DocumentStore::shared(backend.clone());
        backend.set_available(false);

        let response = execute(&store, CREATE, json!({ "product": widget() })).await;

        assert_eq!(error_code(&response).as_deref(), Some("UNAVAILABLE"));
        assert_eq!(
            response.errors.first().unwrap().message,
            "Document store temporarily unavailable"
        );
        assert!(response.http_headers.get(PRODUCT_ID_HEADER).is_none());
        assert_eq!(data(response), json!({ "createProduct": null }));
    }

    /// Backend whose keys are always taken.
    struct OccupiedBackend;

    #[async_trait::async_trait]
    impl DocumentBackend for OccupiedBackend {
        async fn get(&self, _: &Keyspace, key: &DocumentKey) -> Result<Document, StoreError> {
            Err(StoreError::NotFound { key: key.clone() })
        }

        async fn insert(
            &self,
            _: &Keyspace,
            key: &DocumentKey,
            _: &Value,
        ) -> Result<MutationResult, StoreError> {
            Err(StoreError::Conflict { key: key.clone() })
        }

        async fn replace(
            &self,
            _: &Keyspace,
            key: &DocumentKey,
            _: &Value,
        ) -> Result<MutationResult, StoreError> {
            Err(StoreError::NotFound { key: key.clone() })
        }

        async fn remove(&self, _: &Keyspace, key: &DocumentKey) -> Result<MutationResult, StoreError> {
            Err(StoreError::NotFound { key: key.clone() })
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn close(&self) {}

        fn name(&self) -> &'static str {
            "occupied"
        }
    }

    #[tokio::test]
    async fn test_create_on_taken_key_is_conflict() {
        let store = DocumentStore::new(OccupiedBackend);

        let response = execute(&store, CREATE, json!({ "product": widget() })).await;

        assert_eq!(error_code(&response).as_deref(), Some("CONFLICT"));
        assert!(response.http_headers.get(PRODUCT_ID_HEADER).is_none());
        assert!(
            response
                .errors
                .first()
                .unwrap()
                .message
                .starts_with("document already exists: ")
        );
        assert_eq!(data(response), json!({ "createProduct": null }));
    }

    #[tokio::test]
    async fn test_sparse_create_stores_only_given_fields() {
        let backend = Arc::new(MemoryBackend::new());
        let store = DocumentStore::shared(backend.clone());

        let id = create(&store, json!({ "name": "Bare" })).await;

        let document = store
            .products()
            .get(&DocumentKey::parse(&id).unwrap())
            .await
            .unwrap();
        assert_eq!(document.body, json!({ "name": "Bare" }));
        assert_eq!(backend.len().await, 1);
    }
}
