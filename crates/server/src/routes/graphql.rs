//! GraphQL endpoint handlers.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Extension,
    extract::State,
    response::{Html, IntoResponse},
};

use crate::graphql::RequestContext;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Execute a GraphQL request against the product schema.
///
/// Each request gets its own [`RequestContext`]; the document store inside
/// it is the process-wide handle, not a new connection.
pub async fn graphql(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let context = RequestContext::new(state.store().clone(), request_id.as_str());
    state
        .schema()
        .execute(request.into_inner().data(context))
        .await
        .into()
}

/// Serve the GraphiQL explorer.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
