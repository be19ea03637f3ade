use actix_web::{HttpRequest, HttpResponse, Responder, web};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::cache::CacheClient;
use crate::context::RequestContext;
use crate::graphql::schema::AppSchema;

/// Handles incoming GraphQL requests.
///
/// A fresh [`RequestContext`] is attached to every request. It holds a
/// clone of the shared cache client and is dropped together with the
/// request, whatever the outcome.
///
/// # Arguments
/// - `schema`: The application's GraphQL schema, shared through actix-web's app data.
/// - `cache`: The process-wide cache client, cloned into the request context.
/// - `http_req`: The raw HTTP request, read for headers, base URL and peer address.
/// - `req`: The incoming GraphQL request containing the query, variables, and operation name.
///
/// # Returns
/// A [`GraphQLResponse`] containing the execution result of the GraphQL operation.
#[tracing::instrument(name = "GraphQL request", skip_all)]
pub async fn graphql_handler(
    schema: web::Data<AppSchema>,
    cache: web::Data<CacheClient>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let context = RequestContext::from_request(&http_req, cache.get_ref().clone());
    schema.execute(req.into_inner().data(context)).await.into()
}

/// Serves the GraphQL Playground interface for interactive query testing.
///
/// The Playground sends its requests to the root endpoint.
///
/// # Note
/// Only mounted when the playground is enabled, which is off by default in production.
///
/// # Returns
/// An [`HttpResponse`] with HTML content rendering the GraphQL Playground interface.
pub async fn graphql_playground() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(playground_source(GraphQLPlaygroundConfig::new("/")))
}
