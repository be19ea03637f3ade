use actix_web::web;

/// # GraphQL Endpoint
///
/// The single endpoint of the service, mounted at the root path.
///
/// ## Routes
/// - `POST /`: executes GraphQL queries and mutations
/// - `GET /`: GraphQL Playground (when enabled)
///
/// ## Example Request
/// ```json
/// {
///   "query": "mutation { createUser(name: \"Alice\", email: \"alice@example.com\", password: \"secret\") { token } }"
/// }
/// ```
pub mod graphql;

/// # Route Configuration
///
/// Mounts every HTTP route of the service. Expects `web::Data<AppSchema>` and
/// `web::Data<CacheClient>` to be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig, playground: bool) {
    graphql::configure_routes(cfg, playground);
}
