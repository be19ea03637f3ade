use crate::graphql::handlers;
use actix_web::web;

/// Registers the GraphQL endpoint at `/` and, when `playground` is set, the
/// Playground page on `GET /`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, playground: bool) {
    let resource = web::resource("/").route(web::post().to(handlers::graphql_handler));

    if playground {
        cfg.service(resource.route(web::get().to(handlers::graphql_playground)));
    } else {
        cfg.service(resource);
    }
}
