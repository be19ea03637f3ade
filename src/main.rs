use std::sync::Arc;

use actix_web::{App, HttpServer, web::Data};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_registration::auth::TokenService;
use user_registration::cache::CacheClient;
use user_registration::config::ServerConfig;
use user_registration::cors::{CorsGuard, CorsPolicy};
use user_registration::graphql::schema::{AppServices, build_schema};
use user_registration::mail::LogMailProvider;
use user_registration::users::hash::BcryptHashProvider;
use user_registration::users::{
    CreateUserController, CreateUserHandler, CreateUserUseCase, MongoUsersRepository,
    UsersRepository,
};

/// User Registration Service Entry Point
///
/// Wires every collaborator once and serves the GraphQL endpoint:
/// - GraphQL: `POST /`
/// - Playground: `GET /` (off in production unless `GRAPHQL_PLAYGROUND` is set)
///
/// # Configuration
/// Environment variables, optionally loaded from a `.env` file. Any
/// configuration error aborts startup.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,user_registration=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::info!(environment = %config.environment, "starting user registration service");

    let cache = CacheClient::from_config(&config.redis).context("invalid redis configuration")?;

    let mongo = mongodb::Client::with_uri_str(&config.mongo.uri)
        .await
        .context("invalid MongoDB configuration")?;
    let repository = MongoUsersRepository::new(&mongo, &config.mongo);
    repository
        .ensure_indexes()
        .await
        .context("failed to create the users email index")?;
    let users: Arc<dyn UsersRepository> = Arc::new(repository);

    let tokens = TokenService::new(config.jwt_secret.clone(), config.jwt_expires_in_days);
    let use_case = CreateUserUseCase::new(
        users.clone(),
        Arc::new(BcryptHashProvider::new(config.bcrypt_cost)),
        Arc::new(LogMailProvider),
        tokens.clone(),
    );
    let create_user: Arc<dyn CreateUserHandler> = Arc::new(CreateUserController::new(use_case));

    let schema = build_schema(AppServices {
        environment: config.environment.clone(),
        create_user,
        users,
        tokens,
        rate_limit: config.rate_limit.clone(),
        hits: Arc::new(cache.clone()),
    });

    let policy = CorsPolicy::new(config.environment.clone(), config.whitelist.clone());
    let playground = config.playground;
    let bind = config.bind_address();
    tracing::info!(host = %bind.0, port = bind.1, playground, "listening");

    HttpServer::new(move || {
        App::new()
            .wrap(policy.headers())
            .wrap(CorsGuard::new(policy.clone()))
            .app_data(Data::new(schema.clone()))
            .app_data(Data::new(cache.clone()))
            .configure(|cfg| user_registration::routes::configure(cfg, playground))
    })
    .bind(bind)?
    .run()
    .await?;

    tracing::info!("server stopped");
    Ok(())
}
