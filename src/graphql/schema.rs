use std::sync::Arc;

use super::health::HealthQuery;
use super::users::{CreateUserResolver, UserQuery};
use crate::auth::TokenService;
use crate::cache::HitCounter;
use crate::config::{Environment, RateLimitConfig};
use crate::rate_limit::RateLimiter;
use crate::users::{CreateUserHandler, UsersRepository};
use async_graphql::{EmptySubscription, MergedObject, Schema};

/// Every query resolver of the service.
#[derive(MergedObject, Default)]
pub struct QueryRoot(HealthQuery, UserQuery);

/// Every mutation resolver of the service.
#[derive(MergedObject, Default)]
pub struct MutationRoot(CreateUserResolver);

/// Main GraphQL Schema Definition
///
/// # Type Parameters
/// - `QueryRoot`: `health` and `me`
/// - `MutationRoot`: `createUser`
/// - `EmptySubscription`: the service has no subscriptions
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Collaborators wired at the composition root and shared by all requests.
///
/// ## Fields
/// - `environment`: Deployment mode reported by the `health` query
/// - `create_user`: Registration controller behind the `createUser` mutation
/// - `users`: Repository the `me` query reads from
/// - `tokens`: Issues and verifies bearer tokens
/// - `rate_limit`: Budget per client and window; `max_requests: 0` disables limiting
/// - `hits`: Counter backing the rate limiter, usually the shared [`CacheClient`](crate::cache::CacheClient)
#[derive(Clone)]
pub struct AppServices {
    pub environment: Environment,
    pub create_user: Arc<dyn CreateUserHandler>,
    pub users: Arc<dyn UsersRepository>,
    pub tokens: TokenService,
    pub rate_limit: RateLimitConfig,
    pub hits: Arc<dyn HitCounter>,
}

/// Builds the GraphQL schema.
///
/// Services become schema data, read by resolvers through their context.
/// The [`RateLimiter`] wraps the execution of every operation.
///
/// # Arguments
/// - `services`: Collaborators built once at startup
///
/// # Returns
/// An [`AppSchema`] ready to be shared across actix workers.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use user_registration::auth::TokenService;
/// use user_registration::cache::CacheClient;
/// use user_registration::config::{Environment, RateLimitConfig};
/// use user_registration::graphql::schema::{AppServices, build_schema};
/// use user_registration::mail::LogMailProvider;
/// use user_registration::users::{
///     CreateUserController, CreateUserUseCase, InMemoryUsersRepository,
///     hash::BcryptHashProvider,
/// };
///
/// let users = Arc::new(InMemoryUsersRepository::new());
/// let tokens = TokenService::new("secret", 1);
/// let use_case = CreateUserUseCase::new(
///     users.clone(),
///     Arc::new(BcryptHashProvider::default()),
///     Arc::new(LogMailProvider),
///     tokens.clone(),
/// );
/// let cache = CacheClient::open("redis://127.0.0.1:6379").unwrap();
///
/// let schema = build_schema(AppServices {
///     environment: Environment::Development,
///     create_user: Arc::new(CreateUserController::new(use_case)),
///     users,
///     tokens,
///     rate_limit: RateLimitConfig { max_requests: 100, window_secs: 60 },
///     hits: Arc::new(cache),
/// });
/// ```
pub fn build_schema(services: AppServices) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(services.environment)
    .data(services.create_user)
    .data(services.users)
    .data(services.tokens)
    .extension(RateLimiter::new(services.rate_limit, services.hits))
    .finish()
}
