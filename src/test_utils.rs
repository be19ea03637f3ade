//! Shared fixtures for schema-level tests. Nothing here touches Redis or MongoDB.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::cache::{CacheClient, MockHitCounter};
use crate::config::{Environment, RateLimitConfig};
use crate::graphql::schema::{AppSchema, AppServices, build_schema};
use crate::mail::FakeMailProvider;
use crate::users::hash::FakeHashProvider;
use crate::users::{
    CreateUserController, CreateUserHandler, CreateUserUseCase, InMemoryUsersRepository,
};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 1)
}

/// Never connected; schema fixtures count hits with a mock instead.
pub fn test_cache() -> CacheClient {
    CacheClient::open("redis://127.0.0.1:6379").expect("valid redis url")
}

pub struct TestApp {
    pub schema: AppSchema,
    pub users: Arc<InMemoryUsersRepository>,
    pub mailer: Arc<FakeMailProvider>,
}

/// Schema wired with the real controller over in-memory collaborators.
pub fn test_app() -> TestApp {
    let users = Arc::new(InMemoryUsersRepository::new());
    let mailer = Arc::new(FakeMailProvider::new());
    let use_case = CreateUserUseCase::new(
        users.clone(),
        Arc::new(FakeHashProvider),
        mailer.clone(),
        test_tokens(),
    );

    let schema = build_schema(services(
        Arc::new(CreateUserController::new(use_case)),
        users.clone(),
    ));

    TestApp {
        schema,
        users,
        mailer,
    }
}

/// Schema wired around an arbitrary handler, e.g. a mock.
pub fn schema_with_handler(handler: Arc<dyn CreateUserHandler>) -> AppSchema {
    build_schema(services(handler, Arc::new(InMemoryUsersRepository::new())))
}

fn services(
    create_user: Arc<dyn CreateUserHandler>,
    users: Arc<InMemoryUsersRepository>,
) -> AppServices {
    AppServices {
        environment: Environment::Testing,
        create_user,
        users,
        tokens: test_tokens(),
        rate_limit: RateLimitConfig {
            max_requests: 0,
            window_secs: 60,
        },
        hits: Arc::new(MockHitCounter::new()),
    }
}
