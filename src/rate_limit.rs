use std::sync::Arc;

use async_graphql::extensions::{Extension, ExtensionContext, ExtensionFactory, NextExecute};
use async_graphql::{ErrorExtensionValues, Response, ServerError};

use crate::cache::HitCounter;
use crate::config::RateLimitConfig;
use crate::context::RequestContext;

const KEY_PREFIX: &str = "rate_limit";

/// Global middleware limiting operations per client address and window.
///
/// Counting goes through a [`HitCounter`], Redis in production. When the
/// counter cannot be reached the operation is let through. Requests without
/// a peer address are not counted.
///
/// # Arguments
/// * `config` - Window length and per-client budget. `max_requests == 0` disables the limiter.
/// * `counter` - Shared counter keyed by `rate_limit:<client ip>`.
pub struct RateLimiter {
    config: RateLimitConfig,
    counter: Arc<dyn HitCounter>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, counter: Arc<dyn HitCounter>) -> Self {
        Self { config, counter }
    }
}

impl ExtensionFactory for RateLimiter {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(RateLimiterExtension {
            config: self.config.clone(),
            counter: self.counter.clone(),
        })
    }
}

struct RateLimiterExtension {
    config: RateLimitConfig,
    counter: Arc<dyn HitCounter>,
}

impl RateLimiterExtension {
    fn exceeded(&self, count: u64) -> bool {
        self.config.max_requests > 0 && count > self.config.max_requests
    }
}

fn too_many_requests() -> Response {
    let mut extensions = ErrorExtensionValues::default();
    extensions.set("code", "TOO_MANY_REQUESTS");
    let mut error = ServerError::new("Too many requests", None);
    error.extensions = Some(extensions);
    Response::from_errors(vec![error])
}

#[async_trait::async_trait]
impl Extension for RateLimiterExtension {
    async fn execute(
        &self,
        ctx: &ExtensionContext<'_>,
        operation_name: Option<&str>,
        next: NextExecute<'_>,
    ) -> Response {
        if self.config.max_requests == 0 {
            return next.run(ctx, operation_name).await;
        }

        let Some(client) = ctx
            .data_opt::<RequestContext>()
            .and_then(|request| request.client_ip.as_deref())
        else {
            tracing::debug!("no peer address, skipping rate limit");
            return next.run(ctx, operation_name).await;
        };

        let key = format!("{}:{}", KEY_PREFIX, client);
        match self.counter.hit(key, self.config.window_secs).await {
            Ok(count) if self.exceeded(count) => {
                tracing::warn!(client, count, "rate limit exceeded");
                too_many_requests()
            }
            Ok(_) => next.run(ctx, operation_name).await,
            Err(e) => {
                tracing::warn!(error = %e, "rate limiter unavailable, allowing request");
                next.run(ctx, operation_name).await
            }
        }
    }
}
