use crate::config::Environment;
use crate::models::health::HealthStatus;
use async_graphql::{Context, Object, Result};

/// GraphQL view of [`HealthStatus`].
#[derive(Debug)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
}

impl From<HealthStatus> for Health {
    fn from(status: HealthStatus) -> Self {
        Self {
            status: status.status,
            timestamp: status.timestamp,
            environment: status.environment,
        }
    }
}

#[Object]
impl Health {
    /// Service status, always "UP" while the process answers
    async fn status(&self) -> &str {
        &self.status
    }

    /// RFC 3339 time of the check
    async fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Deployment mode (development, testing, production, ...)
    async fn environment(&self) -> &str {
        &self.environment
    }
}

#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    /// Checks service health status
    async fn health(&self, ctx: &Context<'_>) -> Result<Health> {
        let environment = ctx
            .data_opt::<Environment>()
            .cloned()
            .unwrap_or(Environment::Development);
        Ok(Health::from(HealthStatus::up(&environment)))
    }
}
