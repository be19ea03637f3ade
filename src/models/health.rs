use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::Environment;

#[derive(Serialize, Debug, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
}

impl HealthStatus {
    pub fn up(environment: &Environment) -> Self {
        Self {
            status: "UP".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            environment: environment.to_string(),
        }
    }
}
