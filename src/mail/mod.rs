use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod fake;
pub mod logger;

pub use fake::FakeMailProvider;
pub use logger::LogMailProvider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailContact {
    pub name: String,
    pub email: String,
}

/// Template reference rendered by the delivering provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MailTemplate {
    pub file: String,
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMailDto {
    pub to: MailContact,
    pub from: Option<MailContact>,
    pub subject: String,
    pub template: MailTemplate,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send_mail(&self, message: SendMailDto) -> Result<(), MailError>;
}
