use async_trait::async_trait;

use super::{MailError, MailProvider, SendMailDto};

/// Development provider: writes each message to the log and reports success.
#[derive(Default, Clone)]
pub struct LogMailProvider;

#[async_trait]
impl MailProvider for LogMailProvider {
    #[tracing::instrument(name = "Sending mail", skip(self, message), fields(to = %message.to.email))]
    async fn send_mail(&self, message: SendMailDto) -> Result<(), MailError> {
        tracing::info!(
            subject = %message.subject,
            template = %message.template.file,
            "mail delivered to log"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{MailContact, MailTemplate};

    #[tokio::test]
    async fn test_log_provider_succeeds() {
        let provider = LogMailProvider;
        let result = provider
            .send_mail(SendMailDto {
                to: MailContact {
                    name: "Bob".to_string(),
                    email: "bob@example.com".to_string(),
                },
                from: None,
                subject: "Hello".to_string(),
                template: MailTemplate::default(),
            })
            .await;

        assert!(result.is_ok());
    }
}
