use std::sync::Mutex;

use async_trait::async_trait;

use super::{MailError, MailProvider, SendMailDto};

/// Records every message instead of delivering it.
#[derive(Default)]
pub struct FakeMailProvider {
    messages: Mutex<Vec<SendMailDto>>,
}

impl FakeMailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<SendMailDto> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl MailProvider for FakeMailProvider {
    async fn send_mail(&self, message: SendMailDto) -> Result<(), MailError> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message);
        Ok(())
    }
}
