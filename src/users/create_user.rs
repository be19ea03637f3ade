use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::UserError;
use super::hash::HashProvider;
use super::models::{CreateUserInput, CreateUserResponse, User};
use super::repository::UsersRepository;
use crate::auth::TokenService;
use crate::mail::{MailContact, MailProvider, MailTemplate, SendMailDto};

const MIN_PASSWORD_LENGTH: usize = 6;

/// Registers a new user: validation, uniqueness, hashing, persistence,
/// welcome mail and token issuing.
pub struct CreateUserUseCase {
    users: Arc<dyn UsersRepository>,
    hasher: Arc<dyn HashProvider>,
    mailer: Arc<dyn MailProvider>,
    tokens: TokenService,
}

impl CreateUserUseCase {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        hasher: Arc<dyn HashProvider>,
        mailer: Arc<dyn MailProvider>,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            hasher,
            mailer,
            tokens,
        }
    }

    #[tracing::instrument(name = "Creating user", skip_all, fields(email = %input.email))]
    pub async fn execute(&self, input: CreateUserInput) -> Result<CreateUserResponse, UserError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        validate(&name, &email, &input.password)?;

        // fast path; `create` enforces uniqueness for concurrent registrations
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(UserError::EmailAlreadyInUse);
        }

        let password_hash = self.hasher.hash(&input.password).await?;
        let user = self.users.create(User::new(name, email, password_hash)).await?;
        tracing::info!(user_id = %user.id, "user created");

        let welcome = SendMailDto {
            to: MailContact {
                name: user.name.clone(),
                email: user.email.clone(),
            },
            from: None,
            subject: "Welcome!".to_string(),
            template: MailTemplate {
                file: "welcome".to_string(),
                variables: HashMap::from([("name".to_string(), user.name.clone())]),
            },
        };
        if let Err(e) = self.mailer.send_mail(welcome).await {
            tracing::warn!(user_id = %user.id, error = %e, "welcome mail not sent");
        }

        let token = self.tokens.issue(&user.id)?;

        Ok(CreateUserResponse {
            user: user.into(),
            token,
        })
    }
}

fn validate(name: &str, email: &str, password: &str) -> Result<(), UserError> {
    if name.is_empty() {
        return Err(UserError::Validation("Name is required".to_string()));
    }
    if !looks_like_email(email) {
        return Err(UserError::Validation("Email address is invalid".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserError::Validation(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Entry point the GraphQL layer talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreateUserHandler: Send + Sync {
    async fn handler(&self, input: CreateUserInput) -> Result<CreateUserResponse, UserError>;
}

pub struct CreateUserController {
    use_case: CreateUserUseCase,
}

impl CreateUserController {
    pub fn new(use_case: CreateUserUseCase) -> Self {
        Self { use_case }
    }
}

#[async_trait]
impl CreateUserHandler for CreateUserController {
    async fn handler(&self, input: CreateUserInput) -> Result<CreateUserResponse, UserError> {
        self.use_case.execute(input).await
    }
}
