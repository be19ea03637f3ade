use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error, PartialEq)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("Email address already in use")]
    EmailAlreadyInUse,

    #[error("User not found")]
    NotFound,

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Token(#[from] AuthError),
}

impl UserError {
    pub fn code(&self) -> &'static str {
        match self {
            UserError::Validation(_) => "BAD_USER_INPUT",
            UserError::EmailAlreadyInUse => "EMAIL_IN_USE",
            UserError::NotFound => "NOT_FOUND",
            UserError::Repository(_) | UserError::Hash(_) | UserError::Token(_) => {
                "INTERNAL_SERVER_ERROR"
            }
        }
    }
}

impl ErrorExtensions for UserError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Repository(err.to_string())
    }
}
