use async_graphql::SimpleObject;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user; never exposes the password hash.
#[derive(SimpleObject, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[graphql(name = "UserSchema")]
pub struct UserSchema {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserSchema {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Result of a successful registration.
#[derive(SimpleObject, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[graphql(name = "CreateUserSchema")]
pub struct CreateUserResponse {
    pub user: UserSchema,
    /// Access token for the new user
    pub token: String,
}
