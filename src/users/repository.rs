use std::sync::RwLock;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use super::errors::UserError;
use super::models::User;
use crate::config::MongoConfig;

/// MongoDB's duplicate key error code.
const DUPLICATE_KEY: i32 = 11000;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserError>;
    /// Stores `user`, failing with [`UserError::EmailAlreadyInUse`] when the
    /// email is taken, including by a concurrent registration.
    async fn create(&self, user: User) -> Result<User, UserError>;
}

/// Process-local store for tests and local runs without MongoDB.
#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find(|user| predicate(user))
            .cloned()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.find(|user| user.email == email))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserError> {
        Ok(self.find(|user| user.id == id))
    }

    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self
            .users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyInUse);
        }
        users.push(user.clone());
        Ok(user)
    }
}

pub struct MongoUsersRepository {
    collection: Collection<User>,
}

impl MongoUsersRepository {
    pub fn new(client: &Client, config: &MongoConfig) -> Self {
        let collection = client
            .database(&config.database)
            .collection(&config.users_collection);
        Self { collection }
    }

    /// Creates the unique index on `email`. Idempotent; run once at startup.
    pub async fn ensure_indexes(&self) -> Result<(), UserError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UsersRepository for MongoUsersRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserError> {
        Ok(self.collection.find_one(doc! { "id": id }).await?)
    }

    async fn create(&self, user: User) -> Result<User, UserError> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(UserError::EmailAlreadyInUse),
            Err(e) => Err(e.into()),
        }
    }
}
