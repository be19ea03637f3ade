//! User registration domain: records, persistence, password hashing and the
//! CreateUser use case consumed by the GraphQL layer.

pub mod create_user;
pub mod errors;
pub mod hash;
pub mod models;
pub mod repository;

pub use create_user::{CreateUserController, CreateUserHandler, CreateUserUseCase};
pub use errors::UserError;
pub use models::{CreateUserInput, CreateUserResponse, User, UserSchema};
pub use repository::{InMemoryUsersRepository, MongoUsersRepository, UsersRepository};
