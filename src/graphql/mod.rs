pub mod handlers;
pub mod health;
pub mod schema;
pub mod users;

#[cfg(test)]
mod users_test;
