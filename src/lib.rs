pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod cors;
pub mod graphql;
pub mod mail;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod users;

#[cfg(test)]
mod test_utils;
