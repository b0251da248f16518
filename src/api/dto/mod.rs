pub mod auth;
pub mod weather;
