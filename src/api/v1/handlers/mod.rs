pub mod connection;
pub mod health;
