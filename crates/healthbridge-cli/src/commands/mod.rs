pub mod auth;
pub mod catalog;
pub mod config;
pub mod export;
pub mod import;
pub mod query;
