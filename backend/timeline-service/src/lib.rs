pub mod auth;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};
