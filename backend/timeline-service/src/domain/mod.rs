pub mod models;

pub use models::{Comment, Group, Post, User};
