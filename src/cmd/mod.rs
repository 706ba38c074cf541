pub mod comment;
pub mod config;
