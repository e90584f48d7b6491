pub mod config;
pub mod names;
pub mod types;
