pub mod config;
pub mod detect;
pub mod engine;
pub mod models;
pub mod patterns;
pub mod snapshot;
