// src/lib.rs
pub mod api;
pub mod banner;
pub mod config;
pub mod dispatch;
pub mod docs;
pub mod envelope;
pub mod errors;
pub mod function;
pub mod health;
pub mod models;
pub mod runner;
pub mod validate;
