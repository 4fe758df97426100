// src/api/handlers/mod.rs
mod dispatch;
mod health;

pub use dispatch::dispatch;
pub use health::health_check;
