// src/api/handlers/health.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::api::AppState;

/// Liveness check. Unlike the `healthcheck` command it runs no tests.
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "evalfn",
        "function": state.dispatcher.function_name(),
        "version": env!("CARGO_PKG_VERSION")
    })))
}
