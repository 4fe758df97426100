// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(handlers::dispatch))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(handlers::health_check)),
        );
}
