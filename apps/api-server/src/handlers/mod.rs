//! HTTP handlers and route configuration.

mod auth;
mod health;
mod tasks;

use std::sync::Arc;

use actix_web::{
    HttpRequest,
    error::{JsonPayloadError, QueryPayloadError},
    web,
};

use justdo_core::ports::TokenService;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::error::AppError;
use crate::middleware::logging::MAX_BUFFERED_BODY;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, tokens: Arc<dyn TokenService>) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_BUFFERED_BODY)
            .error_handler(json_error),
    )
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login)),
                ),
        )
        .service(
            web::scope("/v1/tasks")
                .wrap(AuthMiddleware::new(tokens))
                .route("", web::get().to(tasks::list))
                .route("", web::post().to(tasks::create))
                // Fixed segments before `/{id}`
                .route("/today", web::get().to(tasks::today))
                .route("/backlog", web::get().to(tasks::backlog))
                .route("/{id}", web::put().to(tasks::replace))
                .route("/{id}", web::delete().to(tasks::delete))
                .route("/{id}/toggle", web::patch().to(tasks::toggle)),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            return AppError::PayloadTooLarge(format!(
                "request body exceeds {MAX_BUFFERED_BODY} bytes"
            ))
            .into();
        }
        JsonPayloadError::ContentType => "content type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("invalid request body: {e}"),
        other => format!("invalid request body: {other}"),
    };
    AppError::BadRequest(message).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("invalid query string: {err}")).into()
}
