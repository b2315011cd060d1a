//! # JustDo API Server
//!
//! Actix-web server for personal task management: registration and login
//! under `/api/auth`, bearer-authenticated task routes under `/v1/tasks`.

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod tests;

use config::AppConfig;
use middleware::logging::RequestLogger;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env()?;

    tracing::info!(
        "Starting JustDo API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::from_config(&config).await?;
    let tokens = state.tokens();

    HttpServer::new(move || {
        let tokens = tokens.clone();

        App::new()
            .wrap(RequestLogger)
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, tokens))
    })
    .client_request_timeout(config.request_timeout)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
