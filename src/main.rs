//! TuklasVerse Embed Proxy Server
//!
//! Main entry point for the sanitizing proxy service.

use actix_web::{web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tuklasverse_proxy::config::Config;
use tuklasverse_proxy::routes::{configure_routes, not_found, ApiDoc, AppState};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    let bind_address = format!("{}:{}", config.host, config.port);

    for entry in config.proxy.allow_list.entries() {
        info!("Allowing embed prefix {} (referer {})", entry.prefix(), entry.referer());
    }
    info!("Sanitize mode: {:?}", config.proxy.sanitize_mode);

    let app_state = web::Data::new(
        AppState::from_config(config)
            .map_err(|e| startup_error("Failed to initialise proxy", e))?,
    );

    info!("Starting TuklasVerse embed proxy on {}", bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(configure_routes)
            .default_service(web::to(not_found))
    })
    .bind(&bind_address)?
    .run()
    .await
}
