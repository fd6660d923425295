//! API Routes module for the TuklasVerse embed proxy
//!
//! This module contains all HTTP route handlers for the public API endpoints.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::info;
use utoipa::OpenApi;

use crate::config::Config;
use crate::constants::messages;
use crate::embed::{build_embed, EmbedKind, EmbedRequest, EmbedSource};
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, ApiResponse, HealthStatus, SeasonInfo};
use crate::proxy::EmbedProxy;
use crate::sanitizer::SanitizeMode;
use crate::upstream::{HttpUpstream, UpstreamFetch};

/// Application state shared across handlers
pub struct AppState {
    pub proxy: EmbedProxy,
    pub config: Config,
}

impl AppState {
    /// Build state around an existing transport
    pub fn new(config: Config, upstream: Arc<dyn UpstreamFetch>) -> Self {
        Self {
            proxy: EmbedProxy::from_config(&config.proxy, upstream),
            config,
        }
    }

    /// Build state with the reqwest transport
    pub fn from_config(config: Config) -> AppResult<Self> {
        let upstream = HttpUpstream::new(&config.proxy)?;
        Ok(Self::new(config, Arc::new(upstream)))
    }
}

/// First `url` value of the query string, percent-decoded
fn target_url(req: &HttpRequest) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

/// GET /api/proxy/vidsrc - Fetch an embed page and strip ad scripts
///
/// Answers in plain text on every failure.
#[utoipa::path(
    get,
    path = "/api/proxy/vidsrc",
    tag = "proxy",
    params(
        ("url" = Option<String>, Query, description = "Percent-encoded embed URL on an approved prefix")
    ),
    responses(
        (status = 200, description = "Sanitized embed HTML", body = String, content_type = "text/html"),
        (status = 400, description = "Invalid or missing URL", body = String, content_type = "text/plain"),
        (status = 500, description = "Proxy failed", body = String, content_type = "text/plain")
    )
)]
pub async fn proxy_vidsrc(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let target = target_url(&req);
    data.proxy.handle(target.as_deref()).await
}

/// GET /api/embed - Build the player iframe source for a movie or episode
#[utoipa::path(
    get,
    path = "/api/embed",
    tag = "embed",
    params(EmbedRequest),
    responses(
        (status = 200, description = "Embed source built", body = EmbedSource),
        (status = 400, description = "Neither imdb_id nor tmdb_id given", body = ApiError)
    )
)]
pub async fn get_embed(
    data: web::Data<AppState>,
    query: web::Query<EmbedRequest>,
) -> AppResult<HttpResponse> {
    let embed = build_embed(
        &data.config.embed_base_url,
        data.proxy.allow_list(),
        &query,
    )?;
    info!("Built {:?} embed: {}", embed.kind, embed.src);
    Ok(HttpResponse::Ok().json(ApiResponse::new(embed)))
}

/// GET /api/season/{tv_id}/{season_number} - Echo the requested season
#[utoipa::path(
    get,
    path = "/api/season/{tv_id}/{season_number}",
    tag = "season",
    params(
        ("tv_id" = String, Path, description = "TMDB TV series id"),
        ("season_number" = String, Path, description = "Season number")
    ),
    responses(
        (status = 200, description = "Season identifiers", body = SeasonInfo)
    )
)]
pub async fn get_season(path: web::Path<(String, String)>) -> impl Responder {
    let (tv_id, season_number) = path.into_inner();
    HttpResponse::Ok().json(SeasonInfo {
        tv_id,
        season_number,
        message: messages::SEASON_FETCHED.to_string(),
    })
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus)
    )
)]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::healthy())
}

/// Fallback for unknown routes
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::not_found(format!("No route for {}", req.path())))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TuklasVerse Embed Proxy",
        version = "0.1.0",
        description = "Sanitizing proxy and embed helpers for the TuklasVerse front end",
        license(
            name = "MIT"
        )
    ),
    paths(
        proxy_vidsrc,
        get_embed,
        get_season,
        health_check
    ),
    components(
        schemas(
            ApiError,
            EmbedSource,
            EmbedKind,
            EmbedRequest,
            SeasonInfo,
            HealthStatus,
            SanitizeMode
        )
    ),
    tags(
        (name = "proxy", description = "Embed sanitizing proxy"),
        (name = "embed", description = "Player source builder"),
        (name = "season", description = "Season lookup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api")
            .route("/proxy/vidsrc", web::get().to(proxy_vidsrc))
            .route("/embed", web::get().to(get_embed))
            .route(
                "/season/{tv_id}/{season_number}/proxy/vidsrc",
                web::get().to(proxy_vidsrc),
            )
            .route("/season/{tv_id}/{season_number}", web::get().to(get_season)),
    );
}
