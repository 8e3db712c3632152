pub mod auth;
pub mod classify;
pub mod client;
pub mod error;
pub mod friday;
pub mod handlers;
pub mod invites;
pub mod local_day;
pub mod models;
pub mod openapi;
pub mod settings;
pub mod timestamp;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use handlers::{
    delete_signup, get_active_invites, get_by_day, get_fridays, get_upcoming, healthz_live,
    healthz_ready, post_signup, root,
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::client::BackendClient;
use crate::friday::FridayRules;
use crate::openapi::ApiDoc;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub client: Arc<BackendClient>,
    pub rules: Arc<FridayRules>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let client = BackendClient::new(
            settings.backend_base_url.clone(),
            settings.backend_token.clone(),
        );
        let rules = FridayRules::from_settings(&settings);
        Self {
            settings,
            client: Arc::new(client),
            rules: Arc::new(rules),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState::new(settings);
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!(
        backend = %state.settings.backend_base_url,
        timezone = %state.settings.display_timezone,
        "Starting Club Schedule API on {addr}"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/appointments/upcoming", get(get_upcoming))
        .route("/appointments/by-day", get(get_by_day))
        .route("/fridays", get(get_fridays))
        .route("/fridays/{date}/signup", post(post_signup).delete(delete_signup))
        .route("/invites/active", get(get_active_invites))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer)
}
