use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::alarm::controller::BusyRows;
use crate::alarm::render::LocalizedTimeFormatter;
use crate::alarm::{Notifier, ShieldApi, ShieldListController};
use crate::server::config::ConsoleConfig;
use crate::web::routes::*;

pub use error::AppError;

pub mod error;
pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub shield_api: Arc<dyn ShieldApi>,
    pub config: Arc<ConsoleConfig>,
    pub busy_rows: BusyRows,
}

impl AppState {
    pub fn new(shield_api: Arc<dyn ShieldApi>, config: Arc<ConsoleConfig>) -> Self {
        Self {
            shield_api,
            config,
            busy_rows: BusyRows::default(),
        }
    }

    /// A fresh list controller speaking `locale`, reporting through `notifier`.
    pub fn shield_controller(&self, locale: &str, notifier: Arc<dyn Notifier>) -> ShieldListController {
        ShieldListController::new(self.shield_api.clone(), notifier, locale, self.config.page_size)
            .with_time_formatter(LocalizedTimeFormatter::from_offset_minutes(
                self.config.display_utc_offset_minutes,
            ))
            .with_busy_rows(self.busy_rows.clone())
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/alarm/shields", shield_routes::create_shield_router())
        .nest("/api/integrations", integration_routes::create_integration_router())
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::i18n::i18n_middleware,
        ))
        .with_state(app_state)
        .layer(cors)
}
