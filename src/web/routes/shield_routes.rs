use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alarm::controller::ShieldPageView;
use crate::alarm::feedback::{Message, MessageLevel};
use crate::alarm::models::{AlertShieldListItem, ShieldForm, ShieldId};
use crate::alarm::{
    ApiError, AutoConfirm, CollectingNotifier, DeleteOutcome, ShieldListController, ToggleOutcome,
};
use crate::web::middleware::i18n::Locale;
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    page: Option<u32>,
    page_size: Option<u32>,
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    is_active: bool,
}

#[derive(Serialize)]
pub struct ShieldPageResponse {
    view: ShieldPageView,
    messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct SaveShieldResponse {
    shield: AlertShieldListItem,
    view: ShieldPageView,
    messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct DeleteShieldResponse {
    outcome: DeleteOutcome,
    view: ShieldPageView,
    messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct ToggleShieldResponse {
    outcome: ToggleOutcome,
    view: ShieldPageView,
    messages: Vec<Message>,
}

/// One controller per request, seeded from the query string.
struct PageSession {
    controller: ShieldListController,
    notifier: Arc<CollectingNotifier>,
}

impl PageSession {
    async fn open(app_state: &AppState, locale: &Locale, params: ListParams) -> Self {
        let notifier = Arc::new(CollectingNotifier::new());
        let controller = app_state.shield_controller(locale.as_str(), notifier.clone());
        controller
            .restore(
                params.page.unwrap_or(1),
                params.page_size.unwrap_or(app_state.config.page_size),
                params.name.unwrap_or_default(),
            )
            .await;
        Self { controller, notifier }
    }

    /// Upstream failures keep the localized toast text as the error message.
    fn fail(&self, err: ApiError) -> AppError {
        let toast = self
            .notifier
            .take()
            .into_iter()
            .rev()
            .find(|m| m.level == MessageLevel::Error);
        match (AppError::from(err), toast) {
            (AppError::BadGateway(_), Some(message)) => AppError::BadGateway(message.text),
            (app_error, _) => app_error,
        }
    }

    async fn finish(self) -> (ShieldPageView, Vec<Message>) {
        let view = self.controller.view().await;
        (view, self.notifier.take())
    }
}

// --- Route Handlers ---

async fn list_shields_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(locale): Extension<Locale>,
    Query(params): Query<ListParams>,
) -> Result<Json<ShieldPageResponse>, AppError> {
    let session = PageSession::open(&app_state, &locale, params).await;
    session.controller.refresh().await.map_err(|e| session.fail(e))?;

    let (view, messages) = session.finish().await;
    Ok(Json(ShieldPageResponse { view, messages }))
}

async fn save_shield(
    app_state: &AppState,
    locale: &Locale,
    form: ShieldForm,
    existing_id: Option<ShieldId>,
) -> Result<Json<SaveShieldResponse>, AppError> {
    let session = PageSession::open(app_state, locale, ListParams::default()).await;
    let shield = session
        .controller
        .save_shield(&form, existing_id)
        .await
        .map_err(|e| session.fail(e))?;

    let (view, messages) = session.finish().await;
    Ok(Json(SaveShieldResponse { shield, view, messages }))
}

async fn create_shield_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(locale): Extension<Locale>,
    Json(form): Json<ShieldForm>,
) -> Result<Json<SaveShieldResponse>, AppError> {
    if form.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Shield name is required".to_string()));
    }
    save_shield(&app_state, &locale, form, None).await
}

async fn update_shield_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(locale): Extension<Locale>,
    Path(shield_id): Path<ShieldId>,
    Json(form): Json<ShieldForm>,
) -> Result<Json<SaveShieldResponse>, AppError> {
    if form.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Shield name is required".to_string()));
    }
    save_shield(&app_state, &locale, form, Some(shield_id)).await
}

/// The HTTP call is the confirmation; the page is loaded first so the
/// controller knows how many rows the current page holds.
async fn delete_shield_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(locale): Extension<Locale>,
    Path(shield_id): Path<ShieldId>,
    Query(params): Query<ListParams>,
) -> Result<Json<DeleteShieldResponse>, AppError> {
    let session = PageSession::open(&app_state, &locale, params).await;
    session.controller.refresh().await.map_err(|e| session.fail(e))?;

    let outcome = session
        .controller
        .delete_shield(shield_id, &AutoConfirm)
        .await
        .map_err(|e| session.fail(e))?;

    let (view, messages) = session.finish().await;
    Ok(Json(DeleteShieldResponse { outcome, view, messages }))
}

async fn update_status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(locale): Extension<Locale>,
    Path(shield_id): Path<ShieldId>,
    Query(params): Query<ListParams>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ToggleShieldResponse>, AppError> {
    let session = PageSession::open(&app_state, &locale, params).await;
    let outcome = session
        .controller
        .toggle_active(shield_id, payload.is_active)
        .await
        .map_err(|e| session.fail(e))?;

    let (view, messages) = session.finish().await;
    Ok(Json(ToggleShieldResponse { outcome, view, messages }))
}

// --- Router ---

pub fn create_shield_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_shields_handler).post(create_shield_handler))
        .route("/{shield_id}", put(update_shield_handler).delete(delete_shield_handler))
        .route("/{shield_id}/status", patch(update_status_handler))
}
