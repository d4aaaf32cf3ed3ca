use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::integrations::activemq::get_plugin_cfg;
use crate::integrations::{
    AutoBundle, AutoParams, AutoTableConfig, BundleDescriptor, DefaultForm, EditBundle,
    ManualBundle, ManualParams, MonitoredObject, PluginBundle, PluginCfgRequest, PluginMode,
};
use crate::web::middleware::i18n::Locale;
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoParamsRequest {
    #[serde(default)]
    row: Map<String, Value>,
    #[serde(default)]
    data_source: Vec<MonitoredObject>,
}

#[derive(Deserialize)]
pub struct EditParamsRequest {
    #[serde(default)]
    row: Value,
    #[serde(default)]
    config: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUrlRequest {
    #[serde(default)]
    data_source: Vec<MonitoredObject>,
    index: usize,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUrlResponse {
    data_source: Vec<MonitoredObject>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTextResponse {
    config_text: String,
}

// --- Bundle Lookup ---

fn auto_bundle(locale: &Locale, data_source: Vec<MonitoredObject>) -> Result<AutoBundle, AppError> {
    let request = PluginCfgRequest::new(PluginMode::Auto, locale.as_str())
        .with_data_source(data_source)
        .on_table_data_change(Arc::new(|rows: Vec<MonitoredObject>| {
            debug!(rows = rows.len(), "ActiveMQ table data changed.");
        }));
    match get_plugin_cfg(request) {
        PluginBundle::Auto(bundle) => Ok(bundle),
        other => Err(AppError::InternalServerError(format!("Unexpected bundle mode: {}", other.mode()))),
    }
}

fn manual_bundle(locale: &Locale) -> Result<ManualBundle, AppError> {
    match get_plugin_cfg(PluginCfgRequest::new(PluginMode::Manual, locale.as_str())) {
        PluginBundle::Manual(bundle) => Ok(bundle),
        other => Err(AppError::InternalServerError(format!("Unexpected bundle mode: {}", other.mode()))),
    }
}

fn edit_bundle(locale: &Locale) -> Result<EditBundle, AppError> {
    match get_plugin_cfg(PluginCfgRequest::new(PluginMode::Edit, locale.as_str())) {
        PluginBundle::Edit(bundle) => Ok(bundle),
        other => Err(AppError::InternalServerError(format!("Unexpected bundle mode: {}", other.mode()))),
    }
}

// --- Route Handlers ---

async fn describe_handler(
    Extension(locale): Extension<Locale>,
    Path(mode): Path<String>,
) -> Result<Json<BundleDescriptor>, AppError> {
    let mode: PluginMode = mode.parse()?;
    let bundle = get_plugin_cfg(PluginCfgRequest::new(mode, locale.as_str()));
    Ok(Json(bundle.descriptor()))
}

async fn auto_params_handler(
    Extension(locale): Extension<Locale>,
    Json(payload): Json<AutoParamsRequest>,
) -> Result<Json<AutoParams>, AppError> {
    let bundle = auto_bundle(&locale, Vec::new())?;
    let table = AutoTableConfig { data_source: payload.data_source };
    Ok(Json(bundle.get_params(&payload.row, &table)))
}

async fn auto_url_handler(
    Extension(locale): Extension<Locale>,
    Json(payload): Json<UpdateUrlRequest>,
) -> Result<Json<UpdateUrlResponse>, AppError> {
    let bundle = auto_bundle(&locale, payload.data_source)?;
    let data_source = bundle.update_url(payload.index, &payload.value)?;
    Ok(Json(UpdateUrlResponse { data_source }))
}

async fn manual_params_handler(
    Extension(locale): Extension<Locale>,
    Json(form): Json<Map<String, Value>>,
) -> Result<Json<ManualParams>, AppError> {
    Ok(Json(manual_bundle(&locale)?.get_params(&form)?))
}

async fn manual_config_text_handler(
    Extension(locale): Extension<Locale>,
    Json(form): Json<Map<String, Value>>,
) -> Result<Json<ConfigTextResponse>, AppError> {
    let config_text = manual_bundle(&locale)?.get_config_text(&form)?;
    Ok(Json(ConfigTextResponse { config_text }))
}

async fn edit_default_form_handler(
    Extension(locale): Extension<Locale>,
    Json(record): Json<Value>,
) -> Result<Json<DefaultForm>, AppError> {
    Ok(Json(edit_bundle(&locale)?.get_default_form(&record)))
}

async fn edit_params_handler(
    Extension(locale): Extension<Locale>,
    Json(payload): Json<EditParamsRequest>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(edit_bundle(&locale)?.get_params(&payload.row, payload.config)))
}

// --- Router ---

pub fn create_integration_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/activemq/{mode}", get(describe_handler))
        .route("/activemq/auto/params", post(auto_params_handler))
        .route("/activemq/auto/url", post(auto_url_handler))
        .route("/activemq/manual/params", post(manual_params_handler))
        .route("/activemq/manual/config-text", post(manual_config_text_handler))
        .route("/activemq/edit/params", post(edit_params_handler))
        .route("/activemq/edit/default-form", post(edit_default_form_handler))
}
