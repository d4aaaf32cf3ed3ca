use axum::{
    body::Body as AxumBody, extract::State, http::{header, Request}, middleware::Next, response::Response
};
use std::sync::Arc;

use crate::web::AppState;

pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];

/// Locale resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Maps a language tag onto a supported locale: exact match first
/// (case-insensitive), then by primary language (`zh-TW` -> `zh-CN`).
pub fn match_locale(tag: &str) -> Option<&'static str> {
    let tag = tag.split(';').next().unwrap_or_default().trim();
    if tag.is_empty() || tag == "*" {
        return None;
    }
    if let Some(exact) = SUPPORTED_LOCALES.iter().copied().find(|l| l.eq_ignore_ascii_case(tag)) {
        return Some(exact);
    }
    let primary = tag.split(['-', '_']).next().unwrap_or_default();
    SUPPORTED_LOCALES
        .iter()
        .find(|l| l.split('-').next().is_some_and(|p| p.eq_ignore_ascii_case(primary)))
        .copied()
}

pub fn resolve_locale(accept_language: Option<&str>, default_locale: &str) -> String {
    accept_language
        .and_then(|s| s.split(',').next())
        .and_then(match_locale)
        .map(str::to_string)
        .unwrap_or_else(|| default_locale.to_string())
}

pub async fn i18n_middleware(
    State(app_state): State<Arc<AppState>>,
    mut req: Request<AxumBody>,
    next: Next,
) -> Response {
    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let locale = resolve_locale(accept_language, &app_state.config.default_locale);

    req.extensions_mut().insert(Locale(locale));
    next.run(req).await
}
