use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{
    AlertShieldListItem, PatchShieldRequest, ShieldForm, ShieldId, ShieldPage, ShieldQuery,
};

const SHIELD_ENDPOINT: &str = "/alerts/api/shield/";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Request rejected by backend: {0}")]
    Rejected(String),
    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The alarm backend operations the shield list page depends on.
#[async_trait]
pub trait ShieldApi: Send + Sync {
    async fn list_shields(&self, query: &ShieldQuery) -> Result<ShieldPage, ApiError>;

    async fn create_shield(&self, form: &ShieldForm) -> Result<AlertShieldListItem, ApiError>;

    async fn update_shield(
        &self,
        id: ShieldId,
        form: &ShieldForm,
    ) -> Result<AlertShieldListItem, ApiError>;

    async fn delete_shield(&self, id: ShieldId) -> Result<(), ApiError>;

    /// Partial update. `Ok(None)` means the backend answered without a record,
    /// which the page treats as a failed operation.
    async fn patch_shield(
        &self,
        id: ShieldId,
        patch: &PatchShieldRequest,
    ) -> Result<Option<AlertShieldListItem>, ApiError>;
}

/// `ShieldApi` over the backend's REST endpoints.
///
/// Responses use the `{ "result": bool, "data": ..., "message": "..." }` envelope;
/// bodies without a `result` field are taken as the data itself.
#[derive(Clone)]
pub struct HttpShieldApi {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpShieldApi {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, SHIELD_ENDPOINT)
    }

    fn item_url(&self, id: ShieldId) -> String {
        format!("{}{}{}/", self.base_url, SHIELD_ENDPOINT, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn read_data(response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Shield backend returned non-success status.");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let mut payload: Value = serde_json::from_str(&body)?;
        let Some(result) = payload.get("result").and_then(Value::as_bool) else {
            return Ok(payload);
        };

        if !result {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(ApiError::Rejected(message));
        }

        Ok(payload
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl ShieldApi for HttpShieldApi {
    async fn list_shields(&self, query: &ShieldQuery) -> Result<ShieldPage, ApiError> {
        debug!(page = query.page, page_size = query.page_size, name = ?query.name, "Fetching shield list.");
        let response = self
            .request(Method::GET, &self.collection_url())
            .query(query)
            .send()
            .await?;
        Self::decode(Self::read_data(response).await?)
    }

    async fn create_shield(&self, form: &ShieldForm) -> Result<AlertShieldListItem, ApiError> {
        let response = self
            .request(Method::POST, &self.collection_url())
            .json(form)
            .send()
            .await?;
        Self::decode(Self::read_data(response).await?)
    }

    async fn update_shield(
        &self,
        id: ShieldId,
        form: &ShieldForm,
    ) -> Result<AlertShieldListItem, ApiError> {
        let response = self
            .request(Method::PUT, &self.item_url(id))
            .json(form)
            .send()
            .await?;
        Self::decode(Self::read_data(response).await?)
    }

    async fn delete_shield(&self, id: ShieldId) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, &self.item_url(id)).send().await?;
        Self::read_data(response).await?;
        Ok(())
    }

    async fn patch_shield(
        &self,
        id: ShieldId,
        patch: &PatchShieldRequest,
    ) -> Result<Option<AlertShieldListItem>, ApiError> {
        let response = self
            .request(Method::PATCH, &self.item_url(id))
            .json(patch)
            .send()
            .await?;
        match Self::read_data(response).await? {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            data => Self::decode(data).map(Some),
        }
    }
}
