use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntegrationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Row {index} is out of range for a table of {len} rows")]
    RowOutOfRange { index: usize, len: usize },
    #[error("Invalid mode: {0}")]
    InvalidMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginMode {
    Manual,
    Auto,
    Edit,
}

impl FromStr for PluginMode {
    type Err = IntegrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(PluginMode::Manual),
            "auto" => Ok(PluginMode::Auto),
            "edit" => Ok(PluginMode::Edit),
            other => Err(IntegrationError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for PluginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginMode::Manual => "manual",
            PluginMode::Auto => "auto",
            PluginMode::Edit => "edit",
        };
        f.write_str(name)
    }
}

/// Fixed facts about one collector plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginConfig {
    pub collect_type: &'static str,
    pub config_type: &'static [&'static str],
    pub collector: &'static str,
    pub instance_type: &'static str,
    pub object_name: &'static str,
}

impl PluginConfig {
    /// The primary config type, used as the Telegraf input name.
    pub fn primary_config_type(&self) -> &'static str {
        self.config_type.first().copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

/// A row of the auto-discovery table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoredObject {
    // Table-internal row key, never sent to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ids: Option<OneOrMany<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type TableDataCallback = Arc<dyn Fn(Vec<MonitoredObject>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRule {
    pub required: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItem {
    pub name: String,
    pub label: String,
    pub widget: Widget,
    pub required: bool,
    pub disabled: bool,
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub rules: Vec<FormRule>,
}

impl FormItem {
    /// Checks the required rule against submitted form values.
    /// Blank strings and `null` count as missing.
    pub fn validate(&self, form: &Map<String, Value>) -> Result<(), IntegrationError> {
        if !self.required {
            return Ok(());
        }
        let present = match form.get(&self.name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if present {
            Ok(())
        } else {
            Err(IntegrationError::MissingField(self.name.clone()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub title: String,
    pub data_index: String,
    pub key: String,
    pub width: u32,
    pub editor: Option<Widget>,
}

/// What a configuration wizard passes in when asking for a plugin bundle.
#[derive(Clone)]
pub struct PluginCfgRequest {
    pub mode: PluginMode,
    pub data_source: Vec<MonitoredObject>,
    pub on_table_data_change: Option<TableDataCallback>,
    pub locale: String,
}

impl PluginCfgRequest {
    pub fn new(mode: PluginMode, locale: impl Into<String>) -> Self {
        Self {
            mode,
            data_source: Vec::new(),
            on_table_data_change: None,
            locale: locale.into(),
        }
    }

    pub fn with_data_source(mut self, data_source: Vec<MonitoredObject>) -> Self {
        self.data_source = data_source;
        self
    }

    pub fn on_table_data_change(mut self, callback: TableDataCallback) -> Self {
        self.on_table_data_change = Some(callback);
        self
    }
}

/// Second argument of the auto-mode `get_params`: the wizard's table state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTableConfig {
    #[serde(default)]
    pub data_source: Vec<MonitoredObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstancePayload {
    pub url: Option<String>,
    pub instance_name: Option<String>,
    pub node_ids: Vec<String>,
    pub instance_type: String,
    pub instance_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoParams {
    pub configs: Vec<Map<String, Value>>,
    pub collect_type: String,
    pub collector: String,
    pub instances: Vec<InstancePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualParams {
    pub instance_id: String,
    pub instance_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultForm {
    pub monitor_url: String,
}
