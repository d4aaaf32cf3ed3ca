use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::models::{
    AutoParams, AutoTableConfig, ColumnDescriptor, DefaultForm, FormItem, InstancePayload,
    IntegrationError, ManualParams, MonitoredObject, OneOrMany, PluginConfig, PluginMode,
    TableDataCallback,
};
use super::template::{replace_template, value_to_text};

pub const MONITOR_URL_FIELD: &str = "monitor_url";

// Keys of an instance payload that are set from the row or the plugin.
const INSTANCE_FIELDS: &[&str] = &["key", "url", "instance_name", "node_ids", "instance_type", "instance_id"];

/// A plugin's configuration bundle for one mode.
pub enum PluginBundle {
    Auto(AutoBundle),
    Edit(EditBundle),
    Manual(ManualBundle),
}

/// Serializable view of a bundle for the front end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDescriptor {
    pub mode: PluginMode,
    #[serde(flatten)]
    pub plugin: PluginConfig,
    pub form_items: Vec<FormItem>,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_table_items: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_form: Option<Map<String, Value>>,
}

impl PluginBundle {
    pub fn mode(&self) -> PluginMode {
        match self {
            PluginBundle::Auto(_) => PluginMode::Auto,
            PluginBundle::Edit(_) => PluginMode::Edit,
            PluginBundle::Manual(_) => PluginMode::Manual,
        }
    }

    pub fn plugin(&self) -> &PluginConfig {
        match self {
            PluginBundle::Auto(b) => &b.plugin,
            PluginBundle::Edit(b) => &b.plugin,
            PluginBundle::Manual(b) => &b.plugin,
        }
    }

    pub fn descriptor(&self) -> BundleDescriptor {
        let (form_items, columns, init_table_items, default_form) = match self {
            PluginBundle::Auto(b) => (
                Vec::new(),
                b.columns.clone(),
                Some(b.init_table_items.clone()),
                Some(b.default_form.clone()),
            ),
            PluginBundle::Edit(b) => (b.form_items.clone(), Vec::new(), None, None),
            PluginBundle::Manual(b) => (
                b.form_items.clone(),
                Vec::new(),
                None,
                Some(b.default_form.clone()),
            ),
        };
        BundleDescriptor {
            mode: self.mode(),
            plugin: self.plugin().clone(),
            form_items,
            columns,
            init_table_items,
            default_form,
        }
    }
}

/// Auto-discovery: no form, an editable table of instances instead.
pub struct AutoBundle {
    pub plugin: PluginConfig,
    pub columns: Vec<ColumnDescriptor>,
    pub init_table_items: Map<String, Value>,
    pub default_form: Map<String, Value>,
    pub(crate) data_source: Vec<MonitoredObject>,
    pub(crate) on_table_data_change: Option<TableDataCallback>,
}

impl AutoBundle {
    /// Edits the URL cell of row `index`; the instance name follows the URL.
    ///
    /// Works on a copy of the data source handed to the factory. The copy is
    /// passed to the change callback and returned; the bundle itself is not
    /// modified.
    pub fn update_url(&self, index: usize, value: &str) -> Result<Vec<MonitoredObject>, IntegrationError> {
        let mut rows = self.data_source.clone();
        let len = rows.len();
        let row = rows
            .get_mut(index)
            .ok_or(IntegrationError::RowOutOfRange { index, len })?;
        row.url = Some(value.to_string());
        row.instance_name = Some(value.to_string());

        if let Some(callback) = &self.on_table_data_change {
            callback(rows.clone());
        }
        Ok(rows)
    }

    /// Builds the create-instances request from the wizard form `row` and the table.
    pub fn get_params(&self, row: &Map<String, Value>, table: &AutoTableConfig) -> AutoParams {
        let mut config = Map::new();
        config.insert(
            "type".to_string(),
            Value::String(self.plugin.primary_config_type().to_string()),
        );
        config.extend(row.clone());

        let instances = table
            .data_source
            .iter()
            .cloned()
            .map(|mut item| {
                // Fixed fields win over whatever the row carried.
                for field in INSTANCE_FIELDS {
                    item.extra.remove(*field);
                }
                InstancePayload {
                    instance_id: item.url.clone(),
                    url: item.url,
                    instance_name: item.instance_name,
                    node_ids: item.node_ids.map(OneOrMany::into_vec).unwrap_or_default(),
                    instance_type: self.plugin.instance_type.to_string(),
                    extra: item.extra,
                }
            })
            .collect();

        AutoParams {
            configs: vec![config],
            collect_type: self.plugin.collect_type.to_string(),
            collector: self.plugin.collector.to_string(),
            instances,
        }
    }
}

/// Editing an existing instance: the URL is shown but locked.
pub struct EditBundle {
    pub plugin: PluginConfig,
    pub form_items: Vec<FormItem>,
}

impl EditBundle {
    /// Seeds the form from a stored instance (`child.content.config.url`).
    pub fn get_default_form(&self, record: &Value) -> DefaultForm {
        let monitor_url = record
            .pointer("/child/content/config/url")
            .map(value_to_text)
            .unwrap_or_default();
        DefaultForm { monitor_url }
    }

    pub fn get_params(&self, _row: &Value, config: Value) -> Value {
        config
    }
}

/// Manual entry: the user supplies the URL and copies the generated config text.
pub struct ManualBundle {
    pub plugin: PluginConfig,
    pub form_items: Vec<FormItem>,
    pub default_form: Map<String, Value>,
    pub(crate) config_template: &'static str,
}

impl ManualBundle {
    fn validate(&self, form: &Map<String, Value>) -> Result<(), IntegrationError> {
        self.form_items.iter().try_for_each(|item| item.validate(form))
    }

    fn monitor_url(form: &Map<String, Value>) -> String {
        form.get(MONITOR_URL_FIELD).map(value_to_text).unwrap_or_default()
    }

    pub fn get_params(&self, row: &Map<String, Value>) -> Result<ManualParams, IntegrationError> {
        self.validate(row)?;
        let instance_id = Self::monitor_url(row);
        Ok(ManualParams {
            instance_name: instance_id.clone(),
            instance_id,
        })
    }

    /// Renders the collector configuration for the submitted form.
    pub fn get_config_text(&self, form_data: &Map<String, Value>) -> Result<String, IntegrationError> {
        self.validate(form_data)?;

        let mut mapping = form_data.clone();
        mapping.insert("instance_id".to_string(), Value::String(Self::monitor_url(form_data)));
        mapping.insert(
            "instance_type".to_string(),
            Value::String(self.plugin.instance_type.to_string()),
        );
        mapping.insert(
            "collect_type".to_string(),
            Value::String(self.plugin.collect_type.to_string()),
        );
        mapping.insert(
            "config_type".to_string(),
            Value::String(self.plugin.primary_config_type().to_string()),
        );

        debug!(plugin = self.plugin.object_name, "Rendering collector config text.");
        Ok(replace_template(self.config_template, &mapping))
    }
}
