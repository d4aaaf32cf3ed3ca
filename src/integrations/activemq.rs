//! ActiveMQ collected through Telegraf.

use serde_json::{Map, Value};

use super::bundle::{AutoBundle, EditBundle, MONITOR_URL_FIELD, ManualBundle, PluginBundle};
use super::models::{
    ColumnDescriptor, FormItem, FormRule, PluginCfgRequest, PluginConfig, PluginMode, Widget,
};

const CONFIG_TYPES: &[&str] = &["activemq"];

pub const CONFIG_TEMPLATE: &str = r#"[[inputs.$config_type]]
    urls = ["$monitor_url"]
    interval = "$intervals"
    tags = { "instance_id"="$instance_id", "instance_type"="$instance_type", "collect_type"="$collect_type" }"#;

pub fn plugin_config() -> PluginConfig {
    PluginConfig {
        collect_type: "middleware",
        config_type: CONFIG_TYPES,
        collector: "Telegraf",
        instance_type: "activemq",
        object_name: "ActiveMQ",
    }
}

fn url_form_item(mode: PluginMode, locale: &str) -> FormItem {
    FormItem {
        name: MONITOR_URL_FIELD.to_string(),
        label: t!("monitor.intergrations.url", locale = locale).to_string(),
        widget: Widget::Input,
        required: true,
        disabled: mode == PluginMode::Edit,
        width: 300,
        help_text: Some(t!("monitor.intergrations.urlDes", locale = locale).to_string()),
        rules: vec![FormRule {
            required: true,
            message: t!("common.required", locale = locale).to_string(),
        }],
    }
}

fn url_column(locale: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        title: t!("monitor.intergrations.url", locale = locale).to_string(),
        data_index: "url".to_string(),
        key: "url".to_string(),
        width: 200,
        editor: Some(Widget::Input),
    }
}

/// Builds the ActiveMQ configuration bundle for the requested mode.
pub fn get_plugin_cfg(request: PluginCfgRequest) -> PluginBundle {
    let locale = request.locale.as_str();
    let plugin = plugin_config();

    match request.mode {
        PluginMode::Auto => {
            let mut init_table_items = Map::new();
            init_table_items.insert("url".to_string(), Value::Null);
            PluginBundle::Auto(AutoBundle {
                plugin,
                columns: vec![url_column(locale)],
                init_table_items,
                default_form: Map::new(),
                data_source: request.data_source,
                on_table_data_change: request.on_table_data_change,
            })
        }
        PluginMode::Edit => PluginBundle::Edit(EditBundle {
            plugin,
            form_items: vec![url_form_item(PluginMode::Edit, locale)],
        }),
        PluginMode::Manual => PluginBundle::Manual(ManualBundle {
            plugin,
            form_items: vec![url_form_item(PluginMode::Manual, locale)],
            default_form: Map::new(),
            config_template: CONFIG_TEMPLATE,
        }),
    }
}
