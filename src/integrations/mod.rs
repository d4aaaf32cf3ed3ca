pub mod activemq;
pub mod bundle;
pub mod models;
pub mod template;

pub use bundle::{AutoBundle, BundleDescriptor, EditBundle, ManualBundle, PluginBundle};
pub use models::{
    AutoParams, AutoTableConfig, DefaultForm, IntegrationError, ManualParams, MonitoredObject,
    PluginCfgRequest, PluginConfig, PluginMode,
};
