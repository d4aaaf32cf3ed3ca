#[macro_use]
extern crate rust_i18n;

// Load all translations from the locales directory
i18n!("locales", fallback = "en");

pub mod alarm;
pub mod integrations;
pub mod server;
pub mod web;
pub mod version;
