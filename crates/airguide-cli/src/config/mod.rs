//! Application configuration module.
//!
//! Manages the TOML config file holding the guide source, channel and
//! refresh policy.

#[allow(clippy::module_inception)]
mod config;
mod paths;

pub use config::AppConfig;
pub use paths::{resolve_config_path, resolve_log_path};
