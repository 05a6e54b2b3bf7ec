// src/core/mod.rs
//! Configuration and the shared HTTP client.

pub mod config_manager;
pub mod service_client;

pub use config_manager::ConfigManager;
pub use service_client::ServiceClient;
