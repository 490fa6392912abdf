#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{Message, MessageLog, MessageRole};
pub use ports::{ChatGateway, GatewayError};
pub use settings::{
    DEFAULT_BACKEND_BASE_URL, DEFAULT_CHAT_ENDPOINT, DEFAULT_GATEWAY_TIMEOUT_SECS,
    DEFAULT_PROXY_PORT, Settings, SettingsError, validate_settings,
};
