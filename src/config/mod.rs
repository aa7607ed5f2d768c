pub mod app_config;
pub mod error;
pub mod probe_config;
pub mod settings;

pub use app_config::{load_config, setup_resolver};
pub use error::ConfigError;
pub use settings::{Settings, SinkSettings};
