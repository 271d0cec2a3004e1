/// Application settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, load_config, load_default_config};
