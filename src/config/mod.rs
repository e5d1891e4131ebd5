// Configuration management module
// Loads the TOML settings file once at startup; every gateway receives it by reference

pub mod settings;
pub mod show;


pub use settings::{
    CaptureConfig, CollectionConfig, Config, ConfigError, CorpusConfig, ModelsConfig,
    RetrievalConfig, ServicesConfig,
};
pub use show::show_config;

/// Get the default configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::default_config_dir()
}
