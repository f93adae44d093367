use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use mythicplus_core::config::{Settings, DEFAULT_FREQUENCY_MINUTES};
use tracing::warn;

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mythicplus", "mythicplus")
}

/// Directory holding the character store when `store.path` is unset
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn get_configuration_with_paths(
    current_dir_path: Option<PathBuf>,
    system_config_dir_path: Option<PathBuf>,
) -> Result<Settings, config::ConfigError> {
    let config_directory = current_dir_path.unwrap_or_else(|| {
        std::env::current_dir()
            .map(|p| p.join("config"))
            .unwrap_or_else(|_| PathBuf::from("config"))
    });

    let system_config_dir = system_config_dir_path.unwrap_or_else(|| {
        project_dirs()
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config"))
    });

    let settings = Config::builder()
        .set_default("blizzard.client_id", "")?
        .set_default("blizzard.client_secret", "")?
        .set_default("blizzard.region", "us")?
        .set_default("raiderio.access_key", "")?
        .set_default("raiderio.region", "us")?
        .set_default("discord.token", "")?
        .set_default("discord.channel_id", "")?
        .set_default("updater.frequency_minutes", DEFAULT_FREQUENCY_MINUTES as i64)?
        .set_default("updater.cooldown_ms", 250)?
        .set_default("log_level", "info")?
        .add_source(File::from(system_config_dir.join("config.toml")).required(false))
        .add_source(File::from(config_directory.join("config.toml")).required(false))
        .add_source(Environment::with_prefix("MYTHICPLUS").separator("__"))
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;

    // zero reads as unset
    if settings.updater.frequency_minutes == 0 {
        warn!(
            default = DEFAULT_FREQUENCY_MINUTES,
            "updater.frequency_minutes is 0, using the default"
        );
        settings.updater.frequency_minutes = DEFAULT_FREQUENCY_MINUTES;
    }

    Ok(settings)
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    get_configuration_with_paths(None, None)
}
