use crate::error::ConfigError;
use crate::settings::Config;
use std::path::PathBuf;

/// Command-line flags shared by every subcommand that needs a configuration.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Overrides `logging.level` (still subordinate to RUST_LOG).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl ConfigArgs {
    /// Loads the configured file and applies the command-line overrides on top.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = crate::load_config(&self.config)?;
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}
