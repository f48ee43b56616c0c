//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsargs/rsargs.toml`
//! 3. Explicit config file passed by the host program
//! 4. Environment variables: `RSARGS_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::CommandLineError;

/// Settings a host program applies to its command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Program name shown in usage text (default: executable name)
    pub program_name: Option<String>,
    /// Trace tokens on every invocation, as if `--command-line-debug` were given
    pub debug: bool,
    /// Log verbosity: 0 warn, 1 info, 2 debug, 3 trace
    pub verbosity: u8,
}

/// Get the XDG config directory for rsargs.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsargs").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsargs.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, CommandLineError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("debug", defaults.debug)
            .map_err(config_err)?
            .set_default("verbosity", u64::from(defaults.verbosity))
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("RSARGS").try_parsing(true));

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, CommandLineError> {
        toml::to_string_pretty(self).map_err(|e| CommandLineError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rsargs configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rsargs/rsargs.toml
#   File:   explicit path given by the host program
#   Env:    RSARGS_* environment variables (explicit overrides)

# Program name shown in usage text (default: executable name)
# program_name = "mytool"

# Trace tokens on every invocation
# debug = false

# Log verbosity: 0 warn, 1 info, 2 debug, 3 trace
# verbosity = 0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> CommandLineError {
    CommandLineError::Config {
        message: e.to_string(),
    }
}
