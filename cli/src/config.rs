/**
 * @file config.rs
 * @date 19/10/2026
 * @brief Configuration handling for the command line front end.
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where circuit boxes are saved to and loaded from.
    pub data_dir: String,
    /// Filter for the logger when `RUST_LOG` is not set.
    pub log_level: String,
    pub prompt: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: String::from("./circuits"),
            log_level: String::from("info"),
            prompt: String::from("> "),
        }
    }
}

/// Values given on the command line, they win over the file.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub data_dir: Option<&'a str>,
    pub log_level: Option<&'a str>,
}

impl CliConfig {
    pub fn parse(path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&CliConfig::default())?)
            .add_source(config::File::with_name(path).required(false))
            .set_override_option("data_dir", overrides.data_dir)?
            .set_override_option("log_level", overrides.log_level)?
            .build()?
            .try_deserialize()
    }
}
