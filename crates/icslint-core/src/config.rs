use config::Config;
use serde::Deserialize;

use crate::error::CoreResult;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub gating: GatingConfig,
    pub logging: LoggingConfig,
    pub runner: RunnerConfig,
}

/// Controls which finding severities fail the run.
#[derive(Debug, Clone, Deserialize)]
pub struct GatingConfig {
    pub fail_on_errors: bool,
    pub fail_on_warnings: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of documents validated concurrently.
    pub max_in_flight: usize,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional `icslint.toml` file,
    /// and environment variables (prefix `ICSLINT`, section separator
    /// `__`, e.g. `ICSLINT_GATING__FAIL_ON_WARNINGS=true`). Environment
    /// variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> CoreResult<Self> {
        Ok(Config::builder()
            .set_default("gating.fail_on_errors", true)?
            .set_default("gating.fail_on_warnings", false)?
            .set_default("logging.level", "info")?
            .set_default("runner.max_in_flight", 4)?
            // TOML file
            .add_source(config::File::with_name("icslint.toml").required(false))
            // Environment
            .add_source(
                config::Environment::with_prefix("ICSLINT")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> CoreResult<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
