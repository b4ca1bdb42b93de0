use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;
pub mod sweep_config;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{Config, DataSettings, LogFormat, LoggingSettings, ModelSettings, RunSettings};
pub use sweep_config::{SweepConfig, WindowRange};

/// Prefix for environment overrides, e.g. `BUBBLE__RUN__FORCE_HOST=true`.
const ENV_PREFIX: &str = "BUBBLE";

/// Loads the application configuration from the `config.toml` file.
///
/// Values from `BUBBLE__<SECTION>__<KEY>` environment variables override the file.
/// The result is validated before it is returned.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`] but reads an explicit file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()?;

    finish(builder)
}

/// Parses configuration from TOML text, without environment overrides.
pub fn load_config_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [model]
        omega = 6.28
        m_coeff = 0.38
        t_crit = 21.0

        [data]
        root = "ProgramData"

        [sweep]
        category = "Stocks"
        selections = ["TSLA", "AAPL"]
        windows = [52, 104]
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load_config_str(MINIMAL).unwrap();
        assert!(!config.run.force_host);
        assert!(config.run.retry_on_host);
        assert_eq!(config.run.task_workers, 2);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Full);
        assert_eq!(config.sweep.windows.expand().unwrap(), vec![52, 104]);
    }

    #[test]
    fn linear_windows_deserialize() {
        let toml = MINIMAL.replace("windows = [52, 104]", "windows = { start = 50, end = 60, step = 5 }");
        let config = load_config_str(&toml).unwrap();
        assert_eq!(config.sweep.windows, WindowRange::Linear { start: 50, end: 60, step: 5 });
    }

    #[test]
    fn run_section_builds_context() {
        let toml = format!("{}\n[run]\nforce_host = true\nthreads = 3\nheadless = false\n", MINIMAL);
        let config = load_config_str(&toml).unwrap();
        let context = config.run.to_context();
        assert!(context.force_host);
        assert_eq!(context.threads, 3);
        assert!(!context.headless);
        assert!(!context.is_stopped());
    }

    #[test]
    fn invalid_model_is_rejected() {
        let toml = MINIMAL.replace("m_coeff = 0.38", "m_coeff = 1.5");
        assert!(matches!(load_config_str(&toml), Err(ConfigError::Model(_))));
    }

    #[test]
    fn tiny_window_is_rejected() {
        let toml = MINIMAL.replace("windows = [52, 104]", "windows = [2]");
        assert!(load_config_str(&toml).is_err());
    }

    #[test]
    fn empty_selection_list_is_rejected() {
        let toml = MINIMAL.replace(r#"selections = ["TSLA", "AAPL"]"#, "selections = []");
        assert!(matches!(load_config_str(&toml), Err(ConfigError::ValidationError(_))));
    }
}
