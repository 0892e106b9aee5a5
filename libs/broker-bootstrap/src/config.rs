use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// CLI arguments that flow into the layered config merge.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Main application configuration.
///
/// Layering order: defaults → YAML file → `BROKER__`-prefixed environment
/// variables → CLI overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Broker identity and credentials.
    pub broker: BrokerSettings,
    /// Template bucket coordinates.
    pub storage: StorageSettings,
    /// Catalog refresh behavior.
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// Logging configuration (optional, defaults apply when absent).
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerSettings {
    pub broker_id: String,
    pub region: String,
    #[serde(default)]
    pub key_id: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    pub table_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_template_filter")]
    pub template_filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSettings {
    /// Interval between background refresh cycles, humantime-encoded
    /// (e.g. `600s`, `10m`).
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

fn default_template_filter() -> String {
    "/metadata".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(600)
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            broker_id: "stackbroker".to_string(),
            region: "us-east-1".to_string(),
            key_id: None,
            secret_key: None,
            profile: None,
            table_name: "stackbroker-state".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            // No sensible default exists for the bucket; validate() rejects
            // an empty one before the broker starts.
            bucket: String::new(),
            region: "us-east-1".to_string(),
            key_prefix: String::new(),
            template_filter: default_template_filter(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            broker: BrokerSettings::default(),
            storage: StorageSettings::default(),
            catalog: CatalogSettings::default(),
            logging: Some(LoggingConfig::default()),
        }
    }
}

impl AppConfig {
    /// Layered loading: defaults → YAML file → environment (`BROKER__*`,
    /// sections separated by `__`).
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::providers::{Env, Format, Serialized, Yaml};
        use figment::Figment;

        let figment = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed("BROKER__").split("__"));

        let config: AppConfig = figment
            .extract()
            .with_context(|| format!("failed to load config from {}", config_path.as_ref().display()))?;
        Ok(config)
    }

    /// Load from the given file, or fall back to defaults + environment
    /// when no path is provided.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                use figment::providers::{Env, Serialized};
                use figment::Figment;

                let config: AppConfig = Figment::new()
                    .merge(Serialized::defaults(AppConfig::default()))
                    .merge(Env::prefixed("BROKER__").split("__"))
                    .extract()
                    .context("failed to load config from defaults and environment")?;
                Ok(config)
            }
        }
    }

    /// Fold CLI flags into the loaded configuration.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if args.verbose > 0 {
            let level = if args.verbose == 1 { "debug" } else { "trace" };
            self.logging
                .get_or_insert_with(LoggingConfig::default)
                .console_level = level.to_string();
        }
    }

    /// Reject configurations the broker cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.is_empty() {
            bail!("storage.bucket must be set");
        }
        if self.broker.broker_id.is_empty() {
            bail!("broker.broker_id must be set");
        }
        if self.broker.table_name.is_empty() {
            bail!("broker.table_name must be set");
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = AppConfig::default();
        assert_eq!(config.broker.broker_id, "stackbroker");
        assert_eq!(config.storage.template_filter, "/metadata");
        assert_eq!(config.catalog.poll_interval, Duration::from_secs(600));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "broker:\n  broker_id: prod-broker\n  region: eu-west-1\n  table_name: prod-state\n\
             storage:\n  bucket: prod-templates\n  region: eu-west-1\n  key_prefix: templates\n\
             catalog:\n  poll_interval: 90s\n"
        )
        .unwrap();

        let config = AppConfig::load_layered(file.path()).unwrap();
        assert_eq!(config.broker.broker_id, "prod-broker");
        assert_eq!(config.storage.bucket, "prod-templates");
        assert_eq!(config.storage.key_prefix, "templates");
        assert_eq!(config.catalog.poll_interval, Duration::from_secs(90));
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "broker:\n  broker_id: b\n  region: r\n  table_name: t\n  surprise: true\n\
             storage:\n  bucket: b\n  region: r\n"
        )
        .unwrap();
        assert!(AppConfig::load_layered(file.path()).is_err());
    }

    #[test]
    fn validate_rejects_an_empty_bucket() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn verbosity_overrides_the_console_level() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&CliArgs {
            verbose: 2,
            ..CliArgs::default()
        });
        assert_eq!(config.logging.unwrap().console_level, "trace");
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.broker.broker_id, config.broker.broker_id);
        assert_eq!(parsed.catalog.poll_interval, config.catalog.poll_interval);
    }
}
