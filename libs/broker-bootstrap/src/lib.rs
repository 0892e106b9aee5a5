//! Process bootstrap: layered configuration loading, logging
//! initialization and shutdown signal handling for the broker server.

pub mod config;
pub mod logging;
pub mod signals;

pub use config::{AppConfig, BrokerSettings, CatalogSettings, CliArgs, StorageSettings};
pub use logging::{init_logging, LoggingConfig};
pub use signals::wait_for_shutdown;
