use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Console level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_console_level")]
    pub console_level: String,
    /// Optional log file, relative to the process working directory.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_file_level")]
    pub file_level: String,
    /// How many rotated files to keep.
    #[serde(default)]
    pub max_backups: Option<usize>,
    /// Rotate once the active file exceeds this size.
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: default_console_level(),
            file: None,
            file_level: default_file_level(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        }
    }
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

/// `-v` repetition wins over the configured console level.
fn effective_level(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

// ================= rotating writer for the file layer =================

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Install the global subscriber: a console layer, plus a rotating file
/// layer when a file is configured. `RUST_LOG` overrides the console
/// level when set.
pub fn init_logging(config: &LoggingConfig, base_dir: &Path, verbose: u8) {
    let console_level = effective_level(&config.console_level, verbose);
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_filter(console_filter);

    let file_layer = config.file.as_ref().map(|file| {
        let path = base_dir.join(file);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let suffix =
            AppendTimestamp::default(FileLimit::MaxFiles(config.max_backups.unwrap_or(3)));
        let limit =
            ContentLimit::Bytes((config.max_size_mb.unwrap_or(100) * 1024 * 1024) as usize);
        #[cfg(unix)]
        let rotate = FileRotate::new(path, suffix, limit, Compression::None, None);
        #[cfg(not(unix))]
        let rotate = FileRotate::new(path, suffix, limit, Compression::None);
        fmt::layer()
            .with_ansi(false)
            .with_writer(RotWriter(Arc::new(Mutex::new(rotate))))
            .with_filter(EnvFilter::new(config.file_level.clone()))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_beats_the_configured_level() {
        assert_eq!(effective_level("info", 0), "info");
        assert_eq!(effective_level("info", 1), "debug");
        assert_eq!(effective_level("warn", 3), "trace");
    }
}
