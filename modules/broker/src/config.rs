use std::time::Duration;

/// Construction options, as handed over by the configuration layer.
#[derive(Debug, Clone, Default)]
pub struct BrokerOptions {
    pub key_id: Option<String>,
    pub secret_key: Option<String>,
    pub profile: Option<String>,
    pub region: String,
    pub broker_id: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_key: String,
    pub table_name: String,
    pub template_filter: String,
    pub poll_interval: Duration,
}

/// Immutable broker configuration, captured once at construction.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub key_id: Option<String>,
    pub secret_key: Option<String>,
    pub profile: Option<String>,
    pub region: String,
    pub broker_id: String,
    pub s3_bucket: String,
    pub s3_region: String,
    /// Always ends with `/`.
    pub s3_key: String,
    pub table_name: String,
    pub template_filter: String,
    pub poll_interval: Duration,
}

impl BrokerConfig {
    pub fn from_options(options: BrokerOptions) -> Self {
        Self {
            key_id: options.key_id,
            secret_key: options.secret_key,
            profile: options.profile,
            region: options.region,
            broker_id: options.broker_id,
            s3_bucket: options.s3_bucket,
            s3_region: options.s3_region,
            s3_key: add_trailing_slash(&options.s3_key),
            table_name: options.table_name,
            template_filter: options.template_filter,
            poll_interval: options.poll_interval,
        }
    }
}

/// Normalize a key prefix to end with the path separator.
pub fn add_trailing_slash(prefix: &str) -> String {
    if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}
