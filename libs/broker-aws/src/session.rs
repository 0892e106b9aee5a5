use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;

/// Credential and region settings for the broker's own session.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub region: String,
    pub profile: Option<String>,
    pub key_id: Option<String>,
    pub secret_key: Option<String>,
}

/// Resolve an SDK config from the settings: explicit static keys win,
/// then a named profile, then the default provider chain.
pub async fn resolve_session(settings: &SessionSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()));
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let (Some(key_id), Some(secret_key)) = (&settings.key_id, &settings.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret_key,
            None,
            None,
            "stackbroker-config",
        ));
    }
    loader.load().await
}
