use uuid::Uuid;

/// Deterministic per-account, per-broker partition identifier.
///
/// UUIDv5 over the nil namespace of `accountid + brokerid`: identical
/// inputs always derive the identical tenant, so persisted records land in
/// the same partition across restarts without a separate allocation step.
pub fn derive_tenant_uuid(account_id: &str, broker_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::nil(), format!("{account_id}{broker_id}").as_bytes())
}
