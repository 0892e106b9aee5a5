use std::collections::HashMap;

/// Request parameter naming the role to assume in the target account.
pub const TARGET_ROLE_NAME_PARAM: &str = "target_role_name";
/// Request parameter selecting the target account; defaults to the
/// broker's own account when absent.
pub const TARGET_ACCOUNT_ID_PARAM: &str = "target_account_id";

/// Build the IAM role ARN used for cross-account provisioning.
///
/// Deterministic and side-effect free. A missing `target_role_name` yields
/// an ARN with an empty role segment; rejecting such requests is the
/// protocol adapter's job, not this builder's.
pub fn build_role_arn(params: &HashMap<String, String>, default_account_id: &str) -> String {
    let account = params
        .get(TARGET_ACCOUNT_ID_PARAM)
        .map(String::as_str)
        .unwrap_or(default_account_id);
    let role = params
        .get(TARGET_ROLE_NAME_PARAM)
        .map(String::as_str)
        .unwrap_or_default();
    format!("arn:aws:iam::{account}:role/{role}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_broker_account() {
        let mut params = HashMap::new();
        params.insert(TARGET_ROLE_NAME_PARAM.to_string(), "worker".to_string());
        assert_eq!(
            build_role_arn(&params, "123456654321"),
            "arn:aws:iam::123456654321:role/worker"
        );
    }

    #[test]
    fn target_account_overrides_default() {
        let mut params = HashMap::new();
        params.insert(TARGET_ROLE_NAME_PARAM.to_string(), "worker".to_string());
        params.insert(
            TARGET_ACCOUNT_ID_PARAM.to_string(),
            "000000000000".to_string(),
        );
        assert_eq!(
            build_role_arn(&params, "123456654321"),
            "arn:aws:iam::000000000000:role/worker"
        );
    }

    #[test]
    fn missing_role_name_leaves_the_segment_empty() {
        let params = HashMap::new();
        assert_eq!(
            build_role_arn(&params, "123456654321"),
            "arn:aws:iam::123456654321:role/"
        );
    }
}
