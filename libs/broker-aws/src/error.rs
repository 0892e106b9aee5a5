use thiserror::Error;

/// Object-storage failures, classified so callers can tell bucket-access
/// problems apart from everything else without string matching.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    NoSuchBucket(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    Service(String),
}

impl StorageError {
    /// True when the bucket itself is unreachable: missing or unauthorized.
    pub fn is_bucket_access(&self) -> bool {
        matches!(self, Self::NoSuchBucket(_) | Self::AccessDenied(_))
    }
}

/// Identity resolution failed. Fatal at broker construction.
#[derive(Debug, Error)]
#[error("identity resolution failed: {message}")]
pub struct IdentityError {
    pub message: String,
}

impl IdentityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures of stack orchestration, parameter resolution and role
/// assumption.
#[derive(Debug, Error)]
pub enum AwsError {
    #[error("assuming role {role_arn} failed: {message}")]
    AssumeRole { role_arn: String, message: String },

    #[error("parameter {name} not found")]
    ParameterNotFound { name: String },

    #[error("stack {stack_id} not found")]
    StackNotFound { stack_id: String },

    #[error("{0}")]
    Service(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_access_classification() {
        assert!(StorageError::NoSuchBucket("gone".into()).is_bucket_access());
        assert!(StorageError::AccessDenied("nope".into()).is_bucket_access());
        assert!(!StorageError::Service("throttled".into()).is_bucket_access());
    }

    #[test]
    fn storage_errors_display_the_native_message() {
        let err = StorageError::NoSuchBucket("NoSuchBucket: The specified bucket does not exist".into());
        assert_eq!(
            err.to_string(),
            "NoSuchBucket: The specified bucket does not exist"
        );
    }
}
