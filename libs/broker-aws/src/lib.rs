//! AWS-facing capability ports and their SDK adapters.
//!
//! Each backing service the broker talks to is reachable only through a
//! small trait: object storage ([`ObjectStore`]), the identity service
//! ([`IdentityResolver`]), stack orchestration ([`StackOps`]) and the
//! parameter store ([`ParamStore`]). [`ClientFactory`] is the one place
//! that maps those ports to concrete clients, including clients bound to
//! assumed cross-account credentials.

pub mod arn;
pub mod error;
pub mod factory;
pub mod identity;
pub mod object_store;
pub mod params;
pub mod session;
pub mod stack_ops;

pub use arn::build_role_arn;
pub use error::{AwsError, IdentityError, StorageError};
pub use factory::{AwsClientFactory, ClientFactory};
pub use identity::{IdentityResolver, StsIdentityResolver};
pub use object_store::{FetchedObject, ObjectStore, ObjectSummary, S3ObjectStore};
pub use params::{ParamStore, SsmParamStore};
pub use session::{resolve_session, SessionSettings};
pub use stack_ops::{CfnStackOps, StackOps};
