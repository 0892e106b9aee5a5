//! The broker aggregate.
//!
//! [`Broker::new`] performs the fail-fast bootstrap: resolve the account
//! identity, derive the tenant partition, run one synchronous catalog
//! pass, start the background poller. The aggregate's public methods are
//! the boundary the protocol adapter calls for catalog, provision,
//! deprovision, bind, unbind and last-operation requests.

mod broker;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod tenant;

pub use broker::Broker;
pub use config::{add_trailing_slash, BrokerConfig, BrokerOptions};
pub use error::BrokerError;
pub use lifecycle::OperationState;
pub use tenant::derive_tenant_uuid;
