//! Persistence port for broker state and its adapters.
//!
//! Everything the broker persists — service definitions, instances,
//! bindings, broker-level parameters — goes through [`DataStorePort`].
//! Records are scoped to one tenant partition; the partition id is the
//! deterministic tenant UUID the broker derives at construction time.

pub mod dynamo;
pub mod error;
pub mod memory;
pub mod port;

pub use dynamo::DynamoDataStore;
pub use error::StoreError;
pub use memory::MemoryDataStore;
pub use port::DataStorePort;
