//! Infrastructure implementations for the Lucid reconciliation core.
//!
//! Concrete backends for the collaborator traits defined in `lucid-core`:
//! the JSON file key/value store, the durable local store and outbox, the
//! identity boundary, the HTTP remote transport and fail-closed gateway,
//! the cached reachability probe, and configuration/path resolution.

pub mod config_service;
pub mod connectivity;
pub mod http_remote;
pub mod identity_boundary;
pub mod json_file_store;
pub mod local_store;
pub mod memory_store;
pub mod outbox;
pub mod paths;
pub mod remote_gateway;

pub use config_service::ConfigService;
pub use connectivity::CachedNetworkProbe;
pub use http_remote::HttpRemoteApi;
pub use identity_boundary::IdentityBoundary;
pub use json_file_store::JsonFileStore;
pub use local_store::{RecordStore, SingletonStore, clear_all};
pub use memory_store::MemoryKeyValueStore;
pub use outbox::Outbox;
pub use remote_gateway::RemoteGateway;
