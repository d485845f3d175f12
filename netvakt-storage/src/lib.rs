//! # netvakt-storage
//!
//! Persistence layer for enriched flows and the threat registry.
//!
//! ### Key Submodules:
//! - `store`: the `FlowStore` seam every backend implements
//! - `rest`: REST document-store client (PostgREST-style row filters)
//! - `registry`: idempotent create-or-increment threat registry logic

pub mod registry;
pub mod rest;
pub mod store;

pub use registry::ThreatRecorder;
pub use rest::RestStore;
pub use store::{FlowStore, StorageError};
