//! # netvakt-engine
//!
//! Pipeline runtime: batch scheduling, the enrich-and-persist flush path,
//! and the wiring that connects capture, enrichment, and storage.

pub mod error;
pub mod flush;
pub mod runtime;
pub mod scheduler;

pub use error::PipelineError;
pub use flush::Flusher;
pub use runtime::PipelineRuntime;
pub use scheduler::{BatchScheduler, FlushPermit};
