//! # netvakt-capture
//!
//! Lifecycle management for the external capture process: spawn, stream
//! consumption, crash detection, restart with backoff.
//!
//! ### Key Submodules:
//! - `lines`: chunk-boundary-safe line assembly
//! - `supervisor`: the capture process state machine

pub mod lines;
pub mod supervisor;

pub use lines::LineAssembler;
pub use supervisor::{tshark_args, CaptureError, CaptureSupervisor};
