//! # netvakt-core
//!
//! Foundation layer for the Netvakt capture pipeline: the flow data model,
//! the capture-line parser, and the shared pending-flow buffer.
//!
//! ### Key Submodules:
//! - `flow`: typed flow records and their enriched form
//! - `parser`: one capture-tool output line -> `FlowRecord`
//! - `buffer`: FIFO buffer with atomic batch detachment
//! - `threat`: threat registry entry model and severity mapping

pub mod buffer;
pub mod flow;
pub mod parser;
pub mod threat;

pub mod prelude {
    pub use crate::buffer::FlowBuffer;
    pub use crate::flow::{EnrichedFlowRecord, FlowRecord, GeoInfo, Protocol, ThreatVerdict};
    pub use crate::parser::{parse_line, ParseError};
    pub use crate::threat::{Severity, ThreatEntry};
}
