//! Process mining: derives a labeled transition system from an event log and
//! synthesizes a Petri net from it via the theory of regions.
//!
//! The pipeline runs `F` (builder) -> `G` (condenser) -> `H` (rebuilder) ->
//! `I` (single-accepting-state conversion) -> `J` (self-loop elimination) ->
//! `M` (region synthesis), with `dot` attaching as a peripheral output stage
//! at any point along the way. Every stage is single-threaded; long-running
//! stages accept a [`progress::ProgressCallback`] for cooperative
//! cancellation.

pub mod attr;
pub mod dot;
pub mod error;
pub mod eventlog;
pub mod intern;
pub mod parikh;
pub mod pn;
pub mod progress;
pub mod state_id;
pub mod ts;

pub use attr::AttributeValue;
pub use error::{Error, Result};
