//! Adapters for remote systems.
//!
//! - `collector`: pushes reports to the remote collector service
//! - `connectivity`: decides whether the collector is reachable

pub mod collector;
pub mod connectivity;

pub use collector::{Collector, CollectorError, HttpCollector};
pub use connectivity::{Connectivity, HttpProbe, StaticConnectivity};
