//! Server-side ingestion: upstream sources, per-metric buffers, and the
//! fixed-cadence aggregation scheduler.

pub mod buffer;
pub mod record;
pub mod scheduler;
pub mod source;

pub use buffer::{mean, IngestionBuffer};
pub use record::parse_line;
pub use scheduler::{spawn_aggregator, AggregateSink, Aggregator};
pub use source::{bind_intake, spawn_intake, spawn_simulated};
