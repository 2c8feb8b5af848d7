pub mod error;
pub mod event;
pub mod sample;
pub mod state;

pub use error::{PulseError, Result};
pub use event::{AggregateEvent, Message, Metric, Reading};
pub use sample::{validate, RawSample, Rejected};
pub use state::{AppState, RollingWindow, DEFAULT_CAPACITY};
