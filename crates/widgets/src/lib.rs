pub mod graph;
pub mod plot;
pub mod readout;

pub use graph::GraphWidget;
pub use plot::Plot;
pub use readout::{format_readout, header_text};
