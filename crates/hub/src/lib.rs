//! Fan-out of aggregates to viewers, the viewer line protocol, and the relay
//! process that ties ingestion to it.

pub mod client;
pub mod fanout;
pub mod relay;
pub mod server;
pub mod wire;

pub use client::{RelayClient, RelayConnection};
pub use fanout::{Hub, Session, Subscription};
pub use relay::{run, Relay};
pub use server::{bind_viewers, spawn_server};
pub use wire::{encode_event, parse_command, parse_event, Command};
