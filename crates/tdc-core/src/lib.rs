//! Task resolution and filtering engine for the `tdc` Todoist client.

pub mod config;
pub mod due;
pub mod hierarchy;
pub mod matcher;
pub mod model;
pub mod ops;
pub mod remote;
pub mod resolve;
pub mod sanitize;
pub mod views;

pub use hierarchy::Snapshot;
pub use matcher::{EntityKind, ResolveError};
pub use remote::{RemoteError, RemoteService};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
