//! Todoist HTTP implementation of [`tdc_core::RemoteService`].

mod client;

pub use client::{TodoistClient, DEFAULT_BASE_URL};
