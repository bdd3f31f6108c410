//! Client for the MOTU AVB datastore HTTP API.
//!
//! The device exposes its entire state as a key-value datastore over HTTP.
//! This crate mirrors that datastore locally by long-polling
//! `GET /datastore` with conditional-GET (`If-None-Match` / `Etag`)
//! semantics, and pushes state changes back with
//! `PATCH /datastore/{path}` commands.
//!
//! ## Usage
//!
//! ```no_run
//! use motu_avb::Device;
//! use tokio::sync::{mpsc, watch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let device = Device::from_addr("192.168.1.20:1280")?;
//! let store = device.store();
//!
//! let (events_tx, mut events_rx) = mpsc::channel(1);
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(device.watcher()?.run(events_tx, shutdown_rx));
//!
//! while let Some(event) = events_rx.recv().await {
//!     println!("{} = {}", event.path, event.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod store;
pub mod sync;
pub mod value;

pub use client::Device;
pub use config::{Config, ConfigError};
pub use error::DeviceError;
pub use store::{Datastore, Event};
pub use sync::DatastoreWatcher;
pub use value::Value;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
