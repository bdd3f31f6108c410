//! Long-poll synchronization of the device datastore.
//!
//! This module keeps the local [`Datastore`](crate::Datastore) mirror
//! coherent with the device.
//!
//! ## Protocol
//!
//! The watcher loops on `GET /datastore`:
//! 1. The first request carries no change token and returns the full
//!    snapshot plus an `Etag` header.
//! 2. Every later request sends `If-None-Match: {token}`. The device holds
//!    the request (about 10 seconds) and answers `304` if nothing changed,
//!    or `200` with the changed entries and a fresh `Etag`.
//! 3. `304` triggers an immediate re-poll; the hold already happened
//!    device-side.
//! 4. Any failure is logged and retried after a fixed backoff, forever.
//!
//! Each merged entry is delivered as an [`Event`](crate::Event) on a bounded
//! channel, except for the initial snapshot, which is applied silently.

mod watcher;

pub use watcher::DatastoreWatcher;
