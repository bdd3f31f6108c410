use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, StatusCode};
use tokio::sync::{mpsc, watch};

use crate::client::{http_base_url, http_client};
use crate::config::Config;
use crate::error::DeviceError;
use crate::store::{Datastore, Event};
use crate::value::Value;

/// Long-poll watcher that mirrors the device datastore into a local
/// [`Datastore`] and emits one [`Event`] per changed entry.
///
/// Created via [`Device::watcher`](crate::Device::watcher) or
/// [`DatastoreWatcher::new`]; consumed by [`run`](DatastoreWatcher::run).
#[derive(Debug)]
pub struct DatastoreWatcher {
    base_url: String,
    client: reqwest::Client,
    store: Arc<Datastore>,
    etag: Option<String>,
    retry_backoff: Duration,
}

impl DatastoreWatcher {
    /// Creates a watcher writing into `store`.
    pub fn new(config: &Config, store: Arc<Datastore>) -> Result<Self, DeviceError> {
        Ok(Self {
            base_url: http_base_url(&config.addr),
            client: http_client(config)?,
            store,
            etag: None,
            retry_backoff: config.retry_backoff(),
        })
    }

    /// Runs the synchronization loop until `shutdown` trips.
    ///
    /// The first successful fetch populates the store silently. Afterwards
    /// every entry of every fetched snapshot is re-emitted as an [`Event`],
    /// whether or not its value changed; consumers must tolerate duplicate
    /// notifications after a reconnect.
    ///
    /// Sends on `events` block once the channel is full, so a stalled
    /// consumer stalls polling. The loop ends when `shutdown` is set to
    /// `true` (or its sender is dropped), or when the event receiver is
    /// dropped. Fetch failures are logged and retried after a fixed backoff,
    /// indefinitely.
    pub async fn run(mut self, events: mpsc::Sender<Event>, mut shutdown: watch::Receiver<bool>) {
        let mut initialized = false;

        loop {
            if *shutdown.borrow() {
                return;
            }

            let snapshot = tokio::select! {
                _ = shutdown.changed() => return,
                fetched = self.fetch_datastore() => match fetched {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!("Fetching datastore failed: {}", e);
                        tokio::select! {
                            _ = shutdown.changed() => return,
                            _ = tokio::time::sleep(self.retry_backoff) => {}
                        }
                        continue;
                    }
                },
            };

            for (path, value) in snapshot {
                // store first, then notify: a subscriber that reads the
                // store on receipt must already see this value
                self.store.insert(&path, value.clone());
                if initialized {
                    let event = Event { path, value };
                    tokio::select! {
                        _ = shutdown.changed() => return,
                        sent = events.send(event) => {
                            if sent.is_err() {
                                // receiver dropped, nobody is listening
                                return;
                            }
                        }
                    }
                }
            }
            initialized = true;
        }
    }

    /// Fetches the next datastore snapshot.
    ///
    /// Inner conditional-GET loop: a `304` means the device already held the
    /// request for its long-poll window, so the next request goes out
    /// immediately. Transport, HTTP and parse failures return to the caller,
    /// which applies the backoff.
    async fn fetch_datastore(&mut self) -> Result<HashMap<String, Value>, DeviceError> {
        loop {
            let mut request = self.client.get(format!("{}/datastore", self.base_url));
            if let Some(etag) = &self.etag {
                request = request.header(header::IF_NONE_MATCH, etag);
            }

            let response = request
                .send()
                .await
                .map_err(|e| DeviceError::Network(e.to_string()))?;

            if self.etag.is_some() && response.status() == StatusCode::NOT_MODIFIED {
                // No change; poll again right away
                continue;
            }

            let status = response.status();
            let etag = response
                .headers()
                .get(header::ETAG)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let body = response
                .text()
                .await
                .map_err(|e| DeviceError::Network(e.to_string()))?;

            if status.as_u16() >= 400 {
                return Err(DeviceError::Http {
                    status: status.as_u16(),
                });
            }

            let snapshot: HashMap<String, Value> =
                serde_json::from_str(&body).map_err(|e| DeviceError::Parse(e.to_string()))?;

            // a missing Etag clears the token and forces the next GET to be
            // unconditional
            self.etag = etag;

            tracing::debug!(
                etag = self.etag.as_deref().unwrap_or(""),
                entries = snapshot.len(),
                "Fetched datastore snapshot"
            );

            return Ok(snapshot);
        }
    }
}
