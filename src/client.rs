//! Command client for the device datastore.
//!
//! Mutations are `PATCH /datastore/{path}` requests carrying a urlencoded
//! form with a single `json` field, e.g. `json={"value":0.5}`. The device
//! answers `204` (or an empty 2xx body) on success. Reads never touch the
//! network; they go through the shared [`Datastore`] mirror kept current by
//! the watcher.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;

use crate::config::Config;
use crate::error::DeviceError;
use crate::store::Datastore;
use crate::sync::DatastoreWatcher;

/// Handle to a device: issues datastore mutations and reads the local mirror.
#[derive(Debug)]
pub struct Device {
    base_url: String,
    client: reqwest::Client,
    store: Arc<Datastore>,
    config: Config,
}

/// Wire payload for a single-value mutation: `{"value": <v>}`.
#[derive(Serialize)]
struct SingleValue<T: Serialize> {
    value: T,
}

impl Device {
    /// Creates a device handle from a configuration.
    pub fn new(config: Config) -> Result<Self, DeviceError> {
        let client = http_client(&config)?;
        Ok(Self {
            base_url: http_base_url(&config.addr),
            client,
            store: Arc::new(Datastore::new()),
            config,
        })
    }

    /// Creates a device handle for `addr` (`host:port`) with default settings.
    pub fn from_addr(addr: &str) -> Result<Self, DeviceError> {
        Self::new(Config {
            addr: addr.to_string(),
            ..Config::default()
        })
    }

    /// The shared datastore mirror.
    pub fn store(&self) -> Arc<Datastore> {
        Arc::clone(&self.store)
    }

    /// Creates a watcher that keeps [`Device::store`] synchronized with the
    /// device. Spawn its [`run`](DatastoreWatcher::run) on a task.
    pub fn watcher(&self) -> Result<DatastoreWatcher, DeviceError> {
        DatastoreWatcher::new(&self.config, Arc::clone(&self.store))
    }

    /// Sends a mutation for a single datastore path.
    ///
    /// No internal retry: errors go straight back to the caller.
    async fn patch(&self, path: &str, json: String) -> Result<(), DeviceError> {
        let url = format!("{}/datastore/{}", self.base_url, path);
        let response = self
            .client
            .patch(&url)
            .form(&[("json", json.as_str())])
            .send()
            .await
            .map_err(|e| DeviceError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        if status.as_u16() >= 400 {
            return Err(DeviceError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DeviceError::Network(e.to_string()))?;
        if !body.is_empty() {
            return Err(DeviceError::UnexpectedBody(body));
        }
        Ok(())
    }

    /// Writes a float value to `path`.
    pub async fn set_float(&self, path: &str, value: f64) -> Result<(), DeviceError> {
        self.patch(path, single_value_payload(value)?).await
    }

    /// Writes an integer value to `path`.
    pub async fn set_int(&self, path: &str, value: i64) -> Result<(), DeviceError> {
        self.patch(path, single_value_payload(value)?).await
    }

    /// Writes a boolean value to `path`, encoded as 0/1 (the device has no
    /// native boolean type).
    pub async fn set_bool(&self, path: &str, value: bool) -> Result<(), DeviceError> {
        self.set_int(path, if value { 1 } else { 0 }).await
    }

    /// Reads the fader position of a channel strip (`{channel}/fader`).
    pub fn fader_position(&self, channel: &str) -> Result<f64, DeviceError> {
        self.store.float(&format!("{}/fader", channel))
    }

    /// Moves the fader of a channel strip.
    pub async fn set_fader_position(&self, channel: &str, value: f64) -> Result<(), DeviceError> {
        self.set_float(&format!("{}/fader", channel), value).await
    }

    /// Reads the mute state of a channel strip (`{channel}/mute`).
    pub fn fader_mute(&self, channel: &str) -> Result<bool, DeviceError> {
        self.store.bool(&format!("{}/mute", channel))
    }

    /// Mutes or unmutes a channel strip.
    pub async fn set_fader_mute(&self, channel: &str, value: bool) -> Result<(), DeviceError> {
        self.set_bool(&format!("{}/mute", channel), value).await
    }

    /// Flips the mute state of a channel strip, based on the mirrored value.
    pub async fn toggle_fader_mute(&self, channel: &str) -> Result<(), DeviceError> {
        let muted = self.fader_mute(channel)?;
        self.set_fader_mute(channel, !muted).await
    }
}

fn single_value_payload<T: Serialize>(value: T) -> Result<String, DeviceError> {
    serde_json::to_string(&SingleValue { value }).map_err(|e| DeviceError::Parse(e.to_string()))
}

/// Builds the HTTP base URL for a device address.
///
/// A bare `host:port` gets an `http://` prefix; explicit schemes pass
/// through.
pub(crate) fn http_base_url(addr: &str) -> String {
    let addr = addr.trim_end_matches('/');
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

/// Builds the shared HTTP client profile: a pool of one idle connection with
/// a 30 s idle timeout (one long-lived polling connection, not a fan-out),
/// and an explicit request deadline to catch silently hung connections.
pub(crate) fn http_client(config: &Config) -> Result<reqwest::Client, DeviceError> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(1)
        .pool_idle_timeout(config.pool_idle_timeout())
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| DeviceError::Network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_base_url_bare_host() {
        assert_eq!(http_base_url("localhost:1280"), "http://localhost:1280");
    }

    #[test]
    fn test_http_base_url_with_scheme() {
        assert_eq!(http_base_url("http://10.0.0.5:1280"), "http://10.0.0.5:1280");
        assert_eq!(
            http_base_url("https://motu.example.com"),
            "https://motu.example.com"
        );
    }

    #[test]
    fn test_http_base_url_strips_trailing_slash() {
        assert_eq!(http_base_url("localhost:1280/"), "http://localhost:1280");
    }

    #[test]
    fn test_single_value_payload() {
        assert_eq!(single_value_payload(0.5).unwrap(), r#"{"value":0.5}"#);
        assert_eq!(single_value_payload(1i64).unwrap(), r#"{"value":1}"#);
        assert_eq!(single_value_payload(0i64).unwrap(), r#"{"value":0}"#);
    }
}
