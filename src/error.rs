//! Error types for device communication and datastore access.

use thiserror::Error;

/// Errors returned by the watcher, the command client and typed cache reads.
///
/// Fetch-side errors (`Network`, `Http`, `Parse`) are absorbed by the watcher
/// loop, which logs them and retries after a fixed backoff. Command and
/// accessor errors are returned to the caller, which decides whether to
/// retry. Nothing here is fatal.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Connection or transport failure (refused, timed out, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The device answered with a 4xx/5xx status.
    #[error("got HTTP {status} response")]
    Http { status: u16 },

    /// The response body was not well-formed JSON.
    #[error("invalid JSON response: {0}")]
    Parse(String),

    /// A typed read found a value of a different dynamic type, or no value
    /// at all.
    #[error("cannot read {path} as {expected}: found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A mutation got a 2xx response that was expected to be empty but
    /// carried a body.
    #[error("expected empty response, got: {0}")]
    UnexpectedBody(String),
}
