//! Network side of the host: fetches the URLs of installed resources and
//! reports how each fetch ended.

mod curl_multi;
mod handler;

pub use curl_multi::{CurlMultiTransport, FetchOptions};
pub use handler::FragmentBody;

use std::time::Duration;

use crate::host::ResourceHandle;

/// Why a fetch produced no usable content.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection refused, DNS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The transfer could not be registered with the multi handle.
    #[error("curl multi: {0}")]
    Multi(#[from] curl::MultiError),
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response; the body is opaque code.
    Delivered { status: u32, body: Vec<u8> },
    Failed(FetchError),
}

/// A finished fetch for one resource.
#[derive(Debug)]
pub struct Completion {
    pub handle: ResourceHandle,
    pub url: String,
    pub outcome: FetchOutcome,
}

/// Drives fetches for the event loop. Implementations are single-threaded:
/// `begin` registers work and `poll` advances it.
pub trait Transport {
    /// Starts fetching `url` on behalf of `handle`.
    fn begin(&mut self, handle: ResourceHandle, url: &str) -> Result<(), FetchError>;

    /// Advances in-flight fetches, waiting up to `wait` for activity, and
    /// returns those that finished.
    fn poll(&mut self, wait: Duration) -> anyhow::Result<Vec<Completion>>;

    /// Number of fetches started but not yet returned by `poll`.
    fn in_flight(&self) -> usize;
}
