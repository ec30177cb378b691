//! Remote index-series client.
//!
//! Fetches the monthly series over HTTP at most once per process; every
//! failure mode (network, bad status, empty body, unparsable payload) resolves
//! to "unavailable" so valuation can continue on the fixed fallback rate.

use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, warn};

use super::{parse_wire_series, IndexSeries};

/// Macroeconomic statistics endpoint for the monthly price index.
pub const DEFAULT_INDEX_ENDPOINT: &str =
    "https://api.bcb.gov.br/dados/serie/bcdata.sgs.433/dados?formato=json";

/// Bound on the fetch; the series is optional, so a slow endpoint must not
/// stall the whole computation.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RemoteIndexClient {
    endpoint: String,
    timeout: Duration,
    cache: OnceLock<Option<IndexSeries>>,
}

impl Default for RemoteIndexClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteIndexClient {
    pub fn new() -> Self {
        RemoteIndexClient {
            endpoint: DEFAULT_INDEX_ENDPOINT.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            cache: OnceLock::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The memoized series; `None` means unavailable for this process run.
    pub fn series(&self) -> Option<&IndexSeries> {
        self.cache.get_or_init(|| self.fetch()).as_ref()
    }

    fn fetch(&self) -> Option<IndexSeries> {
        let client = match reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to build HTTP client; index series unavailable");
                return None;
            }
        };

        let response = match client.get(&self.endpoint).send() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, endpoint = %self.endpoint, "index series fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                status = %response.status(),
                endpoint = %self.endpoint,
                "index series endpoint returned non-success status"
            );
            return None;
        }

        let body = match response.text() {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed to read index series response body");
                return None;
            }
        };

        if body.trim().is_empty() {
            warn!("index series endpoint returned an empty body");
            return None;
        }

        match parse_wire_series(&body) {
            Some(series) => {
                debug!(observations = series.len(), "fetched index series");
                Some(series)
            }
            None => {
                warn!("index series payload had no usable observations");
                None
            }
        }
    }
}
