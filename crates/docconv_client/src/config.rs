use std::fmt;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Conversion microservices that speak this protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    BuildVu,
    JPedal,
    FormVu,
}

impl Product {
    pub fn path_segment(self) -> &'static str {
        match self {
            Product::BuildVu => "buildvu",
            Product::JPedal => "jpedal",
            Product::FormVu => "formvu",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Immutable per-client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    request_timeout: Duration,
    conversion_timeout: Option<u32>,
    poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            conversion_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Endpoint for `product` hosted under `base_url`.
    pub fn for_product(base_url: &str, product: Product) -> Self {
        let base = base_url.trim_end_matches('/');
        Self::new(format!("{base}/{}", product.path_segment()))
    }

    /// Connect and read timeout applied to every HTTP call.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Upper bound on polling, in whole seconds. `None` waits forever.
    pub fn with_conversion_timeout(mut self, seconds: Option<u32>) -> Self {
        self.conversion_timeout = seconds;
        self
    }

    /// Same as [`Self::with_conversion_timeout`], where any value `<= 0`
    /// means "no timeout".
    pub fn with_conversion_timeout_secs(self, seconds: i64) -> Self {
        let limit = if seconds <= 0 {
            None
        } else {
            Some(u32::try_from(seconds).unwrap_or(u32::MAX))
        };
        self.with_conversion_timeout(limit)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn conversion_timeout(&self) -> Option<u32> {
        self.conversion_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
