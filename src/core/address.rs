//! Service addresses and endpoint URLs.

use std::fmt;

/// Address of the authorization or scanning service.
///
/// A bare `host[:port]` is reached over HTTPS. A value that already carries
/// a scheme (`http://...`, `https://...`) is used as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceAddress(String);

impl ServiceAddress {
    /// Creates a service address.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let trimmed = address.trim_end_matches('/');
        if trimmed.contains("://") {
            Self(trimmed.to_string())
        } else {
            Self(format!("https://{}", trimmed))
        }
    }

    /// Returns the base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.0
    }

    /// Returns the absolute URL of an endpoint path such as `/api/scan/v1`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }

    /// Resolves a task URL returned by the service.
    ///
    /// Absolute URLs are returned unchanged; relative ones are joined to
    /// this address.
    pub fn resolve(&self, task_url: &str) -> String {
        if task_url.starts_with("http://") || task_url.starts_with("https://") {
            task_url.to_string()
        } else {
            self.endpoint(task_url)
        }
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for ServiceAddress {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}
