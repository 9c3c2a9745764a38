//!
//! Navigation targets
//!
//! A successful scan ends in a redirect carrying the decoded payload. The
//! payload is untrusted no matter where it came from (camera or typed), so
//! the query string is always built with structured percent-encoding, never
//! by interpolation.
//!

/// The page a successful scan redirects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    path: String,
    param: String,
}

impl ScanTarget {
    pub fn new(path: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            param: param.into(),
        }
    }

    /// Build the navigation URL for a decoded payload
    pub fn url_for(&self, code: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.param, code)
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl Default for ScanTarget {
    fn default() -> Self {
        Self::new("/scan/", "code")
    }
}

/// The manual fallback: a user-typed code, bypassing the camera path
///
/// Shares no state with the scan loop; it only reuses the target shape.
pub fn manual_entry(target: &ScanTarget, code: &str) -> String {
    target.url_for(code)
}

/// Consumes the final navigation target
///
/// Invoked at most once per scan loop, on the first non-empty decode.
pub trait Navigator: Send + 'static {
    fn navigate(&mut self, target: String);
}

/// A navigator that only logs the redirect
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, target: String) {
        info!("navigating to {target}");
    }
}
