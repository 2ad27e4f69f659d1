//! The browser-session capability consumed by the capture pipeline.

use crate::config::ProxyCredentials;
use crate::error::{AuthenticationError, CaptureError, NavigationError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// One live page in a browser runtime.
///
/// Every method takes `&mut self`: the orchestrator is the only owner for a
/// run and lends the session out for a single operation at a time, so no two
/// browser operations ever overlap on the same viewport.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url`, failing if it does not finish within `timeout`.
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<(), NavigationError>;

    /// Evaluate a script in the page and return its JSON value
    /// (`Value::Null` for `undefined`).
    async fn evaluate(&mut self, script: &str) -> Result<Value>;

    /// Scroll the document to a vertical offset in CSS pixels.
    async fn scroll_to(&mut self, offset: u32) -> Result<()>;

    /// PNG snapshot bounded to the current viewport.
    async fn capture_viewport(&mut self) -> std::result::Result<Vec<u8>, CaptureError>;

    /// Install proxy credentials for subsequent requests.
    async fn authenticate(
        &mut self,
        credentials: &ProxyCredentials,
    ) -> std::result::Result<(), AuthenticationError>;

    /// Release the session. Must be safe to call whatever state the run
    /// reached, including after an external teardown.
    async fn close(&mut self) -> Result<()>;
}
