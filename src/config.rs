//! Capture configuration
//!
//! [`CaptureConfig`] is supplied by the caller and read-only for a whole run.
//! It can be built in code, through [`CaptureConfigBuilder`], or loaded from a
//! JSON file where every field is optional.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Username/password pair for the authenticated proxy path
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyCredentials {
    /// Proxy username
    pub username: String,
    /// Proxy password
    pub password: String,
}

impl ProxyCredentials {
    /// Create a credential pair
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for one full-page capture
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Viewport width in pixels (default: 1366)
    pub viewport_width: u32,
    /// Viewport height in pixels (default: 768)
    pub viewport_height: u32,
    /// Pixels shared by consecutive tiles (default: 100)
    pub overlap: u32,
    /// Route the browser through a proxy and enable the retry path (default: false)
    pub use_proxy: bool,
    /// Proxy address handed to the runtime, e.g. `http://proxy:8080`
    pub proxy_server: Option<String>,
    /// Credentials used when retrying navigation through the proxy
    pub proxy_credentials: Option<ProxyCredentials>,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub browser_executable: Option<PathBuf>,
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Enable sandbox (default: true)
    pub sandbox: bool,
    /// Navigation timeout in milliseconds (default: 120000)
    pub navigation_timeout_ms: u64,
    /// Settle window before the first tile in milliseconds (default: 3000)
    pub first_settle_ms: u64,
    /// Settle window before every later tile in milliseconds (default: 500)
    pub settle_ms: u64,
    /// Timeout for a single viewport capture in milliseconds (default: 30000)
    pub capture_timeout_ms: u64,
    /// Deepest element nesting visited while normalizing (default: 512)
    pub max_dom_depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1366,
            viewport_height: 768,
            overlap: 100,
            use_proxy: false,
            proxy_server: None,
            proxy_credentials: None,
            browser_executable: None,
            headless: true,
            sandbox: true,
            navigation_timeout_ms: 120_000,
            first_settle_ms: 3000,
            settle_ms: 500,
            capture_timeout_ms: 30_000,
            max_dom_depth: 512,
        }
    }
}

impl CaptureConfig {
    /// Create a new config builder
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }

    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: CaptureConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Check the invariants every run relies on.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }

        if self.overlap >= self.viewport_height {
            return Err(ConfigError::InvalidOverlap {
                overlap: self.overlap,
                viewport_height: self.viewport_height,
            });
        }

        if let Some(creds) = &self.proxy_credentials {
            if creds.username.is_empty() {
                return Err(ConfigError::InvalidProxy(
                    "proxy username cannot be empty".to_string(),
                ));
            }
        }

        if matches!(self.proxy_server.as_deref(), Some("")) {
            return Err(ConfigError::InvalidProxy(
                "proxy server cannot be empty".to_string(),
            ));
        }

        if self.navigation_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "navigation timeout must be positive".to_string(),
            ));
        }
        if self.capture_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "capture timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Credentials for the single navigation retry, if that path is enabled.
    pub fn retry_credentials(&self) -> Option<&ProxyCredentials> {
        if self.use_proxy {
            self.proxy_credentials.as_ref()
        } else {
            None
        }
    }

    /// Navigation timeout
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

/// Builder for CaptureConfig
#[derive(Default)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    /// Set tile overlap
    pub fn overlap(mut self, overlap: u32) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Route through a proxy server
    pub fn proxy_server<S: Into<String>>(mut self, server: S) -> Self {
        self.config.use_proxy = true;
        self.config.proxy_server = Some(server.into());
        self
    }

    /// Enable the proxy retry path with credentials
    pub fn proxy_credentials<U: Into<String>, P: Into<String>>(
        mut self,
        username: U,
        password: P,
    ) -> Self {
        self.config.use_proxy = true;
        self.config.proxy_credentials = Some(ProxyCredentials::new(username, password));
        self
    }

    /// Toggle the proxy path without touching its settings
    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.config.use_proxy = use_proxy;
        self
    }

    /// Set Chrome path
    pub fn browser_executable<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.browser_executable = Some(path.into());
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set navigation timeout
    pub fn navigation_timeout_ms(mut self, ms: u64) -> Self {
        self.config.navigation_timeout_ms = ms;
        self
    }

    /// Set first-tile and later-tile settle windows
    pub fn settle_ms(mut self, first: u64, subsequent: u64) -> Self {
        self.config.first_settle_ms = first;
        self.config.settle_ms = subsequent;
        self
    }

    /// Set per-capture timeout
    pub fn capture_timeout_ms(mut self, ms: u64) -> Self {
        self.config.capture_timeout_ms = ms;
        self
    }

    /// Set the normalizer depth bound
    pub fn max_dom_depth(mut self, depth: usize) -> Self {
        self.config.max_dom_depth = depth;
        self
    }

    /// Build the config
    pub fn build(self) -> CaptureConfig {
        self.config
    }
}
