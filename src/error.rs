//! Error types for pagestitch
//!
//! One `thiserror` enum per failure kind of a capture run, gathered under the
//! crate-level [`Error`]. Only [`NavigationError`] is ever retried.

use thiserror::Error;

/// The main error type for capture operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration or URL, raised before any browser interaction
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Browser runtime lifecycle errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Page failed to load
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Proxy credentials rejected
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Viewport snapshot failed mid-pipeline
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Canvas allocation, compositing or encoding failed
    #[error("Stitch error: {0}")]
    Stitch(#[from] StitchError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Overlap must lie in `[0, viewport_height)`
    #[error("Overlap {overlap}px must be smaller than the viewport height {viewport_height}px")]
    InvalidOverlap {
        /// Requested overlap
        overlap: u32,
        /// Configured viewport height
        viewport_height: u32,
    },

    /// Zero-sized viewport
    #[error("Invalid viewport {width}x{height}")]
    InvalidViewport {
        /// Viewport width
        width: u32,
        /// Viewport height
        height: u32,
    },

    /// Proxy settings are inconsistent
    #[error("Invalid proxy settings: {0}")]
    InvalidProxy(String),

    /// A timeout or settle window is out of range
    #[error("Invalid timing: {0}")]
    InvalidTiming(String),
}

/// Browser lifecycle errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration rejected by the runtime
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Session already released
    #[error("Browser already closed")]
    AlreadyClosed,
}

/// Navigation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Proxy authentication errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Credentials rejected by the proxy or the runtime
    #[error("Proxy credentials rejected: {0}")]
    Rejected(String),

    /// The session cannot install credentials
    #[error("Authentication unavailable: {0}")]
    Unavailable(String),
}

/// Capture errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed at offset {offset}: {reason}")]
    ScreenshotFailed {
        /// Scroll offset of the failed tile
        offset: u32,
        /// Underlying failure
        reason: String,
    },

    /// Scrolling to an offset failed
    #[error("Scroll to offset {offset} failed: {reason}")]
    ScrollFailed {
        /// Target scroll offset
        offset: u32,
        /// Underlying failure
        reason: String,
    },

    /// Page height could not be measured
    #[error("Page measurement failed: {0}")]
    MeasureFailed(String),

    /// Capture timeout
    #[error("Capture timed out after {0}ms")]
    Timeout(u64),
}

/// Stitching errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    /// Canvas with a zero dimension
    #[error("Cannot allocate an empty {width}x{height} canvas")]
    EmptyCanvas {
        /// Canvas width
        width: u32,
        /// Canvas height
        height: u32,
    },

    /// Canvas exceeds the allocation limit
    #[error("Canvas {width}x{height} exceeds the {limit} byte limit")]
    CanvasTooLarge {
        /// Canvas width
        width: u32,
        /// Canvas height
        height: u32,
        /// Byte limit
        limit: u64,
    },

    /// No tiles to composite
    #[error("No tiles to stitch")]
    NoTiles,

    /// Tile raster could not be decoded
    #[error("Tile at offset {offset} could not be decoded: {reason}")]
    DecodeFailed {
        /// Offset of the offending tile
        offset: u32,
        /// Decoder message
        reason: String,
    },

    /// Final raster could not be encoded
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
}

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Whether this failure may be retried through the proxy path.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Navigation(_))
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_overlap_error() {
        let err = ConfigError::InvalidOverlap {
            overlap: 800,
            viewport_height: 768,
        };
        assert_eq!(
            err.to_string(),
            "Overlap 800px must be smaller than the viewport height 768px"
        );
    }

    #[test]
    fn test_only_navigation_is_retryable() {
        assert!(Error::from(NavigationError::Timeout(120000)).is_retryable());
        assert!(!Error::from(AuthenticationError::Rejected("407".into())).is_retryable());
        assert!(!Error::from(StitchError::NoTiles).is_retryable());
        assert!(!Error::from(CaptureError::Timeout(10)).is_retryable());
        assert!(!Error::from(ConfigError::InvalidUrl("x".into())).is_retryable());
    }

    #[test]
    fn test_capture_error_mentions_offset() {
        let err = CaptureError::ScreenshotFailed {
            offset: 668,
            reason: "target closed".to_string(),
        };
        assert!(err.to_string().contains("668"));
        assert!(err.to_string().contains("target closed"));
    }
}
