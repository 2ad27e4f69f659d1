//! pagestitch - Full-Page Web Screenshots
//!
//! Captures pages taller than one viewport by scrolling a headless browser,
//! taking a viewport-sized tile at each planned offset and compositing the
//! tiles into one seamless PNG.
//!
//! # Architecture
//!
//! ```text
//! capture_full_page ──▶ CaptureOrchestrator ──▶ BrowserSession (CDP)
//!                              │
//!                              ▼
//!   PageNormalizer ──▶ compute_capture_plan ──▶ TileCapturer ──▶ ImageStitcher
//!   (fixed → absolute)   (scroll offsets)       (scroll, settle,   (white canvas,
//!                                                 snapshot)         later tile wins)
//! ```
//!
//! Navigation failures are retried exactly once through an authenticated
//! proxy when credentials are configured; every other failure is final.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagestitch::{capture_full_page, CaptureConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::builder().viewport(1366, 768).overlap(100).build();
//!     let shot = capture_full_page("https://example.com", config).await?;
//!     shot.save("out/example.png").await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod capture;
pub mod config;
pub mod error;
pub mod output;

// Re-exports for convenience
pub use browser::{BrowserSession, ChromeSession};
pub use capture::{compute_capture_plan, CaptureOrchestrator, CapturePlan, CaptureState};
pub use config::{CaptureConfig, ProxyCredentials};
pub use error::{Error, Result};
pub use output::{save_to_file, CaptureResult};

use browser::UrlValidator;
use tracing::instrument;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Capture the whole of `url` as one PNG.
///
/// The configuration and URL are validated before a browser is launched.
#[instrument(skip(config))]
pub async fn capture_full_page(url: &str, config: CaptureConfig) -> Result<CaptureResult> {
    UrlValidator::validate(url)?;
    let mut orchestrator = CaptureOrchestrator::new(config)?;
    let session = ChromeSession::launch(orchestrator.config()).await?;
    orchestrator.run(session, url).await
}
