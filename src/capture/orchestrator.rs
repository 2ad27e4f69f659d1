//! Capture state machine
//!
//! ```text
//! Init -> Navigating -> Capturing -> Stitched
//!             |
//!             v
//!      NavigationFailed --(proxy credentials, first failure)--> Authenticating -> Navigating
//!             |                                                       |
//!             v                                                       v
//!           Failed <--------------------------------------------- (rejected)
//! ```
//!
//! The session is released exactly once whichever way the run ends.

use super::normalize::PageNormalizer;
use super::planner::compute_capture_plan;
use super::stitch::ImageStitcher;
use super::tiles::{SettleTimings, TileCapturer};
use crate::browser::{BrowserSession, UrlValidator};
use crate::config::CaptureConfig;
use crate::error::Result;
use crate::output::CaptureResult;
use chrono::Utc;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// States of a capture run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing has happened yet
    Init,
    /// Loading the page
    Navigating,
    /// The last navigation attempt failed
    NavigationFailed,
    /// Installing proxy credentials before the retry
    Authenticating,
    /// Normalize, plan, tile and stitch
    Capturing,
    /// Terminal success
    Stitched,
    /// Terminal failure
    Failed,
}

impl CaptureState {
    /// Whether the machine has stopped
    pub fn is_terminal(self) -> bool {
        matches!(self, CaptureState::Stitched | CaptureState::Failed)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureState::Init => "init",
            CaptureState::Navigating => "navigating",
            CaptureState::NavigationFailed => "navigation_failed",
            CaptureState::Authenticating => "authenticating",
            CaptureState::Capturing => "capturing",
            CaptureState::Stitched => "stitched",
            CaptureState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs one full-page capture over an exclusively owned session
pub struct CaptureOrchestrator {
    config: CaptureConfig,
    normalizer: PageNormalizer,
    capturer: TileCapturer,
    history: Vec<CaptureState>,
}

impl CaptureOrchestrator {
    /// Validate `config` and build an orchestrator for it.
    pub fn new(config: CaptureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: PageNormalizer::new(config.max_dom_depth),
            capturer: TileCapturer::new(SettleTimings::from_config(&config)),
            config,
            history: vec![CaptureState::Init],
        })
    }

    /// Current state
    pub fn state(&self) -> CaptureState {
        self.history
            .last()
            .copied()
            .unwrap_or(CaptureState::Init)
    }

    /// Every state visited, in order
    pub fn history(&self) -> &[CaptureState] {
        &self.history
    }

    /// The configuration in use
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Capture `url` with `session`, then release the session.
    ///
    /// Each run starts again from [`CaptureState::Init`].
    #[instrument(skip(self, session))]
    pub async fn run<S>(&mut self, mut session: S, url: &str) -> Result<CaptureResult>
    where
        S: BrowserSession,
    {
        self.history = vec![CaptureState::Init];
        let outcome = self.drive(&mut session, url).await;

        if let Err(e) = session.close().await {
            warn!("Session close failed: {}", e);
        }

        match outcome {
            Ok(result) => {
                self.transition(CaptureState::Stitched);
                info!(
                    "Captured {} as {}x{} from {} tiles",
                    url, result.width, result.height, result.tile_count
                );
                Ok(result)
            }
            Err(e) => {
                self.transition(CaptureState::Failed);
                warn!("Capture of {} failed: {}", url, e);
                Err(e)
            }
        }
    }

    async fn drive<S>(&mut self, session: &mut S, url: &str) -> Result<CaptureResult>
    where
        S: BrowserSession,
    {
        UrlValidator::validate(url)?;

        self.navigate(session, url).await?;

        self.transition(CaptureState::Capturing);
        self.normalizer.normalize_fixed_elements(session).await?;

        let total_height = TileCapturer::measure_page_height(session).await?;
        let plan = compute_capture_plan(
            total_height,
            self.config.viewport_height,
            self.config.overlap,
        )?;
        debug!("Capture plan for {}px: {:?}", total_height, plan.offsets());

        let tile_set = self.capturer.capture(session, &plan).await?;
        let tile_count = tile_set.tiles.len();

        let image = ImageStitcher::stitch(
            tile_set.tiles,
            tile_set.total_height,
            self.config.viewport_width,
        )?;

        Ok(CaptureResult {
            data: image.data,
            width: image.width,
            height: image.height,
            tile_count,
            url: url.to_string(),
            captured_at: Utc::now(),
        })
    }

    /// Navigate, retrying once through the authenticated proxy path.
    async fn navigate<S>(&mut self, session: &mut S, url: &str) -> Result<()>
    where
        S: BrowserSession,
    {
        let timeout = self.config.navigation_timeout();
        let mut retried = false;

        loop {
            self.transition(CaptureState::Navigating);
            let err = match session.navigate(url, timeout).await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            self.transition(CaptureState::NavigationFailed);
            let credentials = match self.config.retry_credentials() {
                Some(creds) if !retried => creds.clone(),
                _ => return Err(err.into()),
            };

            warn!("Navigation failed ({}), retrying through proxy", err);
            retried = true;

            self.transition(CaptureState::Authenticating);
            session.authenticate(&credentials).await?;
        }
    }

    fn transition(&mut self, next: CaptureState) {
        debug!("Capture state: {} -> {}", self.state(), next);
        self.history.push(next);
    }
}
