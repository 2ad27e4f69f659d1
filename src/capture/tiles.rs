//! Tile capture: scroll, settle, snapshot, once per planned offset.

use super::planner::CapturePlan;
use crate::browser::BrowserSession;
use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use std::time::Duration;
use tracing::{debug, info, instrument};

const PAGE_HEIGHT_SCRIPT: &str = r#"
    Math.max(
        document.body ? document.body.scrollHeight : 0,
        document.documentElement ? document.documentElement.scrollHeight : 0
    )
"#;

/// One viewport-sized raster and the scroll offset it was taken at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Encoded raster (PNG)
    pub data: Vec<u8>,
    /// Vertical scroll offset
    pub offset: u32,
}

/// Tiles of one run, in plan order, with the height they were planned for
#[derive(Debug)]
pub struct TileSet {
    /// Captured tiles
    pub tiles: Vec<Tile>,
    /// Page height measured before capturing began
    pub total_height: u32,
}

/// Wait windows and the per-snapshot timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimings {
    /// Wait before the first tile (initial paint, lazy resources)
    pub first: Duration,
    /// Wait before every later tile
    pub subsequent: Duration,
    /// Upper bound on a single viewport capture
    pub capture_timeout: Duration,
}

impl SettleTimings {
    /// Timings taken from a capture config
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            first: Duration::from_millis(config.first_settle_ms),
            subsequent: Duration::from_millis(config.settle_ms),
            capture_timeout: Duration::from_millis(config.capture_timeout_ms),
        }
    }

    fn settle_for(&self, index: usize) -> Duration {
        if index == 0 {
            self.first
        } else {
            self.subsequent
        }
    }
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

/// Drives a session through a capture plan
#[derive(Debug, Clone, Copy)]
pub struct TileCapturer {
    timings: SettleTimings,
}

impl TileCapturer {
    /// Capturer with the given timings
    pub fn new(timings: SettleTimings) -> Self {
        Self { timings }
    }

    /// Full document height in CSS pixels.
    pub async fn measure_page_height<S>(session: &mut S) -> Result<u32>
    where
        S: BrowserSession + ?Sized,
    {
        let value = session.evaluate(PAGE_HEIGHT_SCRIPT).await?;
        let height = value
            .as_f64()
            .filter(|h| h.is_finite() && *h >= 0.0)
            .ok_or_else(|| CaptureError::MeasureFailed(format!("unexpected height {}", value)))?;
        Ok(height.ceil().min(f64::from(u32::MAX)) as u32)
    }

    /// Capture one tile per offset, strictly in plan order.
    #[instrument(skip(self, session, plan), fields(tiles = plan.len()))]
    pub async fn capture<S>(&self, session: &mut S, plan: &CapturePlan) -> Result<TileSet>
    where
        S: BrowserSession + ?Sized,
    {
        let mut tiles = Vec::with_capacity(plan.len());

        for (index, &offset) in plan.offsets().iter().enumerate() {
            session
                .scroll_to(offset)
                .await
                .map_err(|e| CaptureError::ScrollFailed {
                    offset,
                    reason: e.to_string(),
                })?;

            tokio::time::sleep(self.timings.settle_for(index)).await;

            let timeout_ms = self.timings.capture_timeout.as_millis() as u64;
            let data = tokio::time::timeout(self.timings.capture_timeout, session.capture_viewport())
                .await
                .map_err(|_| CaptureError::Timeout(timeout_ms))??;

            debug!("Tile {} at offset {}: {} bytes", index, offset, data.len());
            tiles.push(Tile { data, offset });
        }

        info!("Captured {} tiles", tiles.len());
        Ok(TileSet {
            tiles,
            total_height: plan.total_height(),
        })
    }
}
