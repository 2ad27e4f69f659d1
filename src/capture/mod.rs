//! Full-page capture pipeline
//!
//! Normalize fixed elements, plan scroll offsets, capture one tile per offset
//! and stitch the tiles, all driven by [`CaptureOrchestrator`].

pub mod normalize;
pub mod orchestrator;
pub mod planner;
pub mod stitch;
pub mod tiles;

pub use normalize::{DomNode, DomSnapshot, PageNormalizer, PinEdit, Rect};
pub use orchestrator::{CaptureOrchestrator, CaptureState};
pub use planner::{compute_capture_plan, CapturePlan};
pub use stitch::{ImageStitcher, StitchedImage, MAX_CANVAS_BYTES};
pub use tiles::{SettleTimings, Tile, TileCapturer, TileSet};
