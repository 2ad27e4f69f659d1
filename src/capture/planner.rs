//! Scroll planning: which offsets cover a page of a given height.

use crate::error::ConfigError;
use serde::Serialize;

/// Ordered scroll offsets for one capture run.
///
/// Offsets start at 0 and strictly increase; the last offset plus the
/// viewport height reaches the page bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturePlan {
    offsets: Vec<u32>,
    total_height: u32,
    viewport_height: u32,
}

impl CapturePlan {
    /// Scroll offsets in capture order
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Page height the plan was computed for
    pub fn total_height(&self) -> u32 {
        self.total_height
    }

    /// Viewport height the plan was computed for
    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false for a computed plan
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Compute the offsets needed to cover `total_height`.
///
/// Offsets advance by `viewport_height - overlap` while a whole viewport still
/// fits. The bottom is then reached by a snap offset of
/// `total_height - viewport_height`: appended when it lies more than
/// `overlap / 2` past the last offset, otherwise it replaces the last offset
/// so that no near-duplicate tile is taken. The leading 0 is never replaced.
pub fn compute_capture_plan(
    total_height: u32,
    viewport_height: u32,
    overlap: u32,
) -> Result<CapturePlan, ConfigError> {
    if overlap >= viewport_height {
        return Err(ConfigError::InvalidOverlap {
            overlap,
            viewport_height,
        });
    }

    let step = u64::from(viewport_height - overlap);
    let total = u64::from(total_height);
    let viewport = u64::from(viewport_height);

    let mut offsets = vec![0u32];
    if total > viewport {
        let mut offset = step;
        while offset + viewport <= total {
            offsets.push(offset as u32);
            offset += step;
        }

        let final_offset = total_height - viewport_height;
        let last = offsets[offsets.len() - 1];
        if final_offset > last {
            if final_offset - last > overlap / 2 || offsets.len() == 1 {
                offsets.push(final_offset);
            } else if let Some(tail) = offsets.last_mut() {
                *tail = final_offset;
            }
        }
    }

    Ok(CapturePlan {
        offsets,
        total_height,
        viewport_height,
    })
}
