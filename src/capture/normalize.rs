//! Fixed-to-absolute normalization
//!
//! Viewport-anchored (`position: fixed`) elements would otherwise show up in
//! every tile. The live page is read once into a [`DomSnapshot`], walked here
//! with an explicit stack, and every fixed element is pinned at its current
//! document position with `position: absolute`.
//!
//! Must run once, before the first scroll: pinned tops are computed from the
//! scroll offset at the time of the snapshot.

use crate::browser::BrowserSession;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Reads every element in document order (index 0 is the root element).
const SNAPSHOT_SCRIPT: &str = r#"
    (() => {
        const all = Array.from(document.querySelectorAll('*'));
        const index = new Map(all.map((el, i) => [el, i]));
        return {
            scrollY: window.scrollY || document.documentElement.scrollTop || 0,
            nodes: all.map(el => {
                const r = el.getBoundingClientRect();
                return {
                    position: window.getComputedStyle(el).position,
                    rect: { top: r.top, left: r.left },
                    children: Array.from(el.children)
                        .map(c => index.get(c))
                        .filter(i => i !== undefined),
                };
            }),
        };
    })()
"#;

/// Applies pin edits by document-order index; returns how many landed.
///
/// An element that is no longer fixed is skipped: the page may have shifted
/// the indices since the snapshot.
const APPLY_SCRIPT: &str = r#"
    (edits) => {
        const all = document.querySelectorAll('*');
        const pin = (el, prop, value) => el.style.setProperty(prop, value, 'important');
        let applied = 0;
        for (const e of edits) {
            const el = all[e.index];
            if (!el || window.getComputedStyle(el).position !== 'fixed') continue;
            pin(el, 'position', 'absolute');
            pin(el, 'top', e.top + 'px');
            pin(el, 'left', e.left + 'px');
            pin(el, 'bottom', 'auto');
            pin(el, 'right', 'auto');
            applied++;
        }
        return applied;
    }
"#;

/// Viewport-relative bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the viewport top
    pub top: f64,
    /// Distance from the viewport left edge
    pub left: f64,
}

/// One element of a [`DomSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    /// Computed `position` value
    pub position: String,
    /// Bounding rectangle at snapshot time
    pub rect: Rect,
    /// Indices of child elements
    #[serde(default)]
    pub children: Vec<usize>,
    /// Inline `top` written by a pin, in px
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_top: Option<f64>,
    /// Inline `left` written by a pin, in px
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_left: Option<f64>,
}

impl DomNode {
    /// Element with no children and no inline offsets
    pub fn new<S: Into<String>>(position: S, top: f64, left: f64) -> Self {
        Self {
            position: position.into(),
            rect: Rect { top, left },
            children: Vec::new(),
            inline_top: None,
            inline_left: None,
        }
    }

    /// Builder-style child list
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }
}

/// Element tree in document order plus the document scroll offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshot {
    /// Vertical scroll offset at snapshot time
    pub scroll_y: f64,
    /// Elements; index 0 is the root
    pub nodes: Vec<DomNode>,
}

impl DomSnapshot {
    /// Mirror pin edits onto the snapshot, as the page applies them.
    ///
    /// Edits landing on an element that is not fixed are ignored.
    pub fn apply(&mut self, edits: &[PinEdit]) {
        for edit in edits {
            if let Some(node) = self.nodes.get_mut(edit.index) {
                if node.position != "fixed" {
                    continue;
                }
                node.position = "absolute".to_string();
                node.inline_top = Some(edit.top);
                node.inline_left = Some(edit.left);
            }
        }
    }
}

/// Pin one element at a document position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PinEdit {
    /// Document-order index
    pub index: usize,
    /// New `top` in px
    pub top: f64,
    /// New `left` in px
    pub left: f64,
}

/// Rewrites fixed elements to absolute positioning
#[derive(Debug, Clone, Copy)]
pub struct PageNormalizer {
    max_depth: usize,
}

impl PageNormalizer {
    /// Normalizer visiting elements nested at most `max_depth` levels below the root
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Depth-first walk collecting an edit for every fixed element.
    ///
    /// Children are visited whether or not their parent was converted. In
    /// document order a child always follows its parent, so child indices not
    /// greater than the parent's are dropped; each element is visited at most
    /// once even if the page reports a cycle.
    pub fn plan(&self, snapshot: &DomSnapshot) -> Vec<PinEdit> {
        let mut edits = Vec::new();
        if snapshot.nodes.is_empty() {
            return edits;
        }

        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            let node = &snapshot.nodes[index];

            if node.position == "fixed" {
                edits.push(PinEdit {
                    index,
                    top: node.rect.top + snapshot.scroll_y,
                    left: node.rect.left,
                });
            }

            if depth >= self.max_depth {
                if !node.children.is_empty() {
                    debug!("Depth limit {} reached at element {}", self.max_depth, index);
                }
                continue;
            }

            for &child in node.children.iter().rev() {
                if child > index && child < snapshot.nodes.len() {
                    stack.push((child, depth + 1));
                }
            }
        }

        edits
    }

    /// Convert every fixed element of the live page; returns how many were converted.
    #[instrument(skip(self, session))]
    pub async fn normalize_fixed_elements<S>(&self, session: &mut S) -> Result<usize>
    where
        S: BrowserSession + ?Sized,
    {
        let raw = session.evaluate(SNAPSHOT_SCRIPT).await?;
        let snapshot: DomSnapshot = serde_json::from_value(raw)?;
        debug!(
            "DOM snapshot: {} elements, scroll_y={}",
            snapshot.nodes.len(),
            snapshot.scroll_y
        );

        let edits = self.plan(&snapshot);
        if edits.is_empty() {
            debug!("No fixed elements found");
            return Ok(0);
        }

        let script = format!("({})({})", APPLY_SCRIPT, serde_json::to_string(&edits)?);
        let applied = session
            .evaluate(&script)
            .await?
            .as_u64()
            .unwrap_or(0) as usize;

        info!("Pinned {} of {} fixed elements", applied, edits.len());
        Ok(applied)
    }
}
