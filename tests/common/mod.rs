//! Scripted in-memory browser session shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use pagestitch::error::{AuthenticationError, CaptureError, Error, NavigationError, Result};
use pagestitch::{BrowserSession, ProxyCredentials};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded session call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    Snapshot,
    ApplyPins(usize),
    MeasureHeight,
    ScrollTo(u32),
    Capture { offset: u32, at: tokio::time::Instant },
    Authenticate(String),
    Close,
}

/// What the mock returns, plus everything it saw
#[derive(Debug)]
pub struct MockState {
    pub navigate_results: VecDeque<std::result::Result<(), NavigationError>>,
    pub auth_result: std::result::Result<(), AuthenticationError>,
    pub close_result_is_err: bool,
    pub page_height: f64,
    pub snapshot: Value,
    pub viewport: (u32, u32),
    pub fail_capture_at: Option<u32>,
    pub calls: Vec<Call>,
    pub close_count: usize,
    scroll_offset: u32,
}

/// Cloneable handle: the test keeps one, the orchestrator consumes the other
#[derive(Clone)]
pub struct MockSession {
    pub state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new(viewport_width: u32, viewport_height: u32, page_height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                navigate_results: VecDeque::new(),
                auth_result: Ok(()),
                close_result_is_err: false,
                page_height: f64::from(page_height),
                snapshot: json!({
                    "scrollY": 0,
                    "nodes": [{ "position": "static", "rect": { "top": 0, "left": 0 }, "children": [] }]
                }),
                viewport: (viewport_width, viewport_height),
                fail_capture_at: None,
                calls: Vec::new(),
                close_count: 0,
                scroll_offset: 0,
            })),
        }
    }

    pub fn fail_navigations(self, errors: Vec<NavigationError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .navigate_results
            .extend(errors.into_iter().map(Err));
        self
    }

    pub fn reject_auth(self) -> Self {
        self.state.lock().unwrap().auth_result =
            Err(AuthenticationError::Rejected("407 Proxy Authentication Required".to_string()));
        self
    }

    pub fn fail_capture_at(self, offset: u32) -> Self {
        self.state.lock().unwrap().fail_capture_at = Some(offset);
        self
    }

    pub fn fail_close(self) -> Self {
        self.state.lock().unwrap().close_result_is_err = true;
        self
    }

    pub fn with_snapshot(self, snapshot: Value) -> Self {
        self.state.lock().unwrap().snapshot = snapshot;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().close_count
    }

    pub fn navigate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Navigate(_)))
            .count()
    }

    pub fn captured_offsets(&self) -> Vec<u32> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                Call::Capture { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect()
    }
}

/// Colour identifying the tile taken at `offset`
pub fn color_for(offset: u32) -> Rgba<u8> {
    Rgba([(offset % 251) as u8, (offset / 251 % 251) as u8, 200, 255])
}

/// PNG of a solid colour
pub fn solid_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, color);
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(
        &mut self,
        url: &str,
        _timeout: Duration,
    ) -> std::result::Result<(), NavigationError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Navigate(url.to_string()));
        state.navigate_results.pop_front().unwrap_or(Ok(()))
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        if script.contains("getBoundingClientRect") {
            state.calls.push(Call::Snapshot);
            Ok(state.snapshot.clone())
        } else if script.contains("applied") {
            let pins = script.matches("\"index\"").count();
            state.calls.push(Call::ApplyPins(pins));
            Ok(json!(pins))
        } else if script.contains("scrollHeight") {
            state.calls.push(Call::MeasureHeight);
            Ok(json!(state.page_height))
        } else {
            Ok(Value::Null)
        }
    }

    async fn scroll_to(&mut self, offset: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ScrollTo(offset));
        state.scroll_offset = offset;
        Ok(())
    }

    async fn capture_viewport(&mut self) -> std::result::Result<Vec<u8>, CaptureError> {
        let mut state = self.state.lock().unwrap();
        let offset = state.scroll_offset;
        state.calls.push(Call::Capture {
            offset,
            at: tokio::time::Instant::now(),
        });
        if state.fail_capture_at == Some(offset) {
            return Err(CaptureError::ScreenshotFailed {
                offset,
                reason: "target crashed".to_string(),
            });
        }
        let (width, height) = state.viewport;
        Ok(solid_png(width, height, color_for(offset)))
    }

    async fn authenticate(
        &mut self,
        credentials: &ProxyCredentials,
    ) -> std::result::Result<(), AuthenticationError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::Authenticate(credentials.username.clone()));
        state.auth_result.clone()
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Close);
        state.close_count += 1;
        if state.close_result_is_err {
            return Err(Error::cdp("connection already torn down"));
        }
        Ok(())
    }
}
