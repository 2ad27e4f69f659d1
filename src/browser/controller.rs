//! Chromium-backed browser session
//!
//! Launches one browser with one page sized to the capture viewport and
//! implements [`BrowserSession`] over it through ChromiumOxide.

use super::navigation::PageNavigator;
use super::session::BrowserSession;
use crate::config::{CaptureConfig, ProxyCredentials};
use crate::error::{
    AuthenticationError, BrowserError, CaptureError, Error, NavigationError, Result,
};
use async_trait::async_trait;
use chromiumoxide::auth::Credentials;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// How long `close` waits for the CDP handler task to drain
const HANDLER_SHUTDOWN: Duration = Duration::from_secs(5);

/// A launched browser plus the single page a capture run drives.
pub struct ChromeSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    scroll_offset: u32,
}

impl ChromeSession {
    /// Launch a browser configured for `config` and open a blank page.
    #[instrument(skip(config))]
    pub async fn launch(config: &CaptureConfig) -> Result<Self> {
        info!(
            "Launching browser: viewport={}x{} headless={} proxy={}",
            config.viewport_width, config.viewport_height, config.headless, config.use_proxy
        );

        let mut builder = CdpBrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            });

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.arg("--no-sandbox");
        }

        if let Some(ref path) = config.browser_executable {
            builder = builder.chrome_executable(path);
        }

        if config.use_proxy {
            if let Some(ref server) = config.proxy_server {
                builder = builder.arg(format!("--proxy-server={}", server));
            }
        }

        let cdp_config = builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        let mut session = Self {
            browser: Some(browser),
            page: None,
            handler: Some(handler_task),
            scroll_offset: 0,
        };

        let page = match session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                let _ = session.close().await;
                return Err(e);
            }
        };
        session.page = Some(page);

        info!("Browser launched successfully");
        Ok(session)
    }

    async fn new_page(&self) -> Result<Page> {
        let browser = self.browser.as_ref().ok_or(BrowserError::AlreadyClosed)?;
        browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()).into())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::AlreadyClosed.into())
    }

    /// Whether `close` has already run
    pub fn is_closed(&self) -> bool {
        self.browser.is_none()
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<(), NavigationError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| NavigationError::LoadFailed("browser already closed".to_string()))?;
        PageNavigator::goto(page, url, timeout).await?;
        self.scroll_offset = 0;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        let result = self.page()?.evaluate(script).await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn scroll_to(&mut self, offset: u32) -> Result<()> {
        let script = format!("window.scrollTo(0, {})", offset);
        self.page()?.evaluate(script.as_str()).await?;
        self.scroll_offset = offset;
        Ok(())
    }

    async fn capture_viewport(&mut self) -> std::result::Result<Vec<u8>, CaptureError> {
        let offset = self.scroll_offset;
        let page = self.page.as_ref().ok_or_else(|| CaptureError::ScreenshotFailed {
            offset,
            reason: "browser already closed".to_string(),
        })?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .from_surface(true)
            .capture_beyond_viewport(false)
            .build();

        let data = page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed {
                offset,
                reason: e.to_string(),
            })?;

        debug!("Viewport captured at offset {}: {} bytes", offset, data.len());
        Ok(data)
    }

    async fn authenticate(
        &mut self,
        credentials: &ProxyCredentials,
    ) -> std::result::Result<(), AuthenticationError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| AuthenticationError::Unavailable("browser already closed".to_string()))?;

        page.authenticate(Credentials {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
        .await
        .map_err(|e| AuthenticationError::Rejected(e.to_string()))?;

        debug!("Proxy credentials installed for {}", credentials.username);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            debug!("Browser already closed");
            return Ok(());
        };

        info!("Closing browser");
        self.page = None;

        let closed = browser.close().await.map_err(|e| Error::cdp(e.to_string()));

        if let Some(handler) = self.handler.take() {
            stop_handler(handler, HANDLER_SHUTDOWN).await;
        }

        closed?;
        info!("Browser closed");
        Ok(())
    }
}

/// Wait up to `grace` for the handler task, aborting it if it is still running.
/// Returns whether it finished on its own.
async fn stop_handler(mut handler: JoinHandle<()>, grace: Duration) -> bool {
    if tokio::time::timeout(grace, &mut handler).await.is_ok() {
        return true;
    }
    warn!("Browser handler did not stop in time, aborting it");
    handler.abort();
    false
}
