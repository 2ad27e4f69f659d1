//! URL validation and page navigation
//!
//! Validation runs before any browser interaction. Navigation is a single
//! bounded attempt: retrying is the orchestrator's decision, not ours.

use crate::error::{ConfigError, NavigationError};
use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Longest URL accepted for navigation
pub const MAX_URL_LEN: usize = 2048;

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Validate a URL for navigation
    pub fn validate(url: &str) -> Result<Url, ConfigError> {
        if url.is_empty() {
            return Err(ConfigError::InvalidUrl("URL cannot be empty".to_string()));
        }

        if url.len() > MAX_URL_LEN {
            return Err(ConfigError::InvalidUrl(format!(
                "URL exceeds maximum length of {} characters",
                MAX_URL_LEN
            )));
        }

        let parsed = Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", url, e)))?;

        match parsed.scheme() {
            "http" | "https" | "file" => Ok(parsed),
            other => Err(ConfigError::InvalidUrl(format!(
                "URL must use http, https or file, got {}: {}",
                other, url
            ))),
        }
    }
}

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate once, bounded by `timeout`, then wait for the load event.
    #[instrument(skip(page))]
    pub async fn goto(page: &Page, url: &str, timeout: Duration) -> Result<(), NavigationError> {
        let timeout_ms = timeout.as_millis() as u64;
        info!("Navigating to: {}", url);

        tokio::time::timeout(timeout, async {
            page.goto(url)
                .await
                .map_err(|e| classify_failure(e.to_string()))?;
            Self::wait_for_load(page).await
        })
        .await
        .map_err(|_| NavigationError::Timeout(timeout_ms))??;

        debug!("Navigation complete: {}", url);
        Ok(())
    }

    async fn wait_for_load(page: &Page) -> Result<(), NavigationError> {
        let script = r#"
            new Promise(resolve => {
                if (document.readyState === 'complete') {
                    resolve(true);
                } else {
                    window.addEventListener('load', () => resolve(true));
                }
            })
        "#;

        page.evaluate(script)
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;
        Ok(())
    }
}

/// Chrome reports transport failures as `net::ERR_*` codes.
fn classify_failure(message: String) -> NavigationError {
    if message.contains("net::ERR_") {
        NavigationError::NetworkError(message)
    } else {
        NavigationError::LoadFailed(message)
    }
}
