//! pagestitch CLI
//!
//! Captures one page and writes the stitched PNG to disk.

use anyhow::Context;
use clap::Parser;
use pagestitch::{capture_full_page, CaptureConfig, ProxyCredentials};
use std::path::PathBuf;

/// Full-page screenshot of a web page
#[derive(Parser, Debug)]
#[command(name = "pagestitch")]
#[command(version)]
#[command(about = "Capture a full-page screenshot by scrolling and stitching viewport tiles")]
struct Args {
    /// URL to capture
    url: String,

    /// Output file
    #[arg(short, long, default_value = "screenshot.png")]
    output: PathBuf,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Viewport width
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height
    #[arg(long)]
    height: Option<u32>,

    /// Overlap between consecutive tiles in pixels
    #[arg(long)]
    overlap: Option<u32>,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Proxy server, e.g. http://proxy:8080
    #[arg(long)]
    proxy_server: Option<String>,

    /// Proxy username for the retry path
    #[arg(long, requires = "proxy_password")]
    proxy_username: Option<String>,

    /// Proxy password for the retry path
    #[arg(long, env = "PAGESTITCH_PROXY_PASSWORD", hide_env_values = true)]
    proxy_password: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(String, PathBuf, CaptureConfig)> {
        let mut config = match &self.config {
            Some(path) => CaptureConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CaptureConfig::default(),
        };

        if let Some(width) = self.width {
            config.viewport_width = width;
        }
        if let Some(height) = self.height {
            config.viewport_height = height;
        }
        if let Some(overlap) = self.overlap {
            config.overlap = overlap;
        }
        if let Some(path) = self.chrome_path {
            config.browser_executable = Some(path);
        }
        if let Some(server) = self.proxy_server {
            config.use_proxy = true;
            config.proxy_server = Some(server);
        }
        if let (Some(username), Some(password)) = (self.proxy_username, self.proxy_password) {
            config.use_proxy = true;
            config.proxy_credentials = Some(ProxyCredentials::new(username, password));
        }
        if self.headful {
            config.headless = false;
        }

        Ok((self.url, self.output, config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (url, output, config) = args.into_config()?;

    let shot = capture_full_page(&url, config)
        .await
        .with_context(|| format!("capturing {}", url))?;

    shot.save(&output)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        "Saved {}x{} screenshot ({} bytes) to {}",
        shot.width,
        shot.height,
        shot.size(),
        output.display()
    );
    Ok(())
}
