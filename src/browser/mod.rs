//! Browser session module
//!
//! The [`BrowserSession`] capability the capture pipeline drives, its
//! ChromiumOxide implementation, and URL validation / navigation.

pub mod controller;
pub mod navigation;
pub mod session;

pub use controller::ChromeSession;
pub use navigation::{PageNavigator, UrlValidator};
pub use session::BrowserSession;
