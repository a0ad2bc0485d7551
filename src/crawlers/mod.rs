pub mod crawler;
pub mod discovery;
pub mod extraction;
pub mod pool;
pub mod webdriver;

#[cfg(test)]
mod tests;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use crawler::{JobContext, SessionJob, execute};
pub use discovery::DiscoveryJob;
pub use extraction::{ExtractionJob, Stage};
pub use pool::{JobFailure, PhaseReport, run_phase};
pub use webdriver::WebDriverBrowser;

/// Hands out independent browser sessions, one per job
#[async_trait]
pub trait Browser: Send + Sync {
    /// Start a fresh session. The caller must [`BrowserSession::close`] it.
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A single live browser session.
///
/// Every query is by CSS selector against the currently rendered page.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to a URL
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Poll until `css` matches something, failing with a timeout error
    async fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<()>;

    /// Number of elements currently matching `css`
    async fn count(&mut self, css: &str) -> Result<usize>;

    /// Wait for `css` to appear, then click the first match.
    /// An element that never appears is a layout mismatch.
    async fn click(&mut self, css: &str, timeout: Duration) -> Result<()>;

    /// Outer markup of the first element matching `css`
    async fn outer_html(&mut self, css: &str) -> Result<String>;

    /// Markup of the whole page
    async fn source(&mut self) -> Result<String>;

    /// End the session and release the browser
    async fn close(self: Box<Self>) -> Result<()>;
}
