use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DownloadId;

/// Descriptor of one clickable element scraped off the conversion page.
/// Field names match the JSON produced by the in-page collection script,
/// and the serialized list is what lands in the debug element dump.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageElement {
    pub tag: String,
    pub text: String,
    pub value: String,
    pub title: String,
    pub aria_label: String,
    pub css_class: String,
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

/// What ended the wait for a binary transfer. A sniffed media response is
/// the hard signal; the settle timeout elapsing is the soft fallback, and
/// both hand over to the materializer.
#[derive(Debug, Clone)]
pub enum TransferSignal {
    MediaResponse {
        url: String,
        content_type: Option<String>,
    },
    SettleTimeout,
}

/// Screenshot and element dump captured when the page cannot be parsed,
/// persisted next to the output files for the debug endpoint.
#[derive(Debug, Clone)]
pub struct DebugCapture {
    pub screenshot_png: Vec<u8>,
    pub elements: Vec<PageElement>,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),
    #[error("navigation timed out after {0} seconds")]
    NavigationTimeout(u64),
    #[error("no URL input control found on the page")]
    InputNotFound,
    #[error("no download trigger found on the page")]
    TriggerNotFound,
    #[error("no transfer detected within {0} seconds")]
    TransferNotDetected(u64),
    #[error("page interaction failed: {0}")]
    Page(String),
}

impl DriverError {
    /// Locator failures are the ones worth a screenshot and element dump:
    /// they mean the third-party page changed shape under us.
    pub fn warrants_debug_capture(&self) -> bool {
        matches!(self, DriverError::InputNotFound | DriverError::TriggerNotFound)
    }
}

/// Factory for per-job browser sessions. One session per job; sessions are
/// never shared so a job's page state cannot leak into another's.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn open_session(&self, job_id: DownloadId) -> Result<Box<dyn BrowserSession>, DriverError>;
}

/// An isolated browser context driving the third-party conversion page.
/// Callers must invoke `close` on every exit path; implementations also
/// reap the underlying browser process on drop as a last resort.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load the conversion page, bounded by the navigation timeout.
    async fn navigate(&mut self, page_url: &str) -> Result<(), DriverError>;

    /// Locate the URL input control, clear it, and type the source URL.
    async fn fill_source_url(&mut self, source_url: &str) -> Result<(), DriverError>;

    /// Submit the wrapping form if there is one, otherwise find and click
    /// a trigger element via the locator heuristic.
    async fn submit(&mut self) -> Result<(), DriverError>;

    /// Race a media-looking network response against the settle timeout.
    async fn await_transfer(&mut self) -> Result<TransferSignal, DriverError>;

    /// Full-page screenshot plus the clickable-element dump.
    async fn capture_debug(&mut self) -> Result<DebugCapture, DriverError>;

    /// Tear down the browser context. Must be safe to call after errors.
    async fn close(&mut self);
}
