use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;

use crate::application::ports::{
    BrowserDriver, BrowserSession, DebugCapture, DriverError, PageElement, TransferSignal,
};
use crate::application::services::LocatorPolicy;
use crate::domain::DownloadId;

/// Selectors tried in order when hunting for the URL input control:
/// placeholder hints first, then any text-type input or textarea.
const INPUT_SELECTORS: &[&str] = &[
    "input[placeholder*='url' i]",
    "input[placeholder*='link' i]",
    "textarea[placeholder*='url' i]",
    "textarea[placeholder*='link' i]",
    "input[type='url']",
    "input[type='text']",
    "textarea",
];

/// In-page script returning one descriptor per clickable element, in DOM
/// order. The same scan backs trigger selection, the click-by-index step
/// and the debug element dump, so indices stay consistent across calls as
/// long as the DOM does not mutate in between.
const CLICKABLE_SCAN_JS: &str = r#"
(() => {
    const els = Array.from(document.querySelectorAll(
        "a, button, [role='button'], input[type='submit'], input[type='button']"
    ));
    return els.map(el => {
        const r = el.getBoundingClientRect();
        const s = window.getComputedStyle(el);
        return {
            tag: el.tagName.toLowerCase(),
            text: (el.innerText || '').trim(),
            value: el.value || '',
            title: el.title || '',
            aria_label: el.getAttribute('aria-label') || '',
            css_class: typeof el.className === 'string' ? el.className : '',
            id: el.id || '',
            width: r.width,
            height: r.height,
            visible: r.width > 0 && r.height > 0
                && s.visibility !== 'hidden' && s.display !== 'none'
        };
    });
})()
"#;

#[derive(Debug, Clone)]
pub struct ChromiumDriverConfig {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub download_dir: PathBuf,
    pub navigation_timeout: Duration,
    pub transfer_timeout: Duration,
}

/// CDP-backed driver launching one Chromium process per job.
pub struct ChromiumDriver {
    config: ChromiumDriverConfig,
    policy: LocatorPolicy,
}

impl ChromiumDriver {
    pub fn new(config: ChromiumDriverConfig, policy: LocatorPolicy) -> Self {
        Self { config, policy }
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn open_session(
        &self,
        job_id: DownloadId,
    ) -> Result<Box<dyn BrowserSession>, DriverError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1366, 900)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(DriverError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Route the browser's download manager at our output directory so
        // the deterministic handoff works; the materializer's recency scan
        // remains the fallback when the page streams the file instead.
        let download_behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(self.config.download_dir.display().to_string())
            .build()
            .map_err(DriverError::Page)?;
        browser
            .execute(download_behavior)
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?;

        tracing::debug!(job_id = %job_id, "Browser session opened");

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
            navigation_timeout: self.config.navigation_timeout,
            transfer_timeout: self.config.transfer_timeout,
            policy: self.policy.clone(),
            input_selector: None,
            closed: false,
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
    navigation_timeout: Duration,
    transfer_timeout: Duration,
    policy: LocatorPolicy,
    /// Selector that matched during `fill_source_url`, reused for the
    /// direct form-submission attempt.
    input_selector: Option<&'static str>,
    closed: bool,
}

impl ChromiumSession {
    async fn scan_clickables(&self) -> Result<Vec<PageElement>, DriverError> {
        self.page
            .evaluate(CLICKABLE_SCAN_JS)
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?
            .into_value::<Vec<PageElement>>()
            .map_err(|e| DriverError::Page(e.to_string()))
    }

    async fn click_nth_clickable(&self, index: usize) -> Result<(), DriverError> {
        let script = format!(
            r#"
            (() => {{
                const els = Array.from(document.querySelectorAll(
                    "a, button, [role='button'], input[type='submit'], input[type='button']"
                ));
                const el = els[{index}];
                if (!el) return false;
                el.click();
                return true;
            }})()
            "#
        );
        let clicked = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?
            .into_value::<bool>()
            .unwrap_or(false);
        if clicked {
            Ok(())
        } else {
            Err(DriverError::TriggerNotFound)
        }
    }

    /// Submit the form wrapping the input control, if any. Returns whether
    /// a form was actually submitted.
    async fn try_form_submit(&self) -> Result<bool, DriverError> {
        let Some(selector) = self.input_selector else {
            return Ok(false);
        };
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector("{selector}");
                const form = el && el.form;
                if (!form) return false;
                if (form.requestSubmit) form.requestSubmit(); else form.submit();
                return true;
            }})()
            "#
        );
        let submitted = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?
            .into_value::<bool>()
            .unwrap_or(false);
        Ok(submitted)
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, page_url: &str) -> Result<(), DriverError> {
        let load = async {
            self.page
                .goto(page_url)
                .await
                .map_err(|e| DriverError::Page(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| DriverError::Page(e.to_string()))?;
            // Brief settle after the load event so late XHR-driven UI has
            // a chance to render before we start probing the DOM.
            tokio::time::sleep(Duration::from_millis(750)).await;
            Ok(())
        };
        tokio::time::timeout(self.navigation_timeout, load)
            .await
            .map_err(|_| DriverError::NavigationTimeout(self.navigation_timeout.as_secs()))?
    }

    async fn fill_source_url(&mut self, source_url: &str) -> Result<(), DriverError> {
        for selector in INPUT_SELECTORS {
            let Ok(element) = self.page.find_element(*selector).await else {
                continue;
            };
            element
                .click()
                .await
                .map_err(|e| DriverError::Page(e.to_string()))?;
            let clear = format!(
                r#"(() => {{ const el = document.querySelector("{selector}"); if (el) el.value = ''; }})()"#
            );
            self.page
                .evaluate(clear)
                .await
                .map_err(|e| DriverError::Page(e.to_string()))?;
            element
                .type_str(source_url)
                .await
                .map_err(|e| DriverError::Page(e.to_string()))?;
            self.input_selector = Some(selector);
            tracing::debug!(selector = %selector, "Source URL entered");
            return Ok(());
        }
        Err(DriverError::InputNotFound)
    }

    async fn submit(&mut self) -> Result<(), DriverError> {
        if self.try_form_submit().await? {
            tracing::debug!("Form submitted directly");
            return Ok(());
        }

        let clickables = self.scan_clickables().await?;
        let index = self
            .policy
            .select_trigger(&clickables)
            .ok_or(DriverError::TriggerNotFound)?;
        tracing::debug!(
            index,
            tag = %clickables[index].tag,
            text = %clickables[index].text,
            "Trigger element selected"
        );
        self.click_nth_clickable(index).await
    }

    async fn await_transfer(&mut self) -> Result<TransferSignal, DriverError> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?;

        let settle = tokio::time::sleep(self.transfer_timeout);
        tokio::pin!(settle);

        loop {
            tokio::select! {
                maybe_event = responses.next() => match maybe_event {
                    Some(event) => {
                        let response = &event.response;
                        if looks_like_media(&response.mime_type, &response.url) {
                            return Ok(TransferSignal::MediaResponse {
                                url: response.url.clone(),
                                content_type: Some(response.mime_type.clone()),
                            });
                        }
                    }
                    // The event stream only closes when the page or the
                    // CDP connection died under us.
                    None => {
                        return Err(DriverError::TransferNotDetected(
                            self.transfer_timeout.as_secs(),
                        ));
                    }
                },
                _ = &mut settle => return Ok(TransferSignal::SettleTimeout),
            }
        }
    }

    async fn capture_debug(&mut self) -> Result<DebugCapture, DriverError> {
        let screenshot_png = self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| DriverError::Page(e.to_string()))?;
        let elements = self.scan_clickables().await.unwrap_or_default();
        Ok(DebugCapture {
            screenshot_png,
            elements,
        })
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.browser.close().await {
                tracing::warn!(error = %e, "Browser close failed");
            }
            let _ = self.browser.wait().await;
        }
        self.handler_task.abort();
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Browser kills its child process when dropped without a graceful
        // close, which covers cancellation by the job-level timeout.
        self.handler_task.abort();
    }
}

/// Does this network response look like the media payload itself?
fn looks_like_media(mime_type: &str, url: &str) -> bool {
    let mime = mime_type.to_ascii_lowercase();
    if mime.starts_with("video/") || mime.starts_with("audio/") {
        return true;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    let by_extension = crate::domain::MEDIA_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(&format!(".{ext}")));
    by_extension || (mime == "application/octet-stream" && path.contains("download"))
}
