use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Process-level configuration, read once at startup from the
/// environment. Everything has a default so a bare `clipfetch` run works.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub downloads: DownloadSettings,
    pub browser: BrowserSettings,
    pub janitor: JanitorSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSettings {
    /// Directory where the browser drops transfers and finished artifacts
    /// live. Also receives the debug screenshots and element dumps.
    pub output_dir: PathBuf,
    /// Artifacts below this size are rejected as truncated.
    pub min_artifact_bytes: u64,
    /// Wait before the materializer scans the directory.
    pub settle_ms: u64,
    /// Maximum age for extension-matched candidate files.
    pub recency_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// The third-party conversion page every job is driven through.
    pub conversion_page_url: String,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub navigation_timeout_secs: u64,
    /// Settle timeout for the transfer-or-timeout race after the trigger
    /// click.
    pub transfer_timeout_secs: u64,
    /// Hard ceiling on one job's entire pipeline.
    pub job_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JanitorSettings {
    pub interval_secs: u64,
    pub retention_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0".to_string()),
                port: env_parse("SERVER_PORT", 3000),
            },
            downloads: DownloadSettings {
                output_dir: PathBuf::from(env_or(
                    "OUTPUT_DIR",
                    "converted_media".to_string(),
                )),
                min_artifact_bytes: env_parse("MIN_ARTIFACT_BYTES", 1024),
                settle_ms: env_parse("MATERIALIZE_SETTLE_MS", 2000),
                recency_window_secs: env_parse("RECENCY_WINDOW_SECS", 120),
            },
            browser: BrowserSettings {
                conversion_page_url: env_or(
                    "CONVERSION_PAGE_URL",
                    "https://savefrom.net".to_string(),
                ),
                headless: env_parse("BROWSER_HEADLESS", true),
                chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from),
                navigation_timeout_secs: env_parse("NAVIGATION_TIMEOUT_SECS", 30),
                transfer_timeout_secs: env_parse("TRANSFER_TIMEOUT_SECS", 20),
                job_timeout_secs: env_parse("JOB_TIMEOUT_SECS", 180),
            },
            janitor: JanitorSettings {
                interval_secs: env_parse("JANITOR_INTERVAL_SECS", 300),
                retention_secs: env_parse("RETENTION_SECS", 3600),
            },
        }
    }
}

impl DownloadSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn recency_window(&self) -> Duration {
        Duration::from_secs(self.recency_window_secs)
    }
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

impl JanitorSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
