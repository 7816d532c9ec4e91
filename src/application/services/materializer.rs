use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::domain::{DownloadId, MediaFormat, MEDIA_EXTENSIONS};

/// The validated output file of a completed job.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("no downloaded file found for this job")]
    NoCandidate,
    #[error("downloaded file is {size} bytes, below the {min} byte minimum")]
    TooSmall { size: u64, min: u64 },
    #[error("download directory error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    file_name: String,
    modified: SystemTime,
}

/// Resolves which file on disk belongs to a job once the browser signals
/// (or is assumed) to have started a transfer, then canonicalizes it to
/// `{id}.{format}` and validates it.
#[derive(Debug, Clone)]
pub struct Materializer {
    download_dir: PathBuf,
    /// Wait inserted before scanning, letting the browser flush the file.
    settle: Duration,
    /// How recent a file's mtime must be for the extension-based matching
    /// strategy; filters out artifacts of other, older jobs.
    recency_window: Duration,
    min_artifact_bytes: u64,
}

impl Materializer {
    pub fn new(
        download_dir: PathBuf,
        settle: Duration,
        recency_window: Duration,
        min_artifact_bytes: u64,
    ) -> Self {
        Self {
            download_dir,
            settle,
            recency_window,
            min_artifact_bytes,
        }
    }

    pub async fn materialize(
        &self,
        id: DownloadId,
        format: MediaFormat,
    ) -> Result<Artifact, MaterializeError> {
        tokio::time::sleep(self.settle).await;

        let candidates = self.scan_candidates(id).await?;
        let winner = select_winner(candidates).ok_or(MaterializeError::NoCandidate)?;

        let target = self.download_dir.join(format!("{}.{}", id, format));
        if winner.path != target {
            match tokio::fs::rename(&winner.path, &target).await {
                Ok(()) => {}
                // The janitor may have reaped the candidate between the
                // scan and the rename; report it as a missing candidate
                // rather than an I/O crash.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(MaterializeError::NoCandidate);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let size = tokio::fs::metadata(&target).await?.len();
        if size < self.min_artifact_bytes {
            return Err(MaterializeError::TooSmall {
                size,
                min: self.min_artifact_bytes,
            });
        }

        tracing::debug!(job_id = %id, path = %target.display(), size, "Artifact materialized");
        Ok(Artifact { path: target, size })
    }

    /// Two matching strategies, evaluated in OR: the filename embeds the
    /// job id, or the file carries a known media extension and was written
    /// within the recency window.
    async fn scan_candidates(&self, id: DownloadId) -> Result<Vec<Candidate>, MaterializeError> {
        let id_str = id.to_string();
        let now = SystemTime::now();
        let mut candidates = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.download_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let file_name = entry.file_name().to_string_lossy().into_owned();

            // Chrome keeps in-flight transfers under a .crdownload suffix.
            if file_name.ends_with(".crdownload") || file_name.ends_with(".part") {
                continue;
            }

            let modified = meta.modified().unwrap_or(now);
            let by_id = file_name.contains(&id_str);
            let by_extension = has_media_extension(&file_name)
                && now
                    .duration_since(modified)
                    .map(|age| age <= self.recency_window)
                    .unwrap_or(true);

            if by_id || by_extension {
                candidates.push(Candidate {
                    path: entry.path(),
                    file_name,
                    modified,
                });
            }
        }

        Ok(candidates)
    }
}

/// Most recent mtime wins; equal mtimes fall back to the lexicographically
/// smallest name so the pick stays deterministic.
fn select_winner(mut candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.sort_by(|a, b| {
        a.modified
            .cmp(&b.modified)
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
    candidates.pop()
}

fn has_media_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
