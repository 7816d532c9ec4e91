use std::fmt;
use std::str::FromStr;

/// Closed set of output containers a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Mp4,
    Webm,
    Mkv,
    Mp3,
    M4a,
    Wav,
}

/// Extensions the materializer accepts when matching freshly written
/// files that do not embed the job id in their name.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mkv", "mov", "avi", "mp3", "m4a", "wav", "aac", "ogg", "opus", "flac",
];

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Webm => "webm",
            MediaFormat::Mkv => "mkv",
            MediaFormat::Mp3 => "mp3",
            MediaFormat::M4a => "m4a",
            MediaFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::Webm => "video/webm",
            MediaFormat::Mkv => "video/x-matroska",
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::M4a => "audio/mp4",
            MediaFormat::Wav => "audio/wav",
        }
    }

    pub fn supported() -> &'static [&'static str] {
        &["mp4", "webm", "mkv", "mp3", "m4a", "wav"]
    }
}

impl Default for MediaFormat {
    fn default() -> Self {
        MediaFormat::Mp4
    }
}

impl FromStr for MediaFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(MediaFormat::Mp4),
            "webm" => Ok(MediaFormat::Webm),
            "mkv" => Ok(MediaFormat::Mkv),
            "mp3" => Ok(MediaFormat::Mp3),
            "m4a" => Ok(MediaFormat::M4a),
            "wav" => Ok(MediaFormat::Wav),
            other => Err(format!(
                "Unsupported format: {}. Expected one of: {}",
                other,
                Self::supported().join(", ")
            )),
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
