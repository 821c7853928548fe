use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::errors::DownloadError;
use crate::localizations::Localizations;
use crate::orchestrator::{DownloadOutcome, DownloadPhase};
use crate::validation::is_youtube_url;

pub const VIDEO_QUALITIES: [&str; 4] = ["1080p", "720p", "480p", "360p"];
pub const AUDIO_QUALITIES: [&str; 3] = ["320 kbps", "192 kbps", "128 kbps"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DownloadFormat {
    #[serde(rename = "mp4")]
    MP4,
    #[serde(rename = "mp3")]
    MP3,
}

impl Default for DownloadFormat {
    fn default() -> Self {
        Self::MP4
    }
}

impl DownloadFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::MP4 => "mp4",
            Self::MP3 => "mp3",
        }
    }

    pub fn quality_options(self) -> &'static [&'static str] {
        match self {
            Self::MP4 => &VIDEO_QUALITIES,
            Self::MP3 => &AUDIO_QUALITIES,
        }
    }

    pub fn default_quality(self) -> &'static str {
        self.quality_options()[0]
    }

    /// Name and extensions for the save dialog filter.
    pub fn file_filter(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::MP4 => ("MP4 video", &["mp4"]),
            Self::MP3 => ("MPEG audio", &["mp3"]),
        }
    }
}

/// oEmbed response fields we use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author_name: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub thumbnail_width: Option<u32>,
    #[serde(default)]
    pub thumbnail_height: Option<u32>,
}

/// Body of the backend job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format: DownloadFormat,
    pub quality: String,
}

/// Successful backend reply to a job submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub url: String,
    pub format: DownloadFormat,
    pub quality: String,
    pub metadata: Option<VideoMetadata>,
    /// Reference the loaded metadata belongs to.
    pub metadata_url: Option<String>,
    /// Reference of the preview request in flight, if any.
    pub pending_metadata: Option<String>,
    pub is_downloading: bool,
    pub phase: DownloadPhase,
    pub notification: Option<Notification>,
    pub settings_open: bool,
    pub settings_draft: BackendConfig,
    pub checking_backend: bool,
}

impl AppState {
    pub fn new() -> Self {
        let format = DownloadFormat::default();
        Self {
            format,
            quality: format.default_quality().to_string(),
            ..Default::default()
        }
    }

    pub fn reference(&self) -> &str {
        self.url.trim()
    }

    pub fn is_url_valid(&self) -> bool {
        is_youtube_url(self.reference())
    }

    /// Replaces the input with pasted text. Blank clipboard contents leave it
    /// untouched.
    pub fn paste_url(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.url = text.to_string();
        true
    }

    pub fn is_loading_metadata(&self) -> bool {
        self.pending_metadata.is_some()
    }

    /// Switches format. A quality that is not offered by the new format is
    /// replaced by that format's first option.
    pub fn set_format(&mut self, format: DownloadFormat) {
        self.format = format;
        if !format.quality_options().contains(&self.quality.as_str()) {
            self.quality = format.default_quality().to_string();
        }
    }

    /// Clears the current metadata and returns the reference to fetch.
    pub fn begin_metadata_fetch(&mut self) -> Result<String, DownloadError> {
        if !self.is_url_valid() {
            return Err(DownloadError::InvalidReference);
        }
        let reference = self.reference().to_string();
        self.metadata = None;
        self.metadata_url = None;
        self.pending_metadata = Some(reference.clone());
        Ok(reference)
    }

    /// Applies a fetch result. Returns false when the result belongs to an
    /// older request and was dropped.
    pub fn finish_metadata_fetch(
        &mut self,
        reference: &str,
        result: &Result<VideoMetadata, DownloadError>,
    ) -> bool {
        if self.pending_metadata.as_deref() != Some(reference) {
            return false;
        }
        self.pending_metadata = None;
        if let Ok(metadata) = result {
            self.metadata = Some(metadata.clone());
            self.metadata_url = Some(reference.to_string());
        }
        true
    }

    /// Metadata for the reference currently in the input, if loaded.
    pub fn current_metadata(&self) -> Option<&VideoMetadata> {
        match &self.metadata_url {
            Some(url) if url == self.reference() => self.metadata.as_ref(),
            _ => None,
        }
    }

    pub fn download_request(&self) -> DownloadRequest {
        DownloadRequest {
            url: self.reference().to_string(),
            format: self.format,
            quality: self.quality.clone(),
        }
    }

    pub fn finish_download(&mut self, outcome: &DownloadOutcome, localizer: &Localizations) {
        self.is_downloading = false;
        self.phase = outcome.phase();
        if let Some(notification) = outcome.notification(localizer) {
            self.notification = Some(notification);
        }
    }
}
