use thiserror::Error;

/// Everything that can end a preview or download attempt.
///
/// All of these are turned into a single notification by the shell, none of
/// them stop the application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("Enter a valid YouTube link.")]
    InvalidReference,

    #[error("Could not fetch video info: {0}")]
    MetadataUnavailable(String),

    #[error("Load video info first.")]
    MetadataRequired,

    #[error("Connect a backend to enable downloads.")]
    BackendNotConfigured,

    #[error("Save cancelled")]
    SaveCancelled,

    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Backend error: {0}")]
    BackendRejected(String),

    #[error("Could not retrieve the file: {0}")]
    RetrievalFailed(String),

    #[error("Could not save the file: {0}")]
    PersistenceFailed(String),
}

impl DownloadError {
    /// Localization key of the message template, `{detail}` being the
    /// variant's payload.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::InvalidReference => "error-invalid-reference",
            Self::MetadataUnavailable(_) => "error-metadata-unavailable",
            Self::MetadataRequired => "error-metadata-required",
            Self::BackendNotConfigured => "error-backend-not-configured",
            Self::SaveCancelled => "error-save-cancelled",
            Self::BackendUnreachable(_) => "error-backend-unreachable",
            Self::BackendRejected(_) => "error-backend-rejected",
            Self::RetrievalFailed(_) => "error-retrieval-failed",
            Self::PersistenceFailed(_) => "error-persistence-failed",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::MetadataUnavailable(detail)
            | Self::BackendUnreachable(detail)
            | Self::BackendRejected(detail)
            | Self::RetrievalFailed(detail)
            | Self::PersistenceFailed(detail) => detail,
            _ => "",
        }
    }
}
