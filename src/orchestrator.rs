//! One download attempt as an explicit sequence of phases.
//!
//! [`prepare`] runs on the UI thread because it may open the save dialog,
//! [`run`] does the network work and persistence on a worker thread.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use serde::Deserialize;
use url::Url;

use crate::config::BackendConfig;
use crate::errors::DownloadError;
use crate::http::{HttpClient, TransportError};
use crate::localizations::Localizations;
use crate::models::{
    DownloadFormat, DownloadRequest, DownloadResult, Notification, VideoMetadata,
};
use crate::persistence::{
    negotiate, sanitize_filename, suggested_filename, BrowserHandoff, DownloadsFolderSave,
    FilePersistenceStrategy, NativePickerSave, PickOutcome, Persisted, RetrievedFile,
    SavePicker, SaveTarget, UrlOpener,
};
use crate::validation::is_youtube_url;

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
// The backend only answers once the media has been transcoded.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DownloadPhase {
    #[default]
    Idle,
    ValidatingPreconditions,
    NegotiatingSaveTarget,
    ProbingBackend,
    SubmittingJob,
    RetrievingFile,
    Persisting,
    Succeeded,
    Failed(String),
    Cancelled,
}

impl DownloadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_) | Self::Cancelled)
    }

    /// Localization key describing the phase.
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Idle => "status-ready",
            Self::ValidatingPreconditions => "phase-validating",
            Self::NegotiatingSaveTarget => "phase-negotiating",
            Self::ProbingBackend => "phase-probing",
            Self::SubmittingJob => "phase-submitting",
            Self::RetrievingFile => "phase-retrieving",
            Self::Persisting => "phase-persisting",
            Self::Succeeded => "phase-succeeded",
            Self::Failed(_) => "phase-failed",
            Self::Cancelled => "phase-cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub filename: String,
    pub persisted: Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Succeeded(DownloadReport),
    Failed(DownloadError),
    Cancelled,
}

impl DownloadOutcome {
    pub fn from_result(result: Result<DownloadReport, DownloadError>) -> Self {
        match result {
            Ok(report) => Self::Succeeded(report),
            Err(DownloadError::SaveCancelled) => Self::Cancelled,
            Err(e) => Self::Failed(e),
        }
    }

    pub fn phase(&self) -> DownloadPhase {
        match self {
            Self::Succeeded(_) => DownloadPhase::Succeeded,
            Self::Failed(e) => DownloadPhase::Failed(e.to_string()),
            Self::Cancelled => DownloadPhase::Cancelled,
        }
    }

    /// The single message shown for this attempt. Cancelling is silent.
    pub fn notification(&self, localizer: &Localizations) -> Option<Notification> {
        match self {
            Self::Succeeded(DownloadReport { filename, persisted: Persisted::Saved(path) }) => {
                let path = path.display().to_string();
                Some(Notification::success(localizer.format(
                    "download-saved",
                    "Download ready! Saved {file} to {path}",
                    &[("file", filename.as_str()), ("path", path.as_str())],
                )))
            }
            Self::Succeeded(DownloadReport { filename, persisted: Persisted::HandedOff(_) }) => {
                Some(Notification::warning(localizer.format(
                    "download-handed-off",
                    "Opened {file} in your browser; the file was not saved by this app",
                    &[("file", filename.as_str())],
                )))
            }
            Self::Failed(e @ DownloadError::BackendNotConfigured) => {
                Some(Notification::info(localizer.error_text(e)))
            }
            Self::Failed(e) => Some(Notification::error(localizer.error_text(e))),
            Self::Cancelled => None,
        }
    }
}

/// State carried from the UI thread into the worker.
#[derive(Debug)]
pub struct PreparedDownload {
    pub request: DownloadRequest,
    pub config: BackendConfig,
    pub filename: String,
    pub target: Option<SaveTarget>,
}

/// Where the bytes may go when no target was negotiated up front.
pub struct PersistenceEnv<'a> {
    pub late_picker: &'a dyn SavePicker,
    pub downloads_dir: Option<PathBuf>,
    pub opener: &'a dyn UrlOpener,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Checks preconditions and asks for a save location.
pub fn prepare(
    config: BackendConfig,
    metadata: Option<&VideoMetadata>,
    request: DownloadRequest,
    picker: &dyn SavePicker,
    on_phase: &mut dyn FnMut(DownloadPhase),
) -> Result<PreparedDownload, DownloadError> {
    on_phase(DownloadPhase::ValidatingPreconditions);
    if !config.is_configured() {
        return Err(DownloadError::BackendNotConfigured);
    }
    if !is_youtube_url(&request.url) {
        return Err(DownloadError::InvalidReference);
    }
    let metadata = metadata.ok_or(DownloadError::MetadataRequired)?;

    on_phase(DownloadPhase::NegotiatingSaveTarget);
    let filename = suggested_filename(Some(&metadata.title), request.format);
    let target = negotiate(picker, &filename, request.format)?;

    Ok(PreparedDownload { request, config, filename, target })
}

/// Runs the network part of a prepared download and returns its outcome.
pub fn run(
    prepared: PreparedDownload,
    client: &dyn HttpClient,
    env: &PersistenceEnv<'_>,
    on_phase: &mut dyn FnMut(DownloadPhase),
) -> DownloadOutcome {
    let result = execute(prepared, client, env, on_phase);
    conclude(result, on_phase)
}

/// Turns a result into the terminal outcome and reports its phase.
pub fn conclude(
    result: Result<DownloadReport, DownloadError>,
    on_phase: &mut dyn FnMut(DownloadPhase),
) -> DownloadOutcome {
    let outcome = DownloadOutcome::from_result(result);
    match &outcome {
        DownloadOutcome::Succeeded(report) => {
            log::info!("Download finished: {} ({:?})", report.filename, report.persisted)
        }
        DownloadOutcome::Failed(e) => log::error!("Download failed: {}", e),
        DownloadOutcome::Cancelled => log::info!("Download cancelled in the save dialog"),
    }
    on_phase(outcome.phase());
    outcome
}

fn execute(
    prepared: PreparedDownload,
    client: &dyn HttpClient,
    env: &PersistenceEnv<'_>,
    on_phase: &mut dyn FnMut(DownloadPhase),
) -> Result<DownloadReport, DownloadError> {
    let PreparedDownload { request, config, filename, target } = prepared;

    on_phase(DownloadPhase::ProbingBackend);
    probe_backend(client, &config)?;

    on_phase(DownloadPhase::SubmittingJob);
    let result = submit_job(client, &config, &request)?;
    if let Some(title) = &result.title {
        log::info!("Backend prepared \"{}\"", title);
    }

    on_phase(DownloadPhase::RetrievingFile);
    let url = config
        .resolve_download_url(&result.download_url)
        .map_err(|e| DownloadError::RetrievalFailed(format!("bad download URL: {e}")))?;
    let bytes = retrieve_file(client, &url)?;

    on_phase(DownloadPhase::Persisting);
    let filename = result
        .filename
        .as_deref()
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
        .unwrap_or(filename);
    let file = RetrievedFile { url, filename, bytes };
    let persisted = persist(&file, target, request.format, env)?;

    Ok(DownloadReport { filename: file.filename, persisted })
}

/// `GET <base>/health`. Anything but a 2xx means the backend is unusable.
pub fn probe_backend(client: &dyn HttpClient, config: &BackendConfig) -> Result<(), DownloadError> {
    let url = config
        .endpoint("/health")
        .map_err(|e| DownloadError::BackendUnreachable(format!("invalid backend URL: {e}")))?;
    let response = client
        .get(&url, Some(HEALTH_TIMEOUT))
        .map_err(|e| DownloadError::BackendUnreachable(e.to_string()))?;
    if !response.is_success() {
        return Err(DownloadError::BackendUnreachable(format!(
            "health check returned {}",
            response.status
        )));
    }
    Ok(())
}

fn submit_job(
    client: &dyn HttpClient,
    config: &BackendConfig,
    request: &DownloadRequest,
) -> Result<DownloadResult, DownloadError> {
    let url = config
        .endpoint("/download")
        .map_err(|e| DownloadError::BackendUnreachable(format!("invalid backend URL: {e}")))?;
    let body = serde_json::to_value(request)
        .map_err(|e| DownloadError::BackendRejected(e.to_string()))?;
    log::info!("Requesting {} ({}, {})", request.url, request.format.extension(), request.quality);

    let response = client
        .post_json(&url, &body, config.api_key(), Some(SUBMIT_TIMEOUT))
        .map_err(|e| match e {
            TransportError::Timeout => {
                DownloadError::BackendRejected("timed out waiting for the backend".to_string())
            }
            TransportError::Other(reason) => DownloadError::BackendUnreachable(reason),
        })?;

    if !response.is_success() {
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| response.status.to_string());
        return Err(DownloadError::BackendRejected(message));
    }

    match response.json::<DownloadResult>() {
        Ok(result) if !result.download_url.trim().is_empty() => Ok(result),
        _ => Err(DownloadError::BackendRejected("No download URL returned".to_string())),
    }
}

fn retrieve_file(client: &dyn HttpClient, url: &Url) -> Result<Bytes, DownloadError> {
    let response = client
        .get(url, None)
        .map_err(|e| DownloadError::RetrievalFailed(e.to_string()))?;
    if !response.is_success() {
        return Err(DownloadError::RetrievalFailed(response.status.to_string()));
    }
    log::debug!("Retrieved {} bytes from {}", response.body.len(), url);
    Ok(response.body)
}

fn persist(
    file: &RetrievedFile,
    target: Option<SaveTarget>,
    format: DownloadFormat,
    env: &PersistenceEnv<'_>,
) -> Result<Persisted, DownloadError> {
    let target = match target {
        Some(target) => Some(target),
        None if env.late_picker.is_available() => {
            match env.late_picker.pick(&file.filename, format) {
                PickOutcome::Chosen(path) => Some(SaveTarget::new(path)),
                PickOutcome::Cancelled => {
                    log::info!("Save dialog dismissed, using the downloads folder");
                    None
                }
                PickOutcome::Unavailable(reason) => {
                    log::warn!("Save dialog failed: {}", reason);
                    None
                }
            }
        }
        None => None,
    };

    let mut strategies: Vec<Box<dyn FilePersistenceStrategy + '_>> = Vec::new();
    match target {
        Some(target) => strategies.push(Box::new(NativePickerSave::new(target))),
        None => {
            if let Some(dir) = &env.downloads_dir {
                strategies.push(Box::new(DownloadsFolderSave::new(dir.clone())));
            }
        }
    }
    strategies.push(Box::new(BrowserHandoff::new(env.opener)));

    let mut failures = Vec::new();
    for strategy in &strategies {
        match strategy.persist(file) {
            Ok(persisted) => return Ok(persisted),
            Err(e) => {
                log::warn!("Saving via {} failed: {:#}", strategy.name(), e);
                failures.push(format!("{}: {:#}", strategy.name(), e));
            }
        }
    }
    Err(DownloadError::PersistenceFailed(failures.join("; ")))
}
