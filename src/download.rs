use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::anyhow;
use eframe::egui;
use url::Url;

use crate::config::BackendConfig;
use crate::errors::DownloadError;
use crate::http::HttpClient;
use crate::metadata::fetch_metadata;
use crate::models::{DownloadFormat, VideoMetadata};
use crate::orchestrator::{self, DownloadOutcome, DownloadPhase, PersistenceEnv, PreparedDownload};
use crate::persistence::{PickOutcome, SavePicker, UrlOpener};

/// Messages from worker threads to the UI thread.
#[derive(Debug)]
pub enum StatusUpdate {
    Metadata {
        reference: String,
        result: Result<VideoMetadata, DownloadError>,
    },
    Phase(DownloadPhase),
    Finished(DownloadOutcome),
    /// The worker needs a save location; answer on `reply`.
    PickSaveTarget {
        suggested: String,
        format: DownloadFormat,
        reply: Sender<PickOutcome>,
    },
    OpenUrl(Url),
    BackendChecked(Result<(), DownloadError>),
}

fn notify(tx: &Sender<StatusUpdate>, ctx: &egui::Context, update: StatusUpdate) -> bool {
    let sent = tx.send(update).is_ok();
    ctx.request_repaint();
    sent
}

pub fn start_preview(
    client: Arc<dyn HttpClient>,
    reference: String,
    tx: Sender<StatusUpdate>,
    ctx: egui::Context,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let result = fetch_metadata(client.as_ref(), &reference);
        if let Err(e) = &result {
            log::warn!("Preview of {} failed: {}", reference, e);
        }
        notify(&tx, &ctx, StatusUpdate::Metadata { reference, result });
    })
}

pub fn start_download(
    client: Arc<dyn HttpClient>,
    prepared: PreparedDownload,
    downloads_dir: Option<PathBuf>,
    picker_available: bool,
    tx: Sender<StatusUpdate>,
    ctx: egui::Context,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let picker = ForwardedPicker { available: picker_available, tx: tx.clone(), ctx: ctx.clone() };
        let opener = ForwardedOpener { tx: tx.clone(), ctx: ctx.clone() };
        let env = PersistenceEnv { late_picker: &picker, downloads_dir, opener: &opener };

        let mut on_phase = |phase: DownloadPhase| {
            log::debug!("Download phase: {:?}", phase);
            notify(&tx, &ctx, StatusUpdate::Phase(phase));
        };
        let outcome = orchestrator::run(prepared, client.as_ref(), &env, &mut on_phase);
        notify(&tx, &ctx, StatusUpdate::Finished(outcome));
    })
}

pub fn start_backend_check(
    client: Arc<dyn HttpClient>,
    config: BackendConfig,
    tx: Sender<StatusUpdate>,
    ctx: egui::Context,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let result = if config.is_configured() {
            orchestrator::probe_backend(client.as_ref(), &config)
        } else {
            Err(DownloadError::BackendNotConfigured)
        };
        notify(&tx, &ctx, StatusUpdate::BackendChecked(result));
    })
}

/// Save dialog shown by the UI thread on behalf of a worker.
struct ForwardedPicker {
    available: bool,
    tx: Sender<StatusUpdate>,
    ctx: egui::Context,
}

impl SavePicker for ForwardedPicker {
    fn is_available(&self) -> bool {
        self.available
    }

    fn pick(&self, suggested: &str, format: DownloadFormat) -> PickOutcome {
        let (reply, answer) = mpsc::channel();
        let request = StatusUpdate::PickSaveTarget {
            suggested: suggested.to_string(),
            format,
            reply,
        };
        if !notify(&self.tx, &self.ctx, request) {
            return PickOutcome::Unavailable("window closed".to_string());
        }
        answer
            .recv()
            .unwrap_or_else(|_| PickOutcome::Unavailable("window closed".to_string()))
    }
}

struct ForwardedOpener {
    tx: Sender<StatusUpdate>,
    ctx: egui::Context,
}

impl UrlOpener for ForwardedOpener {
    fn open(&self, url: &Url) -> anyhow::Result<()> {
        if notify(&self.tx, &self.ctx, StatusUpdate::OpenUrl(url.clone())) {
            Ok(())
        } else {
            Err(anyhow!("window closed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http::fake::FakeClient;
    use crate::models::DownloadRequest;
    use crate::orchestrator::DownloadReport;
    use crate::persistence::Persisted;

    const HEALTH: &str = "http://localhost:5000/health";
    const SUBMIT: &str = "http://localhost:5000/download";
    const FILE: &str = "http://localhost:5000/files/abc.mp4";
    const WAIT: Duration = Duration::from_secs(5);

    fn prepared() -> PreparedDownload {
        PreparedDownload {
            request: DownloadRequest {
                url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                format: DownloadFormat::MP3,
                quality: "192 kbps".to_string(),
            },
            config: BackendConfig {
                base_url: "http://localhost:5000".to_string(),
                api_key: String::new(),
            },
            filename: "Song.mp3".to_string(),
            target: None,
        }
    }

    fn backend() -> Arc<FakeClient> {
        Arc::new(
            FakeClient::new()
                .on_get(HEALTH, 200, "")
                .on_post(SUBMIT, 200, r#"{"downloadUrl":"/files/abc.mp4"}"#)
                .on_get(FILE, 200, "bytes"),
        )
    }

    #[test]
    fn late_save_dialog_is_answered_by_the_ui_thread() {
        let dir = tempfile::tempdir().unwrap();
        let chosen = dir.path().join("answer.mp3");
        let (tx, rx) = mpsc::channel();
        let client = backend();
        let handle = start_download(
            client.clone(),
            prepared(),
            None,
            true,
            tx,
            egui::Context::default(),
        );

        let mut phases = Vec::new();
        let outcome = loop {
            match rx.recv_timeout(WAIT).unwrap() {
                StatusUpdate::Phase(phase) => phases.push(phase),
                StatusUpdate::PickSaveTarget { suggested, format, reply } => {
                    assert_eq!(suggested, "Song.mp3");
                    assert_eq!(format, DownloadFormat::MP3);
                    reply.send(PickOutcome::Chosen(chosen.clone())).unwrap();
                }
                StatusUpdate::Finished(outcome) => break outcome,
                other => panic!("unexpected update {other:?}"),
            }
        };
        handle.join().unwrap();

        assert_eq!(
            outcome,
            DownloadOutcome::Succeeded(DownloadReport {
                filename: "Song.mp3".to_string(),
                persisted: Persisted::Saved(chosen.clone()),
            })
        );
        assert_eq!(std::fs::read(chosen).unwrap(), b"bytes");
        assert_eq!(phases.first(), Some(&DownloadPhase::ProbingBackend));
        assert_eq!(phases.last(), Some(&DownloadPhase::Succeeded));
        assert_eq!(client.count("GET", FILE), 1);
    }

    #[test]
    fn handoff_is_forwarded_as_open_url() {
        let (tx, rx) = mpsc::channel();
        let handle = start_download(backend(), prepared(), None, false, tx, egui::Context::default());

        let mut opened = None;
        let outcome = loop {
            match rx.recv_timeout(WAIT).unwrap() {
                StatusUpdate::OpenUrl(url) => opened = Some(url),
                StatusUpdate::Finished(outcome) => break outcome,
                _ => {}
            }
        };
        handle.join().unwrap();

        assert_eq!(opened.map(|u| u.to_string()), Some(FILE.to_string()));
        assert!(matches!(
            outcome,
            DownloadOutcome::Succeeded(DownloadReport { persisted: Persisted::HandedOff(_), .. })
        ));
    }

    #[test]
    fn preview_reports_back_with_its_reference() {
        let (tx, rx) = mpsc::channel();
        let reference = "https://youtu.be/dQw4w9WgXcQ".to_string();
        start_preview(Arc::new(FakeClient::new()), reference.clone(), tx, egui::Context::default())
            .join()
            .unwrap();
        match rx.recv_timeout(WAIT).unwrap() {
            StatusUpdate::Metadata { reference: got, result } => {
                assert_eq!(got, reference);
                assert!(matches!(result, Err(DownloadError::MetadataUnavailable(_))));
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[test]
    fn backend_check_without_configuration() {
        let (tx, rx) = mpsc::channel();
        start_backend_check(
            Arc::new(FakeClient::new()),
            BackendConfig::default(),
            tx,
            egui::Context::default(),
        )
        .join()
        .unwrap();
        assert!(matches!(
            rx.recv_timeout(WAIT).unwrap(),
            StatusUpdate::BackendChecked(Err(DownloadError::BackendNotConfigured))
        ));
    }
}
