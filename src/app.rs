use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::download::{start_backend_check, start_download, start_preview, StatusUpdate};
use crate::errors::DownloadError;
use crate::http::HttpClient;
use crate::localizations::Localizations;
use crate::models::{AppState, Notification};
use crate::orchestrator::{self, DownloadOutcome, DownloadPhase};
use crate::persistence::{NativeSavePicker, SavePicker};
use crate::ui::{self, SettingsAction, UrlInputAction};

pub struct YtdlApp {
    pub state: AppState,
    localizer: Localizations,
    config_store: Box<dyn ConfigStore>,
    client: Arc<dyn HttpClient>,
    picker: NativeSavePicker,
    downloads_dir: Option<PathBuf>,
    status_sender: Sender<StatusUpdate>,
    status_receiver: Receiver<StatusUpdate>,
}

impl YtdlApp {
    pub fn new(
        config_store: Box<dyn ConfigStore>,
        client: Arc<dyn HttpClient>,
        downloads_dir: Option<PathBuf>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: AppState::new(),
            localizer: Localizations::new(),
            config_store,
            client,
            picker: NativeSavePicker::new(downloads_dir.clone()),
            downloads_dir,
            status_sender: tx,
            status_receiver: rx,
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.state.notification = Some(notification);
    }

    pub fn start_preview(&mut self, ctx: &egui::Context) {
        match self.state.begin_metadata_fetch() {
            Ok(reference) => {
                log::info!("Loading preview for {}", reference);
                self.state.notification = None;
                start_preview(self.client.clone(), reference, self.status_sender.clone(), ctx.clone());
            }
            Err(e) => self.notify(Notification::error(self.localizer.error_text(&e))),
        }
    }

    fn paste_from_clipboard(&mut self) {
        let text = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
        self.apply_clipboard(text.map_err(anyhow::Error::from));
    }

    fn apply_clipboard(&mut self, text: anyhow::Result<String>) {
        match text {
            Ok(text) => {
                if self.state.paste_url(&text) {
                    self.state.notification = None;
                }
            }
            Err(e) => {
                log::warn!("Reading the clipboard failed: {:#}", e);
                self.notify(Notification::error(
                    self.localizer.text("clipboard-denied", "Clipboard access denied. Paste manually."),
                ));
            }
        }
    }

    pub fn start_download(&mut self, ctx: &egui::Context) {
        if self.state.is_downloading {
            return;
        }

        let config = self.config_store.read();
        let metadata = self.state.current_metadata().cloned();
        let request = self.state.download_request();
        let mut phase = DownloadPhase::Idle;
        let prepared = orchestrator::prepare(
            config,
            metadata.as_ref(),
            request,
            &self.picker,
            &mut |p: DownloadPhase| phase = p,
        );
        self.state.phase = phase;

        match prepared {
            Ok(prepared) => {
                self.state.is_downloading = true;
                self.state.notification = None;
                start_download(
                    self.client.clone(),
                    prepared,
                    self.downloads_dir.clone(),
                    self.picker.is_available(),
                    self.status_sender.clone(),
                    ctx.clone(),
                );
            }
            Err(e) => {
                if e == DownloadError::BackendNotConfigured {
                    self.open_settings();
                }
                let outcome = orchestrator::conclude(Err(e), &mut |_: DownloadPhase| {});
                self.state.finish_download(&outcome, &self.localizer);
            }
        }
        ctx.request_repaint();
    }

    fn open_settings(&mut self) {
        self.state.settings_draft = self.config_store.read();
        self.state.settings_open = true;
    }

    fn save_settings(&mut self) {
        let config = self.state.settings_draft.trimmed();
        match self.config_store.write(&config) {
            Ok(()) => {
                self.state.settings_open = false;
                self.notify(Notification::success(self.localizer.text("backend-saved", "Backend saved")));
            }
            Err(e) => {
                log::error!("Saving settings failed: {:#}", e);
                let detail = format!("{e:#}");
                self.notify(Notification::error(self.localizer.format(
                    "settings-save-failed",
                    "Could not save settings: {detail}",
                    &[("detail", detail.as_str())],
                )));
            }
        }
    }

    fn test_connection(&mut self, ctx: &egui::Context) {
        self.state.checking_backend = true;
        start_backend_check(
            self.client.clone(),
            self.state.settings_draft.trimmed(),
            self.status_sender.clone(),
            ctx.clone(),
        );
    }

    fn process_status_updates(&mut self, ctx: &egui::Context) {
        while let Ok(update) = self.status_receiver.try_recv() {
            match update {
                StatusUpdate::Metadata { reference, result } => {
                    if !self.state.finish_metadata_fetch(&reference, &result) {
                        log::debug!("Dropping stale preview for {}", reference);
                        continue;
                    }
                    match result {
                        Ok(_) => self.notify(Notification::success(
                            self.localizer.text("metadata-loaded", "Video info loaded"),
                        )),
                        Err(e) => self.notify(Notification::error(self.localizer.error_text(&e))),
                    }
                }
                StatusUpdate::Phase(phase) => {
                    if !phase.is_terminal() {
                        self.state.phase = phase;
                    }
                }
                StatusUpdate::Finished(outcome) => self.finish_download(outcome),
                StatusUpdate::PickSaveTarget { suggested, format, reply } => {
                    let answer = self.picker.pick(&suggested, format);
                    let _ = reply.send(answer);
                }
                StatusUpdate::OpenUrl(url) => {
                    log::info!("Opening {} in the browser", url);
                    ctx.output_mut(|o| o.open_url = Some(egui::output::OpenUrl::new_tab(url.as_str())));
                }
                StatusUpdate::BackendChecked(result) => {
                    self.state.checking_backend = false;
                    match result {
                        Ok(()) => self.notify(Notification::success(
                            self.localizer.text("backend-reachable", "Backend is reachable"),
                        )),
                        Err(e) => self.notify(Notification::error(self.localizer.error_text(&e))),
                    }
                }
            }
            ctx.request_repaint();
        }
    }

    fn finish_download(&mut self, outcome: DownloadOutcome) {
        self.state.finish_download(&outcome, &self.localizer);
    }

    pub fn update_ui(&mut self, ctx: &egui::Context) {
        self.process_status_updates(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.localizer.text("app-title", "YouTube Downloader"));
            ui.label(
                egui::RichText::new(self.localizer.text("app-subtitle", "Paste a link, preview, and get MP4/MP3."))
                    .color(crate::theme::SECONDARY_TEXT),
            );
            ui.add_space(20.0);

            match ui::render_url_input(ui, &mut self.state, &self.localizer) {
                UrlInputAction::Paste => self.paste_from_clipboard(),
                UrlInputAction::Preview => self.start_preview(ctx),
                UrlInputAction::None => {}
            }
            ui.add_space(16.0);

            match self.state.current_metadata().cloned() {
                Some(metadata) => {
                    ui::render_preview(ui, &metadata, &self.localizer);
                    ui.add_space(12.0);
                    ui::render_format_selector(ui, &mut self.state, &self.localizer);
                    ui.add_space(6.0);
                    ui::render_quality_selector(ui, &mut self.state, &self.localizer);
                    ui.add_space(16.0);
                    self.render_buttons(ui, ctx);
                }
                None => ui::render_tip(ui, &self.localizer),
            }

            ui.add_space(20.0);
            ui::render_status(ui, &self.state, &self.localizer);
        });

        if self.state.settings_open {
            match ui::render_settings(ctx, &mut self.state, &self.localizer) {
                SettingsAction::Save => self.save_settings(),
                SettingsAction::Cancel => self.state.settings_open = false,
                SettingsAction::TestConnection => self.test_connection(ctx),
                SettingsAction::None => {}
            }
        }
    }

    fn render_buttons(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            let download = ui::primary_button(self.localizer.text("download-button", "Download"));
            if ui.add_enabled(!self.state.is_downloading, download).clicked() {
                self.start_download(ctx);
            }

            let settings = ui::secondary_button(self.localizer.text("settings-button", "Backend settings"));
            if ui.add(settings).clicked() {
                self.open_settings();
            }
        });
    }
}

impl eframe::App for YtdlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }
}
