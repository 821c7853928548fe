use eframe::egui::{self, RichText, Stroke};

use crate::localizations::Localizations;
use crate::models::{AppState, DownloadFormat, NoticeKind, VideoMetadata};
use crate::theme::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlInputAction {
    None,
    Paste,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    Save,
    Cancel,
    TestConnection,
}

pub fn primary_button(text: String) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).size(BUTTON_FONT_SIZE).color(BUTTON_MAIN_TEXT))
        .min_size(MIN_SIZE_BUTTON)
        .fill(PRIMARY_BUTTON_BG)
        .rounding(ROUNDING_BUTTON)
        .stroke(Stroke::new(1.0, BORDER_COLOR))
}

pub fn secondary_button(text: String) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).size(BUTTON_FONT_SIZE).color(BUTTON_SECONDARY_TEXT))
        .min_size(MIN_SIZE_BUTTON)
        .fill(SECONDARY_BUTTON_BG)
        .rounding(ROUNDING_BUTTON)
        .stroke(Stroke::new(1.0, BORDER_COLOR))
}

/// URL field with Paste and Preview buttons.
pub fn render_url_input(ui: &mut egui::Ui, state: &mut AppState, localizer: &Localizations) -> UrlInputAction {
    ui.label(localizer.text("url-label", "YouTube URL"));

    let invalid = !state.reference().is_empty() && !state.is_url_valid();
    let stroke = if invalid { INPUT_INVALID_STROKE } else { INPUT_STROKE };
    let loading = state.is_loading_metadata();
    let mut requested = false;
    let mut pasted = false;

    ui.horizontal(|ui| {
        let response = egui::Frame::group(ui.style())
            .fill(INPUT_BG)
            .stroke(Stroke::new(1.0, stroke))
            .rounding(ROUNDING_FRAME)
            .show(ui, |ui| {
                ui.add_sized(
                    [ui.available_width() - 2.0 * MIN_SIZE_BUTTON.x - 24.0, 32.0],
                    egui::TextEdit::singleline(&mut state.url)
                        .hint_text(localizer.text("url-placeholder", "https://www.youtube.com/watch?v=..."))
                        .font(egui::FontId::proportional(16.0)),
                )
            })
            .inner;
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            requested = true;
        }

        if ui.add(secondary_button(localizer.text("paste-button", "Paste"))).clicked() {
            pasted = true;
        }

        let label = if loading {
            localizer.text("preview-loading", "Loading…")
        } else {
            localizer.text("preview-button", "Preview")
        };
        let enabled = state.is_url_valid() && !loading;
        if ui.add_enabled(enabled, primary_button(label)).clicked() {
            requested = true;
        }
        if loading {
            ui.add(egui::Spinner::new());
        }
    });

    if invalid {
        ui.colored_label(TEXT_ERROR, localizer.text("url-invalid", "This does not look like a YouTube video link."));
    }

    if pasted {
        UrlInputAction::Paste
    } else if requested && state.is_url_valid() && !loading {
        UrlInputAction::Preview
    } else {
        UrlInputAction::None
    }
}

pub fn render_preview(ui: &mut egui::Ui, metadata: &VideoMetadata, localizer: &Localizations) {
    ui.horizontal(|ui| {
        ui.add(egui::Image::new(metadata.thumbnail_url.as_str()).max_width(THUMBNAIL_MAX_WIDTH));
        ui.vertical(|ui| {
            ui.label(RichText::new(&metadata.title).size(18.0).strong());
            ui.label(
                RichText::new(format!("{} {}", localizer.text("by-author", "by"), metadata.author_name))
                    .color(SECONDARY_TEXT),
            );
        });
    });
}

pub fn render_format_selector(ui: &mut egui::Ui, state: &mut AppState, localizer: &Localizations) {
    ui.horizontal(|ui| {
        ui.label(localizer.text("format-label", "Format"));

        let mut format = state.format;
        ui.radio_value(&mut format, DownloadFormat::MP4, localizer.text("format-mp4", "MP4 (Video)"));
        ui.radio_value(&mut format, DownloadFormat::MP3, localizer.text("format-mp3", "MP3 (Audio)"));
        if format != state.format {
            state.set_format(format);
        }
    });
}

pub fn render_quality_selector(ui: &mut egui::Ui, state: &mut AppState, localizer: &Localizations) {
    ui.horizontal(|ui| {
        ui.label(localizer.text("quality-label", "Quality"));
        egui::ComboBox::from_id_source("quality")
            .selected_text(state.quality.clone())
            .show_ui(ui, |ui| {
                for option in state.format.quality_options() {
                    ui.selectable_value(&mut state.quality, option.to_string(), *option);
                }
            });
    });
}

pub fn render_tip(ui: &mut egui::Ui, localizer: &Localizations) {
    egui::Frame::group(ui.style())
        .fill(CARD_BG)
        .rounding(ROUNDING_CARD)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(localizer.text(
                    "preview-tip",
                    "Tip: use the Preview button to load title and thumbnail. Downloads require connecting a backend.",
                ))
                .color(SECONDARY_TEXT),
            );
        });
}

pub fn render_status(ui: &mut egui::Ui, state: &AppState, localizer: &Localizations) {
    egui::Frame::group(ui.style())
        .fill(CARD_BG)
        .rounding(ROUNDING_CARD)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical(|ui| {
                ui.add_space(6.0);
                if state.is_downloading {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.label(localizer.text(state.phase.label_key(), "Working…"));
                    });
                }

                match &state.notification {
                    Some(notification) => {
                        let color = match notification.kind {
                            NoticeKind::Info => TEXT_INFO,
                            NoticeKind::Success => TEXT_SUCCESS,
                            NoticeKind::Warning => TEXT_WARNING,
                            NoticeKind::Error => TEXT_ERROR,
                        };
                        ui.label(RichText::new(&notification.message).color(color));
                    }
                    None if !state.is_downloading => {
                        ui.label(RichText::new(localizer.text("status-ready", "Ready")).color(SECONDARY_TEXT));
                    }
                    None => {}
                }
                ui.add_space(6.0);
            });
        });
}

/// Backend settings dialog working on `state.settings_draft`.
pub fn render_settings(ctx: &egui::Context, state: &mut AppState, localizer: &Localizations) -> SettingsAction {
    let mut action = SettingsAction::None;
    let mut open = state.settings_open;

    egui::Window::new(localizer.text("settings-title", "Connect a backend"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(RichText::new(localizer.text(
                "settings-description",
                "Set your API endpoint that prepares download links. We'll POST { url, format, quality } to /download.",
            ))
            .color(SECONDARY_TEXT));
            ui.add_space(10.0);

            ui.label(localizer.text("backend-url-label", "Backend base URL"));
            ui.add(
                egui::TextEdit::singleline(&mut state.settings_draft.base_url)
                    .hint_text(localizer.text("backend-url-placeholder", "https://your-api.example.com"))
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(6.0);

            ui.label(localizer.text("backend-key-label", "API key (optional)"));
            ui.add(
                egui::TextEdit::singleline(&mut state.settings_draft.api_key)
                    .hint_text(localizer.text("backend-key-placeholder", "Bearer token or secret"))
                    .password(true)
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                let test = ui.add_enabled(
                    !state.checking_backend,
                    secondary_button(localizer.text("test-button", "Test connection")),
                );
                if test.clicked() {
                    action = SettingsAction::TestConnection;
                }
                if state.checking_backend {
                    ui.add(egui::Spinner::new());
                }
                if ui.add(secondary_button(localizer.text("cancel-button", "Cancel"))).clicked() {
                    action = SettingsAction::Cancel;
                }
                if ui.add(primary_button(localizer.text("save-button", "Save"))).clicked() {
                    action = SettingsAction::Save;
                }
            });
        });

    if !open && action == SettingsAction::None {
        action = SettingsAction::Cancel;
    }
    action
}
