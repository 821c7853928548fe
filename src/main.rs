use eframe::egui;
use std::sync::Arc;

mod app;
mod config;
mod download;
mod errors;
mod http;
mod localizations;
mod metadata;
mod models;
mod orchestrator;
mod persistence;
mod theme;
mod ui;
mod validation;

use app::YtdlApp;
use config::FileConfigStore;
use http::BlockingClient;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("ytdl_remote_gui=info"))
        .init();

    let config_store = FileConfigStore::from_env_or_default();
    log::info!("Using settings file {}", config_store.path().display());

    let client = Arc::new(BlockingClient::new()?);
    let downloads_dir = dirs::download_dir();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 600.0])
            .with_min_inner_size([600.0, 480.0])
            .with_title("YouTube Downloader"),
        ..Default::default()
    };

    let app = YtdlApp::new(Box::new(config_store), client, downloads_dir);

    eframe::run_native(
        "YouTube Downloader",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the window: {e}"))
}
