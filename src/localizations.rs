use std::collections::HashMap;

use i18n_embed::DesktopLanguageRequester;
use unic_langid::{langid, LanguageIdentifier};

use crate::errors::DownloadError;

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

pub struct Localizations {
    translations: HashMap<LanguageIdentifier, Translations>,
    fallback: LanguageIdentifier,
    current: LanguageIdentifier,
}

impl Default for Localizations {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizations {
    /// English and Spanish tables, language picked from the desktop locale.
    pub fn new() -> Self {
        let mut localizer = Self::with_builtin_tables();
        localizer.select(&DesktopLanguageRequester::requested_languages());
        log::debug!("UI language: {}", localizer.current);
        localizer
    }

    pub(crate) fn with_builtin_tables() -> Self {
        let mut translations = HashMap::new();

        let mut en = Translations::new();
        en.insert("app-title", "YouTube Downloader");
        en.insert("app-subtitle", "Paste a link, preview, and get MP4/MP3.");
        en.insert("url-label", "YouTube URL");
        en.insert("url-placeholder", "https://www.youtube.com/watch?v=...");
        en.insert("url-invalid", "This does not look like a YouTube video link.");
        en.insert("preview-button", "Preview");
        en.insert("preview-loading", "Loading…");
        en.insert("preview-tip", "Tip: use the Preview button to load title and thumbnail. Downloads require connecting a backend.");
        en.insert("by-author", "by");
        en.insert("format-label", "Format");
        en.insert("format-mp4", "MP4 (Video)");
        en.insert("format-mp3", "MP3 (Audio)");
        en.insert("quality-label", "Quality");
        en.insert("download-button", "Download");
        en.insert("settings-button", "Backend settings");
        en.insert("settings-title", "Connect a backend");
        en.insert("settings-description", "Set your API endpoint that prepares download links. We'll POST { url, format, quality } to /download.");
        en.insert("backend-url-label", "Backend base URL");
        en.insert("backend-url-placeholder", "https://your-api.example.com");
        en.insert("backend-key-label", "API key (optional)");
        en.insert("backend-key-placeholder", "Bearer token or secret");
        en.insert("save-button", "Save");
        en.insert("cancel-button", "Cancel");
        en.insert("test-button", "Test connection");
        en.insert("backend-saved", "Backend saved");
        en.insert("backend-reachable", "Backend is reachable");
        en.insert("metadata-loaded", "Video info loaded");
        en.insert("status-ready", "Ready");
        en.insert("phase-validating", "Checking…");
        en.insert("phase-negotiating", "Choosing where to save…");
        en.insert("phase-probing", "Contacting backend…");
        en.insert("phase-submitting", "Preparing download…");
        en.insert("phase-retrieving", "Downloading file…");
        en.insert("phase-persisting", "Saving file…");
        en.insert("phase-succeeded", "Download ready!");
        en.insert("phase-failed", "Download failed");
        en.insert("phase-cancelled", "Download cancelled");
        en.insert("paste-button", "Paste");
        en.insert("clipboard-denied", "Clipboard access denied. Paste manually.");
        en.insert("settings-save-failed", "Could not save settings: {detail}");
        en.insert("download-saved", "Download ready! Saved {file} to {path}");
        en.insert("download-handed-off", "Opened {file} in your browser; the file was not saved by this app");
        en.insert("error-invalid-reference", "Enter a valid YouTube link.");
        en.insert("error-metadata-unavailable", "Could not fetch video info: {detail}");
        en.insert("error-metadata-required", "Load video info first.");
        en.insert("error-backend-not-configured", "Connect a backend to enable downloads.");
        en.insert("error-save-cancelled", "Save cancelled");
        en.insert("error-backend-unreachable", "Backend unreachable: {detail}");
        en.insert("error-backend-rejected", "Backend error: {detail}");
        en.insert("error-retrieval-failed", "Could not retrieve the file: {detail}");
        en.insert("error-persistence-failed", "Could not save the file: {detail}");
        translations.insert(langid!("en-US"), en);

        let mut es = Translations::new();
        es.insert("app-title", "Descargador de YouTube");
        es.insert("app-subtitle", "Pega un enlace, previsualiza y obtén MP4/MP3.");
        es.insert("url-label", "URL de YouTube");
        es.insert("url-invalid", "Esto no parece un enlace a un video de YouTube.");
        es.insert("preview-button", "Previsualizar");
        es.insert("preview-loading", "Cargando…");
        es.insert("preview-tip", "Consejo: usa el botón Previsualizar para cargar el título y la miniatura. Las descargas requieren conectar un backend.");
        es.insert("by-author", "de");
        es.insert("format-label", "Formato");
        es.insert("format-mp4", "MP4 (Video)");
        es.insert("format-mp3", "MP3 (Audio)");
        es.insert("quality-label", "Calidad");
        es.insert("download-button", "Descargar");
        es.insert("settings-button", "Configuración del backend");
        es.insert("settings-title", "Conectar un backend");
        es.insert("settings-description", "Indica el endpoint de tu API que prepara los enlaces de descarga. Enviaremos { url, format, quality } por POST a /download.");
        es.insert("backend-url-label", "URL base del backend");
        es.insert("backend-key-label", "Clave de API (opcional)");
        es.insert("backend-key-placeholder", "Token Bearer o secreto");
        es.insert("save-button", "Guardar");
        es.insert("cancel-button", "Cancelar");
        es.insert("test-button", "Probar conexión");
        es.insert("backend-saved", "Backend guardado");
        es.insert("backend-reachable", "El backend responde");
        es.insert("metadata-loaded", "Información del video cargada");
        es.insert("status-ready", "Listo");
        es.insert("phase-validating", "Comprobando…");
        es.insert("phase-negotiating", "Eligiendo dónde guardar…");
        es.insert("phase-probing", "Contactando con el backend…");
        es.insert("phase-submitting", "Preparando la descarga…");
        es.insert("phase-retrieving", "Descargando archivo…");
        es.insert("phase-persisting", "Guardando archivo…");
        es.insert("phase-succeeded", "¡Descarga lista!");
        es.insert("phase-failed", "La descarga falló");
        es.insert("phase-cancelled", "Descarga cancelada");
        es.insert("paste-button", "Pegar");
        es.insert("clipboard-denied", "No se pudo acceder al portapapeles. Pega el enlace manualmente.");
        es.insert("settings-save-failed", "No se pudo guardar la configuración: {detail}");
        es.insert("download-saved", "¡Descarga lista! Se guardó {file} en {path}");
        es.insert("download-handed-off", "Se abrió {file} en el navegador; esta aplicación no guardó el archivo");
        es.insert("error-invalid-reference", "Introduce un enlace de YouTube válido.");
        es.insert("error-metadata-unavailable", "No se pudo obtener la información del video: {detail}");
        es.insert("error-metadata-required", "Carga primero la información del video.");
        es.insert("error-backend-not-configured", "Conecta un backend para habilitar las descargas.");
        es.insert("error-save-cancelled", "Guardado cancelado");
        es.insert("error-backend-unreachable", "No se puede contactar con el backend: {detail}");
        es.insert("error-backend-rejected", "Error del backend: {detail}");
        es.insert("error-retrieval-failed", "No se pudo descargar el archivo: {detail}");
        es.insert("error-persistence-failed", "No se pudo guardar el archivo: {detail}");
        translations.insert(langid!("es-ES"), es);

        Self {
            translations,
            fallback: langid!("en-US"),
            current: langid!("en-US"),
        }
    }

    /// First requested language we have a table for, matched on the
    /// language subtag.
    fn negotiate(&self, requested: &[LanguageIdentifier]) -> Option<LanguageIdentifier> {
        requested.iter().find_map(|wanted| {
            if self.translations.contains_key(wanted) {
                return Some(wanted.clone());
            }
            self.translations
                .keys()
                .find(|available| available.language == wanted.language)
                .cloned()
        })
    }

    /// Switches to the best match for `requested`, English if none match.
    pub fn select(&mut self, requested: &[LanguageIdentifier]) {
        self.current = self
            .negotiate(requested)
            .unwrap_or_else(|| self.fallback.clone());
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.translations
            .get(&self.current)
            .and_then(|t| t.lookup(key))
            .or_else(|| self.translations.get(&self.fallback).and_then(|t| t.lookup(key)))
    }

    /// Translated text for `key`, or `default` when no table has it.
    pub fn text(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }

    /// Like [`Self::text`] with each `{name}` placeholder replaced.
    pub fn format(&self, key: &str, default: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.text(key, default), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }

    /// User-facing message for an error in the current language.
    pub fn error_text(&self, error: &DownloadError) -> String {
        match self.lookup(error.message_key()) {
            Some(template) => template.replace("{detail}", error.detail()),
            None => error.to_string(),
        }
    }
}
