//! Choosing where a download ends up and writing it there.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use rfd::FileDialog;
use url::Url;

use crate::errors::DownloadError;
use crate::models::DownloadFormat;

const MAX_FILE_STEM: usize = 150;
const GENERIC_NAME: &str = "download";

/// Destination picked by the user for one download attempt.
#[derive(Debug, PartialEq, Eq)]
pub struct SaveTarget {
    path: PathBuf,
}

impl SaveTarget {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Chosen(PathBuf),
    Cancelled,
    Unavailable(String),
}

pub trait SavePicker: Send {
    fn is_available(&self) -> bool;
    fn pick(&self, suggested: &str, format: DownloadFormat) -> PickOutcome;
}

/// The platform "save as" dialog.
#[derive(Debug, Clone, Default)]
pub struct NativeSavePicker {
    initial_dir: Option<PathBuf>,
}

impl NativeSavePicker {
    pub fn new(initial_dir: Option<PathBuf>) -> Self {
        Self { initial_dir }
    }
}

impl SavePicker for NativeSavePicker {
    fn is_available(&self) -> bool {
        if cfg!(any(target_os = "windows", target_os = "macos")) {
            return true;
        }
        ["DISPLAY", "WAYLAND_DISPLAY"]
            .iter()
            .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
    }

    fn pick(&self, suggested: &str, format: DownloadFormat) -> PickOutcome {
        if !self.is_available() {
            return PickOutcome::Unavailable("no display available for the save dialog".to_string());
        }
        let (filter_name, extensions) = format.file_filter();
        let mut dialog = FileDialog::new()
            .set_file_name(suggested)
            .add_filter(filter_name, extensions);
        if let Some(dir) = &self.initial_dir {
            dialog = dialog.set_directory(dir);
        }
        match dialog.save_file() {
            Some(path) => PickOutcome::Chosen(with_extension(path, format)),
            None => PickOutcome::Cancelled,
        }
    }
}

/// Asks for a destination before any network traffic happens.
///
/// `Ok(None)` means no picker could be shown and the caller has to pick a
/// fallback once the data is there.
pub fn negotiate(
    picker: &dyn SavePicker,
    suggested: &str,
    format: DownloadFormat,
) -> Result<Option<SaveTarget>, DownloadError> {
    if !picker.is_available() {
        log::info!("Save dialog not available, deciding on a location after download");
        return Ok(None);
    }
    match picker.pick(suggested, format) {
        PickOutcome::Chosen(path) => {
            log::info!("Saving to {}", path.display());
            Ok(Some(SaveTarget::new(path)))
        }
        PickOutcome::Cancelled => Err(DownloadError::SaveCancelled),
        PickOutcome::Unavailable(reason) => {
            log::warn!("Save dialog failed: {}", reason);
            Ok(None)
        }
    }
}

fn with_extension(path: PathBuf, format: DownloadFormat) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(format.extension())
    }
}

/// Replaces characters that are not allowed in file names on common
/// platforms and trims the result to a sane length.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_whitespace() => ' ',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c == '.' || c == ' ')
        .to_string()
}

/// File name offered to the user for a title, `download.<ext>` without one.
pub fn suggested_filename(title: Option<&str>, format: DownloadFormat) -> String {
    let stem = title.map(sanitize_filename).unwrap_or_default();
    let stem: String = stem.chars().take(MAX_FILE_STEM).collect();
    let stem = stem.trim_end_matches(|c: char| c == '.' || c == ' ');
    let stem = if stem.is_empty() { GENERIC_NAME } else { stem };
    format!("{stem}.{}", format.extension())
}

/// First of `name`, `name (1)`, `name (2)`... that does not exist in `dir`.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = as_path.extension().map(|e| e.to_string_lossy().into_owned());
    (1..)
        .map(|n| match &extension {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// A downloaded file waiting to be stored.
#[derive(Debug, Clone)]
pub struct RetrievedFile {
    pub url: Url,
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Saved(PathBuf),
    /// Given to the system browser, not confirmed on disk.
    HandedOff(Url),
}

pub trait FilePersistenceStrategy {
    fn name(&self) -> &'static str;
    fn persist(&self, file: &RetrievedFile) -> Result<Persisted>;
}

pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &Url) -> Result<()>;
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Err(e) = fs::write(path, bytes) {
        let _ = fs::remove_file(path);
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Writes into the location chosen in the save dialog.
pub struct NativePickerSave {
    target: SaveTarget,
}

impl NativePickerSave {
    pub fn new(target: SaveTarget) -> Self {
        Self { target }
    }
}

impl FilePersistenceStrategy for NativePickerSave {
    fn name(&self) -> &'static str {
        "save dialog"
    }

    fn persist(&self, file: &RetrievedFile) -> Result<Persisted> {
        write_file(self.target.path(), &file.bytes)?;
        Ok(Persisted::Saved(self.target.path().to_path_buf()))
    }
}

/// Drops the file into the Downloads folder under a free name.
pub struct DownloadsFolderSave {
    dir: PathBuf,
}

impl DownloadsFolderSave {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl FilePersistenceStrategy for DownloadsFolderSave {
    fn name(&self) -> &'static str {
        "downloads folder"
    }

    fn persist(&self, file: &RetrievedFile) -> Result<Persisted> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = unique_path(&self.dir, &file.filename);
        write_file(&path, &file.bytes)?;
        Ok(Persisted::Saved(path))
    }
}

/// Last resort: let the browser fetch the file itself.
pub struct BrowserHandoff<'a> {
    opener: &'a dyn UrlOpener,
}

impl<'a> BrowserHandoff<'a> {
    pub fn new(opener: &'a dyn UrlOpener) -> Self {
        Self { opener }
    }
}

impl FilePersistenceStrategy for BrowserHandoff<'_> {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn persist(&self, file: &RetrievedFile) -> Result<Persisted> {
        self.opener.open(&file.url)?;
        Ok(Persisted::HandedOff(file.url.clone()))
    }
}


#[cfg(test)]
mod tests {
    use super::fake::*;
    use super::*;

    fn file(name: &str) -> RetrievedFile {
        RetrievedFile {
            url: Url::parse("http://localhost:5000/files/abc.mp4").unwrap(),
            filename: name.to_string(),
            bytes: Bytes::from_static(b"media"),
        }
    }

    #[test]
    fn sanitizes_illegal_characters() {
        assert_eq!(sanitize_filename("AC/DC: Back in Black?"), "AC_DC_ Back in Black_");
        assert_eq!(sanitize_filename("  a\tb\n c  "), "a b c");
        assert_eq!(sanitize_filename("...hidden..."), "hidden");
        assert_eq!(sanitize_filename("<>|*\""), "_____");
    }

    #[test]
    fn suggested_name_uses_title_and_format() {
        assert_eq!(suggested_filename(Some("My Video"), DownloadFormat::MP4), "My Video.mp4");
        assert_eq!(suggested_filename(Some("Song: Live"), DownloadFormat::MP3), "Song_ Live.mp3");
    }

    #[test]
    fn suggested_name_falls_back_to_generic() {
        assert_eq!(suggested_filename(None, DownloadFormat::MP4), "download.mp4");
        assert_eq!(suggested_filename(Some(" ... "), DownloadFormat::MP3), "download.mp3");
    }

    #[test]
    fn suggested_name_is_capped() {
        let long = "x".repeat(400);
        let name = suggested_filename(Some(&long), DownloadFormat::MP4);
        assert_eq!(name.len(), MAX_FILE_STEM + ".mp4".len());
    }

    #[test]
    fn unique_path_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_path(dir.path(), "a.mp4"), dir.path().join("a.mp4"));
        fs::write(dir.path().join("a.mp4"), b"").unwrap();
        assert_eq!(unique_path(dir.path(), "a.mp4"), dir.path().join("a (1).mp4"));
        fs::write(dir.path().join("a (1).mp4"), b"").unwrap();
        assert_eq!(unique_path(dir.path(), "a.mp4"), dir.path().join("a (2).mp4"));
    }

    #[test]
    fn negotiate_returns_the_chosen_target() {
        let picker = ScriptedPicker::new(true, PickOutcome::Chosen(PathBuf::from("/tmp/x.mp4")));
        let target = negotiate(&picker, "x.mp4", DownloadFormat::MP4).unwrap();
        assert_eq!(target, Some(SaveTarget::new(PathBuf::from("/tmp/x.mp4"))));
        assert_eq!(
            picker.asked.lock().unwrap()[0],
            ("x.mp4".to_string(), DownloadFormat::MP4)
        );
    }

    #[test]
    fn negotiate_propagates_cancel() {
        let picker = ScriptedPicker::new(true, PickOutcome::Cancelled);
        assert_eq!(
            negotiate(&picker, "x.mp3", DownloadFormat::MP3),
            Err(DownloadError::SaveCancelled)
        );
    }

    #[test]
    fn negotiate_without_a_picker_defers() {
        let picker = ScriptedPicker::unavailable();
        assert_eq!(negotiate(&picker, "x.mp4", DownloadFormat::MP4), Ok(None));
        assert_eq!(picker.times_asked(), 0);

        let broken = ScriptedPicker::new(true, PickOutcome::Unavailable("portal error".into()));
        assert_eq!(negotiate(&broken, "x.mp4", DownloadFormat::MP4), Ok(None));
    }

    #[test]
    fn filters_depend_on_format() {
        assert_eq!(DownloadFormat::MP3.file_filter().1, &["mp3"]);
        assert_eq!(DownloadFormat::MP4.file_filter().1, &["mp4"]);
        assert_eq!(
            with_extension(PathBuf::from("/tmp/song"), DownloadFormat::MP3),
            PathBuf::from("/tmp/song.mp3")
        );
    }

    #[test]
    fn picker_target_receives_the_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chosen.mp4");
        let strategy = NativePickerSave::new(SaveTarget::new(path.clone()));
        assert_eq!(strategy.persist(&file("ignored.mp4")).unwrap(), Persisted::Saved(path.clone()));
        assert_eq!(fs::read(path).unwrap(), b"media");
    }

    #[test]
    fn picker_target_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chosen.mp4");
        let strategy = NativePickerSave::new(SaveTarget::new(path));
        assert!(strategy.persist(&file("x.mp4")).is_err());
    }

    #[test]
    fn downloads_folder_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = DownloadsFolderSave::new(dir.path().join("Downloads"));
        let first = strategy.persist(&file("My Video.mp4")).unwrap();
        let second = strategy.persist(&file("My Video.mp4")).unwrap();
        assert_eq!(first, Persisted::Saved(dir.path().join("Downloads").join("My Video.mp4")));
        assert_eq!(
            second,
            Persisted::Saved(dir.path().join("Downloads").join("My Video (1).mp4"))
        );
    }

    #[test]
    fn browser_handoff_reports_the_url() {
        let opener = RecordingOpener::default();
        let strategy = BrowserHandoff::new(&opener);
        let persisted = strategy.persist(&file("x.mp4")).unwrap();
        assert!(matches!(persisted, Persisted::HandedOff(_)));
        assert_eq!(opener.opened.lock().unwrap().len(), 1);

        let failing = RecordingOpener { fail: true, ..Default::default() };
        assert!(BrowserHandoff::new(&failing).persist(&file("x.mp4")).is_err());
    }
}
