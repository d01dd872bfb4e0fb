//! Remote sources fetched with a yt-dlp compatible downloader.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use super::sanitize::title_or_default;
use super::{AcquireError, AcquireResult, Acquired};
use crate::process::{CommandRunner, CommandSpec, OutputStream, ProgressWindow, RunObserver};

/// Suffixes of incomplete downloads left behind by the downloader.
const PARTIAL_SUFFIXES: [&str; 4] = ["part", "ytdl", "temp", "tmp"];

/// Builds and runs downloader commands.
#[derive(Debug, Clone)]
pub struct Downloader {
    program: String,
}

impl Downloader {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command fetching the best available audio of `url` into `dir`.
    ///
    /// Progress is printed on stdout one line per update.
    pub fn command(&self, url: &Url, dir: &Path) -> CommandSpec {
        let template = dir.join("%(title)s.%(ext)s");
        CommandSpec::new("yt-dlp", &self.program)
            .args(["--newline", "--no-playlist", "-f", "bestaudio/best", "-o"])
            .arg(template.to_string_lossy())
            .arg(url.as_str())
            .primary_stream(OutputStream::Stdout)
    }

    /// Download `url` into the (empty, private) directory `dir`.
    pub fn download(
        &self,
        runner: &dyn CommandRunner,
        url: &Url,
        dir: &Path,
        window: ProgressWindow,
        observer: &dyn RunObserver,
    ) -> AcquireResult<Acquired> {
        fs::create_dir_all(dir).map_err(|e| AcquireError::io("creating download directory", e))?;

        let spec = self.command(url, dir);
        runner.run(&spec, Some(window), observer)?;

        let path = find_downloaded(dir)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Acquired {
            title: title_or_default(&stem),
            path,
            remote: true,
        })
    }
}

/// Locate the downloaded file in `dir`.
///
/// Partial download artifacts are ignored. If several complete files are
/// present the largest wins.
pub fn find_downloaded(dir: &Path) -> AcquireResult<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| AcquireError::io("scanning download directory", e))?;

    let mut best: Option<(u64, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| AcquireError::io("scanning download directory", e))?;
        let path = entry.path();
        if !path.is_file() || is_partial(&path) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if best.as_ref().map_or(true, |(s, _)| size > *s) {
            best = Some((size, path));
        }
    }

    best.map(|(_, path)| path)
        .ok_or_else(|| AcquireError::NothingDownloaded {
            dir: dir.to_path_buf(),
        })
}

fn is_partial(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PARTIAL_SUFFIXES.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessError, ProcessResult};
    use tempfile::tempdir;

    struct Silent;

    impl RunObserver for Silent {
        fn on_line(&self, _line: &str) {}
        fn on_progress(&self, _percent: u8) {}
    }

    /// Writes a fake download into the `-o` template's directory.
    struct FakeDownloader {
        file_name: Option<&'static str>,
    }

    impl CommandRunner for FakeDownloader {
        fn run(
            &self,
            spec: &CommandSpec,
            window: Option<ProgressWindow>,
            observer: &dyn RunObserver,
        ) -> ProcessResult<()> {
            let template = PathBuf::from(spec.arg_after("-o").unwrap_or_default());
            let dir = template.parent().unwrap().to_path_buf();
            if let Some(window) = window {
                observer.on_progress(window.map(100));
            }
            match self.file_name {
                Some(name) => {
                    fs::write(dir.join(name), b"audio-bytes").unwrap();
                    Ok(())
                }
                None => Err(ProcessError::failed("yt-dlp", 1, "ERROR: Video unavailable")),
            }
        }
    }

    #[test]
    fn command_uses_stdout_and_template() {
        let url = Url::parse("https://youtu.be/abc").unwrap();
        let spec = Downloader::new("yt-dlp").command(&url, Path::new("/tmp/job/download"));

        assert_eq!(spec.primary, OutputStream::Stdout);
        assert!(spec.has_arg("--newline"));
        assert!(spec.has_arg("--no-playlist"));
        assert_eq!(spec.arg_after("-f"), Some("bestaudio/best"));
        assert!(spec.arg_after("-o").unwrap().ends_with("%(title)s.%(ext)s"));
        assert_eq!(spec.args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[test]
    fn download_picks_up_file_and_sanitizes_title() {
        let dir = tempdir().unwrap();
        let url = Url::parse("https://example.com/watch?v=1").unwrap();
        let runner = FakeDownloader {
            file_name: Some("Artist - Song (Official).webm"),
        };

        let acquired = Downloader::new("yt-dlp")
            .download(&runner, &url, dir.path(), ProgressWindow::new(0, 10), &Silent)
            .unwrap();

        assert_eq!(acquired.title, "Artist_-_Song_(Official)");
        assert!(acquired.path.ends_with("Artist - Song (Official).webm"));
        assert!(acquired.remote);
    }

    #[test]
    fn download_failure_propagates_exit_code() {
        let dir = tempdir().unwrap();
        let url = Url::parse("https://example.com/gone").unwrap();
        let runner = FakeDownloader { file_name: None };

        let err = Downloader::new("yt-dlp")
            .download(&runner, &url, dir.path(), ProgressWindow::new(0, 10), &Silent)
            .unwrap_err();

        assert!(err.to_string().contains("Video unavailable"));
    }

    #[test]
    fn partial_files_are_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.webm.part"), b"xxxxxxxxxxxxxxxx").unwrap();

        assert!(matches!(
            find_downloaded(dir.path()),
            Err(AcquireError::NothingDownloaded { .. })
        ));

        fs::write(dir.path().join("song.webm"), b"x").unwrap();
        assert!(find_downloaded(dir.path()).unwrap().ends_with("song.webm"));
    }
}
