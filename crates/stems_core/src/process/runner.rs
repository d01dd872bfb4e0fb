//! Progress-scraping command runner.

use std::io::{BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

use super::errors::{ProcessError, ProcessResult};
use super::lines::OutputLines;
use super::progress::{scrape_percent, ProgressWindow};

/// One of a child process's two output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStream {
    Stdout,
    #[default]
    Stderr,
}

impl OutputStream {
    fn label(&self) -> &'static str {
        match self {
            OutputStream::Stdout => "STDOUT",
            OutputStream::Stderr => "STDERR",
        }
    }

    fn other(&self) -> Self {
        match self {
            OutputStream::Stdout => OutputStream::Stderr,
            OutputStream::Stderr => OutputStream::Stdout,
        }
    }
}

/// Fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Short tool name used in errors and logs (e.g. "demucs").
    pub tool: String,
    /// Executable to launch.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Stream that carries live diagnostics and progress.
    pub primary: OutputStream,
}

impl CommandSpec {
    pub fn new(tool: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            primary: OutputStream::Stderr,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Read diagnostics from stdout instead of stderr.
    pub fn primary_stream(mut self, stream: OutputStream) -> Self {
        self.primary = stream;
        self
    }

    /// Whether any argument equals `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following `flag`, if present.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Receives live output from a running command.
pub trait RunObserver {
    /// A non-empty, trimmed line from the primary stream.
    fn on_line(&self, line: &str);

    /// A mapped progress value in the overall 0..=100 scale.
    fn on_progress(&self, percent: u8);
}

/// Runs external commands.
///
/// Implementations stream the primary output of the command to the
/// observer while it runs and fail with [`ProcessError::Failed`] on a
/// nonzero exit. Swapping the implementation swaps every tool the
/// pipeline uses.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        spec: &CommandSpec,
        window: Option<ProgressWindow>,
        observer: &dyn RunObserver,
    ) -> ProcessResult<()>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    /// Read the primary stream line by line, forwarding lines and progress.
    fn pump(
        primary: impl Read,
        window: Option<ProgressWindow>,
        observer: &dyn RunObserver,
    ) -> std::io::Result<String> {
        let window = window.filter(ProgressWindow::is_active);
        let mut collected = String::new();

        for line in OutputLines::new(BufReader::new(primary)) {
            let line = line?;
            collected.push_str(&line);
            collected.push('\n');

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                observer.on_line(trimmed);
            }

            if let Some(window) = window {
                if let Some(pct) = scrape_percent(&line) {
                    observer.on_progress(window.map(pct));
                }
            }
        }

        Ok(collected)
    }

    /// Pump the primary stream while the secondary one is drained on its
    /// own thread, so neither pipe can fill up. `stop` runs before the
    /// drain is joined when the primary stream fails, since the drain only
    /// finishes once the child closes its end.
    fn read_streams(
        primary: Option<Box<dyn Read + Send>>,
        secondary: Option<Box<dyn Read + Send>>,
        window: Option<ProgressWindow>,
        observer: &dyn RunObserver,
        stop: impl FnOnce(),
    ) -> std::io::Result<(String, String)> {
        thread::scope(|scope| {
            let drain = scope.spawn(move || {
                let mut buf = Vec::new();
                if let Some(mut reader) = secondary {
                    let _ = reader.read_to_end(&mut buf);
                }
                String::from_utf8_lossy(&buf).into_owned()
            });

            let primary_text = match primary {
                Some(reader) => Self::pump(reader, window, observer),
                None => Ok(String::new()),
            };
            if primary_text.is_err() {
                stop();
            }
            let secondary_text = drain.join().unwrap_or_default();
            primary_text.map(|text| (text, secondary_text))
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        spec: &CommandSpec,
        window: Option<ProgressWindow>,
        observer: &dyn RunObserver,
    ) -> ProcessResult<()> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        tracing::debug!("Running: {}", spec.display());

        let mut child = cmd
            .spawn()
            .map_err(|e| ProcessError::spawn_failed(&spec.program, e))?;

        let stdout = child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>);
        let stderr = child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>);
        let (primary, secondary) = match spec.primary {
            OutputStream::Stderr => (stderr, stdout),
            OutputStream::Stdout => (stdout, stderr),
        };

        let streams = Self::read_streams(primary, secondary, window, observer, || {
            let _ = child.kill();
        });

        let (primary_text, secondary_text) = match streams {
            Ok(texts) => texts,
            Err(e) => {
                let _ = child.wait();
                return Err(ProcessError::io(&spec.program, e));
            }
        };

        let status = child
            .wait()
            .map_err(|e| ProcessError::io(&spec.program, e))?;

        if status.success() {
            return Ok(());
        }

        let exit_code = status.code().unwrap_or(-1);
        let output = combine_output(spec.primary, &primary_text, &secondary_text);
        tracing::debug!("{} exited with code {}", spec.tool, exit_code);

        Err(ProcessError::failed(&spec.tool, exit_code, output))
    }
}

/// Aggregate both streams into one failure payload.
fn combine_output(primary: OutputStream, primary_text: &str, secondary_text: &str) -> String {
    if secondary_text.trim().is_empty() {
        return primary_text.to_string();
    }

    format!(
        "{}:\n{}\n{}:\n{}",
        primary.label(),
        primary_text,
        primary.other().label(),
        secondary_text
    )
}
