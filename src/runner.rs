//! Model execution and mask computation interfaces.
//!
//! The model itself is external. A [`ModelRunner`] runs on a worker thread
//! owned by a [`RunHandle`] and talks back over a channel:
//!
//! ```text
//! Caller                              Worker thread
//! ------                              -------------
//! RunHandle::spawn(runner, request) ─────────▶ runner.run(request, ctx)
//!                                               ctx.progress(..)
//! poll() / wait()  ◀────────────────────────── RunEvent::Progress / Output
//! stop(grace): cancel token set ─────────────▶ ctx.is_cancelled()
//!              wait up to grace               return
//!              ◀────────────────────────────── RunEvent::Finished
//! ```
//!
//! A runner that ignores cancellation is abandoned once the grace period
//! expires; its thread is detached and its result discarded.

use std::io::{self, BufRead, BufReader, Read};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bitflags::bitflags;

/// Grace period used when the configuration does not set one.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_millis(3000);

/// Cooperative cancellation flag shared with a running model.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRequest {
    pub settings_path: PathBuf,
    pub args: Vec<String>,
}

impl RunRequest {
    #[must_use]
    pub fn new(settings_path: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            settings_path: settings_path.into(),
            args,
        }
    }
}

/// Result reported by a model run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    pub success: bool,
    /// Discharge at the last time step, when the model reports one.
    pub last_discharge: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Message from the worker thread.
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    /// Percent complete, always within `0..=100`.
    Progress(u8),
    Output { stream: OutputStream, line: String },
    Finished(Result<RunOutcome, String>),
}

/// Handed to a runner for reporting and cancellation checks.
#[derive(Debug)]
pub struct RunContext {
    cancel: CancelToken,
    tx: Sender<RunEvent>,
}

impl RunContext {
    /// Checked by runners between discrete steps.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Report progress; values are clamped to `[0, 100]`.
    pub fn progress(&self, percent: f64) {
        let clamped = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        // clamped to 0..=100 above, the cast cannot truncate
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let _ = self.tx.send(RunEvent::Progress(clamped.round() as u8));
    }

    pub fn stdout(&self, line: impl Into<String>) {
        self.output(OutputStream::Stdout, line.into());
    }

    pub fn stderr(&self, line: impl Into<String>) {
        self.output(OutputStream::Stderr, line.into());
    }

    fn output(&self, stream: OutputStream, line: String) {
        // receiver gone means the handle was dropped; output is discarded
        let _ = self.tx.send(RunEvent::Output { stream, line });
    }
}

/// External hydrological model.
pub trait ModelRunner: Send + 'static {
    fn run(&mut self, request: &RunRequest, ctx: &RunContext) -> Result<RunOutcome, String>;
}

/// How [`RunHandle::stop`] ended.
#[derive(Clone, Debug, PartialEq)]
pub enum StopOutcome {
    /// The runner returned within the grace period.
    Finished(Result<RunOutcome, String>),
    /// The runner kept going; its thread was detached.
    Abandoned,
}

/// Owner of one background model run.
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancelToken,
    rx: Receiver<RunEvent>,
    handle: Option<JoinHandle<()>>,
    result: Option<Result<RunOutcome, String>>,
}

impl RunHandle {
    /// Start `runner` on a new thread.
    pub fn spawn<R: ModelRunner>(mut runner: R, request: RunRequest) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let ctx = RunContext {
            cancel: cancel.clone(),
            tx,
        };
        tracing::debug!(settings = %request.settings_path.display(), args = ?request.args, "starting model run");

        let handle = thread::Builder::new()
            .name("cwatm-run".to_string())
            .spawn(move || {
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| runner.run(&request, &ctx)))
                    .unwrap_or_else(|payload| Err(panic_message(&*payload)));
                let _ = ctx.tx.send(RunEvent::Finished(result));
            })?;

        Ok(Self {
            cancel,
            rx,
            handle: Some(handle),
            result: None,
        })
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Result of the run, once it has been received.
    #[must_use]
    pub fn result(&self) -> Option<&Result<RunOutcome, String>> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    fn record(&mut self, event: &RunEvent) {
        if let RunEvent::Finished(result) = event {
            self.result = Some(result.clone());
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    /// Drain events without blocking.
    pub fn poll(&mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.record(&event);
                    events.push(event);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Block until the run finishes, passing every event to `on_event`.
    pub fn wait_with<F: FnMut(&RunEvent)>(&mut self, mut on_event: F) -> Result<RunOutcome, String> {
        if let Some(result) = &self.result {
            return result.clone();
        }
        while let Ok(event) = self.rx.recv() {
            on_event(&event);
            self.record(&event);
            if let Some(result) = &self.result {
                return result.clone();
            }
        }
        Err("model thread exited without a result".to_string())
    }

    pub fn wait(&mut self) -> Result<RunOutcome, String> {
        self.wait_with(|_| {})
    }

    /// Request cancellation and wait up to `grace` for the runner to return.
    pub fn stop(&mut self, grace: Duration) -> StopOutcome {
        self.cancel.cancel();
        if let Some(result) = &self.result {
            return StopOutcome::Finished(result.clone());
        }

        let deadline = Instant::now() + grace;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.record(&event);
                    if let Some(result) = &self.result {
                        tracing::debug!("model run stopped");
                        return StopOutcome::Finished(result.clone());
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }

        tracing::warn!(grace_ms = grace.as_millis(), "model run ignored cancellation; abandoning worker");
        self.handle = None;
        StopOutcome::Abandoned
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        // never block on a runner that may not check the token
        self.cancel.cancel();
    }
}

fn panic_message(payload: &dyn std::any::Any) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "model run panicked".to_string())
}

/// Runs the model as a child process: `program <settings> <args..>`.
///
/// Both output streams are forwarded line by line. The child is killed as
/// soon as the run is cancelled.
#[derive(Clone, Debug)]
pub struct CommandRunner {
    program: PathBuf,
    poll_interval: Duration,
}

impl CommandRunner {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            poll_interval: Duration::from_millis(50),
        }
    }

    /// How often the child is checked for exit and cancellation.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `None` when the child was killed after cancellation.
    fn supervise(&self, ctx: &RunContext, request: &RunRequest) -> io::Result<Option<ExitStatus>> {
        let mut child = Command::new(&self.program)
            .arg(&request.settings_path)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        tracing::debug!(program = %self.program.display(), pid = child.id(), "model process started");
        ctx.progress(0.0);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        thread::scope(|scope| -> io::Result<Option<ExitStatus>> {
            if let Some(out) = stdout {
                scope.spawn(move || forward_lines(out, OutputStream::Stdout, ctx));
            }
            if let Some(err) = stderr {
                scope.spawn(move || forward_lines(err, OutputStream::Stderr, ctx));
            }
            loop {
                if let Some(status) = child.try_wait()? {
                    return Ok(Some(status));
                }
                if ctx.is_cancelled() {
                    // already exited is fine; wait() reaps either way
                    let _ = child.kill();
                    child.wait()?;
                    return Ok(None);
                }
                thread::sleep(self.poll_interval);
            }
        })
    }
}

impl ModelRunner for CommandRunner {
    fn run(&mut self, request: &RunRequest, ctx: &RunContext) -> Result<RunOutcome, String> {
        let status = self
            .supervise(ctx, request)
            .map_err(|e| format!("cannot run {}: {e}", self.program.display()))?;
        match status {
            None => Err("model run cancelled".to_string()),
            Some(status) if status.success() => {
                ctx.progress(100.0);
                Ok(RunOutcome {
                    success: true,
                    last_discharge: None,
                })
            }
            Some(status) => {
                tracing::warn!(%status, "model process failed");
                Ok(RunOutcome {
                    success: false,
                    last_discharge: None,
                })
            }
        }
    }
}

fn forward_lines(reader: impl Read, stream: OutputStream, ctx: &RunContext) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                ctx.output(stream, line.trim_end_matches(['\n', '\r']).to_string());
            }
        }
    }
}

bitflags! {
    /// Flags passed to the mask computation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MaskMode: u8 {
        /// Verbose model output.
        const VERBOSE = 1 << 0;
        /// Started from the front-end rather than a terminal.
        const GUI = 1 << 1;
        /// Compute the basin mask upstream of the outlet.
        const MASK = 1 << 2;
    }
}

impl MaskMode {
    /// Command-line switch form, e.g. `-vgm`.
    #[must_use]
    pub fn to_arg(self) -> String {
        let mut arg = String::from("-");
        for (flag, c) in [(Self::VERBOSE, 'v'), (Self::GUI, 'g'), (Self::MASK, 'm')] {
            if self.contains(flag) {
                arg.push(c);
            }
        }
        arg
    }
}

/// Raster produced by a mask computation.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskGrid {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell values, `rows * cols` long.
    pub data: Vec<f32>,
    /// Position of the grid's first cell inside the basin raster.
    pub offset: (usize, usize),
}

impl MaskGrid {
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Number of cells equal to 1.
    #[must_use]
    pub fn masked_cells(&self) -> usize {
        self.data.iter().filter(|v| (**v - 1.0).abs() < f32::EPSILON).count()
    }
}

/// External mask computation.
pub trait MaskProvider {
    fn compute_mask(
        &self,
        settings_path: &Path,
        mode: MaskMode,
        extra_args: &[String],
    ) -> Result<MaskGrid, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StepRunner {
        steps: u32,
    }

    impl ModelRunner for StepRunner {
        fn run(&mut self, request: &RunRequest, ctx: &RunContext) -> Result<RunOutcome, String> {
            ctx.stdout(format!("settings {}", request.settings_path.display()));
            for step in 0..self.steps {
                if ctx.is_cancelled() {
                    return Ok(RunOutcome {
                        success: false,
                        last_discharge: None,
                    });
                }
                ctx.progress(f64::from(step + 1) * 100.0 / f64::from(self.steps));
                thread::sleep(Duration::from_millis(5));
            }
            ctx.stderr("done");
            Ok(RunOutcome {
                success: true,
                last_discharge: Some(12.5),
            })
        }
    }

    struct Stubborn;

    impl ModelRunner for Stubborn {
        fn run(&mut self, _: &RunRequest, _: &RunContext) -> Result<RunOutcome, String> {
            thread::sleep(Duration::from_millis(500));
            Ok(RunOutcome {
                success: true,
                last_discharge: None,
            })
        }
    }

    struct Panicky;

    impl ModelRunner for Panicky {
        fn run(&mut self, _: &RunRequest, _: &RunContext) -> Result<RunOutcome, String> {
            panic!("boom");
        }
    }

    fn request() -> RunRequest {
        RunRequest::new("settings.ini", vec!["-lg".into()])
    }

    #[test]
    fn run_reports_progress_and_result() {
        let mut handle = RunHandle::spawn(StepRunner { steps: 4 }, request()).unwrap();
        let mut progress = Vec::new();
        let mut lines = Vec::new();
        let result = handle.wait_with(|event| match event {
            RunEvent::Progress(p) => progress.push(*p),
            RunEvent::Output { line, .. } => lines.push(line.clone()),
            RunEvent::Finished(_) => {}
        });
        assert_eq!(progress, [25, 50, 75, 100]);
        assert_eq!(lines, ["settings settings.ini", "done"]);
        assert_eq!(result.unwrap().last_discharge, Some(12.5));
        assert!(handle.is_finished());
    }

    #[test]
    fn stop_cancels_cooperative_runner() {
        let mut handle = RunHandle::spawn(StepRunner { steps: 10_000 }, request()).unwrap();
        let outcome = handle.stop(Duration::from_secs(5));
        match outcome {
            StopOutcome::Finished(Ok(result)) => assert!(!result.success),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stop_abandons_runner_after_grace() {
        let mut handle = RunHandle::spawn(Stubborn, request()).unwrap();
        assert_eq!(handle.stop(Duration::from_millis(20)), StopOutcome::Abandoned);
        assert!(handle.cancel_token().is_cancelled());
    }

    #[test]
    fn panic_becomes_error() {
        let mut handle = RunHandle::spawn(Panicky, request()).unwrap();
        assert_eq!(handle.wait(), Err("boom".to_string()));
    }

    #[test]
    fn progress_is_clamped() {
        let (tx, rx) = mpsc::channel();
        let ctx = RunContext {
            cancel: CancelToken::new(),
            tx,
        };
        ctx.progress(-5.0);
        ctx.progress(250.0);
        ctx.progress(f64::NAN);
        let got: Vec<RunEvent> = rx.try_iter().collect();
        assert_eq!(
            got,
            [RunEvent::Progress(0), RunEvent::Progress(100), RunEvent::Progress(0)]
        );
    }

    #[cfg(unix)]
    fn script(body: &str) -> (tempfile::TempDir, RunRequest) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.sh");
        std::fs::write(&path, body).unwrap();
        (dir, RunRequest::new(path, vec!["-lg".into()]))
    }

    #[cfg(unix)]
    #[test]
    fn command_runner_forwards_output() {
        let (_dir, request) = script("echo \"args $1\"\necho warming >&2\nprintf 'last'\n");
        let runner = CommandRunner::new("sh").with_poll_interval(Duration::from_millis(5));
        let mut handle = RunHandle::spawn(runner, request).unwrap();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut progress = Vec::new();
        let result = handle.wait_with(|event| match event {
            RunEvent::Output {
                stream: OutputStream::Stdout,
                line,
            } => stdout.push(line.clone()),
            RunEvent::Output { line, .. } => stderr.push(line.clone()),
            RunEvent::Progress(p) => progress.push(*p),
            RunEvent::Finished(_) => {}
        });
        assert!(result.unwrap().success);
        assert_eq!(stdout, ["args -lg", "last"]);
        assert_eq!(stderr, ["warming"]);
        assert_eq!(progress, [0, 100]);
    }

    #[cfg(unix)]
    #[test]
    fn command_runner_reports_exit_failure() {
        let (_dir, request) = script("exit 3\n");
        let mut handle = RunHandle::spawn(CommandRunner::new("sh"), request).unwrap();
        assert!(!handle.wait().unwrap().success);
    }

    #[cfg(unix)]
    #[test]
    fn command_runner_kills_child_on_stop() {
        let (_dir, request) = script("exec sleep 30\n");
        let runner = CommandRunner::new("sh").with_poll_interval(Duration::from_millis(5));
        let mut handle = RunHandle::spawn(runner, request).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(
            handle.stop(Duration::from_secs(5)),
            StopOutcome::Finished(Err("model run cancelled".to_string()))
        );
    }

    #[test]
    fn command_runner_missing_program_is_error() {
        let runner = CommandRunner::new("/nonexistent/cwatm-model");
        let mut handle = RunHandle::spawn(runner, request()).unwrap();
        let err = handle.wait().unwrap_err();
        assert!(err.contains("/nonexistent/cwatm-model"));
    }

    #[test]
    fn mask_mode_args_and_grid_access() {
        assert_eq!((MaskMode::VERBOSE | MaskMode::GUI | MaskMode::MASK).to_arg(), "-vgm");
        assert_eq!(MaskMode::empty().to_arg(), "-");

        let grid = MaskGrid {
            rows: 2,
            cols: 2,
            data: vec![1.0, 0.0, 1.0, 1.0],
            offset: (3, 4),
        };
        assert_eq!(grid.get(1, 0), Some(1.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.masked_cells(), 3);
    }
}
