use crate::core::copier::{ByteCopier, DEFAULT_BUFFER_SIZE};
use crate::utils::error::{KclError, Result};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external program while two copier threads drain its stdout and
/// stderr. On unix the child leads its own process group, so a timeout
/// kills its descendants as well.
#[derive(Debug, Clone)]
pub struct SystemProcess {
    executable: PathBuf,
    variables: BTreeMap<String, String>,
    inherit_environment: bool,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    buffer_size: usize,
}

impl SystemProcess {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            variables: BTreeMap::new(),
            inherit_environment: true,
            working_dir: None,
            timeout: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn remove_variable(mut self, key: &str) -> Self {
        self.variables.remove(key);
        self
    }

    /// With `false` the child only sees the variables added here.
    pub fn inherit_environment(mut self, inherit: bool) -> Self {
        self.inherit_environment = inherit;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The child gets killed when it runs longer than this.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Chunk size used while draining stdout and stderr.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Runs the program and collects its output in memory.
    pub fn execute<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<ProcessOutput> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let exit_code = self.execute_with(args, &mut stdout, &mut stderr)?;
        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
        })
    }

    /// Runs the program with its output forwarded to the console.
    pub fn execute_to_console<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<i32> {
        self.execute_with(args, &mut std::io::stdout(), &mut std::io::stderr())
    }

    /// Runs the program streaming stdout and stderr into the supplied sinks.
    /// Returns the exit code (`-1` when the child was ended by a signal).
    ///
    /// With a timeout the call returns once it has elapsed, even when
    /// descendants of the child still hold its output streams open.
    pub fn execute_with<S, O, E>(&self, args: &[S], out: &mut O, err: &mut E) -> Result<i32>
    where
        S: AsRef<OsStr>,
        O: Write,
        E: Write,
    {
        let mut child = self.spawn(args)?;
        let child_out = child.stdout.take().ok_or_else(|| KclError::ProcessError {
            message: "stdout of child not captured".to_string(),
        })?;
        let child_err = child.stderr.take().ok_or_else(|| KclError::ProcessError {
            message: "stderr of child not captured".to_string(),
        })?;

        let (sender, receiver) = unbounded();
        self.drain(child_out, StreamKind::Stdout, sender.clone());
        self.drain(child_err, StreamKind::Stderr, sender);

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut open_streams = 2;
        let mut status = None;
        loop {
            if status.is_none() {
                status = child.try_wait()?;
            }
            if open_streams == 0 {
                if let Some(status) = status {
                    out.flush()?;
                    err.flush()?;
                    return Ok(self.finished(status));
                }
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                self.kill(&mut child);
                return Err(self.timed_out());
            }

            let wait = deadline.map_or(POLL_INTERVAL, |deadline| {
                deadline
                    .saturating_duration_since(Instant::now())
                    .min(POLL_INTERVAL)
            });
            if open_streams == 0 {
                // both streams are done, only the child is left
                if deadline.is_none() {
                    status = Some(child.wait()?);
                } else {
                    std::thread::sleep(wait);
                }
                continue;
            }
            match receiver.recv_timeout(wait) {
                Ok(StreamEvent::Chunk(StreamKind::Stdout, chunk)) => out.write_all(&chunk)?,
                Ok(StreamEvent::Chunk(StreamKind::Stderr, chunk)) => err.write_all(&chunk)?,
                Ok(StreamEvent::Closed(result)) => {
                    open_streams -= 1;
                    result?;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => open_streams = 0,
            }
        }
    }

    /// Copies one output stream of the child into the channel. The thread
    /// is detached so that a stuck stream never blocks the caller.
    fn drain<R>(&self, mut stream: R, kind: StreamKind, sender: Sender<StreamEvent>)
    where
        R: Read + Send + 'static,
    {
        let copier = ByteCopier::new().with_buffer_size(self.buffer_size);
        std::thread::spawn(move || {
            let mut sink = ChannelSink {
                kind,
                sender: sender.clone(),
            };
            let result = copier.copy(&mut stream, &mut sink);
            // the receiver is gone when the call already returned
            let _ = sender.send(StreamEvent::Closed(result));
        });
    }

    fn finished(&self, status: ExitStatus) -> i32 {
        let exit_code = status.code().unwrap_or(-1);
        tracing::debug!(
            "Process '{}' finished with exit code {}",
            self.executable.display(),
            exit_code
        );
        exit_code
    }

    fn timed_out(&self) -> KclError {
        let timeout = self.timeout.unwrap_or_default();
        tracing::warn!(
            "Process '{}' exceeded {:?}",
            self.executable.display(),
            timeout
        );
        KclError::TimeoutError {
            millis: timeout.as_millis(),
        }
    }

    fn spawn<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<Child> {
        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !self.inherit_environment {
            command.env_clear();
        }
        command.envs(&self.variables);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        tracing::info!("Starting process '{}'", self.executable.display());
        command.spawn().map_err(|e| KclError::ProcessError {
            message: format!("cannot start '{}': {}", self.executable.display(), e),
        })
    }

    /// Kills the child together with everything it started.
    fn kill(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Ok(group) = libc::pid_t::try_from(child.id()) {
            // the child leads its own process group
            if unsafe { libc::kill(-group, libc::SIGKILL) } != 0 {
                tracing::warn!(
                    "Failed to kill process group {}: {}",
                    group,
                    std::io::Error::last_os_error()
                );
            }
        }
        if let Err(e) = child.kill() {
            tracing::debug!("Failed to kill process: {}", e);
        }
        if let Err(e) = child.wait() {
            tracing::warn!("Failed to reap process: {}", e);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StreamKind {
    Stdout,
    Stderr,
}

enum StreamEvent {
    Chunk(StreamKind, Vec<u8>),
    Closed(Result<u64>),
}

struct ChannelSink {
    kind: StreamKind,
    sender: Sender<StreamEvent>,
}

impl Write for ChannelSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.sender
            .send(StreamEvent::Chunk(self.kind, buf.to_vec()))
            .map_err(|_| std::io::Error::from(std::io::ErrorKind::BrokenPipe))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
