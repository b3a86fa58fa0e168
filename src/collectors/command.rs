use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An external program to run, with a bound on how long it may take.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args:    Vec<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str], timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args:    args.iter().map(|a| a.to_string()).collect(),
            timeout,
        }
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("{0}: permission denied")]
    PermissionDenied(String),
    #[error("no output within {}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Runs a command and hands back its standard output.
/// Collectors take this as a parameter so tests can feed canned output.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<String, CommandError>;
}

/// Spawns real processes, killing them once `spec.timeout` elapses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<String, CommandError> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound         => CommandError::NotFound(spec.program.clone()),
                io::ErrorKind::PermissionDenied => CommandError::PermissionDenied(spec.program.clone()),
                _                               => CommandError::Io(e),
            })?;

        // Drain pipes on helper threads so a chatty child cannot fill the
        // pipe buffer and stall before we notice it exited.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let start = Instant::now();
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if start.elapsed() >= spec.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::debug!(cmd = %spec.display(), "killed after timeout");
                    return Err(CommandError::Timeout(spec.timeout));
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let out = stdout.map(join_lossy).unwrap_or_default();
        let err = stderr.map(join_lossy).unwrap_or_default();

        if !status.success() {
            return Err(CommandError::Failed {
                status: status.code().unwrap_or(-1),
                stderr: err.trim().to_string(),
            });
        }
        Ok(out)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_lossy(handle: thread::JoinHandle<Vec<u8>>) -> String {
    handle.join()
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}
