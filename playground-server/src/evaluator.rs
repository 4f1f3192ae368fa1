//! Runs the evaluator command for `POST /eval`.
//!
//! The evaluator is opaque: any command that reads a snippet on stdin and
//! writes its result to stdout. Each evaluation gets a fresh process, a
//! wall-clock limit, and bounded output capture.
//!
//! On Unix the evaluator leads its own process group, and a timeout kills the
//! whole group so helpers it started cannot outlive the limit.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

pub const DEFAULT_EVAL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;
pub const TIMEOUT_MESSAGE: &str = "evaluation exceeded the allowed execution time";

#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Program and arguments; the snippet is written to its stdin.
    pub command: Vec<String>,
    pub timeout: Duration,
    /// Bytes of stdout/stderr kept per stream; the rest is drained and dropped.
    pub output_limit_bytes: usize,
}

impl EvaluatorConfig {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            timeout: DEFAULT_EVAL_TIMEOUT,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.command.is_empty() || self.command[0].trim().is_empty() {
            return Err(anyhow!("evaluator command must be non-empty"));
        }
        if self.timeout.is_zero() {
            return Err(anyhow!("evaluation timeout must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output limit must be > 0"));
        }
        Ok(())
    }
}

/// What the evaluator produced for one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalReply {
    /// Successful run; rendered as a JSON string.
    Value(String),
    /// Failed or timed-out run; rendered as `{"error": ...}`.
    Error(String),
}

impl EvalReply {
    pub fn to_json(&self) -> Value {
        match self {
            EvalReply::Value(text) => Value::String(text.clone()),
            EvalReply::Error(message) => json!({ "error": message }),
        }
    }
}

pub struct CommandEvaluator {
    config: EvaluatorConfig,
}

impl CommandEvaluator {
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate `source`. Blocks until the process exits or is killed.
    ///
    /// Only failures to run the command at all are errors; evaluator failures
    /// and timeouts are replies.
    #[instrument(skip_all, fields(program = %self.config.command[0], timeout_ms = self.config.timeout.as_millis() as u64))]
    pub fn evaluate(&self, source: &str) -> Result<EvalReply> {
        let limit = self.config.output_limit_bytes;
        let mut command = Command::new(&self.config.command[0]);
        command
            .args(&self.config.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("spawn evaluator {}", self.config.command[0]))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;

        let stdout_handle = thread::spawn(move || read_stream_limited(stdout, limit));
        let stderr_handle = thread::spawn(move || read_stream_limited(stderr, limit));
        let input = source.as_bytes().to_vec();
        let stdin_handle = thread::spawn(move || match stdin.write_all(&input) {
            // The evaluator may exit without reading all of its input.
            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => other,
        });

        let Some(status) = child
            .wait_timeout(self.config.timeout)
            .context("wait for evaluator")?
        else {
            warn!("evaluator timed out, killing");
            kill_process_group(&child);
            child.kill().context("kill evaluator")?;
            child.wait().context("wait evaluator after kill")?;
            // I/O threads are not joined: descendants that left the group may
            // still hold the pipes open.
            return Ok(EvalReply::Error(TIMEOUT_MESSAGE.to_string()));
        };

        stdin_handle
            .join()
            .map_err(|_| anyhow!("stdin writer panicked"))?
            .context("write evaluator stdin")?;
        let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
        let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;
        debug!(exit_code = ?status.code(), stdout_truncated, stderr_truncated, "evaluator finished");

        let stdout = render_output(&stdout, stdout_truncated);
        if status.success() {
            return Ok(EvalReply::Value(stdout));
        }
        let stderr = render_output(&stderr, stderr_truncated);
        let message = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            format!("evaluator exited with status {:?}", status.code())
        };
        Ok(EvalReply::Error(message))
    }
}

/// SIGKILL every process in the evaluator's group.
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let group = format!("-{}", child.id());
    match Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => debug!(?status, group = %group, "kill process group"),
        Err(err) => warn!(error = %err, "could not run kill for process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

fn render_output(bytes: &[u8], truncated: usize) -> String {
    let mut text = String::from_utf8_lossy(bytes).trim_end().to_string();
    if truncated > 0 {
        text.push_str(&format!("\n[output truncated {truncated} bytes]"));
    }
    text
}

/// Read a stream to the end, keeping at most `limit` bytes.
///
/// Returns the kept bytes and the number of bytes discarded.
fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> std::io::Result<(Vec<u8>, usize)> {
    let mut kept = Vec::new();
    let mut discarded = 0usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        let take = limit.saturating_sub(kept.len()).min(n);
        kept.extend_from_slice(&chunk[..take]);
        discarded += n - take;
    }
    Ok((kept, discarded))
}

fn join_output(handle: JoinHandle<std::io::Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader panicked"))?
        .context("read output")
}
