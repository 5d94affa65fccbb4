use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CHUNK: usize = 8 * 1024;

/// Everything a finished runtime process wrote, plus how it exited.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Both streams interleaved in the order the chunks arrived.
    pub combined: Vec<u8>,
}

impl Captured {
    pub fn exit_code(&self) -> i32 {
        exit_code(self.status)
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Default)]
struct Buffers {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    combined: Vec<u8>,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Render a command line for log output.
pub fn render(program: &OsStr, args: &[OsString]) -> String {
    let words = std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|w| w.to_string_lossy().into_owned());
    shell_words::join(words)
}

/// Run `program` to completion and capture its output.
///
/// With a `timeout`, the child is killed once the deadline passes and an
/// error is returned instead of a partial capture.
pub fn capture(program: &OsStr, args: &[OsString], timeout: Option<Duration>) -> Result<Captured> {
    let line = render(program, args);
    log::debug!("running {line}");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| {
            format!(
                "failed to invoke `{}`: is it installed and on PATH?",
                program.to_string_lossy()
            )
        })?;

    let stdout = child.stdout.take().context("stdout was not piped")?;
    let stderr = child.stderr.take().context("stderr was not piped")?;

    let buffers = Arc::new(Mutex::new(Buffers::default()));
    let readers = [
        pump(stdout, Stream::Stdout, buffers.clone()),
        pump(stderr, Stream::Stderr, buffers.clone()),
    ];

    let status = wait(&mut child, timeout);

    for handle in readers {
        let _ = handle.join();
    }

    let status = match status {
        Ok(status) => status,
        Err(err) => return Err(err.context(format!("`{line}` did not complete"))),
    };

    let buffers = std::mem::take(
        &mut *buffers
            .lock()
            .map_err(|_| anyhow::anyhow!("output buffer poisoned"))?,
    );

    log::debug!("`{line}` exited with {status}");

    Ok(Captured {
        status,
        stdout: buffers.stdout,
        stderr: buffers.stderr,
        combined: buffers.combined,
    })
}

fn pump<R>(mut reader: R, stream: Stream, buffers: Arc<Mutex<Buffers>>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut chunk = [0u8; CHUNK];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Ok(mut buf) = buffers.lock() {
                        match stream {
                            Stream::Stdout => buf.stdout.extend_from_slice(&chunk[..n]),
                            Stream::Stderr => buf.stderr.extend_from_slice(&chunk[..n]),
                        }
                        buf.combined.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        }
    })
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus> {
    let Some(limit) = timeout else {
        return child.wait().context("failed to wait for child process");
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("failed to poll child process")? {
            return Ok(status);
        }

        if start.elapsed() > limit {
            let _ = child.kill();
            let _ = child.wait();
            bail!("timed out after {}s", limit.as_secs_f64());
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Map an exit status to a shell-style exit code.
///
/// A process killed by a signal reports `128 + signal` on unix.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
