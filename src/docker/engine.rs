use std::ffi::OsString;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use super::run::{self, Captured};
use super::types::{ContainerSummary, ExecOutput, Platform};
use crate::config::Config;

/// The operations the dispatcher needs from a container runtime.
pub trait Runtime {
    /// Handshake with the daemon and report its platform.
    fn version(&self) -> Result<Platform>;

    /// Containers that are currently running.
    fn list_running(&self) -> Result<Vec<ContainerSummary>>;

    /// Run `cmd` inside `container` and wait for it to finish.
    fn exec(&self, container: &str, cmd: &[OsString], tty: bool) -> Result<ExecOutput>;
}

/// [`Runtime`] backed by the `docker` command-line client.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: OsString,
    daemon_timeout: Option<Duration>,
    exec_timeout: Option<Duration>,
}

impl DockerCli {
    pub fn new(cfg: &Config) -> Self {
        Self {
            program: cfg.docker.clone(),
            daemon_timeout: cfg.daemon_timeout,
            exec_timeout: cfg.exec_timeout,
        }
    }

    /// Run a metadata query and return its stdout; a non-zero exit is an error.
    fn query(&self, args: &[&str]) -> Result<Vec<u8>> {
        let args: Vec<OsString> = args.iter().map(|a| OsString::from(*a)).collect();
        let captured = run::capture(&self.program, &args, self.daemon_timeout)?;
        ensure_success(&captured)?;
        Ok(captured.stdout)
    }
}

impl Runtime for DockerCli {
    fn version(&self) -> Result<Platform> {
        let raw = self
            .query(&["version", "--format", "{{json .Server.Platform}}"])
            .context("docker daemon is not reachable")?;
        parse_platform(&raw)
    }

    fn list_running(&self) -> Result<Vec<ContainerSummary>> {
        let raw = self
            .query(&["ps", "--no-trunc", "--format", "{{json .}}"])
            .context("failed to list running containers")?;
        parse_container_list(&raw)
    }

    fn exec(&self, container: &str, cmd: &[OsString], tty: bool) -> Result<ExecOutput> {
        let mut args: Vec<OsString> = vec!["exec".into()];
        if tty {
            args.push("-t".into());
        }
        args.push(container.into());
        args.extend(cmd.iter().cloned());

        let captured = run::capture(&self.program, &args, self.exec_timeout)
            .with_context(|| format!("failed to exec in container `{container}`"))?;

        Ok(ExecOutput {
            exit_code: captured.exit_code(),
            output: captured.combined,
        })
    }
}

fn ensure_success(captured: &Captured) -> Result<()> {
    if captured.status.success() {
        return Ok(());
    }
    let stderr = captured.stderr_text();
    if stderr.is_empty() {
        bail!("docker exited with {}", captured.status);
    }
    bail!("docker exited with {}: {stderr}", captured.status);
}

/// Decode the output of `docker version --format '{{json .Server.Platform}}'`.
pub fn parse_platform(raw: &[u8]) -> Result<Platform> {
    serde_json::from_slice(raw.trim_ascii()).context("unexpected `docker version` output")
}

/// Decode `docker ps --format '{{json .}}'`: one JSON object per line.
pub fn parse_container_list(raw: &[u8]) -> Result<Vec<ContainerSummary>> {
    raw.split(|b| *b == b'\n')
        .map(<[u8]>::trim_ascii)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_slice(line).context("unexpected `docker ps` output"))
        .collect()
}
