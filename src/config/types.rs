use std::ffi::OsString;
use std::time::Duration;

/// Name of the container every command is forwarded into.
pub const DEFAULT_TARGET: &str = "can-utils";

/// Settings for a single dispatch. Nothing here is read from disk or the
/// environment; the binary always runs with [`Config::default`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Container name matched exactly against the running containers.
    pub target: String,
    /// Container runtime executable, resolved through `PATH`.
    pub docker: OsString,
    /// Bound on the `version` and `ps` calls. `None` waits forever.
    pub daemon_timeout: Option<Duration>,
    /// Bound on the forwarded command. `None` waits forever, which is what
    /// long-running tools like `candump` need.
    pub exec_timeout: Option<Duration>,
    /// Allocate a pseudo-terminal for the exec session.
    pub tty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            docker: OsString::from("docker"),
            daemon_timeout: Some(Duration::from_secs(30)),
            exec_timeout: None,
            tty: true,
        }
    }
}
