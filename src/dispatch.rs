use std::ffi::OsString;
use std::io::Write;

use crate::commands;
use crate::config::Config;
use crate::docker::{ExecOutput, Runtime};

/// How a dispatch finished when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No subcommand was given; the usage line was printed.
    Usage,
    /// The forwarded command exited with status 0.
    Success(ExecOutput),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Error connecting to Docker. Is the Docker Daemon running?")]
    Connectivity(anyhow::Error),

    #[error("Invalid command.")]
    InvalidCommand(String),

    #[error("Error: target {0} does not exist.")]
    TargetMissing(String),

    #[error("Error (exit code: {code}): {output}")]
    Execution { code: i32, output: String },

    #[error("Error: {0:#}")]
    Runtime(anyhow::Error),

    #[error("failed to write output")]
    Output(#[from] std::io::Error),
}

impl DispatchError {
    /// Every failure is fatal and reported with exit status 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Validates a command line and forwards it into the target container.
pub struct Dispatcher<'a, R> {
    runtime: &'a R,
    config: &'a Config,
}

impl<'a, R: Runtime> Dispatcher<'a, R> {
    pub fn new(runtime: &'a R, config: &'a Config) -> Self {
        Self { runtime, config }
    }

    /// Run one dispatch and return the process exit status.
    ///
    /// Errors are written to `out` with the `[!]` prefix.
    pub fn run_and_report<W: Write>(&self, args: &[OsString], out: &mut W) -> i32 {
        match self.run(args, out) {
            Ok(_) => 0,
            Err(err) => {
                log::debug!("dispatch failed: {err:?}");
                let _ = writeln!(out, "[!] {err}");
                err.exit_code()
            }
        }
    }

    /// `args` is the whole process argument vector, program path included.
    /// It is forwarded to the container unchanged.
    pub fn run<W: Write>(&self, args: &[OsString], out: &mut W) -> Result<Outcome, DispatchError> {
        let platform = self.runtime.version().map_err(|err| {
            log::warn!("docker handshake failed: {err:#}");
            DispatchError::Connectivity(err)
        })?;
        writeln!(out, "[*] Using {}", platform.name)?;

        let Some(requested) = args.get(1) else {
            let program = args
                .first()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| "can-utils".to_string());
            writeln!(out, "[i] Usage: {program} <Command> <Command Args>*")?;
            return Ok(Outcome::Usage);
        };

        let shown = requested.to_string_lossy();
        writeln!(out, "[*] Chosen command: {shown}")?;

        let command = match requested.to_str() {
            Some(name) if commands::is_valid(name) => name,
            _ => return Err(DispatchError::InvalidCommand(shown.into_owned())),
        };
        log::debug!(
            "{command}: {}",
            commands::describe(command).unwrap_or_default()
        );

        let target = self.config.target.as_str();
        let running = self
            .runtime
            .list_running()
            .map_err(DispatchError::Runtime)?;
        if !running.iter().any(|c| c.has_name(target)) {
            log::debug!("{} running containers, none named {target}", running.len());
            return Err(DispatchError::TargetMissing(target.to_string()));
        }

        let result = self
            .runtime
            .exec(target, args, self.config.tty)
            .map_err(DispatchError::Runtime)?;

        if !result.success() {
            return Err(DispatchError::Execution {
                code: result.exit_code,
                output: result.text().into_owned(),
            });
        }

        writeln!(out, "[*] Output:\n{}", result.text())?;
        Ok(Outcome::Success(result))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::{Result, anyhow};

    use super::*;
    use crate::docker::{ContainerSummary, Platform};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Version,
        List,
        Exec {
            container: String,
            cmd: Vec<OsString>,
            tty: bool,
        },
    }

    /// Scripted runtime that records every call made against it.
    struct StubRuntime {
        reachable: bool,
        running: Vec<&'static str>,
        result: ExecOutput,
        calls: RefCell<Vec<Call>>,
    }

    impl StubRuntime {
        fn new() -> Self {
            Self {
                reachable: true,
                running: vec!["can-utils"],
                result: ExecOutput {
                    exit_code: 0,
                    output: b"OK".to_vec(),
                },
                calls: RefCell::new(Vec::new()),
            }
        }

        fn returning(mut self, exit_code: i32, output: &[u8]) -> Self {
            self.result = ExecOutput {
                exit_code,
                output: output.to_vec(),
            };
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl Runtime for StubRuntime {
        fn version(&self) -> Result<Platform> {
            self.calls.borrow_mut().push(Call::Version);
            if !self.reachable {
                return Err(anyhow!("connection refused"));
            }
            Ok(Platform {
                name: "Stub Engine".into(),
            })
        }

        fn list_running(&self) -> Result<Vec<ContainerSummary>> {
            self.calls.borrow_mut().push(Call::List);
            Ok(self
                .running
                .iter()
                .map(|name| ContainerSummary {
                    names: name.to_string(),
                    state: "running".into(),
                    ..ContainerSummary::default()
                })
                .collect())
        }

        fn exec(&self, container: &str, cmd: &[OsString], tty: bool) -> Result<ExecOutput> {
            self.calls.borrow_mut().push(Call::Exec {
                container: container.into(),
                cmd: cmd.to_vec(),
                tty,
            });
            Ok(self.result.clone())
        }
    }

    fn argv(words: &[&str]) -> Vec<OsString> {
        words.iter().map(|w| OsString::from(*w)).collect()
    }

    fn dispatch(runtime: &StubRuntime, args: &[OsString]) -> (i32, String) {
        let cfg = Config::default();
        let mut out = Vec::new();
        let code = Dispatcher::new(runtime, &cfg).run_and_report(args, &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn invalid_command_never_lists_containers() {
        for cmd in ["rm", "bash", "CANDUMP", "candump;id", ""] {
            let runtime = StubRuntime::new();
            let (code, out) = dispatch(&runtime, &argv(&["can-utils", cmd, "-h"]));
            assert_eq!(code, 1, "{cmd:?}");
            assert!(out.contains("[!] Invalid command."));
            assert_eq!(runtime.calls(), vec![Call::Version]);
        }
    }

    #[test]
    fn forwards_full_argv_including_program_path() {
        let runtime = StubRuntime::new();
        let args = argv(&["/usr/local/bin/can-utils", "cansend", "vcan0", "123#DEADBEEF"]);
        let (code, _) = dispatch(&runtime, &args);
        assert_eq!(code, 0);
        assert_eq!(
            runtime.calls(),
            vec![
                Call::Version,
                Call::List,
                Call::Exec {
                    container: "can-utils".into(),
                    cmd: args,
                    tty: true,
                },
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn forwards_non_utf8_arguments_untouched() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'l', b'o', 0xfe, b'g']);
        let mut args = argv(&["can-utils", "canplayer", "-I"]);
        args.push(raw.clone());

        let runtime = StubRuntime::new();
        let (code, _) = dispatch(&runtime, &args);
        assert_eq!(code, 0);
        match runtime.calls().last() {
            Some(Call::Exec { cmd, .. }) => assert_eq!(cmd[3], raw),
            other => panic!("expected exec, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_prints_usage_after_connect_only() {
        let runtime = StubRuntime::new();
        let (code, out) = dispatch(&runtime, &argv(&["./can-utils"]));
        assert_eq!(code, 0);
        assert!(out.contains("[i] Usage: ./can-utils <Command> <Command Args>*"));
        assert_eq!(runtime.calls(), vec![Call::Version]);
    }

    #[test]
    fn connect_failure_stops_before_listing() {
        let runtime = StubRuntime {
            reachable: false,
            ..StubRuntime::new()
        };
        let (code, out) = dispatch(&runtime, &argv(&["can-utils", "candump", "vcan0"]));
        assert_eq!(code, 1);
        assert!(out.contains("Is the Docker Daemon running?"));
        assert_eq!(runtime.calls(), vec![Call::Version]);
    }

    #[test]
    fn missing_target_never_execs() {
        let runtime = StubRuntime {
            running: vec!["web", "can-utils-old"],
            ..StubRuntime::new()
        };
        let (code, out) = dispatch(&runtime, &argv(&["can-utils", "candump", "vcan0"]));
        assert_eq!(code, 1);
        assert!(out.contains("[!] Error: target can-utils does not exist."));
        assert_eq!(runtime.calls(), vec![Call::Version, Call::List]);
    }

    #[test]
    fn successful_exec_prints_output() {
        let runtime = StubRuntime::new().returning(0, b"OK");
        let (code, out) = dispatch(&runtime, &argv(&["can-utils", "whoami"]));
        assert_eq!(code, 0);
        assert!(out.contains("[*] Using Stub Engine"));
        assert!(out.contains("[*] Chosen command: whoami"));
        assert!(out.contains("[*] Output:\nOK"));
    }

    #[test]
    fn failed_exec_reports_code_and_output() {
        let runtime = StubRuntime::new().returning(2, b"bad arg");
        let (code, out) = dispatch(&runtime, &argv(&["can-utils", "cangen", "--bogus"]));
        assert_eq!(code, 1);
        assert!(out.contains("[!] Error (exit code: 2): bad arg"));
    }

    #[test]
    fn run_returns_typed_outcomes() {
        let cfg = Config::default();
        let runtime = StubRuntime::new();
        let dispatcher = Dispatcher::new(&runtime, &cfg);
        let mut sink = Vec::new();

        let usage = dispatcher.run(&argv(&["can-utils"]), &mut sink).unwrap();
        assert_eq!(usage, Outcome::Usage);

        let err = dispatcher
            .run(&argv(&["can-utils", "nope"]), &mut sink)
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidCommand(ref c) if c == "nope"));
    }

    #[test]
    fn custom_target_is_looked_up_by_name() {
        let cfg = Config {
            target: "bench-rig".into(),
            tty: false,
            ..Config::default()
        };
        let runtime = StubRuntime {
            running: vec!["bench-rig"],
            ..StubRuntime::new()
        };
        let mut out = Vec::new();
        let code =
            Dispatcher::new(&runtime, &cfg).run_and_report(&argv(&["x", "candump"]), &mut out);
        assert_eq!(code, 0);
        assert!(matches!(
            runtime.calls().last(),
            Some(Call::Exec { container, tty: false, .. }) if container == "bench-rig"
        ));
    }
}
