use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use can_utils::docker::DockerCli;
use can_utils::{Config, Dispatcher};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<OsString> = std::env::args_os().collect();
    let config = Config::default();
    let runtime = DockerCli::new(&config);

    let mut stdout = io::stdout().lock();
    let code = Dispatcher::new(&runtime, &config).run_and_report(&args, &mut stdout);
    let _ = stdout.flush();

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
