// Container runtime access: the `Runtime` seam and its `docker` CLI backend.

pub mod engine;
pub mod run;
pub mod types;

pub use engine::{DockerCli, Runtime};
pub use types::{ContainerSummary, ExecOutput, Platform};
