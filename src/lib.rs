//! Forward allow-listed can-utils commands into a running `can-utils`
//! container.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod docker;

pub use config::Config;
pub use dispatch::{DispatchError, Dispatcher, Outcome};
