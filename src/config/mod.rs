// Runtime settings for the dispatcher.

mod types;

pub use types::Config;
