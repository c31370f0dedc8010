#[cfg(feature = "cli")]
pub mod cli;
pub mod lib_config;
pub mod properties;
pub mod resolver;
pub mod typed;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use lib_config::LibConfig;
