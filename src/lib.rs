pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::config::{
    lib_config::LibConfig, properties::Properties, resolver::PropertyResolver,
};
pub use crate::core::{
    copier::{ByteCopier, CharCopier, Copier},
    process::{ProcessOutput, SystemProcess},
    tokenizer::LiteralTokenizer,
    tree::NamedTreeNode,
};
pub use crate::domain::version::Version;
pub use crate::utils::error::{FailureCode, KclError, Result};
