pub mod copier;
pub mod process;
pub mod tokenizer;
pub mod tree;

pub use crate::domain::ports::{PropertySource, Sink, Source, TypeAdapter};
pub use crate::utils::error::Result;
