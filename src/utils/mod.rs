pub mod blacklist;
pub mod error;
pub mod functional;
pub mod logger;
pub mod misc;
pub mod text;
pub mod validation;
pub mod xml;
