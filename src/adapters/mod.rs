// Adapters layer: file system, archive and CSV access.

pub mod archive;
pub mod csv;
pub mod fs;
