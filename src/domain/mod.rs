// Domain layer: value types, versions, encodings and the I/O ports the
// core operates on.

pub mod constants;
pub mod model;
pub mod ports;
pub mod version;
