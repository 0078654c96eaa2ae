// Domain layer: models, connector options and ports. No I/O.

pub mod model;
pub mod options;
pub mod ports;
