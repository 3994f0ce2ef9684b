// Domain layer: records, listing shapes and ports (interfaces).

pub mod listings;
pub mod model;
pub mod ports;
