// Domain layer: result models and ports implemented by adapters.

pub mod model;
pub mod ports;
