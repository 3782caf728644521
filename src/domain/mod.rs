// Domain layer: request/expense models and the ports the relay talks through.

pub mod model;
pub mod ports;
