// Domain layer: models and ports. Implementations live under core/ and adapters/.

pub mod model;
pub mod ports;
