// Domain layer: records, categories and the ports the engine talks through.

pub mod category;
pub mod input;
pub mod model;
pub mod ports;
