// Domain layer: records, changes and the store port. No IO here.

pub mod change;
pub mod model;
pub mod ports;
