// Domain layer: core models and ports (interfaces) the fetcher is written against.

pub mod model;
pub mod ports;
