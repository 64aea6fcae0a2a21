mod transport_config;

pub use transport_config::*;
