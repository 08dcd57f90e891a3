pub mod setup;

pub use setup::{CommandLineOptions, ModelKind, init_logger, parse_configuration_options};
