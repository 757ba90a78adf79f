pub mod cli;
pub mod config;
pub mod manifest;

pub use cli::{build_cli_command, Cli, Commands, MetricArg, SummaryFormat};
pub use config::{load_config, HelioConfig};
