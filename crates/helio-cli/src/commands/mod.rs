pub mod completions;
pub mod potential;
pub mod process;
pub mod summary;
pub mod telemetry;
pub mod util;
