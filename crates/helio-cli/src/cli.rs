use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use helio_algo::Metric;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "helio", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level [default: info, or `[logging] level` from the config]
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the historical series, both forecasts and the commune rollup
    Process {
        /// TOML configuration file; built-in defaults when omitted
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Output directory, overriding `[export] output_dir`
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
    },
    /// Derive per-district solar potential from building roof areas
    Potential {
        /// Building table (CSV or Parquet)
        #[arg(value_hint = ValueHint::FilePath)]
        roofs: PathBuf,
        /// Output table (CSV or Parquet)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
        /// District key column
        #[arg(long, default_value = "geo_girec")]
        key: String,
        /// Usable roof area column, m²
        #[arg(long, default_value = "area_roof_solar_m2")]
        area: String,
        /// Peak power per m² of roof, kWc
        #[arg(long, default_value_t = 0.2)]
        kwc_per_m2: f64,
    },
    /// Summarize an exported table: expansion curve and per-region metric
    Summary {
        /// Exported table, e.g. output/communes_exp.geojson
        #[arg(value_hint = ValueHint::FilePath)]
        table: PathBuf,
        /// Year for the per-region metric
        #[arg(long, default_value_t = 2050)]
        year: i32,
        /// Metric reported per region
        #[arg(long, value_enum, default_value_t = MetricArg::Installed)]
        metric: MetricArg,
        /// Divisor applied to the rooftop potential: 3 calibrates the canton to the
        /// 1000 MWc of the energy master plan, 1 keeps the full rooftop estimate
        #[arg(long, default_value_t = 3.0)]
        calibration: f64,
        /// Lower bound of the display range
        #[arg(long)]
        min: Option<f64>,
        /// Upper bound of the display range
        #[arg(long)]
        max: Option<f64>,
        /// Output format
        #[arg(long, value_enum, default_value_t = SummaryFormat::Plain)]
        format: SummaryFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Installed,
    Potential,
    Ratio,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Installed => Metric::Installed,
            MetricArg::Potential => Metric::Potential,
            MetricArg::Ratio => Metric::Ratio,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn summary_defaults() {
        let cli = Cli::try_parse_from(["helio", "summary", "out/communes_exp.geojson"]).unwrap();
        match cli.command {
            Commands::Summary {
                year,
                metric,
                calibration,
                min,
                format,
                ..
            } => {
                assert_eq!(year, 2050);
                assert_eq!(metric, MetricArg::Installed);
                assert_eq!(calibration, 3.0);
                assert_eq!(min, None);
                assert_eq!(format, SummaryFormat::Plain);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.log_level.is_none());
    }
}
