use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use helio_algo::RoofPotentialOptions;
use helio_cli::{
    cli::{Cli, Commands},
    config::load_config,
};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::summary::SummaryArgs;
use commands::{completions, potential, process, summary};

/// `--log-level` wins, then `[logging] level` of the process config, then info.
fn log_level(cli: &Cli) -> Level {
    if let Some(level) = cli.log_level {
        return level;
    }
    if let Commands::Process {
        config: Some(path), ..
    } = &cli.command
    {
        if let Ok(Some(level)) = load_config(Some(path)).and_then(|c| c.log_level()) {
            return level;
        }
    }
    Level::INFO
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&cli))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let (name, result) = match &cli.command {
        Commands::Process { config, out } => (
            "process",
            process::handle(config.as_deref(), out.as_deref()),
        ),
        Commands::Potential {
            roofs,
            out,
            key,
            area,
            kwc_per_m2,
        } => {
            let options = RoofPotentialOptions {
                key_column: key.clone(),
                area_column: area.clone(),
                kw_per_m2: *kwc_per_m2,
            };
            ("potential", potential::handle(roofs, out, &options))
        }
        Commands::Summary {
            table,
            year,
            metric,
            calibration,
            min,
            max,
            format,
        } => {
            let args = SummaryArgs {
                table: Path::new(table),
                year: *year,
                metric: (*metric).into(),
                calibration: *calibration,
                min: *min,
                max: *max,
                format: *format,
            };
            ("summary", summary::handle(&args))
        }
        Commands::Completions { shell, out } => {
            ("completions", completions::handle(*shell, out.as_deref()))
        }
    };

    match result {
        Ok(()) => {
            info!("{name} finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{name} failed: {:?}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
