use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use helio_algo::summary::{expansion_curve, region_metrics, value_range, ExpansionCurve, RegionMetric, ValueRange};
use helio_algo::Metric;
use helio_cli::cli::SummaryFormat;
use helio_io::read_region_table;
use serde::Serialize;
use tabwriter::TabWriter;

use crate::commands::util::fmt_optional;

pub struct SummaryArgs<'a> {
    pub table: &'a Path,
    pub year: i32,
    pub metric: Metric,
    pub calibration: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub format: SummaryFormat,
}

#[derive(Serialize)]
struct SummaryReport {
    table: String,
    year: i32,
    metric: Metric,
    unit: &'static str,
    /// Calibrated potential of the whole table, MWc.
    total_potential: f64,
    range: ValueRange,
    curve: ExpansionCurve,
    regions: Vec<RegionMetric>,
}

pub fn handle(args: &SummaryArgs<'_>) -> Result<()> {
    let table = read_region_table(args.table)?;
    let regions = region_metrics(&table, args.year, args.metric, args.calibration)?;
    let values: Vec<Option<f64>> = regions.iter().map(|r| r.value).collect();
    let report = SummaryReport {
        table: table.name(),
        year: args.year,
        metric: args.metric,
        unit: args.metric.unit(),
        total_potential: table.total_potential() / args.calibration,
        range: value_range(&values, args.min, args.max),
        curve: expansion_curve(&table),
        regions,
    };

    match args.format {
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        SummaryFormat::Plain => write_plain(&report, io::stdout())?,
    }
    Ok(())
}

fn write_plain<W: Write>(report: &SummaryReport, out: W) -> Result<()> {
    let mut writer = TabWriter::new(out);
    writeln!(writer, "Table {}", report.table)?;
    writeln!(writer, "YEAR\tTOTAL (MWc)")?;
    for point in &report.curve.points {
        writeln!(writer, "{}\t{:.2}", point.year, point.total)?;
    }
    writeln!(writer)?;
    writeln!(writer, "TARGET YEAR\tTARGET (MWc)\tTOTAL (MWc)\tGAP (MWc)")?;
    for target in &report.curve.targets {
        writeln!(
            writer,
            "{}\t{:.0}\t{}\t{}",
            target.year,
            target.target,
            fmt_optional(target.total, 2),
            fmt_optional(target.gap, 2)
        )?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "REGION\t{} {} ({})\tSHARE (%)",
        report.metric, report.year, report.unit
    )?;
    for region in &report.regions {
        writeln!(
            writer,
            "{}\t{}\t{}",
            region.name,
            fmt_optional(region.value, 2),
            fmt_optional(region.share, 1)
        )?;
    }
    writeln!(writer, "Total potential\t{:.2} MWc", report.total_potential)?;
    let range_kind = if report.range.constrained { "requested" } else { "data" };
    writeln!(
        writer,
        "Range ({range_kind})\t{:.2} .. {:.2}",
        report.range.min, report.range.max
    )?;
    writer.flush()?;
    Ok(())
}
