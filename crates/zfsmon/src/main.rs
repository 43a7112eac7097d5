//! zfsmon - ZFS metrics collector.
//!
//! Runs one collection pass over the ZFS kstat tree and `zfs list`, then
//! prints the resulting records to stdout. Logs go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use zfsmon_core::collector::config::DEFAULT_KSTAT_PATH;
use zfsmon_core::collector::{RealFs, SystemCommandRunner, ZfsCollector, ZfsConfig};
use zfsmon_core::metrics::{MetricRecord, RecordBuffer};

/// Output format for collected records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Influx line protocol.
    Line,
    /// One JSON object per line.
    Json,
}

/// ZFS metrics collector.
#[derive(Parser, Debug)]
#[command(name = "zfsmon", about = "ZFS pool, dataset and kstat metrics", version)]
struct Args {
    /// Path to the ZFS kstat tree.
    #[arg(long, default_value = DEFAULT_KSTAT_PATH)]
    kstat_path: String,

    /// Counter categories to read (comma-separated). Defaults to the built-in set.
    #[arg(long, value_delimiter = ',')]
    kstat_metrics: Vec<String>,

    /// Emit one zfs_pool record per pool.
    #[arg(long)]
    pool_metrics: bool,

    /// Emit one zfs_dataset record per dataset.
    #[arg(long)]
    dataset_metrics: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Line)]
    format: OutputFormat,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> ZfsConfig {
        ZfsConfig::new()
            .with_kstat_path(&self.kstat_path)
            .with_kstat_metrics(self.kstat_metrics.iter().filter(|m| !m.is_empty()).cloned())
            .with_pool_metrics(self.pool_metrics)
            .with_dataset_metrics(self.dataset_metrics)
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["zfsmon", "zfsmon_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Escapes a measurement, tag key or tag value for line protocol.
fn escape_line(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, ',' | ' ' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Formats a record as a line protocol line.
///
/// Empty tag values are left out. Records without fields cannot be
/// expressed in line protocol and yield `None`.
fn format_line(record: &MetricRecord, timestamp_ns: i64) -> Option<String> {
    if record.fields.is_empty() {
        return None;
    }

    let mut line = escape_line(&record.measurement);
    for (key, value) in &record.tags {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_line(key));
        line.push('=');
        line.push_str(&escape_line(value));
    }

    let fields: Vec<String> = record
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}i", escape_line(key), value))
        .collect();
    line.push(' ');
    line.push_str(&fields.join(","));
    line.push(' ');
    line.push_str(&timestamp_ns.to_string());

    Some(line)
}

#[derive(Serialize)]
struct TimestampedRecord<'a> {
    #[serde(flatten)]
    record: &'a MetricRecord,
    timestamp: i64,
}

/// Formats a record as a single JSON object.
fn format_json(record: &MetricRecord, timestamp_ns: i64) -> serde_json::Result<String> {
    serde_json::to_string(&TimestampedRecord {
        record,
        timestamp: timestamp_ns,
    })
}

fn write_records(
    out: &mut impl Write,
    records: &[MetricRecord],
    format: OutputFormat,
    timestamp_ns: i64,
) -> io::Result<()> {
    for record in records {
        let line = match format {
            OutputFormat::Line => match format_line(record, timestamp_ns) {
                Some(line) => line,
                None => {
                    debug!(measurement = %record.measurement, "skipping record without fields");
                    continue;
                }
            },
            OutputFormat::Json => format_json(record, timestamp_ns)?,
        };
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.config();
    info!("zfsmon {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: kstat_path={}, pool_metrics={}, dataset_metrics={}",
        config.kstat_path.display(),
        config.pool_metrics,
        config.dataset_metrics
    );

    let mut collector = ZfsCollector::new(RealFs::new(), SystemCommandRunner::new(), config);
    let mut acc = RecordBuffer::new();

    if let Err(e) = collector.collect(&mut acc) {
        error!("Failed to collect ZFS metrics: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(timing) = collector.last_timing() {
        info!(
            "Collected {} records in {:.1}ms",
            acc.len(),
            timing.total.as_secs_f64() * 1000.0
        );
    }

    let timestamp_ns = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut stdout = io::stdout().lock();
    if let Err(e) = write_records(&mut stdout, acc.records(), args.format, timestamp_ns) {
        error!("Failed to write records: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
