//! logflume-ingest entry point.
//!
//! Adapts one storage-event notification into one pipeline invocation:
//! reads the notification JSON (file or stdin), wires the production
//! collaborators, runs the pipeline, and exits non-zero with the single
//! descriptive error on any failure.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use logflume_core::event::InvocationBatch;
use logflume_core::observability::{init_logging, LogFormat};
use logflume_core::storage::ObjectStoreBackend;
use logflume_ingest::delivery::{DeliverySink, MemorySink};
use logflume_ingest::parser::AlbParser;
use logflume_ingest::pipeline::IngestPipeline;
use logflume_ingest::report::Reporter;

/// Parses compressed access-log objects and delivers one aggregated record.
#[derive(Debug, Parser)]
#[command(name = "logflume-ingest")]
#[command(about = "Parses compressed access-log objects and delivers one aggregated record")]
#[command(version)]
struct Args {
    /// Path to the storage-event notification JSON (stdin when omitted).
    #[arg(long, env = "LOGFLUME_EVENT_FILE")]
    event_file: Option<PathBuf>,

    /// Log output format.
    #[arg(long, env = "LOGFLUME_LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormatArg,

    /// Aggregate and report without calling the delivery service.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

fn read_notification(args: &Args) -> Result<String> {
    match &args.event_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read event file {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("cannot read event from stdin")?;
            Ok(raw)
        }
    }
}

#[cfg(feature = "firehose")]
async fn delivery_sink() -> Result<Arc<dyn DeliverySink>> {
    use logflume_ingest::delivery::FirehoseSink;
    Ok(Arc::new(FirehoseSink::from_env().await?))
}

#[cfg(not(feature = "firehose"))]
async fn delivery_sink() -> Result<Arc<dyn DeliverySink>> {
    anyhow::bail!("built without the 'firehose' feature; use --dry-run")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format.into());

    let raw = read_notification(&args)?;
    let batch = InvocationBatch::from_notification(&raw)?;
    info!(objects = batch.len(), "invocation triggered");

    let sink: Arc<dyn DeliverySink> = if args.dry_run {
        Arc::new(MemorySink::new())
    } else {
        delivery_sink().await?
    };

    let mut pipeline = IngestPipeline::new(
        Arc::new(ObjectStoreBackend::new()),
        Arc::new(AlbParser::new()),
        sink,
        Reporter::stdout(),
    );

    let outcome = pipeline.run(&batch).await?;
    info!(
        objects = outcome.objects,
        bytes = outcome.delivered_bytes,
        dry_run = args.dry_run,
        "invocation complete"
    );

    Ok(())
}
