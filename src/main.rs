//! CLI entry point for the process cost comparison tool.
//!
//! Provides subcommands for converting report spreadsheets into workbook JSON,
//! extracting a single process, inspecting report layout, and building the
//! comparison chart datasets for several processes.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use flate2::Compression;
use flate2::write::GzEncoder;
use process_cost_charts::analyzers::analyzer::{
    LoadedSource, assemble_records, upload_charts, write_charts,
};
use process_cost_charts::analyzers::writetos3::write_bytes_to_s3;
use process_cost_charts::{
    category::CostCategory,
    extract::{detect_metadata, find_section_bounds, find_section_start},
    fetch::load_source,
    output::{append_record, print_json, print_pretty},
    parser::{parse_report, parse_workbook},
    process::{ProcessRecord, ProcessSummary},
    reader::read_workbook,
    request::{ChartRequest, ChartSource, sources_from_args},
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "process_cost_charts")]
#[command(about = "Compare process economics reports and build chart datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an .xlsx/.xls report into workbook JSON
    Convert {
        /// Spreadsheet to convert
        #[arg(value_name = "SPREADSHEET")]
        input: String,

        /// JSON file to write (defaults to <input>_output.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Optional: S3 bucket to upload the spreadsheet and its JSON to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the JSON before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Extract one process from workbook JSON and append a summary row
    Extract {
        /// Path or URL of the workbook JSON
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Process name (defaults to the file name without timestamp prefix)
        #[arg(short, long)]
        scenario: Option<String>,

        /// CSV file to append the summary to
        #[arg(short, long, default_value = "processes.csv")]
        output: String,
    },
    /// Show report metadata and where the cost sections are
    Inspect {
        /// Path or URL of the workbook JSON
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Numbered section to locate, e.g. "5. MATERIALS COST" (repeatable)
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    /// Build comparison chart datasets for several processes
    Charts {
        /// Paths or URLs of workbook JSON documents
        #[arg(value_name = "FILE_OR_URL")]
        sources: Vec<String>,

        /// Process names, matched to sources by position (repeatable)
        #[arg(short, long = "scenario")]
        scenarios: Vec<String>,

        /// JSON request file with "files" and "scenarios", instead of arguments
        #[arg(short, long, conflicts_with = "sources")]
        request: Option<String>,

        /// Directory to write chart datasets to
        #[arg(short = 'd', long, default_value = "charts")]
        output_dir: String,

        /// Optional: S3 bucket to upload chart datasets to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: CSV file to append one summary row per source to
        #[arg(long)]
        summary: Option<String>,

        /// Maximum number of concurrent report downloads
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/process_cost_charts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("process_cost_charts.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let api_key = std::env::var("STORAGE_API_KEY").ok();

    match cli.command {
        Commands::Convert {
            input,
            output,
            s3_bucket,
            gzip,
        } => {
            convert(&input, output, s3_bucket, gzip).await?;
        }
        Commands::Extract {
            source,
            scenario,
            output,
        } => {
            let bytes = load_source(&source, api_key.as_deref()).await?;
            let workbook = parse_workbook(&bytes)?;
            let record = ProcessRecord::from_workbook(&workbook, scenario.as_deref(), &source)?;

            print_pretty(&record);
            print_json(&record)?;
            append_record(&output, &ProcessSummary::from_record(&record).with_source(&source))?;
        }
        Commands::Inspect { source, sections } => {
            let bytes = load_source(&source, api_key.as_deref()).await?;
            let grid = parse_report(&bytes)?;
            grid.validate()?;

            let meta = detect_metadata(&grid);
            info!(
                cells = grid.len(),
                max_row = grid.max_row,
                max_column = grid.max_column,
                currency = %meta.currency,
                year = meta.year,
                annual_rate = meta.annual_rate,
                "Report metadata"
            );

            for category in CostCategory::ALL {
                let section = category.section();
                let start = find_section_start(&grid, section.start_marker);
                let items = section.extract(&grid).len();
                info!(
                    category = category.title(),
                    marker = section.start_marker,
                    start_row = ?start,
                    items,
                    "Cost section"
                );
            }

            for name in &sections {
                let bounds = find_section_bounds(&grid, name);
                info!(section = %name, start_row = ?bounds.start, end_row = bounds.end, "Section bounds");
            }
        }
        Commands::Charts {
            sources,
            scenarios,
            request,
            output_dir,
            s3_bucket,
            summary,
            concurrency,
        } => {
            let chart_sources = match request {
                Some(path) => ChartRequest::load(&path)?.sources(),
                None => sources_from_args(&sources, &scenarios),
            };
            if chart_sources.is_empty() {
                anyhow::bail!("No files provided");
            }

            generate_charts(
                chart_sources,
                &output_dir,
                s3_bucket,
                summary,
                concurrency,
                api_key,
            )
            .await?;
        }
    }

    Ok(())
}

/// Loads all reports concurrently, builds the chart datasets, writes them to
/// `output_dir` and optionally uploads them to S3.
#[tracing::instrument(skip(chart_sources, s3_bucket, summary, api_key), fields(sources = chart_sources.len()))]
async fn generate_charts(
    chart_sources: Vec<ChartSource>,
    output_dir: &str,
    s3_bucket: Option<String>,
    summary: Option<String>,
    concurrency: usize,
    api_key: Option<String>,
) -> Result<()> {
    let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let mut tasks = vec![];

    for chart_source in chart_sources {
        let sem = semaphore.clone();
        let api_key = api_key.clone();

        let source_span = tracing::info_span!("load_report", source = %chart_source.source);

        let task = tokio::spawn(
            async move {
                let bytes = match sem.acquire().await {
                    Ok(_permit) => load_source(&chart_source.source, api_key.as_deref()).await,
                    Err(e) => Err(e.into()),
                };
                LoadedSource {
                    source: chart_source,
                    bytes,
                }
            }
            .instrument(source_span),
        );

        tasks.push(task);
    }

    // Keep request order regardless of completion order
    let mut loaded = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(source) => loaded.push(source),
            Err(e) => error!(error = %e, "Report loading task failed"),
        }
    }

    let records = assemble_records(loaded, summary.as_deref());
    info!(processes = records.len(), "Process records assembled");

    let (set, written) = write_charts(&records, output_dir)?;
    for path in &written {
        info!(path = %path, "Chart dataset");
    }

    if let Some(bucket) = s3_bucket {
        let config = aws_config::load_from_env().await;
        let s3 = aws_sdk_s3::Client::new(&config);
        let prefix = format!("charts/{}", Utc::now().timestamp_millis());

        let keys = upload_charts(&s3, &bucket, &prefix, &records, &set).await?;
        info!(bucket = %bucket, prefix = %prefix, uploaded = keys.len(), "S3 upload complete");
    }

    Ok(())
}

/// Converts a report spreadsheet into workbook JSON next to it (or at
/// `output`), optionally uploading both files to S3 under a
/// `<millis>-<file name>` key.
#[tracing::instrument(skip(output, s3_bucket))]
async fn convert(
    input: &str,
    output: Option<String>,
    s3_bucket: Option<String>,
    gzip: bool,
) -> Result<()> {
    let input_path = Path::new(input);
    let spreadsheet = std::fs::read(input_path).with_context(|| format!("reading '{input}'"))?;

    let workbook = read_workbook(spreadsheet.clone())?;
    let json = serde_json::to_vec_pretty(&workbook)?;

    let stem = input_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("workbook");
    let output_path = output.unwrap_or_else(|| {
        input_path
            .with_file_name(format!("{stem}_output.json"))
            .display()
            .to_string()
    });
    std::fs::write(&output_path, &json)?;
    let sheets: Vec<_> = workbook.sheet_names().collect();
    info!(output = %output_path, ?sheets, "Workbook JSON written");

    if workbook.report_table().is_err() {
        warn!("Workbook has no report table; extraction will reject it");
    }

    let Some(bucket) = s3_bucket else {
        return Ok(());
    };

    let config = aws_config::load_from_env().await;
    let s3 = aws_sdk_s3::Client::new(&config);
    let millis = Utc::now().timestamp_millis();
    let file_name = input_path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("workbook.xlsx");

    write_bytes_to_s3(
        &s3,
        &bucket,
        &format!("{millis}-{file_name}"),
        spreadsheet,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    )
    .await?;

    let (body, key) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        (encoder.finish()?, format!("{millis}-{stem}_output.json.gz"))
    } else {
        (json, format!("{millis}-{stem}_output.json"))
    };
    write_bytes_to_s3(&s3, &bucket, &key, body, "application/json").await?;

    info!(bucket = %bucket, key = %key, "Workbook uploaded");
    Ok(())
}
