use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use munger::columns::ColumnMap;
use munger::config::{JobConfig, CONFIG_FILE, DEFAULT_WORKERS};
use munger::error::JobError;
use munger::pipeline::{count_lines, default_output_path, discover_inputs, Pipeline};
use munger::reference::ReferenceData;
use munger::stats::JobStats;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "munger")]
#[command(about = "Normalize and enrich direct-mail CSV lists")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map, normalize and enrich input files onto the canonical layout
    Run(RunArgs),
    /// Print the column map inferred from an input header
    Columns(ColumnsArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Input CSV files ("-" for stdin). Defaults to every .csv in the current directory
    inputs: Vec<PathBuf>,

    /// Output file (single input only). Defaults to <input>_output.csv
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of workers to run in parallel
    #[arg(short = 'C', long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Directory holding the reference tables
    #[arg(long, default_value = "resources")]
    resources: PathBuf,

    /// Job configuration. Defaults to config.json in the resources directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ColumnsArgs {
    /// Input CSV file
    input: PathBuf,
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn make_progress_bar(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.cyan}} {label} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{per_sec}}, {{eta}})"
            ))
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

fn print_summary(label: &str, stats: &JobStats, elapsed: f64) {
    println!();
    println!("=== {label} ===");
    println!("Time:               {:.2}s", elapsed);
    println!("Rows read:          {}", stats.rows_read());
    println!("Records written:    {}", stats.records_written());
    println!("Invalid zips:       {}", stats.invalid_zips());
    println!("Names parsed:       {}", stats.names_parsed());
    println!("Blank-date drops:   {}", stats.blank_date_drops());
    println!("Beyond radius:      {}", stats.beyond_radius());
    println!("Do-not-mail hits:   {}", stats.do_not_mail());
    println!("Suppressed names:   {}", stats.suppressed_names());
    println!("Suppressed address: {}", stats.suppressed_addresses());
}

fn run_jobs(args: RunArgs) -> Result<()> {
    let inputs = if args.inputs.is_empty() {
        let found = discover_inputs(Path::new("."))?;
        if found.is_empty() {
            bail!("No input files found in the current directory");
        }
        found
    } else {
        args.inputs
    };
    if args.output.is_some() && inputs.len() > 1 {
        bail!("--output needs exactly one input, got {}", inputs.len());
    }

    let config_path = args
        .config
        .unwrap_or_else(|| args.resources.join(CONFIG_FILE));
    let config = Arc::new(JobConfig::load(&config_path)?);
    let reference = Arc::new(
        ReferenceData::load(&args.resources).with_context(|| {
            format!("Failed to load reference data from {}", args.resources.display())
        })?,
    );

    // one blocking thread per worker, plus the reader and the writer
    let rt = tokio::runtime::Builder::new_multi_thread()
        .thread_name("munger-worker")
        .max_blocking_threads(args.workers.max(1) + 2)
        .build()?;

    for input in &inputs {
        let start = Instant::now();
        let pipeline =
            Pipeline::new(Arc::clone(&reference), Arc::clone(&config)).with_workers(args.workers);

        if is_stdin(input) {
            info!(workers = pipeline.workers(), "Processing standard input");
            let stats = match &args.output {
                Some(out) => rt.block_on(pipeline.run_to_path(io::stdin(), out))?,
                None => rt.block_on(pipeline.run(io::stdin(), io::stdout()))?,
            };
            // stdout may be the data stream
            eprintln!(
                "stdin: {} rows read, {} written",
                stats.rows_read(),
                stats.records_written()
            );
            continue;
        }

        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(input));
        // the header line is not a record
        let total = count_lines(input)?.saturating_sub(1);
        let pb = make_progress_bar(total, &input.display().to_string());

        info!(
            input = %input.display(),
            output = %output.display(),
            rows = total,
            workers = pipeline.workers(),
            "Processing file"
        );
        let result = rt.block_on(pipeline.with_progress(pb.clone()).run_file(input, &output));
        pb.finish_and_clear();
        let stats = result.with_context(|| format!("Job failed for {}", input.display()))?;

        print_summary(
            &input.display().to_string(),
            &stats,
            start.elapsed().as_secs_f64(),
        );
    }

    Ok(())
}

fn show_columns(args: ColumnsArgs) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open input: {}", args.input.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(BufReader::new(file));

    let mut header = csv::StringRecord::new();
    if !reader.read_record(&mut header)? {
        return Err(JobError::EmptyInput.into());
    }
    let cells: Vec<&str> = header.iter().collect();
    let map = ColumnMap::from_header(&cells)?;

    for (field, column) in map.mapped() {
        println!("{:<14} <- {:>3}  {}", field.name(), column, cells[column]);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Run(args) => run_jobs(args),
        Commands::Columns(args) => show_columns(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
