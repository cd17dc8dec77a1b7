use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use termcheck::codec::sbox::{read_sbox_file, write_sbox_file};
use termcheck::core::geometry::GridGeometry;
use termcheck::ocr::CaptureMode;
use termcheck::oracle::{compare, first_divergence};
use termcheck::pipeline::{run_harness, simplify_box_file, HarnessConfig};

#[derive(Parser, Debug)]
#[command(name = "termcheck", args_conflicts_with_subcommands = true)]
#[command(version, about = "Terminal rendering regression tests against recorded run documents", long_about = None)]
struct Cli {
    /// Log trace messages
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the test suite (default)
    Run(RunArgs),

    /// Normalize a raw box file into a run document
    Simplify {
        /// Input box file (`char x1 y1 x2 y2` per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Write the run document here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compare against this exemplar
        #[arg(short, long)]
        exemplar: Option<PathBuf>,

        /// Test name used in the PASS/FAIL line
        #[arg(short = 'n', long)]
        test_name: Option<String>,

        #[command(flatten)]
        grid: GridArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Run a single exemplar instead of every `tests/*.sbox`
    #[arg(long = "test", value_name = "EXEMPLAR")]
    test: Option<PathBuf>,

    /// Recognize the captured image with tesseract instead of direct capture
    #[arg(long)]
    ocr: bool,

    /// Project root containing tests/, build/ and tmp/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Also write produced documents as JSON to tmp/
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    grid: GridArgs,
}

#[derive(Args, Debug, Clone)]
struct GridArgs {
    /// Canvas width in pixels
    #[arg(long, default_value_t = 1200, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Grid columns
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u32).range(1..))]
    cols: u32,

    /// Grid rows
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
    rows: u32,
}

impl GridArgs {
    fn geometry(&self) -> GridGeometry {
        GridGeometry::from_grid(self.width, self.height, self.cols, self.rows)
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    let code = match cli.command {
        Some(Commands::Run(args)) => run_tests(args)?,
        None => run_tests(cli.run)?,
        Some(Commands::Simplify {
            input,
            output,
            exemplar,
            test_name,
            grid,
        }) => simplify(input, output, exemplar, test_name, grid)?,
    };

    Ok(ExitCode::from(code))
}

fn run_tests(args: RunArgs) -> Result<u8> {
    let mode = if args.ocr {
        CaptureMode::Ocr
    } else {
        CaptureMode::Direct
    };
    let config = HarnessConfig::new(args.root)
        .with_mode(mode)
        .with_geometry(args.grid.geometry())
        .with_selected(args.test)
        .with_json_dump(args.json);

    let summary = run_harness(&config)?;

    for name in &summary.skipped {
        eprintln!("[!] Skipped {name}: test binary not built");
    }
    Ok(summary.exit_code())
}

fn simplify(
    input: PathBuf,
    output: Option<PathBuf>,
    exemplar: Option<PathBuf>,
    test_name: Option<String>,
    grid: GridArgs,
) -> Result<u8> {
    let document = simplify_box_file(&input, &grid.geometry())
        .with_context(|| format!("Failed to simplify: {}", input.display()))?;

    if let Some(output) = &output {
        write_sbox_file(&document, output)?;
    }

    let Some(exemplar) = exemplar else {
        return Ok(0);
    };

    let expected = read_sbox_file(&exemplar)?;
    let name = test_name.unwrap_or_else(|| input.display().to_string());
    if compare(&document, &expected) {
        println!("{name}: PASS");
        Ok(0)
    } else {
        println!("{name}: FAIL");
        if let Some(divergence) = first_divergence(&document, &expected) {
            println!("  {divergence}");
        }
        Ok(9)
    }
}
