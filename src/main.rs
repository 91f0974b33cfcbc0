use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use godeps::core::{ModuleAnalyzer, PackageGraph};
use godeps::formatters::{GraphvizFormatter, JsonCompactFormatter};
use godeps::logger::init_logger;

const USAGE: &str = "Usage: godeps <path to root of go module checkout>";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "godeps",
    version,
    about = "Internal package dependency graph of a Go module checkout"
)]
struct Cli {
    /// Root of the Go module checkout (the directory holding go.mod)
    #[arg(value_name = "PATH")]
    root: PathBuf,

    /// Output format
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Dot)]
    format: OutputFormat,

    /// Write the graph to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Dot,
    Json,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            println!("{USAGE}");
            process::exit(1);
        }
    };

    init_logger(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        println!("Failed to compute import map: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        root,
        format,
        output,
        ..
    } = cli;

    let analyzer = ModuleAnalyzer::new().context("failed to initialize Go parser")?;
    let graph = analyzer.analyze(&root)?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            render(&graph, format, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            render(&graph, format, &mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

fn render<W: Write>(graph: &PackageGraph, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Dot => GraphvizFormatter::new()
            .write_to(graph, writer)
            .context("failed to write graph")?,
        OutputFormat::Json => JsonCompactFormatter::new().write_to(graph, writer)?,
    }
    Ok(())
}
