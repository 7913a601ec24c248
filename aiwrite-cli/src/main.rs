use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use aiwrite::{
    ConfigLocator, DocumentProcessor, FileReport, LintConfig, LintReport, Preset, ReportFormat,
};

/// Exit code for operational failures (unreadable input, invalid config)
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "aiwrite")]
#[command(version)]
#[command(about = "Flag mechanically generated Japanese prose in markdown files")]
struct Args {
    /// Markdown files to lint; `-` or nothing reads stdin
    files: Vec<PathBuf>,

    /// Path to config file (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rule preset: recommended or all (overrides the config file)
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Output format: text or json
    #[arg(short = 'f', long, default_value = "text")]
    format: ReportFormat,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Log per-step and per-rule timings
    #[arg(long)]
    profile: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("aiwrite: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let processor = DocumentProcessor::new(&config)?.with_profiling(args.profile);
    info!(rules = ?processor.linter().rule_families(), "rules enabled");

    let inputs = if args.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.files.clone()
    };

    let mut files: Vec<FileReport> = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let report = if input.as_os_str() == "-" {
            let source = read_stdin().await?;
            processor.process_str("<stdin>", &source).await?
        } else {
            if !processor.supports(input) {
                debug!(path = %input.display(), "not a markdown extension, linting anyway");
            }
            processor.process_file(input).await?
        };
        files.push(report);
    }

    let report = LintReport::new(files);
    print!("{}", report.render(args.format)?);

    if report.has_errors() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn load_config(args: &Args) -> Result<LintConfig> {
    let locator = ConfigLocator::new()?;
    let mut config = match locator.locate(args.config.as_deref())? {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            LintConfig::load_from_file(&path)?
        }
        None => {
            debug!("no config file found, using defaults");
            LintConfig::default()
        }
    };

    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    Ok(config)
}

async fn read_stdin() -> Result<String> {
    let mut source = String::new();
    tokio::io::stdin()
        .read_to_string(&mut source)
        .await
        .context("failed to read stdin")?;
    Ok(source)
}
