//! # dflow CLI Entry Point
//!
//! Operator tooling over the workflow engine: render any of the five
//! letters from a JSON parameter file, walk the stage ladder, and print
//! the stage table. Useful for support staff reproducing a consumer's
//! letter and for smoke-testing template changes without the API.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use dflow_workflow::{render_letter, LetterData, TemplateStage};

/// disputeflow CLI — credit-dispute letter toolchain.
#[derive(Parser, Debug)]
#[command(name = "dflow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Render a letter from a JSON parameter file.
    Render(RenderArgs),
    /// Show the stage that follows the given stage.
    Next(NextArgs),
    /// Print the full stage table.
    Stages,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Canonical stage name (e.g. INVESTIGATION_REQUEST).
    #[arg(long)]
    stage: String,
    /// Path to a JSON file with the letter parameters.
    #[arg(long)]
    input: PathBuf,
    /// Write the letter here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct NextArgs {
    /// Canonical stage name.
    #[arg(long)]
    stage: String,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Next(args) => next(args),
        Commands::Stages => {
            stages();
            Ok(())
        }
    }
}

fn parse_stage(s: &str) -> anyhow::Result<TemplateStage> {
    TemplateStage::parse(s)
        .with_context(|| format!("unrecognized template stage: '{s}'"))
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let stage = parse_stage(&args.stage)?;
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let data: LetterData =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", args.input.display()))?;

    let letter = render_letter(stage, &data, Utc::now().date_naive())?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, letter).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("letter written to {}", path.display());
        }
        None => print!("{letter}"),
    }
    Ok(())
}

fn next(args: NextArgs) -> anyhow::Result<()> {
    let stage = parse_stage(&args.stage)?;
    match stage.next() {
        Some(next) => {
            let d = next.descriptor();
            println!("{next} — {title} (wait {days} days)", title = d.title, days = d.wait_days);
        }
        None => println!("{stage} is the final stage"),
    }
    Ok(())
}

fn stages() {
    println!("{:<24} {:<28} {:>9}", "STAGE", "TITLE", "WAIT DAYS");
    for stage in TemplateStage::all() {
        let d = stage.descriptor();
        println!("{:<24} {:<28} {:>9}", stage.as_str(), d.title, d.wait_days);
    }
}
