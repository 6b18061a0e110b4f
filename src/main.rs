use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

mod commands;

#[derive(Parser)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// The command to execute
    #[command(subcommand)]
    command: HtmlstageCommand,
}

#[derive(Parser)]
struct TransformArgs {
    /// The generated content to transform
    input: PathBuf,

    /// The output path the content will be written to (selects stages by extension)
    #[arg(long)]
    output_path: String,

    /// The URL the content will be served at
    #[arg(long, default_value = "/")]
    url: String,

    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print aggregated timings as JSON to stderr
    #[arg(long, default_value = "false")]
    timings: bool,
}

#[derive(Parser)]
struct RenderArgs {
    /// The generated content to run the transforms over
    input: PathBuf,

    /// The page's output path
    #[arg(long)]
    output_path: String,

    /// The URL the page is served at
    #[arg(long, default_value = "/")]
    url: String,

    /// New extension (`json`, `.json`) or full output path (`feed.xml`)
    #[arg(long = "override")]
    extension_override: Option<String>,

    /// Transforms to run, in order (defaults to `transforms` from the config)
    #[arg(short, long = "transform")]
    transforms: Vec<String>,

    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum HtmlstageCommand {
    /// Run the configured per-extension stages over one document
    Transform(TransformArgs),

    /// Run a named transform chain over one document
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(args.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        HtmlstageCommand::Transform(args) => {
            commands::transform::run(&args).await?;
        }
        HtmlstageCommand::Render(args) => {
            commands::render::run(&args).await?;
        }
    }

    Ok(())
}
