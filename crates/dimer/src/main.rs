//! dimer CLI - terminal client for dimer documentation sites.
//!
//! Provides commands for:
//! - `zones`: List zones and their versions
//! - `tree`: Print the document tree of a version
//! - `doc`: Render a document to HTML
//! - `search`: Search one version or every zone
//! - `url`: Print application URLs of documents

mod commands;
mod error;
mod output;
mod render;

use clap::{Parser, Subcommand};
use dimer_config::CliSettings;
use tracing_subscriber::EnvFilter;

use commands::{Context, DocArgs, GlobalArgs, SearchArgs, UrlArgs};
use error::CliError;
use output::Output;

/// dimer - documentation site client.
#[derive(Parser)]
#[command(name = "dimer", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List zones and their versions.
    Zones,
    /// Print the document tree of the selected version.
    Tree,
    /// Render a document to HTML.
    Doc(DocArgs),
    /// Search documents.
    Search(SearchArgs),
    /// Print the application URL of documents.
    Url(UrlArgs),
}

impl Cli {
    /// Global overrides plus those of the selected command.
    fn cli_settings(&self) -> CliSettings {
        let mut settings = self.global.cli_settings();
        if let Commands::Search(args) = &self.command {
            settings.search_limit = args.limit;
        }
        settings
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli, output: &Output) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let settings = cli.cli_settings();
        let ctx = Context::connect(&cli.global, &settings).await?;
        if cli.global.verbose {
            output.success(&format!("Connected to {}", ctx.config.api.url));
        }

        match cli.command {
            Commands::Zones => {
                commands::zones::execute(&ctx, output);
                Ok(())
            }
            Commands::Tree => commands::tree::execute(&ctx, output).await,
            Commands::Doc(args) => args.execute(&ctx, output).await,
            Commands::Search(args) => args.execute(&ctx, output).await,
            Commands::Url(args) => args.execute(&ctx, output),
        }
    })
}
