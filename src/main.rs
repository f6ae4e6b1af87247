use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use eventdoc::{EventRecord, Settings, Workspace};

#[derive(Parser, Debug)]
#[command(
    name = "eventdoc",
    version,
    about = "Generate event circulars and reports as DOCX and PDF"
)]
struct Cli {
    /// Address to serve the web form on (overrides settings)
    #[arg(long = "addr")]
    addr: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Generate once from a TOML event file instead of serving
    #[arg(long = "input")]
    input: Option<String>,

    /// Invitation image for one-shot generation
    #[arg(long = "invitation")]
    invitation: Option<String>,

    /// Photo image for one-shot generation (repeatable, order preserved)
    #[arg(long = "photo")]
    photos: Vec<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    eventdoc::logging::init(cli.verbose)?;

    let settings_path = cli.read_settings.as_deref().map(Path::new);
    let mut settings = eventdoc::load_settings(settings_path)?;
    if let Some(addr) = cli.addr {
        settings.addr = addr;
    }

    if let Some(input) = cli.input.as_deref() {
        return generate_once(&settings, input, cli.invitation.as_deref(), &cli.photos);
    }

    let addr = settings.addr.clone();
    eventdoc::server::run_server(settings, addr).await
}

fn generate_once(
    settings: &Settings,
    input: &str,
    invitation: Option<&str>,
    photos: &[String],
) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read event file: {}", input))?;
    let record: EventRecord = toml::from_str(&content)
        .with_context(|| format!("failed to parse event file: {}", input))?;

    let workspace = Workspace::new(settings)?;
    let invitation = invitation.map(PathBuf::from);
    let photos: Vec<PathBuf> = photos.iter().map(PathBuf::from).collect();

    let artifacts = eventdoc::generate_documents(
        &record,
        invitation.as_deref(),
        &photos,
        settings,
        &workspace,
    )?;
    println!("{}", artifacts.docx.display());
    match artifacts.pdf {
        Some(pdf) => println!("{}", pdf.display()),
        None => eprintln!("warning: pdf build failed, only the docx was written"),
    }
    Ok(())
}
