//! Command-line project form.
//!
//! Collects the project fields, previews the AOI and submits it once.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aoi_backend::client::{ProjectClient, ProjectForm};

#[derive(Debug, Parser)]
#[command(name = "submit-project", about = "Submit a project with a GeoJSON area of interest")]
struct Args {
    /// Base URL of the project intake service
    #[arg(long, env = "AOI_SERVER_URL", default_value = "http://localhost:5000")]
    server: String,

    /// Project name
    #[arg(long)]
    name: String,

    /// Project description
    #[arg(long)]
    description: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end_date: NaiveDate,

    /// Area of interest GeoJSON file
    #[arg(long)]
    aoi: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut form = ProjectForm::new();
    form.name = args.name;
    form.description = args.description;
    form.start_date = Some(args.start_date);
    form.end_date = Some(args.end_date);

    match form.select_aoi(&args.aoi).await {
        Ok(selection) => {
            if let Some(e) = selection.parse_error() {
                eprintln!("Warning: {} is not valid JSON ({}); submitting anyway", selection.file_name, e);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    match form.preview() {
        Some(preview) => {
            let center = preview.center();
            println!(
                "AOI preview: {} vertices centered at {:.6}, {:.6}",
                preview.ring.len(),
                center.lat,
                center.lon
            );
            for vertex in &preview.ring {
                println!("  {:.6}, {:.6}", vertex.lat, vertex.lon);
            }
        }
        None => println!("AOI preview: no polygon to display"),
    }

    let client = ProjectClient::new(&args.server);
    match client.submit(&form).await {
        Ok(notification) => {
            println!("{}", notification.message);
            if notification.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
