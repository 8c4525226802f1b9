use std::{path::Path, process::ExitCode};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpClassifier, WorkflowController, WorkflowState};
use shared::domain::{Gender, ImagePayload, PatientRecord};
use tracing_subscriber::EnvFilter;

mod presentation;

use presentation::{LesionAreaOption, PatientSummary, ReportDocument};

#[derive(Parser, Debug)]
#[command(about = "Submit a skin lesion image for classification and print the report")]
struct Args {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    age: u32,
    #[arg(long, value_parser = parse_gender)]
    gender: Gender,
    /// Lesion area key, e.g. `right-arm` or `scalp`.
    #[arg(long, value_parser = presentation::parse_lesion_area)]
    area: LesionAreaOption,
    /// Path to the lesion photograph.
    #[arg(long)]
    image: std::path::PathBuf,
    /// Overrides CLASSIFIER_API_URL.
    #[arg(long)]
    endpoint: Option<String>,
    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "male" | "m" => Ok(Gender::Male),
        "female" | "f" => Ok(Gender::Female),
        other => Err(format!("unknown gender '{other}'; expected male or female")),
    }
}

async fn load_image(path: &Path) -> Result<ImagePayload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lesion".to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(ImagePayload {
        file_name,
        mime_type,
        bytes,
    })
}

fn summarize(record: &PatientRecord) -> PatientSummary<'_> {
    PatientSummary {
        first_name: &record.first_name,
        last_name: &record.last_name,
        age: record.age,
        gender: record.gender,
        lesion_area: record.lesion_site,
        lesion_label: &record.lesion_label,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.endpoint.as_deref())?;
    tracing::info!(endpoint = %settings.endpoint, "classifier configured");
    let classifier = HttpClassifier::new(&settings)?;
    let mut workflow = WorkflowController::new(classifier);

    let record = PatientRecord {
        first_name: args.first_name,
        last_name: args.last_name,
        age: args.age,
        gender: args.gender,
        lesion_site: args.area.site,
        lesion_label: args.area.label.to_string(),
        image: load_image(&args.image).await?,
    };

    workflow.submit(record)?;
    if let Some(submitted) = workflow.state().record() {
        eprintln!("{}", presentation::render_submitting(&summarize(submitted)));
    }

    match workflow.complete().await? {
        WorkflowState::Reporting { record, report, .. } => {
            let document = ReportDocument {
                patient: summarize(record),
                report,
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                print!("{}", presentation::render_report(&document));
            }
            Ok(ExitCode::SUCCESS)
        }
        WorkflowState::Collecting => {
            let Some(notice) = workflow.take_notice() else {
                bail!("classification ended without a report or an error notice");
            };
            eprintln!("{}", presentation::render_notice(&notice));
            Ok(ExitCode::FAILURE)
        }
        WorkflowState::Submitting { .. } => bail!("classification did not resolve"),
    }
}
