mod display;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sencare_client::{ClientConfig, HttpPatientStore};
use sencare_core::constants::RISK_CONFIG_ENV;
use sencare_core::{
    risk_config_from_env_value, ConditionFilter, CoreConfig, PatientDraft,
    PatientEdit, PatientService, ReadingDraft, TestType,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sencare")]
#[command(about = "SenCare patient monitoring CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients, optionally searching by name or id
    List {
        /// Text to look for in patient names (any case) or ids
        #[arg(long, short, default_value = "")]
        search: String,
        /// All, Normal or Critical
        #[arg(long, short, default_value_t = ConditionFilter::All)]
        condition: ConditionFilter,
    },
    /// Show a patient with their clinical data
    Show { patient_id: String },
    /// Register a new patient
    AddPatient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        contact: String,
        /// Normal or Critical
        #[arg(long, default_value = "Normal")]
        condition: String,
    },
    /// Change some of a patient's details
    EditPatient {
        patient_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Delete a patient and all their clinical data
    DeletePatient { patient_id: String },
    /// List a patient's clinical data, oldest first
    Readings { patient_id: String },
    /// Record a clinical reading
    AddReading {
        patient_id: String,
        /// Date taken (YYYY-MM-DD or DD-MM-YYYY)
        #[arg(long, value_parser = display::parse_date)]
        date: Option<NaiveDate>,
        /// Glucose Level, Heart Rate, Temperature, Respiratory Rate or Oxygen Saturation
        #[arg(long = "type")]
        test_type: Option<TestType>,
        #[arg(long)]
        value: String,
    },
    /// Replace a clinical reading
    EditReading {
        patient_id: String,
        reading_id: String,
        #[arg(long, value_parser = display::parse_date)]
        date: Option<NaiveDate>,
        #[arg(long = "type")]
        test_type: Option<TestType>,
        #[arg(long)]
        value: String,
    },
    /// Delete a clinical reading
    DeleteReading {
        patient_id: String,
        reading_id: String,
    },
    /// Recompute a patient's condition from their readings
    Resync { patient_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", failure_line(&err));
            ExitCode::FAILURE
        }
    }
}

/// The error and its causes on a single line.
fn failure_line(err: &anyhow::Error) -> String {
    format!("error: {err:#}").replace('\n', " ")
}

async fn try_main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sencare_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let risk = risk_config_from_env_value(std::env::var(RISK_CONFIG_ENV).ok())
        .context("failed to load risk configuration")?;
    let client = ClientConfig::from_env().context("invalid client configuration")?;
    tracing::debug!("using {:?}", client);
    let store = Arc::new(HttpPatientStore::new(&client)?);
    let service = PatientService::new(Arc::new(CoreConfig::new(risk)), store);

    run(cli.command, &service).await
}

async fn run(command: Commands, service: &PatientService<HttpPatientStore>) -> anyhow::Result<()> {
    let directory = service.directory();
    let clinical = service.clinical();

    match command {
        Commands::List { search, condition } => {
            directory
                .refresh()
                .await
                .context("failed to load patients")?;
            let found = directory.search(&search, condition);
            print!("{}", display::patient_table(&found));
        }
        Commands::Show { patient_id } => {
            let detail = directory
                .patient_with_readings(&patient_id)
                .await
                .context("failed to load patient")?;
            println!("{}", display::detail(&detail));
        }
        Commands::AddPatient {
            name,
            age,
            contact,
            condition,
        } => {
            let created = directory
                .create_patient(&PatientDraft {
                    name,
                    age,
                    contact,
                    condition,
                })
                .await
                .context("failed to add patient")?;
            println!("Added patient {} ({})", created.name, created.id);
        }
        Commands::EditPatient {
            patient_id,
            name,
            age,
            contact,
            condition,
        } => {
            let updated = directory
                .update_patient(
                    &patient_id,
                    &PatientEdit {
                        name,
                        age,
                        contact,
                        condition,
                    },
                )
                .await
                .context("failed to update patient")?;
            println!("{}", display::patient_line(&updated));
        }
        Commands::DeletePatient { patient_id } => {
            directory
                .delete_patient(&patient_id)
                .await
                .context("failed to delete patient")?;
            println!("Deleted patient {patient_id}");
        }
        Commands::Readings { patient_id } => {
            let readings = clinical
                .readings(&patient_id)
                .await
                .context("failed to load clinical data")?;
            print!("{}", display::reading_table(&readings));
        }
        Commands::AddReading {
            patient_id,
            date,
            test_type,
            value,
        } => {
            let outcome = clinical
                .add_reading(
                    &patient_id,
                    &ReadingDraft {
                        date,
                        test_type,
                        value,
                    },
                )
                .await
                .context("failed to add clinical data")?;
            println!(
                "Added {} reading {} ({})",
                outcome.value.test_type, outcome.value.id, outcome.value.condition
            );
            print_sync(&outcome.sync);
        }
        Commands::EditReading {
            patient_id,
            reading_id,
            date,
            test_type,
            value,
        } => {
            let outcome = clinical
                .update_reading(
                    &patient_id,
                    &reading_id,
                    &ReadingDraft {
                        date,
                        test_type,
                        value,
                    },
                )
                .await
                .context("failed to update clinical data")?;
            println!("Updated reading {} ({})", outcome.value.id, outcome.value.condition);
            print_sync(&outcome.sync);
        }
        Commands::DeleteReading {
            patient_id,
            reading_id,
        } => {
            let outcome = clinical
                .delete_reading(&patient_id, &reading_id)
                .await
                .context("failed to delete clinical data")?;
            println!("Deleted reading {reading_id}");
            print_sync(&outcome.sync);
        }
        Commands::Resync { patient_id } => {
            let outcome = clinical.resync(&patient_id).await;
            if outcome.sync.is_failed() {
                anyhow::bail!("failed to update patient condition: {}", outcome.sync);
            }
            println!("{}", outcome.sync);
        }
    }

    Ok(())
}

fn print_sync(report: &sencare_core::SyncReport) {
    if let Some(note) = display::sync_note(report) {
        if report.is_failed() {
            eprintln!("{note}");
        } else {
            println!("{note}");
        }
    }
}
