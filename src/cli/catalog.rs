use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::catalog::model_list::ModelFinder;
use crate::catalog::store::{ModelCatalog, ModelSetData};
use crate::catalog::verification::{verify_model_set, Severity, VerificationReport};
use crate::cli::OutputFormat;
use crate::core::model::AircraftModel;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List the models of a model set
    List {
        /// Model set file (JSON)
        #[arg(long, required = true)]
        models: PathBuf,

        /// Filter by aircraft designator (e.g., "A320")
        #[arg(long)]
        aircraft: Option<String>,

        /// Filter by airline designator (e.g., "DLH")
        #[arg(long)]
        airline: Option<String>,
    },

    /// Verify a model set and report problems
    Verify {
        /// Model set file (JSON)
        #[arg(long, required = true)]
        models: PathBuf,

        /// Only report warnings and errors
        #[arg(long)]
        only_warn_error: bool,
    },

    /// Write the model set without duplicates
    Export {
        /// Model set file (JSON)
        #[arg(long, required = true)]
        models: PathBuf,

        /// Output file path
        #[arg(required = true)]
        output: PathBuf,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the model set cannot be loaded, or if verification
/// finds errors.
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List {
            models,
            aircraft,
            airline,
        } => run_list(&models, aircraft.as_deref(), airline.as_deref(), format, verbose),
        CatalogCommands::Verify {
            models,
            only_warn_error,
        } => run_verify(&models, only_warn_error, format),
        CatalogCommands::Export { models, output } => run_export(&models, &output),
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<ModelCatalog> {
    ModelCatalog::load_from_file(path)
        .with_context(|| format!("Failed to load model set {}", path.display()))
}

fn run_list(
    path: &Path,
    aircraft_filter: Option<&str>,
    airline_filter: Option<&str>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(path)?;
    if verbose {
        eprintln!("Loaded {} models for {}", catalog.len(), catalog.simulator());
    }

    let mut filtered: Vec<AircraftModel> = catalog.models().to_vec();
    if let Some(aircraft) = aircraft_filter {
        filtered = ModelFinder::new(&filtered).find_by_aircraft_designator(aircraft);
    }
    if let Some(airline) = airline_filter {
        filtered = ModelFinder::new(&filtered).find_by_airline_designator(airline);
    }

    match format {
        OutputFormat::Text => print_text_list(&filtered, catalog.simulator().to_string().as_str()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&filtered)?),
        OutputFormat::Tsv => {
            println!("model_string\taircraft\tcombined_type\tairline\tlivery\tdb_key");
            for m in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    m.model_string,
                    m.aircraft_icao.designator,
                    m.combined_type().unwrap_or_default(),
                    m.airline().designator,
                    m.livery.combined_code,
                    m.db_key.map(|k| k.to_string()).unwrap_or_default(),
                );
            }
        }
    }

    Ok(())
}

fn print_text_list(models: &[AircraftModel], simulator: &str) {
    let ms_width = models
        .iter()
        .map(|m| m.model_string.chars().count().min(40))
        .max()
        .unwrap_or(5)
        .max(5);
    let livery_width = models
        .iter()
        .map(|m| m.livery.combined_code.len())
        .max()
        .unwrap_or(6)
        .max(6);
    let total_width = ms_width + livery_width + 8 + 5 + 7 + 4;

    println!("Model Set {simulator} ({} models)\n", models.len());
    println!(
        "{:<ms_w$} {:<8} {:<5} {:<7} {:<lv_w$}",
        "Model",
        "Aircraft",
        "Type",
        "Airline",
        "Livery",
        ms_w = ms_width,
        lv_w = livery_width
    );
    println!("{}", "-".repeat(total_width));

    for m in models {
        println!(
            "{:<ms_w$} {:<8} {:<5} {:<7} {:<lv_w$}",
            truncate(&m.model_string, ms_width),
            m.aircraft_icao.designator,
            m.combined_type().unwrap_or_default(),
            m.airline().designator,
            m.livery.combined_code,
            ms_w = ms_width,
            lv_w = livery_width
        );
    }
}

fn run_verify(path: &Path, only_warn_error: bool, format: OutputFormat) -> anyhow::Result<()> {
    // verify the file as written, duplicates included
    let data = ModelSetData::load_from_file(path)
        .with_context(|| format!("Failed to load model set {}", path.display()))?;
    let report = verify_model_set(&data.models, only_warn_error);

    match format {
        OutputFormat::Text => print_text_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => {
            println!("severity\tmodel_string\tmessage");
            for m in &report.messages {
                println!("{}\t{}\t{}", m.severity, m.model_string, m.message);
            }
        }
    }

    if report.has_errors() {
        anyhow::bail!(
            "Model set has {} errors in {} models",
            report.count(Severity::Error),
            report.failed_model_strings().len()
        );
    }
    Ok(())
}

fn print_text_report(report: &VerificationReport) {
    println!("Checked {} models", report.checked);
    println!(
        "   Errors: {}  Warnings: {}  Info: {}",
        report.count(Severity::Error),
        report.count(Severity::Warning),
        report.count(Severity::Info)
    );
    if !report.messages.is_empty() {
        println!();
        for message in &report.messages {
            println!("   {message}");
        }
    }
}

fn run_export(path: &Path, output: &Path) -> anyhow::Result<()> {
    let catalog = load_catalog(path)?;
    std::fs::write(output, catalog.to_json()?)?;

    println!("Exported {} models to {}", catalog.len(), output.display());

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("A320_DLH", 10), "A320_DLH");
        assert_eq!(truncate("A320_LUFTHANSA_NEW", 10), "A320_LU...");
        assert_eq!(truncate("Ä320_ÜBERLANG", 6), "Ä32...");
    }
}
