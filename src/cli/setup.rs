use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{AlgorithmArg, OutputFormat};
use crate::setup::{MatcherSetup, MatchingAlgorithm, MatchingModeFlag};

#[derive(Args)]
pub struct SetupArgs {
    /// Show the preset of this algorithm (default: reduce + score)
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Show a setup file instead of a preset
    #[arg(long, conflicts_with = "algorithm")]
    pub setup: Option<PathBuf>,
}

/// Execute setup subcommand
///
/// # Errors
///
/// Returns an error if the setup file cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SetupArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let setup = match &args.setup {
        Some(path) => MatcherSetup::load_from_file(path)
            .with_context(|| format!("Failed to load setup {}", path.display()))?,
        None => MatcherSetup::new(
            args.algorithm
                .map_or(MatchingAlgorithm::default(), MatchingAlgorithm::from),
        ),
    };

    match format {
        OutputFormat::Text => print_text_setup(&setup),
        OutputFormat::Json => println!("{}", setup.to_json()?),
        OutputFormat::Tsv => print_tsv_setup(&setup),
    }

    Ok(())
}

fn print_text_setup(setup: &MatcherSetup) {
    println!("Algorithm: {}", setup.algorithm);
    println!("Pick strategy: {}", setup.pick_strategy);
    println!("Force mode: {}", setup.force_mode);
    println!("Pseudo family: {}", if setup.pseudo_family { "yes" } else { "no" });
    println!("\nMatching mode:");
    for flag in MatchingModeFlag::ALL {
        let mark = if setup.mode.contains(flag) { "x" } else { " " };
        println!("  [{mark}] {}", flag.description());
    }

    for (name, script) in [
        ("Reverse lookup script", &setup.reverse_lookup_script),
        ("Matching stage script", &setup.matching_stage_script),
    ] {
        match &script.file {
            Some(file) if script.enabled => println!("{name}: {}", file.display()),
            _ => println!("{name}: off"),
        }
    }
}

fn print_tsv_setup(setup: &MatcherSetup) {
    println!("flag\tenabled");
    for flag in MatchingModeFlag::ALL {
        let name = serde_json::to_value(flag)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| flag.description().to_string());
        println!("{name}\t{}", setup.mode.contains(flag));
    }
}
