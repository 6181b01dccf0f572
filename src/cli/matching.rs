use clap::Args;

use crate::cli::{MatcherArgs, OutputFormat};
use crate::core::remote::RemoteAircraft;
use crate::matching::engine::{AircraftMatcher, MatchResult};
use crate::matching::log::{MatchingLog, MatchingMessages};

#[derive(Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub matcher: MatcherArgs,

    /// Callsign of the remote aircraft
    #[arg(long, required = true)]
    pub callsign: String,

    /// Aircraft ICAO designator as sent by the network
    #[arg(long, default_value = "")]
    pub aircraft: String,

    /// Airline ICAO designator as sent by the network
    #[arg(long, default_value = "")]
    pub airline: String,

    /// Airline name
    #[arg(long, default_value = "")]
    pub airline_name: String,

    /// Airline telephony designator
    #[arg(long, default_value = "")]
    pub telephony: String,

    /// Livery string as sent by the network
    #[arg(long, default_value = "")]
    pub livery: String,

    /// Model string used by the remote pilot
    #[arg(long, default_value = "")]
    pub model_string: String,

    /// Combined type (e.g. L2J), normally resolved from the database
    #[arg(long)]
    pub combined_type: Option<String>,

    /// Resolve the network values against the database before matching
    #[arg(long)]
    pub reverse_lookup: bool,

    /// Print the matching log
    #[arg(long)]
    pub show_log: bool,
}

impl MatchArgs {
    fn remote(&self) -> RemoteAircraft {
        let remote = RemoteAircraft::from_network(
            &self.callsign,
            &self.aircraft,
            &self.airline,
            &self.livery,
            &self.model_string,
        )
        .with_airline_name(&self.airline_name)
        .with_telephony(&self.telephony);
        match &self.combined_type {
            Some(combined_type) => remote.with_combined_type(combined_type),
            None => remote,
        }
    }
}

/// Execute match subcommand
///
/// # Errors
///
/// Returns an error if the model set, database or setup cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let matcher = args.matcher.build_matcher(verbose)?;
    if verbose {
        eprintln!("Setup: {}", matcher.setup());
    }

    let what_to_log = match (args.show_log, verbose) {
        (false, _) => MatchingLog::Nothing,
        (true, false) => MatchingLog::Simplified,
        (true, true) => MatchingLog::All,
    };
    let mut log = MatchingMessages::new();
    let result = match_remote(&matcher, &args, what_to_log, &mut log);

    match format {
        OutputFormat::Text => print_text_result(&result, &log),
        OutputFormat::Json => print_json_result(&result, &log, args.show_log)?,
        OutputFormat::Tsv => print_tsv_result(&result),
    }

    Ok(())
}

fn match_remote(
    matcher: &AircraftMatcher,
    args: &MatchArgs,
    what_to_log: MatchingLog,
    log: &mut MatchingMessages,
) -> MatchResult {
    let mut remote = args.remote();
    if args.reverse_lookup {
        let model = matcher.reverse_lookup_model(&remote, what_to_log, Some(&mut *log));
        remote = remote.with_model(model);
    }
    matcher.get_closest_match(&remote, what_to_log, Some(log))
}

fn print_text_result(result: &MatchResult, log: &MatchingMessages) {
    let model = &result.model;
    let callsign = model.callsign.as_deref().unwrap_or_default();

    println!("{callsign}: {}", model.model_string);
    println!("   Method: {}", result.method);
    if let Some(score) = result.score {
        println!("   Score: {score}");
    }
    println!("   Candidates: {}", result.candidates);
    println!("   Aircraft: {}", model.aircraft_icao.designator);
    if let Some(combined_type) = model.combined_type() {
        println!("   Combined type: {combined_type}");
    }
    if model.airline().has_designator() {
        println!("   Airline: {}", model.airline().designator);
    }
    if model.livery.has_combined_code() {
        println!("   Livery: {}", model.livery.combined_code);
    }
    if result.is_default() {
        println!("   No close match, default substitute used");
    }

    if !log.is_empty() {
        println!("\n   Matching log:");
        for line in log.to_lines() {
            println!("   - {line}");
        }
    }
    println!();
}

fn print_json_result(result: &MatchResult, log: &MatchingMessages, with_log: bool) -> anyhow::Result<()> {
    let mut json = serde_json::to_value(result)?;
    if with_log {
        json["log"] = serde_json::to_value(log.messages())?;
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_tsv_result(result: &MatchResult) {
    let model = &result.model;
    println!("callsign\tmodel_string\tmethod\tscore\taircraft\tairline\tlivery");
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        model.callsign.as_deref().unwrap_or_default(),
        model.model_string,
        result.method,
        result.score.map(|s| s.to_string()).unwrap_or_default(),
        model.aircraft_icao.designator,
        model.airline().designator,
        model.livery.combined_code,
    );
}
