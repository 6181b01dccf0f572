//! Command-line interface for model-matcher.
//!
//! - **match**: Match one remote aircraft against a model set
//! - **setup**: Print the setup preset of an algorithm
//! - **catalog**: List or verify a model set file
//! - **serve**: Start the JSON API
//!
//! ## Usage
//!
//! ```text
//! # Match a remote aircraft
//! model-matcher match --models models.json --callsign DLH123 --aircraft A320 --airline DLH
//!
//! # With database data and the matching log
//! model-matcher match --models models.json --db db.json --callsign DLH123 --aircraft A320 --show-log
//!
//! # JSON output for scripting
//! model-matcher match --models models.json --callsign AUA1 --aircraft A320 --format json
//!
//! # Serve the API
//! model-matcher serve --models models.json --port 8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::store::ModelSetData;
use crate::db::memory::InMemoryDbCache;
use crate::db::DbCache;
use crate::matching::engine::AircraftMatcher;
use crate::matching::log::MatchingLog;
use crate::matching::script::ProcessScriptEngine;
use crate::setup::{MatcherSetup, MatchingAlgorithm, PickSimilarStrategy};

pub mod catalog;
pub mod matching;
pub mod setup;

#[derive(Parser)]
#[command(name = "model-matcher")]
#[command(version)]
#[command(about = "Match remote multiplayer aircraft to installed simulator models")]
#[command(
    long_about = "model-matcher picks the closest installed model for an aircraft seen on a multiplayer network.\n\nIt resolves the network's aircraft, airline and livery strings against a database and then reduces or scores the installed model set:\n- Exact model string matches when possible\n- Livery, aircraft, family and combined type fallbacks\n- A configurable default model when nothing fits"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the closest model for a remote aircraft
    Match(matching::MatchArgs),

    /// Show the setup preset of an algorithm
    Setup(setup::SetupArgs),

    /// Inspect a model set file
    Catalog(catalog::CatalogArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub matcher: MatcherArgs,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Matching algorithm argument for CLI
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum AlgorithmArg {
    Stepwise,
    Score,
    ReducePlusScore,
}

impl From<AlgorithmArg> for MatchingAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Stepwise => MatchingAlgorithm::StepwiseReduce,
            AlgorithmArg::Score => MatchingAlgorithm::ScoreBased,
            AlgorithmArg::ReducePlusScore => MatchingAlgorithm::ReducePlusScore,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PickStrategyArg {
    First,
    Order,
    Random,
}

impl From<PickStrategyArg> for PickSimilarStrategy {
    fn from(arg: PickStrategyArg) -> Self {
        match arg {
            PickStrategyArg::First => PickSimilarStrategy::First,
            PickStrategyArg::Order => PickSimilarStrategy::ByOrder,
            PickStrategyArg::Random => PickSimilarStrategy::Random,
        }
    }
}

/// Options shared by every command that builds a matcher
#[derive(clap::Args, Clone)]
pub struct MatcherArgs {
    /// Model set file (JSON)
    #[arg(long, required = true)]
    pub models: PathBuf,

    /// Database snapshot file (JSON)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Setup file (JSON), command line options take precedence
    #[arg(long)]
    pub setup: Option<PathBuf>,

    /// Matching algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// How to pick among equally good models
    #[arg(long, value_enum)]
    pub pick_strategy: Option<PickStrategyArg>,

    /// Seed for the random pick strategy
    #[arg(long)]
    pub seed: Option<u64>,

    /// Interpreter for matching scripts (e.g. python3), scripts run directly otherwise
    #[arg(long)]
    pub script_interpreter: Option<PathBuf>,
}

impl MatcherArgs {
    /// Setup from file (or defaults) with command line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the setup file cannot be read or parsed.
    pub fn load_setup(&self) -> anyhow::Result<MatcherSetup> {
        let mut setup = match &self.setup {
            Some(path) => MatcherSetup::load_from_file(path)
                .with_context(|| format!("Failed to load setup {}", path.display()))?,
            None => MatcherSetup::default(),
        };
        if let Some(algorithm) = self.algorithm {
            setup.set_algorithm(algorithm.into(), self.setup.is_none());
        }
        if let Some(strategy) = self.pick_strategy {
            setup.pick_strategy = strategy.into();
        }
        Ok(setup)
    }

    /// Build a matcher with model set, database and setup loaded
    ///
    /// # Errors
    ///
    /// Returns an error if one of the input files cannot be loaded.
    pub fn build_matcher(&self, verbose: bool) -> anyhow::Result<AircraftMatcher> {
        let db: Arc<dyn DbCache> = match &self.db {
            Some(path) => Arc::new(
                InMemoryDbCache::load_from_file(path)
                    .with_context(|| format!("Failed to load database {}", path.display()))?,
            ),
            None => Arc::new(InMemoryDbCache::empty()),
        };
        let data = ModelSetData::load_from_file(&self.models)
            .with_context(|| format!("Failed to load model set {}", self.models.display()))?;

        let script_engine = match &self.script_interpreter {
            Some(interpreter) => ProcessScriptEngine::with_interpreter(interpreter.clone()),
            None => ProcessScriptEngine::new(),
        };
        let mut matcher = AircraftMatcher::new(db)
            .with_setup(self.load_setup()?)
            .with_script_engine(Arc::new(script_engine));
        if let Some(seed) = self.seed {
            matcher = matcher.with_seed(seed);
        }

        let simulator = data.simulator;
        let count = matcher.set_model_set(data.models, simulator, true, MatchingLog::Nothing, None);
        if let Some(default_model) = data.default_model {
            matcher.set_default_model(default_model);
        }

        if verbose {
            eprintln!("Loaded {count} models for {simulator} from {}", self.models.display());
        }
        if count == 0 {
            eprintln!("Warning: Model set is empty, every aircraft gets the default model.");
        }
        Ok(matcher)
    }
}
