use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

use crate::catalog::categories::CategoryIndex;
use crate::catalog::model_list::ModelFinder;
use crate::catalog::store::ModelCatalog;
use crate::catalog::verification::verify_model_set;
use crate::core::icao::{AircraftCategory, AircraftIcaoCode, AirlineIcaoCode, Livery};
use crate::core::model::AircraftModel;
use crate::core::remote::RemoteAircraft;
use crate::core::types::{MatchMethod, ModelType, Simulator};
use crate::db::DbCache;
use crate::matching::log::{log_details, FilteredSink, LogCategory, LogSink, MatchingLog, NullSink};
use crate::matching::reduction::{apply_exclusions, reduce_by_force_mode, ReductionPipeline};
use crate::matching::reverse_lookup::ReverseLookupResolver;
use crate::matching::script::{MatchingScriptInput, ScriptEngine, ScriptReturnValues, ScriptStage};
use crate::matching::scoring::{
    best_scored, combined_type_default_model, pick_model, score_models, ScoringConfig,
};
use crate::matching::statistics::{MatchingStatistics, StatisticsEntryType, StatisticsTracker};
use crate::setup::{MatcherSetup, MatchingAlgorithm, MatchingModeFlag};

/// Session id used when the caller does not set one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Result of matching a remote aircraft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The matched model, carrying the callsign
    pub model: AircraftModel,

    pub method: MatchMethod,

    /// Best score, only for score based decisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,

    /// Candidates left before the final decision
    pub candidates: usize,
}

impl MatchResult {
    pub fn new(model: AircraftModel, method: MatchMethod, score: Option<u32>, candidates: usize) -> Self {
        Self {
            model,
            method,
            score,
            candidates,
        }
    }

    /// Whether the default model (or a combined type substitute) was used
    pub fn is_default(&self) -> bool {
        matches!(
            self.method,
            MatchMethod::DefaultModel | MatchMethod::CombinedTypeDefault
        )
    }
}

/// Access to the active model set
pub trait ModelSetProvider {
    fn model_set(&self) -> Arc<ModelCatalog>;

    fn model_set_count(&self) -> usize {
        self.model_set().len()
    }
}

/// Access to the matching statistics
pub trait StatisticsProvider {
    fn current_statistics(&self, missing_only: bool) -> MatchingStatistics;

    fn clear_matching_statistics(&self);
}

/// Run `f` with the caller's sink restricted to `what`, or with a null sink
fn with_sink<R>(
    what: MatchingLog,
    log: Option<&mut dyn LogSink>,
    f: impl FnOnce(&mut dyn LogSink) -> R,
) -> R {
    match log {
        Some(sink) if what != MatchingLog::Nothing => f(&mut FilteredSink::new(sink, what)),
        _ => f(&mut NullSink),
    }
}

/// Finds the closest model of the active set for remote aircraft.
///
/// Matching reads a snapshot of model set, categories and setup, so many
/// threads can match in parallel. Reconfiguration swaps the snapshots and is
/// expected to come from a single writer.
pub struct AircraftMatcher {
    catalog: RwLock<Arc<ModelCatalog>>,
    categories: RwLock<Arc<CategoryIndex>>,
    setup: watch::Sender<MatcherSetup>,
    scoring: ScoringConfig,
    resolver: ReverseLookupResolver,
    statistics: StatisticsTracker,
    rng: Mutex<StdRng>,
    session_id: String,
}

impl AircraftMatcher {
    pub fn new(db: Arc<dyn DbCache>) -> Self {
        let categories = CategoryIndex::new(&db.categories());
        let (setup, _) = watch::channel(MatcherSetup::default());
        Self {
            catalog: RwLock::new(Arc::new(ModelCatalog::new())),
            categories: RwLock::new(Arc::new(categories)),
            setup,
            scoring: ScoringConfig::default(),
            resolver: ReverseLookupResolver::new(db),
            statistics: StatisticsTracker::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
            session_id: DEFAULT_SESSION_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_setup(self, setup: MatcherSetup) -> Self {
        self.set_setup(setup);
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    #[must_use]
    pub fn with_script_engine(mut self, engine: Arc<dyn ScriptEngine>) -> Self {
        self.resolver = self.resolver.with_script_engine(engine);
        self
    }

    /// Seed the random source of `PickSimilarStrategy::Random`
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock().unwrap_or_else(PoisonError::into_inner) = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn resolver(&self) -> &ReverseLookupResolver {
        &self.resolver
    }

    // ---------------------------------------------------------------- setup

    pub fn setup(&self) -> MatcherSetup {
        self.setup.borrow().clone()
    }

    /// Replace the setup, returns `false` if it was unchanged
    pub fn set_setup(&self, setup: MatcherSetup) -> bool {
        let changed = self.setup.send_if_modified(|current| {
            if *current == setup {
                return false;
            }
            *current = setup.clone();
            true
        });
        if changed {
            tracing::info!(setup = %setup, "Matcher setup changed");
        }
        changed
    }

    /// Watch setup changes
    pub fn subscribe_setup(&self) -> watch::Receiver<MatcherSetup> {
        self.setup.subscribe()
    }

    // ------------------------------------------------------------ model set

    fn catalog(&self) -> Arc<ModelCatalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn category_index(&self) -> Arc<CategoryIndex> {
        Arc::clone(&self.categories.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply a change to a copy of the catalog and swap it in
    fn update_catalog<R>(&self, f: impl FnOnce(&mut ModelCatalog) -> R) -> R {
        let mut guard = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let mut catalog = ModelCatalog::clone(&guard);
        let result = f(&mut catalog);
        *guard = Arc::new(catalog);
        result
    }

    /// Replace the model set, see [`ModelCatalog::set_model_set`].
    ///
    /// With `ModelVerificationAtStartup` the set is verified first, and with
    /// `ModelSetRemoveFailedModel` models with verification errors are
    /// disabled for matching. Categories are reloaded from the database.
    pub fn set_model_set(
        &self,
        models: Vec<AircraftModel>,
        simulator: Simulator,
        forced: bool,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> usize {
        let setup = self.setup();
        with_sink(what_to_log, log, |log| {
            let report = setup
                .mode
                .contains(MatchingModeFlag::ModelVerificationAtStartup)
                .then(|| {
                    verify_model_set(
                        &models,
                        setup.mode.contains(MatchingModeFlag::ModelVerificationOnlyWarnError),
                    )
                });
            if let Some(report) = &report {
                for message in &report.messages {
                    log_details(log, "", LogCategory::ModelSet, message.to_string());
                }
            }

            let count = self.update_catalog(|catalog| {
                let count = catalog.set_model_set(models, simulator, forced);
                if count == 0 {
                    return 0;
                }
                let failed = report.as_ref().map(|r| r.failed_model_strings()).unwrap_or_default();
                if setup.mode.contains(MatchingModeFlag::ModelSetRemoveFailedModel) && !failed.is_empty() {
                    let failed_models: Vec<AircraftModel> = failed
                        .iter()
                        .filter_map(|ms| catalog.get(ms).cloned())
                        .collect();
                    catalog.disable_models_for_matching(&failed_models, true);
                }
                catalog.len()
            });

            let db_categories = self.resolver.db().categories();
            if !db_categories.is_empty() {
                self.set_categories(&db_categories);
            }

            log_details(
                log,
                "",
                LogCategory::ModelSet,
                format!("Model set for {simulator}: {count} active models"),
            );
            count
        })
    }

    pub fn disable_models_for_matching(&self, models: &[AircraftModel], incremental: bool) -> usize {
        self.update_catalog(|catalog| catalog.disable_models_for_matching(models, incremental))
    }

    pub fn restore_disabled_models(&self) -> usize {
        self.update_catalog(ModelCatalog::restore_disabled_models)
    }

    pub fn disabled_models_for_matching(&self) -> Vec<AircraftModel> {
        self.catalog().disabled_models().to_vec()
    }

    pub fn set_default_model(&self, model: AircraftModel) {
        self.update_catalog(|catalog| catalog.set_default_model(model));
    }

    pub fn default_model(&self) -> Option<AircraftModel> {
        self.catalog().default_model().cloned()
    }

    /// Replace the category tree used by category matching
    pub fn set_categories(&self, categories: &[AircraftCategory]) {
        let index = CategoryIndex::new(categories);
        tracing::info!(count = categories.len(), "Aircraft categories set");
        *self.categories.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(index);
    }

    // ------------------------------------------------------------- matching

    /// Closest model for a remote aircraft with the current setup and model set.
    ///
    /// Never fails: without a credible match the default model is used, and
    /// without that an empty model carrying the callsign.
    pub fn get_closest_match(
        &self,
        remote: &RemoteAircraft,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> MatchResult {
        let setup = self.setup();
        let catalog = self.catalog();
        self.get_closest_match_with(remote, &setup, &catalog, what_to_log, log)
    }

    /// Closest model with an explicit setup and model set
    pub fn get_closest_match_with(
        &self,
        remote: &RemoteAircraft,
        setup: &MatcherSetup,
        catalog: &ModelCatalog,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> MatchResult {
        let categories = self.category_index();
        let result = with_sink(what_to_log, log, |log| {
            let mut result = self.run_algorithm(remote, setup, catalog, &categories, log);
            if setup.do_run_matching_stage_script() {
                result = self.run_matching_stage_script(remote, setup, catalog, &categories, result, log);
            }
            let result = finish(result, remote);
            log_details(
                log,
                &remote.callsign,
                LogCategory::Summary,
                format!(
                    "Matched '{}' ({}) by {}",
                    result.model.model_string,
                    result.model.icao_summary(),
                    result.method
                ),
            );
            result
        });

        self.evaluate_statistics_for(remote, catalog);
        result
    }

    fn run_algorithm(
        &self,
        remote: &RemoteAircraft,
        setup: &MatcherSetup,
        catalog: &ModelCatalog,
        categories: &CategoryIndex,
        log: &mut dyn LogSink,
    ) -> MatchResult {
        let callsign = remote.callsign.as_str();
        log_details(
            log,
            callsign,
            LogCategory::Summary,
            format!("Matching {} against {} models, {setup}", remote.model.icao_summary(), catalog.len()),
        );

        if catalog.is_empty() {
            tracing::warn!(callsign, "No models to match against");
            log_details(log, callsign, LogCategory::Summary, "Empty model set, using default model");
            return self.fallback(&[], catalog, remote, log);
        }

        match setup.algorithm {
            MatchingAlgorithm::StepwiseReduce => {
                let result = ReductionPipeline::new(setup, categories).run(remote, catalog.models(), log);
                let count = result.candidates.len();
                if result.exact_model_string {
                    return self.first_of(result.candidates, MatchMethod::ExactModelString, remote, catalog, log);
                }
                if count == 1 {
                    return self.first_of(result.candidates, MatchMethod::Reduction, remote, catalog, log);
                }
                if result.reduced {
                    return self.pick(&result.candidates, setup, catalog, MatchMethod::Reduction, None)
                        .unwrap_or_else(|| self.fallback(&result.candidates, catalog, remote, log));
                }
                log_details(
                    log,
                    callsign,
                    LogCategory::Summary,
                    format!("Not reduced, {count} candidates, using combined type default"),
                );
                self.fallback(&result.candidates, catalog, remote, log)
            }
            MatchingAlgorithm::ReducePlusScore => {
                let result = ReductionPipeline::new(setup, categories).run(remote, catalog.models(), log);
                if result.exact_model_string {
                    return self.first_of(result.candidates, MatchMethod::ExactModelString, remote, catalog, log);
                }
                if result.candidates.len() == 1 {
                    log_details(log, callsign, LogCategory::Summary, "Single candidate after reduction, not scored");
                    return self.first_of(result.candidates, MatchMethod::Reduction, remote, catalog, log);
                }
                self.score_candidates(remote, setup, catalog, result.candidates, log)
            }
            MatchingAlgorithm::ScoreBased => {
                let candidates = apply_exclusions(remote, catalog.models().to_vec(), setup, log);
                if setup.mode.contains(MatchingModeFlag::ByModelString) && remote.has_model_string() {
                    if let Some(model) = ModelFinder::new(&candidates).find_by_model_string(remote.model_string()) {
                        log_details(
                            log,
                            callsign,
                            LogCategory::Summary,
                            format!("Exact model string match '{}'", model.model_string),
                        );
                        return MatchResult::new(model.clone(), MatchMethod::ExactModelString, None, 1);
                    }
                }
                self.score_candidates(remote, setup, catalog, candidates, log)
            }
        }
    }

    fn first_of(
        &self,
        candidates: Vec<AircraftModel>,
        method: MatchMethod,
        remote: &RemoteAircraft,
        catalog: &ModelCatalog,
        log: &mut dyn LogSink,
    ) -> MatchResult {
        match candidates.into_iter().next() {
            Some(model) => MatchResult::new(model, method, None, 1),
            None => self.fallback(&[], catalog, remote, log),
        }
    }

    fn pick(
        &self,
        candidates: &[AircraftModel],
        setup: &MatcherSetup,
        catalog: &ModelCatalog,
        method: MatchMethod,
        score: Option<u32>,
    ) -> Option<MatchResult> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let model = pick_model(
            candidates,
            setup.pick_strategy,
            |m| catalog.position(&m.model_string),
            &mut *rng,
        )?;
        Some(MatchResult::new(model, method, score, candidates.len()))
    }

    fn score_candidates(
        &self,
        remote: &RemoteAircraft,
        setup: &MatcherSetup,
        catalog: &ModelCatalog,
        candidates: Vec<AircraftModel>,
        log: &mut dyn LogSink,
    ) -> MatchResult {
        let callsign = remote.callsign.as_str();
        let (candidates, _) = reduce_by_force_mode(remote, candidates, setup, log);
        let scored = score_models(&candidates, remote, setup, &self.scoring, log);

        match best_scored(&scored) {
            Some((max, best)) if max >= self.scoring.min_credible_score => {
                log_details(
                    log,
                    callsign,
                    LogCategory::Summary,
                    format!("Best score {max}, {} models with that score", best.len()),
                );
                self.pick(&best, setup, catalog, MatchMethod::Score, Some(max))
                    .unwrap_or_else(|| self.fallback(&candidates, catalog, remote, log))
            }
            Some((max, _)) => {
                log_details(
                    log,
                    callsign,
                    LogCategory::Summary,
                    format!(
                        "Best score {max} below {}, using default model",
                        self.scoring.min_credible_score
                    ),
                );
                self.fallback(&candidates, catalog, remote, log)
            }
            None => {
                log_details(log, callsign, LogCategory::Summary, "No scored models, using default model");
                self.fallback(&candidates, catalog, remote, log)
            }
        }
    }

    /// Combined type default among `candidates` (the whole set when empty),
    /// else the default model, else an empty model
    fn fallback(
        &self,
        candidates: &[AircraftModel],
        catalog: &ModelCatalog,
        remote: &RemoteAircraft,
        log: &mut dyn LogSink,
    ) -> MatchResult {
        let models = if candidates.is_empty() { catalog.models() } else { candidates };
        match combined_type_default_model(models, remote, catalog.default_model(), log) {
            Some(model) if model.default_model => MatchResult::new(model, MatchMethod::DefaultModel, None, models.len()),
            Some(model) => MatchResult::new(model, MatchMethod::CombinedTypeDefault, None, models.len()),
            None => {
                log_details(log, &remote.callsign, LogCategory::Summary, "No default model, empty model used");
                MatchResult::new(AircraftModel::empty_for(&remote.callsign), MatchMethod::DefaultModel, None, 0)
            }
        }
    }

    fn run_matching_stage_script(
        &self,
        remote: &RemoteAircraft,
        setup: &MatcherSetup,
        catalog: &ModelCatalog,
        categories: &CategoryIndex,
        result: MatchResult,
        log: &mut dyn LogSink,
    ) -> MatchResult {
        let callsign = remote.callsign.as_str();
        let (Some(engine), Some(file)) = (
            self.resolver.script_engine(),
            setup.matching_stage_script.file.as_deref(),
        ) else {
            return result;
        };

        let input = MatchingScriptInput::new(ScriptStage::MatchingStage, remote, &remote.model)
            .with_model(&result.model, catalog.len());
        let values = match engine.run(file, &input) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(callsign, error = %e, "Matching stage script failed");
                log_details(log, callsign, LogCategory::Script, format!("Script failed: {e}"));
                return result;
            }
        };
        if let Some(message) = &values.log_message {
            log_details(log, callsign, LogCategory::Script, message);
        }

        if let Some(model_string) = values.model_string() {
            if let Some(model) = catalog.get(model_string) {
                log_details(
                    log,
                    callsign,
                    LogCategory::Script,
                    format!("Script selected model '{model_string}'"),
                );
                return MatchResult::new(model.clone(), MatchMethod::Script, None, 1);
            }
            log_details(
                log,
                callsign,
                LogCategory::Script,
                format!("Script model '{model_string}' not in model set, ignored"),
            );
        }

        if values.has_icao_overrides() {
            let icao_values = ScriptReturnValues {
                model_string: None,
                log_message: None,
                ..values
            };
            let model = self
                .resolver
                .apply_script_overrides(remote.model.clone(), &icao_values, callsign, log);
            let changed = remote.clone().with_model(model);
            log_details(log, callsign, LogCategory::Script, "Matching again with script values");
            return self.run_algorithm(&changed, &setup.without_scripts(), catalog, categories, log);
        }

        log_details(log, callsign, LogCategory::Script, "Script returned no overrides");
        result
    }

    /// A model could not be added to the simulator.
    ///
    /// With `ModelSetRemoveFailedModel` the model is disabled for matching,
    /// and with `ModelFailoverIfNoModelCanBeAdded` a new match is returned.
    pub fn adding_remote_model_failed(
        &self,
        remote: &RemoteAircraft,
        failed: &AircraftModel,
        what_to_log: MatchingLog,
        mut log: Option<&mut dyn LogSink>,
    ) -> Option<MatchResult> {
        let setup = self.setup();
        if setup.mode.contains(MatchingModeFlag::ModelSetRemoveFailedModel) {
            let disabled = self.disable_models_for_matching(std::slice::from_ref(failed), true);
            tracing::info!(callsign = %remote.callsign, model = %failed.model_string, disabled, "Failed model disabled");
            if let Some(sink) = log.as_deref_mut() {
                with_sink(what_to_log, Some(sink), |log| {
                    log_details(
                        log,
                        &remote.callsign,
                        LogCategory::ModelSet,
                        format!("Disabled failed model '{}'", failed.model_string),
                    );
                });
            }
        }

        if !setup.mode.contains(MatchingModeFlag::ModelFailoverIfNoModelCanBeAdded) {
            return None;
        }
        let result = self.get_closest_match(remote, what_to_log, log);
        (!result.model.matches_model_string(&failed.model_string) || result.is_default()).then_some(result)
    }

    // ------------------------------------------------------- reverse lookup

    /// Resolve canonical ICAO and livery data for a remote aircraft
    pub fn reverse_lookup_model(
        &self,
        remote: &RemoteAircraft,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> AircraftModel {
        let setup = self.setup();
        let catalog = self.catalog();
        with_sink(what_to_log, log, |log| {
            self.resolver.reverse_lookup_model(remote, catalog.models(), &setup, log)
        })
    }

    pub fn reverse_lookup_aircraft_icao(
        &self,
        designator: &str,
        airline_designator: &str,
        callsign: &str,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> AircraftIcaoCode {
        let catalog = self.catalog();
        with_sink(what_to_log, log, |log| {
            self.resolver
                .reverse_lookup_aircraft_icao(designator, airline_designator, catalog.models(), callsign, log)
        })
    }

    pub fn reverse_lookup_airline_icao(
        &self,
        designator: &str,
        name: &str,
        telephony: &str,
        callsign: &str,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> AirlineIcaoCode {
        with_sink(what_to_log, log, |log| {
            self.resolver
                .reverse_lookup_airline_icao(designator, name, telephony, callsign, log)
        })
    }

    pub fn reverse_lookup_standard_livery(
        &self,
        airline: &AirlineIcaoCode,
        callsign: &str,
        what_to_log: MatchingLog,
        log: Option<&mut dyn LogSink>,
    ) -> Livery {
        with_sink(what_to_log, log, |log| {
            self.resolver.reverse_lookup_standard_livery(airline, callsign, log)
        })
    }

    // ----------------------------------------------------------- statistics

    /// Count a requested aircraft / airline / livery combination
    pub fn evaluate_statistics_entry(
        &self,
        session_id: &str,
        callsign: &str,
        aircraft_icao: &str,
        airline_icao: &str,
        livery: &str,
    ) -> bool {
        let found = self
            .catalog()
            .finder()
            .contains_aircraft_and_airline(aircraft_icao, airline_icao);
        let entry_type = if found {
            StatisticsEntryType::Found
        } else {
            StatisticsEntryType::Missing
        };
        self.statistics.evaluate_statistics_entry(
            session_id,
            callsign,
            aircraft_icao,
            airline_icao,
            livery,
            entry_type,
        )
    }

    fn evaluate_statistics_for(&self, remote: &RemoteAircraft, catalog: &ModelCatalog) {
        let aircraft = &remote.aircraft_icao().designator;
        let airline = &remote.airline().designator;
        let entry_type = if catalog.finder().contains_aircraft_and_airline(aircraft, airline) {
            StatisticsEntryType::Found
        } else {
            StatisticsEntryType::Missing
        };
        self.statistics.evaluate_statistics_entry(
            &self.session_id,
            &remote.callsign,
            aircraft,
            airline,
            &remote.livery().combined_code,
            entry_type,
        );
    }
}

/// Stamp the callsign and the model type on the result
fn finish(mut result: MatchResult, remote: &RemoteAircraft) -> MatchResult {
    result.model.callsign = Some(remote.callsign.clone());
    result.model.model_type = if result.is_default() {
        ModelType::ModelMatchingDefault
    } else {
        ModelType::ModelMatching
    };
    result
}

impl ModelSetProvider for AircraftMatcher {
    fn model_set(&self) -> Arc<ModelCatalog> {
        self.catalog()
    }
}

impl StatisticsProvider for AircraftMatcher {
    fn current_statistics(&self, missing_only: bool) -> MatchingStatistics {
        self.statistics.current_statistics(missing_only)
    }

    fn clear_matching_statistics(&self) {
        self.statistics.clear();
        self.resolver.clear_memo();
    }
}
