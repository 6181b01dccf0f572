//! Matcher configuration.
//!
//! [`MatcherSetup`] bundles the matching algorithm, the independent mode
//! flags ([`MatchingMode`]), the tie-break strategy, the force mode and the
//! matching-script settings. [`MatcherSetup::reset`] is the only validated
//! way to obtain a consistent mode for an algorithm; any other mode value is
//! accepted as given.
//!
//! ## Example
//!
//! ```rust
//! use model_matcher::setup::{MatcherSetup, MatchingAlgorithm, MatchingModeFlag};
//!
//! let setup = MatcherSetup::new(MatchingAlgorithm::StepwiseReduce);
//! assert!(setup.mode.contains(MatchingModeFlag::ByModelString));
//! assert!(!setup.mode.contains(MatchingModeFlag::ScoreIgnoreZeros));
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to read setup: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse setup: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Overall matching algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingAlgorithm {
    /// Chain of reduction filters, ties broken by pick strategy
    StepwiseReduce,
    /// Score the whole model set
    ScoreBased,
    /// Reduce first, score the survivors
    #[default]
    ReducePlusScore,
}

impl std::fmt::Display for MatchingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StepwiseReduce => write!(f, "stepwise reduce"),
            Self::ScoreBased => write!(f, "score based"),
            Self::ReducePlusScore => write!(f, "reduce + score based"),
        }
    }
}

/// Tie-break among equally good candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickSimilarStrategy {
    First,
    #[default]
    ByOrder,
    Random,
}

impl std::fmt::Display for PickSimilarStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::ByOrder => write!(f, "order"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// A single independent matching toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingModeFlag {
    ReverseLookupModelString,
    ReverseLookupLiveryIds,
    ByModelString,
    ByIcaoOrderAircraftFirst,
    ByIcaoOrderAirlineFirst,
    ByFamily,
    ByLivery,
    ByCombinedType,
    ByMilitary,
    ByCivilian,
    ByVtol,
    ByCategoryGlider,
    ByCategoryMilitary,
    ByCategorySmallAircraft,
    ScoreIgnoreZeros,
    ScorePreferColorLiveries,
    ExcludeNoDbData,
    ExcludeNoExcluded,
    ModelVerificationAtStartup,
    ModelVerificationOnlyWarnError,
    ModelSetRemoveFailedModel,
    ModelFailoverIfNoModelCanBeAdded,
    ByAirlineGroupIfNoAirline,
    ByAirlineGroupSameAsAirline,
}

impl MatchingModeFlag {
    pub const ALL: [MatchingModeFlag; 24] = [
        Self::ReverseLookupModelString,
        Self::ReverseLookupLiveryIds,
        Self::ByModelString,
        Self::ByIcaoOrderAircraftFirst,
        Self::ByIcaoOrderAirlineFirst,
        Self::ByFamily,
        Self::ByLivery,
        Self::ByCombinedType,
        Self::ByMilitary,
        Self::ByCivilian,
        Self::ByVtol,
        Self::ByCategoryGlider,
        Self::ByCategoryMilitary,
        Self::ByCategorySmallAircraft,
        Self::ScoreIgnoreZeros,
        Self::ScorePreferColorLiveries,
        Self::ExcludeNoDbData,
        Self::ExcludeNoExcluded,
        Self::ModelVerificationAtStartup,
        Self::ModelVerificationOnlyWarnError,
        Self::ModelSetRemoveFailedModel,
        Self::ModelFailoverIfNoModelCanBeAdded,
        Self::ByAirlineGroupIfNoAirline,
        Self::ByAirlineGroupSameAsAirline,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ReverseLookupModelString => "reverse model lookup",
            Self::ReverseLookupLiveryIds => "reverse livery ids",
            Self::ByModelString => "by model string",
            Self::ByIcaoOrderAircraftFirst => "by ICAO aircraft first",
            Self::ByIcaoOrderAirlineFirst => "by ICAO airline first",
            Self::ByFamily => "by family",
            Self::ByLivery => "by livery",
            Self::ByCombinedType => "by combined code",
            Self::ByMilitary => "by military",
            Self::ByCivilian => "by civilian",
            Self::ByVtol => "VTOL",
            Self::ByCategoryGlider => "glider categories",
            Self::ByCategoryMilitary => "military categories",
            Self::ByCategorySmallAircraft => "small aircraft categories",
            Self::ScoreIgnoreZeros => "scoring, ignore zero scores",
            Self::ScorePreferColorLiveries => "scoring, prefer color liveries",
            Self::ExcludeNoDbData => "excl. without DB data",
            Self::ExcludeNoExcluded => "excl. excluded",
            Self::ModelVerificationAtStartup => "verify models at startup",
            Self::ModelVerificationOnlyWarnError => "only verification warnings/errors",
            Self::ModelSetRemoveFailedModel => "rem. from model set",
            Self::ModelFailoverIfNoModelCanBeAdded => "replace models failed to be added",
            Self::ByAirlineGroupIfNoAirline => "group if no airline",
            Self::ByAirlineGroupSameAsAirline => "group as airline",
        }
    }
}

/// Set of [`MatchingModeFlag`]s.
///
/// Serialized as the list of contained flag names.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<MatchingModeFlag>", from = "Vec<MatchingModeFlag>")]
pub struct MatchingMode(u32);

impl MatchingMode {
    pub const NONE: Self = Self(0);

    pub const BY_FLAGS: Self = Self::from_flags(&[
        MatchingModeFlag::ByMilitary,
        MatchingModeFlag::ByCivilian,
        MatchingModeFlag::ByVtol,
    ]);

    pub const DEFAULT_REDUCE: Self = Self::from_flags(&[
        MatchingModeFlag::ByModelString,
        MatchingModeFlag::ByLivery,
        MatchingModeFlag::ByIcaoOrderAircraftFirst,
        MatchingModeFlag::ByFamily,
        MatchingModeFlag::ByCombinedType,
        MatchingModeFlag::ByAirlineGroupIfNoAirline,
    ])
    .union(Self::BY_FLAGS);

    pub const DEFAULT_SCORE: Self = Self::from_flags(&[
        MatchingModeFlag::ScoreIgnoreZeros,
        MatchingModeFlag::ScorePreferColorLiveries,
        MatchingModeFlag::ByIcaoOrderAircraftFirst,
        MatchingModeFlag::ByLivery,
        MatchingModeFlag::ByFamily,
        MatchingModeFlag::ByCombinedType,
        MatchingModeFlag::ByModelString,
    ])
    .union(Self::BY_FLAGS);

    pub const DEFAULT_REDUCE_PLUS_SCORE: Self = Self::DEFAULT_REDUCE.union(Self::from_flags(&[
        MatchingModeFlag::ScoreIgnoreZeros,
        MatchingModeFlag::ScorePreferColorLiveries,
    ]));

    /// Flags added to every algorithm default
    pub const DEFAULT_SET: Self = Self::from_flags(&[
        MatchingModeFlag::ByCategoryGlider,
        MatchingModeFlag::ByCategoryMilitary,
        MatchingModeFlag::ReverseLookupModelString,
        MatchingModeFlag::ReverseLookupLiveryIds,
        MatchingModeFlag::ModelSetRemoveFailedModel,
        MatchingModeFlag::ModelFailoverIfNoModelCanBeAdded,
    ]);

    #[must_use]
    pub const fn from_flags(flags: &[MatchingModeFlag]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < flags.len() {
            bits |= flags[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, flag: MatchingModeFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn with(mut self, flag: MatchingModeFlag) -> Self {
        self.insert(flag);
        self
    }

    #[must_use]
    pub fn without(mut self, flag: MatchingModeFlag) -> Self {
        self.remove(flag);
        self
    }

    pub fn insert(&mut self, flag: MatchingModeFlag) {
        self.0 |= flag.bit();
    }

    pub fn remove(&mut self, flag: MatchingModeFlag) {
        self.0 &= !flag.bit();
    }

    pub fn set(&mut self, flag: MatchingModeFlag, on: bool) {
        if on {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Contained flags in declaration order
    pub fn iter(self) -> impl Iterator<Item = MatchingModeFlag> {
        MatchingModeFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }

    /// Either ICAO order flag means "match by ICAO data"
    #[must_use]
    pub fn uses_icao_data(self) -> bool {
        self.contains(MatchingModeFlag::ByIcaoOrderAircraftFirst)
            || self.contains(MatchingModeFlag::ByIcaoOrderAirlineFirst)
    }

    /// Encode named booleans into a mode.
    ///
    /// `model_failover` forces `model_set_remove_failed`, replacing a failed
    /// model only makes sense when it is removed from the set first.
    #[must_use]
    pub fn from_toggles(toggles: &MatchingModeToggles) -> Self {
        use MatchingModeFlag as F;

        let remove_failed = toggles.model_set_remove_failed || toggles.model_failover;
        let pairs = [
            (F::ReverseLookupModelString, toggles.reverse_lookup_model_string),
            (F::ReverseLookupLiveryIds, toggles.reverse_lookup_livery_ids),
            (F::ByModelString, toggles.by_model_string),
            (F::ByIcaoOrderAircraftFirst, toggles.by_icao_aircraft_first),
            (F::ByIcaoOrderAirlineFirst, toggles.by_icao_airline_first),
            (F::ByFamily, toggles.by_family),
            (F::ByLivery, toggles.by_livery),
            (F::ByCombinedType, toggles.by_combined_type),
            (F::ByMilitary, toggles.by_military),
            (F::ByCivilian, toggles.by_civilian),
            (F::ByVtol, toggles.by_vtol),
            (F::ByCategoryGlider, toggles.by_glider_category),
            (F::ByCategoryMilitary, toggles.by_military_category),
            (F::ByCategorySmallAircraft, toggles.by_small_aircraft_category),
            (F::ScoreIgnoreZeros, toggles.score_ignore_zeros),
            (F::ScorePreferColorLiveries, toggles.score_prefer_color_liveries),
            (F::ExcludeNoDbData, toggles.exclude_no_db_data),
            (F::ExcludeNoExcluded, toggles.exclude_no_excluded),
            (F::ModelVerificationAtStartup, toggles.model_verification),
            (F::ModelVerificationOnlyWarnError, toggles.model_verification_warn_error),
            (F::ModelSetRemoveFailedModel, remove_failed),
            (F::ModelFailoverIfNoModelCanBeAdded, toggles.model_failover),
            (F::ByAirlineGroupIfNoAirline, toggles.airline_group_if_no_airline),
            (F::ByAirlineGroupSameAsAirline, toggles.airline_group_same_as_airline),
        ];

        let mut mode = Self::NONE;
        for (flag, on) in pairs {
            mode.set(flag, on);
        }
        mode
    }

    /// Decode the mode back into named booleans
    #[must_use]
    pub fn toggles(self) -> MatchingModeToggles {
        use MatchingModeFlag as F;

        MatchingModeToggles {
            reverse_lookup_model_string: self.contains(F::ReverseLookupModelString),
            reverse_lookup_livery_ids: self.contains(F::ReverseLookupLiveryIds),
            by_model_string: self.contains(F::ByModelString),
            by_icao_aircraft_first: self.contains(F::ByIcaoOrderAircraftFirst),
            by_icao_airline_first: self.contains(F::ByIcaoOrderAirlineFirst),
            by_family: self.contains(F::ByFamily),
            by_livery: self.contains(F::ByLivery),
            by_combined_type: self.contains(F::ByCombinedType),
            by_military: self.contains(F::ByMilitary),
            by_civilian: self.contains(F::ByCivilian),
            by_vtol: self.contains(F::ByVtol),
            by_glider_category: self.contains(F::ByCategoryGlider),
            by_military_category: self.contains(F::ByCategoryMilitary),
            by_small_aircraft_category: self.contains(F::ByCategorySmallAircraft),
            score_ignore_zeros: self.contains(F::ScoreIgnoreZeros),
            score_prefer_color_liveries: self.contains(F::ScorePreferColorLiveries),
            exclude_no_db_data: self.contains(F::ExcludeNoDbData),
            exclude_no_excluded: self.contains(F::ExcludeNoExcluded),
            model_verification: self.contains(F::ModelVerificationAtStartup),
            model_verification_warn_error: self.contains(F::ModelVerificationOnlyWarnError),
            model_set_remove_failed: self.contains(F::ModelSetRemoveFailedModel),
            model_failover: self.contains(F::ModelFailoverIfNoModelCanBeAdded),
            airline_group_if_no_airline: self.contains(F::ByAirlineGroupIfNoAirline),
            airline_group_same_as_airline: self.contains(F::ByAirlineGroupSameAsAirline),
        }
    }

    /// Comma separated flag descriptions
    #[must_use]
    pub fn describe(self) -> String {
        self.iter()
            .map(MatchingModeFlag::description)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::ops::BitOr for MatchingMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOr<MatchingModeFlag> for MatchingMode {
    type Output = Self;

    fn bitor(self, rhs: MatchingModeFlag) -> Self {
        self.with(rhs)
    }
}

impl From<MatchingModeFlag> for MatchingMode {
    fn from(flag: MatchingModeFlag) -> Self {
        Self(flag.bit())
    }
}

impl From<Vec<MatchingModeFlag>> for MatchingMode {
    fn from(flags: Vec<MatchingModeFlag>) -> Self {
        Self::from_flags(&flags)
    }
}

impl From<MatchingMode> for Vec<MatchingModeFlag> {
    fn from(mode: MatchingMode) -> Self {
        mode.iter().collect()
    }
}

impl std::fmt::Debug for MatchingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// One named boolean per [`MatchingModeFlag`], the editable form of a mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingModeToggles {
    pub reverse_lookup_model_string: bool,
    pub reverse_lookup_livery_ids: bool,
    pub by_model_string: bool,
    pub by_icao_aircraft_first: bool,
    pub by_icao_airline_first: bool,
    pub by_family: bool,
    pub by_livery: bool,
    pub by_combined_type: bool,
    pub by_military: bool,
    pub by_civilian: bool,
    pub by_vtol: bool,
    pub by_glider_category: bool,
    pub by_military_category: bool,
    pub by_small_aircraft_category: bool,
    pub score_ignore_zeros: bool,
    pub score_prefer_color_liveries: bool,
    pub exclude_no_db_data: bool,
    pub exclude_no_excluded: bool,
    pub model_verification: bool,
    pub model_verification_warn_error: bool,
    pub model_set_remove_failed: bool,
    pub model_failover: bool,
    pub airline_group_if_no_airline: bool,
    pub airline_group_same_as_airline: bool,
}

/// Which combined type components must agree when the exact combined type has no model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceModeFlag {
    ForceType,
    ForceEngineCount,
    ForceEngine,
}

impl ForceModeFlag {
    pub const ALL: [ForceModeFlag; 3] = [Self::ForceType, Self::ForceEngineCount, Self::ForceEngine];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of [`ForceModeFlag`]s, empty means "force nothing"
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<ForceModeFlag>", from = "Vec<ForceModeFlag>")]
pub struct ForceMode(u8);

impl ForceMode {
    pub const NOTHING: Self = Self(0);

    #[must_use]
    pub fn from_flags(flags: &[ForceModeFlag]) -> Self {
        Self(flags.iter().fold(0, |bits, flag| bits | flag.bit()))
    }

    #[must_use]
    pub fn contains(self, flag: ForceModeFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    #[must_use]
    pub fn is_nothing(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ForceModeFlag> {
        ForceModeFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl From<Vec<ForceModeFlag>> for ForceMode {
    fn from(flags: Vec<ForceModeFlag>) -> Self {
        Self::from_flags(&flags)
    }
}

impl From<ForceMode> for Vec<ForceModeFlag> {
    fn from(mode: ForceMode) -> Self {
        mode.iter().collect()
    }
}

impl std::fmt::Debug for ForceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::fmt::Display for ForceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_nothing() {
            return write!(f, "nothing");
        }
        let parts: Vec<&str> = self
            .iter()
            .map(|flag| match flag {
                ForceModeFlag::ForceType => "type",
                ForceModeFlag::ForceEngineCount => "engine count",
                ForceModeFlag::ForceEngine => "engine",
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// External script of one matching stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingScriptSetup {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl MatchingScriptSetup {
    /// Enabled and a file is configured
    #[must_use]
    pub fn should_run(&self) -> bool {
        self.enabled
            && self
                .file
                .as_ref()
                .is_some_and(|f| !f.as_os_str().is_empty())
    }
}

/// Complete matcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSetup {
    pub algorithm: MatchingAlgorithm,
    pub mode: MatchingMode,
    pub pick_strategy: PickSimilarStrategy,
    pub force_mode: ForceMode,
    /// Allow "same combined type + manufacturer" as family substitute
    pub pseudo_family: bool,
    pub reverse_lookup_script: MatchingScriptSetup,
    pub matching_stage_script: MatchingScriptSetup,
}

impl Default for MatcherSetup {
    fn default() -> Self {
        Self::new(MatchingAlgorithm::default())
    }
}

impl MatcherSetup {
    /// Setup with the defaults of the given algorithm
    pub fn new(algorithm: MatchingAlgorithm) -> Self {
        let mut setup = Self {
            algorithm,
            mode: MatchingMode::NONE,
            pick_strategy: PickSimilarStrategy::ByOrder,
            force_mode: ForceMode::NOTHING,
            pseudo_family: true,
            reverse_lookup_script: MatchingScriptSetup::default(),
            matching_stage_script: MatchingScriptSetup::default(),
        };
        setup.reset(algorithm);
        setup
    }

    /// Load a setup from a JSON file, absent fields take the defaults
    pub fn load_from_file(path: &Path) -> Result<Self, SetupError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SetupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Default mode of an algorithm, including the set defaults
    #[must_use]
    pub fn default_mode(algorithm: MatchingAlgorithm) -> MatchingMode {
        let mode = match algorithm {
            MatchingAlgorithm::StepwiseReduce => MatchingMode::DEFAULT_REDUCE,
            MatchingAlgorithm::ScoreBased => MatchingMode::DEFAULT_SCORE,
            MatchingAlgorithm::ReducePlusScore => MatchingMode::DEFAULT_REDUCE_PLUS_SCORE,
        };
        mode | MatchingMode::DEFAULT_SET
    }

    /// Reset to the algorithm's defaults: mode, pick strategy and disabled scripts
    pub fn reset(&mut self, algorithm: MatchingAlgorithm) {
        self.algorithm = algorithm;
        self.mode = Self::default_mode(algorithm);
        self.pick_strategy = PickSimilarStrategy::ByOrder;
        self.force_mode = ForceMode::NOTHING;
        self.pseudo_family = true;
        self.reverse_lookup_script = MatchingScriptSetup::default();
        self.matching_stage_script = MatchingScriptSetup::default();
    }

    /// Change the algorithm, optionally resetting everything else.
    ///
    /// Returns `false` if the algorithm was already set.
    pub fn set_algorithm(&mut self, algorithm: MatchingAlgorithm, reset: bool) -> bool {
        if self.algorithm == algorithm {
            return false;
        }
        if reset {
            self.reset(algorithm);
        } else {
            self.algorithm = algorithm;
        }
        true
    }

    #[must_use]
    pub fn use_category_matching(&self) -> bool {
        self.mode.contains(MatchingModeFlag::ByCategoryGlider)
            || self.mode.contains(MatchingModeFlag::ByCategoryMilitary)
    }

    #[must_use]
    pub fn do_run_reverse_lookup_script(&self) -> bool {
        self.reverse_lookup_script.should_run()
    }

    #[must_use]
    pub fn do_run_matching_stage_script(&self) -> bool {
        self.matching_stage_script.should_run()
    }

    #[must_use]
    pub fn is_reverse_lookup_model_string(&self) -> bool {
        self.mode.contains(MatchingModeFlag::ReverseLookupModelString)
    }

    #[must_use]
    pub fn is_reverse_lookup_livery_ids(&self) -> bool {
        self.mode.contains(MatchingModeFlag::ReverseLookupLiveryIds)
    }

    /// Same setup with scripts disabled, used for re-matching after a script override
    #[must_use]
    pub fn without_scripts(&self) -> Self {
        let mut setup = self.clone();
        setup.reverse_lookup_script.enabled = false;
        setup.matching_stage_script.enabled = false;
        setup
    }
}

impl std::fmt::Display for MatcherSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        write!(
            f,
            "algorithm: '{}' mode: '{}' force: '{}' strategy: '{}' matching script: {}/{}",
            self.algorithm,
            self.mode.describe(),
            self.force_mode,
            self.pick_strategy,
            on_off(self.reverse_lookup_script.enabled),
            on_off(self.matching_stage_script.enabled),
        )
    }
}
