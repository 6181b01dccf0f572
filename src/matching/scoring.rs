use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::catalog::model_list::ModelFinder;
use crate::core::model::AircraftModel;
use crate::core::remote::RemoteAircraft;
use crate::matching::log::{log_details, LogCategory, LogSink};
use crate::setup::{MatcherSetup, MatchingModeFlag, PickSimilarStrategy};

/// Default minimum score a best match needs before the default model is preferred
pub const DEFAULT_MIN_CREDIBLE_SCORE: u32 = 1;

/// Points per matching criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Same aircraft designator
    pub aircraft: u32,
    /// Same family, or the remote designator is the model's family
    pub family: u32,
    pub combined_type: u32,
    pub manufacturer: u32,
    /// Same livery code, the airline standard livery when the remote has none
    pub livery: u32,
    /// Same airline designator, or same airline name / telephony
    pub airline: u32,
    pub military: u32,
    pub vtol: u32,
    /// Bonus for color liveries with `ScorePreferColorLiveries`
    pub color_livery: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            aircraft: 60,
            family: 40,
            combined_type: 25,
            manufacturer: 20,
            livery: 15,
            airline: 12,
            military: 5,
            vtol: 5,
            color_livery: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Best scores below this are not credible, the default model is used instead
    pub min_credible_score: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_credible_score: DEFAULT_MIN_CREDIBLE_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredModel {
    pub model: AircraftModel,
    pub score: u32,
}

/// Score one model against the remote aircraft.
///
/// Flag agreement (military, VTOL) and the color livery bonus only add to a
/// non-zero score, so zero keeps meaning "nothing in common".
#[must_use]
pub fn calculate_score(
    model: &AircraftModel,
    remote: &RemoteAircraft,
    weights: &ScoringWeights,
    prefer_color_liveries: bool,
) -> u32 {
    let wanted = remote.aircraft_icao();
    let icao = &model.aircraft_icao;
    let mut score: u32 = 0;

    if wanted.has_designator() && icao.matches_designator(&wanted.designator) {
        score = score.saturating_add(weights.aircraft);
    } else if wanted.family.as_deref().is_some_and(|f| icao.matches_family(f))
        || (wanted.has_designator() && icao.matches_family(&wanted.designator))
    {
        score = score.saturating_add(weights.family);
    }

    if wanted
        .combined_type
        .as_deref()
        .is_some_and(|ct| icao.matches_combined_type(ct))
    {
        score = score.saturating_add(weights.combined_type);
    }
    if wanted
        .manufacturer
        .as_deref()
        .is_some_and(|m| icao.matches_manufacturer(m))
    {
        score = score.saturating_add(weights.manufacturer);
    }

    let livery_code = remote.livery_code_or_standard();
    if !livery_code.is_empty() && model.livery.matches_combined_code(&livery_code) {
        score = score.saturating_add(weights.livery);
    }

    let airline = remote.airline();
    let name = airline.name.as_deref().unwrap_or_default();
    let telephony = airline.telephony.as_deref().unwrap_or_default();
    if (airline.has_designator() && model.airline().matches_designator(&airline.designator))
        || model.airline().matches_name_or_telephony(name, telephony)
    {
        score = score.saturating_add(weights.airline);
    }

    if score == 0 {
        return 0;
    }

    let remote_military = wanted.military || airline.military;
    if model.is_military() == remote_military {
        score = score.saturating_add(weights.military);
    }
    if model.is_vtol() == wanted.vtol {
        score = score.saturating_add(weights.vtol);
    }
    if prefer_color_liveries && model.has_color_livery() {
        score = score.saturating_add(weights.color_livery);
    }
    score
}

/// Score all candidates, keeping candidate order
pub fn score_models(
    candidates: &[AircraftModel],
    remote: &RemoteAircraft,
    setup: &MatcherSetup,
    config: &ScoringConfig,
    log: &mut dyn LogSink,
) -> Vec<ScoredModel> {
    let prefer_color = setup.mode.contains(MatchingModeFlag::ScorePreferColorLiveries);
    let mut scored: Vec<ScoredModel> = candidates
        .iter()
        .map(|m| ScoredModel {
            score: calculate_score(m, remote, &config.weights, prefer_color),
            model: m.clone(),
        })
        .collect();

    if setup.mode.contains(MatchingModeFlag::ScoreIgnoreZeros) {
        let before = scored.len();
        scored.retain(|s| s.score > 0);
        if scored.len() < before {
            log_details(
                log,
                &remote.callsign,
                LogCategory::Matching,
                format!("Ignored {} models with zero score", before - scored.len()),
            );
        }
    }

    log_details(
        log,
        &remote.callsign,
        LogCategory::Matching,
        format!("Scores: {}", scores_to_string(&scored, 5)),
    );
    scored
}

/// Highest score and all models reaching it, in candidate order
#[must_use]
pub fn best_scored(scored: &[ScoredModel]) -> Option<(u32, Vec<AircraftModel>)> {
    let max = scored.iter().map(|s| s.score).max()?;
    let best = scored
        .iter()
        .filter(|s| s.score == max)
        .map(|s| s.model.clone())
        .collect();
    Some((max, best))
}

/// The top `limit` scores, best first, e.g. `A320_AUA: 97, A320_DLH: 85`
#[must_use]
pub fn scores_to_string(scored: &[ScoredModel], limit: usize) -> String {
    let mut sorted: Vec<&ScoredModel> = scored.iter().collect();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    let parts: Vec<String> = sorted
        .iter()
        .take(limit)
        .map(|s| format!("{}: {}", s.model.model_string, s.score))
        .collect();
    if parts.is_empty() {
        "no scores".to_string()
    } else {
        parts.join(", ")
    }
}

/// Pick one model among equally good candidates.
///
/// `position` yields the catalog order used by [`PickSimilarStrategy::ByOrder`],
/// models without a position sort last. `rng` is only used by
/// [`PickSimilarStrategy::Random`].
pub fn pick_model(
    candidates: &[AircraftModel],
    strategy: PickSimilarStrategy,
    position: impl Fn(&AircraftModel) -> Option<usize>,
    rng: &mut dyn RngCore,
) -> Option<AircraftModel> {
    if candidates.is_empty() {
        return None;
    }
    let picked = match strategy {
        PickSimilarStrategy::First => &candidates[0],
        PickSimilarStrategy::ByOrder => candidates
            .iter()
            .enumerate()
            .min_by_key(|(i, m)| (position(*m).unwrap_or(usize::MAX), *i))
            .map(|(_, m)| m)?,
        PickSimilarStrategy::Random => &candidates[rng.random_range(0..candidates.len())],
    };
    Some(picked.clone())
}

/// Default model that respects the combined type of the remote aircraft.
///
/// Among `models`: same combined type, then same manufacturer, then color
/// liveries, then the first one. Without a combined type match the
/// `default_model` is used, and without that the first model of `models`.
#[must_use]
pub fn combined_type_default_model(
    models: &[AircraftModel],
    remote: &RemoteAircraft,
    default_model: Option<&AircraftModel>,
    log: &mut dyn LogSink,
) -> Option<AircraftModel> {
    let callsign = remote.callsign.as_str();
    let fallback = || default_model.or_else(|| models.first()).cloned();

    let Some(combined_type) = remote.combined_type() else {
        log_details(log, callsign, LogCategory::Matching, "No combined type, using default model");
        return fallback();
    };

    let mut list = ModelFinder::new(models).find_by_combined_type(combined_type);
    if list.is_empty() {
        log_details(
            log,
            callsign,
            LogCategory::Matching,
            format!("No models of combined type '{combined_type}', using default model"),
        );
        return fallback();
    }

    if let Some(manufacturer) = remote.aircraft_icao().manufacturer.as_deref() {
        let same = ModelFinder::new(&list).find_by_manufacturer(manufacturer);
        if !same.is_empty() {
            list = same;
        }
    }
    let colored = ModelFinder::new(&list).find_color_liveries();
    if !colored.is_empty() {
        list = colored;
    }

    let picked = list.into_iter().next();
    if let Some(model) = &picked {
        log_details(
            log,
            callsign,
            LogCategory::Summary,
            format!(
                "Combined type '{combined_type}' default model '{}'",
                model.model_string
            ),
        );
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icao::{AircraftIcaoCode, AirlineIcaoCode, Livery};
    use crate::matching::log::NullSink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn a320(airline: &str) -> AircraftModel {
        AircraftModel::new(
            &format!("A320_{airline}"),
            AircraftIcaoCode::new("A320")
                .with_combined_type("L2J")
                .with_family("A320")
                .with_manufacturer("Airbus"),
            Livery::standard(&AirlineIcaoCode::new(airline)),
        )
    }

    fn b738(airline: &str) -> AircraftModel {
        AircraftModel::new(
            &format!("B738_{airline}"),
            AircraftIcaoCode::new("B738")
                .with_combined_type("L2J")
                .with_manufacturer("Boeing"),
            Livery::standard(&AirlineIcaoCode::new(airline)),
        )
    }

    fn remote_a320_aua() -> RemoteAircraft {
        RemoteAircraft::from_network("AUA1", "A320", "AUA", "", "").with_combined_type("L2J")
    }

    #[test]
    fn test_score_ordering() {
        let weights = ScoringWeights::default();
        let remote = remote_a320_aua();
        let exact = calculate_score(&a320("AUA"), &remote, &weights, false);
        let other_airline = calculate_score(&a320("DLH"), &remote, &weights, false);
        let other_type = calculate_score(&b738("AUA"), &remote, &weights, false);
        let nothing = calculate_score(&b738("DLH"), &remote, &weights, false);
        assert!(exact > other_airline);
        assert!(other_airline > other_type);
        assert!(other_type > nothing);
        // same combined type still counts
        assert!(nothing > 0);
    }

    #[test]
    fn test_zero_score_stays_zero() {
        let weights = ScoringWeights::default();
        let remote = RemoteAircraft::from_network("XXX1", "C172", "", "", "");
        let color = AircraftModel::new("B738_CC", b738("").aircraft_icao, Livery::color("FF0000"));
        assert_eq!(calculate_score(&color, &remote, &weights, true), 0);
    }

    #[test]
    fn test_score_saturates() {
        let weights = ScoringWeights {
            aircraft: u32::MAX,
            combined_type: u32::MAX,
            airline: u32::MAX,
            ..ScoringWeights::default()
        };
        let remote = remote_a320_aua();
        assert_eq!(calculate_score(&a320("AUA"), &remote, &weights, true), u32::MAX);
    }

    #[test]
    fn test_color_livery_bonus() {
        let weights = ScoringWeights::default();
        let remote = remote_a320_aua();
        let plain = AircraftModel::new("A320_PLAIN", a320("").aircraft_icao, Livery::default());
        let color = AircraftModel::new("A320_CC", a320("").aircraft_icao, Livery::color("FFFFFF"));
        let plain_score = calculate_score(&plain, &remote, &weights, true);
        assert_eq!(calculate_score(&color, &remote, &weights, true), plain_score + weights.color_livery);
        assert_eq!(calculate_score(&color, &remote, &weights, false), plain_score);
    }

    #[test]
    fn test_score_models_ignores_zeros() {
        let models = vec![
            a320("AUA"),
            AircraftModel::new("C172", AircraftIcaoCode::new("C172"), Livery::default()),
        ];
        let remote = remote_a320_aua();
        let mut setup = MatcherSetup::default();
        let config = ScoringConfig::default();

        let scored = score_models(&models, &remote, &setup, &config, &mut NullSink);
        assert_eq!(scored.len(), 1);

        setup.mode.remove(MatchingModeFlag::ScoreIgnoreZeros);
        let scored = score_models(&models, &remote, &setup, &config, &mut NullSink);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[1].score, 0);
    }

    #[test]
    fn test_best_scored() {
        let scored = vec![
            ScoredModel { model: a320("AUA"), score: 10 },
            ScoredModel { model: a320("DLH"), score: 30 },
            ScoredModel { model: b738("DLH"), score: 30 },
        ];
        let (max, best) = best_scored(&scored).unwrap();
        assert_eq!(max, 30);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].model_string, "A320_DLH");
        assert!(best_scored(&[]).is_none());
        assert_eq!(scores_to_string(&scored, 2), "A320_DLH: 30, B738_DLH: 30");
    }

    #[test]
    fn test_pick_strategies() {
        let candidates = vec![b738("DLH"), a320("AUA"), a320("DLH")];
        let order = ["A320_AUA", "A320_DLH", "B738_DLH"];
        let position = |m: &AircraftModel| order.iter().position(|s| *s == m.model_string);
        let mut rng = StdRng::seed_from_u64(7);

        let first = pick_model(&candidates, PickSimilarStrategy::First, position, &mut rng).unwrap();
        assert_eq!(first.model_string, "B738_DLH");
        let by_order = pick_model(&candidates, PickSimilarStrategy::ByOrder, position, &mut rng).unwrap();
        assert_eq!(by_order.model_string, "A320_AUA");
        for _ in 0..20 {
            let random = pick_model(&candidates, PickSimilarStrategy::Random, position, &mut rng).unwrap();
            assert!(candidates.contains(&random));
        }
        assert!(pick_model(&[], PickSimilarStrategy::First, position, &mut rng).is_none());
    }

    #[test]
    fn test_random_pick_is_reproducible_with_seed() {
        let candidates = vec![a320("AUA"), a320("DLH"), b738("DLH"), b738("AUA")];
        let pick_all = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| {
                    pick_model(&candidates, PickSimilarStrategy::Random, |_| None, &mut rng)
                        .map(|m| m.model_string)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(pick_all(42), pick_all(42));
    }

    #[test]
    fn test_combined_type_default_model() {
        let models = vec![
            a320("AUA"),
            b738("DLH"),
            AircraftModel::new("B738_CC", b738("").aircraft_icao, Livery::color("00FF00")),
        ];
        let default = AircraftModel::new("DEFAULT", AircraftIcaoCode::new("C172"), Livery::default());

        let boeing = RemoteAircraft::new("N1").with_model(b738(""));
        let picked = combined_type_default_model(&models, &boeing, Some(&default), &mut NullSink);
        assert_eq!(picked.unwrap().model_string, "B738_CC");

        let heli = RemoteAircraft::new("N2").with_combined_type("H1T");
        let picked = combined_type_default_model(&models, &heli, Some(&default), &mut NullSink);
        assert_eq!(picked.unwrap().model_string, "DEFAULT");

        let picked = combined_type_default_model(&models, &heli, None, &mut NullSink);
        assert_eq!(picked.unwrap().model_string, "A320_AUA");
        assert!(combined_type_default_model(&[], &heli, None, &mut NullSink).is_none());
    }
}
