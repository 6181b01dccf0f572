//! Matching behavior through the public API.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use model_matcher::catalog::categories::CategoryIndex;
use model_matcher::db::memory::{DbSnapshot, InMemoryDbCache};
use model_matcher::matching::log::{MatchingLog, MatchingMessages, NullSink};
use model_matcher::matching::reduction::{
    reduce_by_aircraft_or_family, reduce_by_airline, reduce_by_combined_type,
    reduce_by_livery_and_aircraft, reduce_by_manufacturer, reduce_by_military_flag,
    reduce_by_model_string, reduce_by_vtol_flag, ReductionPipeline,
};
use model_matcher::{
    AircraftCategory, AircraftIcaoCode, AircraftMatcher, AircraftModel, AirlineIcaoCode, Livery,
    MatchMethod, MatcherSetup, MatchingAlgorithm, MatchingMode, MatchingModeFlag, RemoteAircraft,
    Simulator,
};

const ALGORITHMS: [MatchingAlgorithm; 3] = [
    MatchingAlgorithm::StepwiseReduce,
    MatchingAlgorithm::ScoreBased,
    MatchingAlgorithm::ReducePlusScore,
];

fn model(ms: &str, designator: &str, combined_type: &str, airline: &str) -> AircraftModel {
    AircraftModel::new(
        ms,
        AircraftIcaoCode::new(designator).with_combined_type(combined_type),
        Livery::standard(&AirlineIcaoCode::new(airline)),
    )
}

fn model_set() -> Vec<AircraftModel> {
    vec![
        model("A320_AUA", "A320", "L2J", "AUA"),
        model("B738_DLH", "B738", "L2J", "DLH"),
        model("A320_DLH", "A320", "L2J", "DLH"),
        model("A321_DLH", "A321", "L2J", "DLH"),
        model("B744_BAW", "B744", "L4J", "BAW"),
        model("C172_N", "C172", "L1P", ""),
        model("EC35_RESCUE", "EC35", "H2T", ""),
    ]
}

fn matcher_with(algorithm: MatchingAlgorithm, models: Vec<AircraftModel>) -> AircraftMatcher {
    let matcher = AircraftMatcher::new(Arc::new(InMemoryDbCache::empty()))
        .with_setup(MatcherSetup::new(algorithm));
    matcher.set_model_set(models, Simulator::Msfs, true, MatchingLog::Nothing, None);
    matcher
}

fn remotes() -> Vec<RemoteAircraft> {
    vec![
        RemoteAircraft::from_network("AUA1", "A320", "AUA", "", ""),
        RemoteAircraft::from_network("DLH2", "A321", "DLH", "", ""),
        RemoteAircraft::from_network("SWR3", "A320", "SWR", "", "").with_combined_type("L2J"),
        RemoteAircraft::from_network("N123", "C182", "", "", "").with_combined_type("L1P"),
        RemoteAircraft::from_network("CHX4", "EC45", "", "", "").with_combined_type("H2T"),
        RemoteAircraft::from_network("BAW5", "B748", "BAW", "_CC101010", ""),
        RemoteAircraft::from_network("XX6", "", "", "", ""),
    ]
}

#[test]
fn test_exact_model_string_wins_for_every_algorithm() {
    for algorithm in ALGORITHMS {
        let matcher = matcher_with(algorithm, model_set());
        for m in model_set() {
            // deliberately conflicting ICAO data
            let remote = RemoteAircraft::from_network("TEST1", "B744", "BAW", "", &m.model_string.to_lowercase());
            let result = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
            assert_eq!(result.model.model_string, m.model_string, "{algorithm}");
            assert_eq!(result.method, MatchMethod::ExactModelString);
        }
    }
}

#[test]
fn test_aircraft_and_livery_scenario() {
    let models = vec![
        model("A320_AUA", "A320", "L2J", "AUA"),
        model("B738_DLH", "B738", "L2J", "DLH"),
    ];
    let mut setup = MatcherSetup::new(MatchingAlgorithm::ReducePlusScore);
    setup.mode = MatchingMode::from_flags(&[
        MatchingModeFlag::ByIcaoOrderAircraftFirst,
        MatchingModeFlag::ByLivery,
    ]);
    let matcher = AircraftMatcher::new(Arc::new(InMemoryDbCache::empty())).with_setup(setup);
    matcher.set_model_set(models, Simulator::Msfs, true, MatchingLog::Nothing, None);

    let remote = RemoteAircraft::from_network("AUA123", "A320", "AUA", "", "");
    let result = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
    assert_eq!(result.model.model_string, "A320_AUA");
}

#[test]
fn test_glider_without_gliders_uses_l1p() {
    let categories = vec![
        AircraftCategory::new("glider", &[2]),
        AircraftCategory::new("sailplane", &[2, 1]),
        AircraftCategory::new("motor glider", &[2, 2]),
    ];
    let db = InMemoryDbCache::new(DbSnapshot {
        version: "1.0.0".to_string(),
        categories: categories.clone(),
        ..DbSnapshot::default()
    });
    let matcher = AircraftMatcher::new(Arc::new(db))
        .with_setup(MatcherSetup::new(MatchingAlgorithm::ReducePlusScore));
    matcher.set_model_set(
        vec![
            model("A320_AUA", "A320", "L2J", "AUA"),
            model("C172_N", "C172", "L1P", ""),
        ],
        Simulator::Msfs,
        true,
        MatchingLog::Nothing,
        None,
    );

    let remote = RemoteAircraft::new("DKXYZ").with_category(categories[1].clone());
    let mut log = MatchingMessages::new();
    let result = matcher.get_closest_match(&remote, MatchingLog::All, Some(&mut log));
    assert_eq!(result.model.model_string, "C172_N");
    assert!(log.contains("No gliders, reduced to L1P"));
}

#[test]
fn test_by_order_is_deterministic() {
    for algorithm in ALGORITHMS {
        let matcher = matcher_with(algorithm, model_set());
        for remote in remotes() {
            let first = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
            for _ in 0..10 {
                let again = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
                assert_eq!(again.model, first.model, "{algorithm} {}", remote.callsign);
            }
        }
    }
}

#[test]
fn test_every_match_has_a_model() {
    for algorithm in ALGORITHMS {
        let matcher = matcher_with(algorithm, model_set());
        for remote in remotes() {
            let result = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
            if remote.aircraft_icao().has_designator() {
                assert!(result.model.has_model_string(), "{algorithm} {}", remote.callsign);
            }
            assert_eq!(result.model.callsign.as_deref(), Some(remote.callsign.as_str()));
        }
    }
}

#[test]
fn test_restore_after_disable() {
    let matcher = matcher_with(MatchingAlgorithm::StepwiseReduce, model_set());
    let before: Vec<String> = matcher
        .setup()
        .mode
        .iter()
        .map(|f| f.description().to_string())
        .collect();
    let active = |m: &AircraftMatcher| {
        let mut keys: Vec<String> = model_matcher::matching::ModelSetProvider::model_set(m)
            .models()
            .iter()
            .map(|m| m.model_string.clone())
            .collect();
        keys.sort();
        keys
    };
    let original = active(&matcher);

    let set = model_set();
    matcher.disable_models_for_matching(&set[1..3], false);
    matcher.disable_models_for_matching(&set[4..5], true);
    matcher.disable_models_for_matching(&set[0..2], false);
    assert_eq!(matcher.disabled_models_for_matching().len(), 2);

    matcher.restore_disabled_models();
    assert_eq!(active(&matcher), original);
    assert!(matcher.disabled_models_for_matching().is_empty());
    // setup untouched by model set changes
    let after: Vec<String> = matcher
        .setup()
        .mode
        .iter()
        .map(|f| f.description().to_string())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_reordered_model_set_is_noop() {
    let matcher = matcher_with(MatchingAlgorithm::ReducePlusScore, model_set());
    let mut reordered = model_set();
    reordered.rotate_left(3);
    assert_eq!(
        matcher.set_model_set(reordered.clone(), Simulator::Msfs, false, MatchingLog::Nothing, None),
        0
    );
    // another simulator is a change
    assert_eq!(
        matcher.set_model_set(reordered, Simulator::Xplane, false, MatchingLog::Nothing, None),
        7
    );
}

#[test]
fn test_filters_never_reduce_to_zero() {
    let setup = MatcherSetup::new(MatchingAlgorithm::StepwiseReduce);
    let mut log = NullSink;
    let single = vec![model("C172_N", "C172", "L1P", "")];

    for candidates in [model_set(), single] {
        for remote in remotes() {
            let c = || candidates.clone();
            let results = [
                reduce_by_model_string(&remote, c(), &mut log),
                reduce_by_livery_and_aircraft(&remote, c(), &mut log),
                reduce_by_aircraft_or_family(&remote, c(), &setup, &mut log),
                reduce_by_combined_type(&remote, c(), &setup, &mut log),
                reduce_by_manufacturer(&remote, c(), &mut log),
                reduce_by_military_flag(&remote, true, c(), &setup, &mut log),
                reduce_by_military_flag(&remote, false, c(), &setup, &mut log),
                reduce_by_vtol_flag(&remote, c(), &mut log),
                reduce_by_airline(&remote, c(), &setup, &mut log),
            ];
            for (list, reduced) in results {
                assert!(!list.is_empty(), "{}", remote.callsign);
                if !reduced {
                    assert_eq!(list.len(), candidates.len());
                }
            }

            let categories = CategoryIndex::new(&[AircraftCategory::new("glider", &[2])]);
            let result = ReductionPipeline::new(&setup, &categories).run(&remote, &candidates, &mut log);
            assert!(!result.candidates.is_empty());
        }
    }
}

#[test]
fn test_categories_without_remote_category_unchanged() {
    let categories = CategoryIndex::new(&[
        AircraftCategory::new("glider", &[2]),
        AircraftCategory::new("sailplane", &[2, 1]),
    ]);
    let setup = MatcherSetup::new(MatchingAlgorithm::StepwiseReduce);
    let remote = RemoteAircraft::from_network("AUA1", "A320", "AUA", "", "");
    let (list, reduced) =
        categories.reduce_by_categories(model_set(), &model_set(), &setup, &remote, &mut NullSink);
    assert!(!reduced);
    assert_eq!(list, model_set());
}

#[test]
fn test_mode_toggles_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let flags: Vec<MatchingModeFlag> = MatchingModeFlag::ALL
            .into_iter()
            .filter(|_| rng.random_bool(0.5))
            .collect();
        let mode = MatchingMode::from_flags(&flags);
        let expected = if mode.contains(MatchingModeFlag::ModelFailoverIfNoModelCanBeAdded) {
            mode.with(MatchingModeFlag::ModelSetRemoveFailedModel)
        } else {
            mode
        };
        assert_eq!(MatchingMode::from_toggles(&mode.toggles()), expected);
    }

    let mut toggles = MatchingMode::NONE.toggles();
    toggles.model_failover = true;
    let mode = MatchingMode::from_toggles(&toggles);
    assert!(mode.toggles().model_set_remove_failed);
}

fn lufthansa_db() -> InMemoryDbCache {
    let dlh = AirlineIcaoCode::new("DLH")
        .with_name("Lufthansa")
        .with_telephony("LUFTHANSA")
        .with_db_key(10);
    InMemoryDbCache::new(DbSnapshot {
        version: "1.0.0".to_string(),
        aircraft_icaos: vec![
            AircraftIcaoCode::new("A320")
                .with_combined_type("L2J")
                .with_manufacturer("Airbus")
                .with_family("A320")
                .with_db_key(1),
            AircraftIcaoCode::new("A321")
                .with_combined_type("L2J")
                .with_manufacturer("Airbus")
                .with_family("A320")
                .with_db_key(2),
        ],
        liveries: vec![Livery::standard(&dlh).with_db_key(20)],
        airlines: vec![dlh],
        ..DbSnapshot::default()
    })
}

#[test]
fn test_reverse_lookup_then_match() {
    let matcher = AircraftMatcher::new(Arc::new(lufthansa_db()))
        .with_setup(MatcherSetup::new(MatchingAlgorithm::ReducePlusScore));
    matcher.set_model_set(model_set(), Simulator::Msfs, true, MatchingLog::Nothing, None);

    // airline only known from the callsign
    let remote = RemoteAircraft::from_network("DLH456", "a321", "", "", "");
    let mut log = MatchingMessages::new();
    let resolved = matcher.reverse_lookup_model(&remote, MatchingLog::All, Some(&mut log));
    assert_eq!(resolved.airline().designator, "DLH");
    assert_eq!(resolved.combined_type(), Some("L2J"));
    assert!(log.contains("derived from callsign"));

    let remote = remote.with_model(resolved);
    let result = matcher.get_closest_match(&remote, MatchingLog::Nothing, None);
    assert_eq!(result.model.model_string, "A321_DLH");
}

#[test]
fn test_parallel_matching_is_consistent() {
    let matcher = Arc::new(matcher_with(MatchingAlgorithm::ReducePlusScore, model_set()));
    let expected: Vec<String> = remotes()
        .iter()
        .map(|r| matcher.get_closest_match(r, MatchingLog::Nothing, None).model.model_string)
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let matcher = Arc::clone(&matcher);
            std::thread::spawn(move || {
                remotes()
                    .iter()
                    .map(|r| matcher.get_closest_match(r, MatchingLog::Nothing, None).model.model_string)
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }

    let stats = model_matcher::matching::StatisticsProvider::current_statistics(&*matcher, false);
    let aua = stats.entries.iter().find(|e| e.airline_icao == "AUA").unwrap();
    assert_eq!(aua.count, 9);
}

#[test]
fn test_non_ascii_callsign_still_matches() {
    let matcher = AircraftMatcher::new(Arc::new(lufthansa_db()))
        .with_setup(MatcherSetup::new(MatchingAlgorithm::ReducePlusScore));
    matcher.set_model_set(model_set(), Simulator::Msfs, true, MatchingLog::Nothing, None);

    for callsign in ["DLÄ123", "ÄÄ12", "DL1"] {
        let remote = RemoteAircraft::from_network(callsign, "A321", "", "", "");
        let resolved = matcher.reverse_lookup_model(&remote, MatchingLog::Nothing, None);
        assert!(!resolved.airline().has_designator(), "{callsign}");

        let result = matcher.get_closest_match(&remote.with_model(resolved), MatchingLog::Nothing, None);
        assert_eq!(result.model.aircraft_icao.designator, "A321", "{callsign}");
        assert_eq!(result.model.callsign.as_deref(), Some(callsign));
    }
}
