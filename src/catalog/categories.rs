//! Aircraft category tree and category based reduction.
//!
//! The index is built from a flat category list. Three subtrees are known
//! by the name of their root: `glider`, `wing military` and
//! `rotor military`. Each subtree is every category sharing the root's first
//! level, sorted by level.
//!
//! Only gliders get a dedicated reduction, because most model sets have few
//! or no glider models and a jet is an absurd substitute for a sailplane.

use super::model_list::{model_strings_summary, ModelFinder};
use crate::core::icao::{AircraftCategory, AircraftIcaoCode};
use crate::core::model::AircraftModel;
use crate::core::remote::RemoteAircraft;
use crate::matching::log::{log_details, LogCategory, LogSink};
use crate::setup::{MatcherSetup, MatchingModeFlag};
use crate::utils::validation::GLIDER_DESIGNATOR;

pub const GLIDER_ROOT: &str = "glider";
pub const MILITARY_WING_ROOT: &str = "wing military";
pub const MILITARY_ROTOR_ROOT: &str = "rotor military";

/// Designators and families used as glider substitutes
pub const GLIDER_SUBSTITUTE_DESIGNATORS: [&str; 3] = ["UHEL", "GLID", "ULAC"];

/// Combined type used as glider substitute of last resort
pub const GLIDER_SUBSTITUTE_COMBINED_TYPE: &str = "L1P";

#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    all: Vec<AircraftCategory>,
    gliders: Vec<AircraftCategory>,
    military_wing: Vec<AircraftCategory>,
    military_rotor: Vec<AircraftCategory>,
}

impl CategoryIndex {
    pub fn new(categories: &[AircraftCategory]) -> Self {
        let mut index = Self::default();
        index.set_categories(categories);
        index
    }

    /// Rebuild from a flat category list
    pub fn set_categories(&mut self, categories: &[AircraftCategory]) {
        let mut all = categories.to_vec();
        all.sort_by(|a, b| a.level.cmp(&b.level));
        self.gliders = Self::subtree(&all, GLIDER_ROOT);
        self.military_wing = Self::subtree(&all, MILITARY_WING_ROOT);
        self.military_rotor = Self::subtree(&all, MILITARY_ROTOR_ROOT);
        self.all = all;

        tracing::debug!(
            categories = self.all.len(),
            gliders = self.gliders.len(),
            military_wing = self.military_wing.len(),
            military_rotor = self.military_rotor.len(),
            "Category index built"
        );
    }

    /// All categories sharing the first level of the root named `root_name`.
    /// `all` is sorted by level, so the result is too.
    fn subtree(all: &[AircraftCategory], root_name: &str) -> Vec<AircraftCategory> {
        let Some(first_level) = all
            .iter()
            .find(|c| c.is_first_level() && c.matches_name(root_name))
            .and_then(AircraftCategory::first_level)
        else {
            return Vec::new();
        };
        all.iter()
            .filter(|c| c.first_level() == Some(first_level))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn categories(&self) -> &[AircraftCategory] {
        &self.all
    }

    pub fn glider_categories(&self) -> &[AircraftCategory] {
        &self.gliders
    }

    /// First level of the glider subtree
    pub fn glider_first_level(&self) -> Option<u32> {
        self.gliders.first().and_then(AircraftCategory::first_level)
    }

    /// Glider designator, or a category within the glider subtree
    pub fn is_glider(&self, icao: &AircraftIcaoCode) -> bool {
        if icao.designator == GLIDER_DESIGNATOR {
            return true;
        }
        match (self.glider_first_level(), &icao.category) {
            (Some(first_level), Some(category)) => category.first_level() == Some(first_level),
            _ => false,
        }
    }

    /// Category within the military wing or rotor subtree
    pub fn is_military_category(&self, category: &AircraftCategory) -> bool {
        [&self.military_wing, &self.military_rotor]
            .iter()
            .filter_map(|tree| tree.first().and_then(AircraftCategory::first_level))
            .any(|first_level| category.first_level() == Some(first_level))
    }

    /// Same depth and subtree, different parent
    pub fn find_in_parallel_branch(
        tree: &[AircraftCategory],
        category: &AircraftCategory,
    ) -> Vec<AircraftCategory> {
        tree.iter()
            .filter(|c| {
                c.depth() == category.depth()
                    && c.first_level() == category.first_level()
                    && !c.is_same_category(category)
                    && !c.is_sibling(category)
            })
            .cloned()
            .collect()
    }

    /// Same parent, excluding the category itself
    pub fn find_siblings(
        tree: &[AircraftCategory],
        category: &AircraftCategory,
    ) -> Vec<AircraftCategory> {
        tree.iter()
            .filter(|c| c.is_sibling(category))
            .cloned()
            .collect()
    }

    /// Reduce candidates by category. Returns the list and whether it was reduced.
    ///
    /// A no-op unless category matching is enabled, categories are loaded
    /// and the remote aircraft carries a category. A glider is searched in
    /// the whole model set, in this order:
    ///
    /// 1. models of exactly the remote category
    /// 2. models of a parallel branch
    /// 3. models of sibling categories
    /// 4. all glider models
    /// 5. no glider models at all: substitutes among the candidates by
    ///    designator or family (`UHEL`, `GLID`, `ULAC`), else by combined type `L1P`
    pub fn reduce_by_categories(
        &self,
        candidates: Vec<AircraftModel>,
        model_set: &[AircraftModel],
        setup: &MatcherSetup,
        remote: &RemoteAircraft,
        log: &mut dyn LogSink,
    ) -> (Vec<AircraftModel>, bool) {
        let callsign = remote.callsign.as_str();
        if !setup.use_category_matching() {
            log_details(log, callsign, LogCategory::Matching, "Disabled category matching");
            return (candidates, false);
        }
        if self.is_empty() {
            log_details(log, callsign, LogCategory::Matching, "No categories loaded, category matching skipped");
            return (candidates, false);
        }
        let Some(category) = remote.category() else {
            log_details(log, callsign, LogCategory::Matching, "No category in remote aircraft");
            return (candidates, false);
        };

        log_details(
            log,
            callsign,
            LogCategory::Matching,
            format!("Remote aircraft has category '{category}'"),
        );

        let glider_first_level = match self.glider_first_level() {
            Some(first_level)
                if setup.mode.contains(MatchingModeFlag::ByCategoryGlider)
                    && self.is_glider(remote.aircraft_icao()) =>
            {
                first_level
            }
            _ => return (candidates, false),
        };

        let gliders = ModelFinder::new(model_set).find_by_first_level(glider_first_level);
        if !gliders.is_empty() {
            return self.reduce_to_gliders(gliders, model_set, category, callsign, log);
        }

        log_details(
            log,
            callsign,
            LogCategory::Matching,
            format!(
                "No glider category '{}' in set",
                self.gliders
                    .first()
                    .map(AircraftCategory::level_and_name)
                    .unwrap_or_default()
            ),
        );

        let finder = ModelFinder::new(&candidates);
        let substitutes = finder.find_by_designator_or_family_patterns(&GLIDER_SUBSTITUTE_DESIGNATORS);
        if !substitutes.is_empty() {
            let colored = ModelFinder::new(&substitutes).find_color_liveries();
            let substitutes = if colored.is_empty() { substitutes } else { colored };
            log_details(
                log,
                callsign,
                LogCategory::Summary,
                format!(
                    "No gliders, reduced to {} models by '{}'",
                    substitutes.len(),
                    GLIDER_SUBSTITUTE_DESIGNATORS.join(", ")
                ),
            );
            return (substitutes, true);
        }

        let substitutes = finder.find_by_combined_type(GLIDER_SUBSTITUTE_COMBINED_TYPE);
        if !substitutes.is_empty() {
            log_details(
                log,
                callsign,
                LogCategory::Summary,
                format!(
                    "No gliders, reduced to {GLIDER_SUBSTITUTE_COMBINED_TYPE} models: {} (avoid absurd matchings)",
                    substitutes.len()
                ),
            );
            return (substitutes, true);
        }

        (candidates, false)
    }

    fn reduce_to_gliders(
        &self,
        gliders: Vec<AircraftModel>,
        model_set: &[AircraftModel],
        category: &AircraftCategory,
        callsign: &str,
        log: &mut dyn LogSink,
    ) -> (Vec<AircraftModel>, bool) {
        let finder = ModelFinder::new(&gliders);

        let same = finder.find_by_category(category);
        if !same.is_empty() {
            log_details(
                log,
                callsign,
                LogCategory::Summary,
                format!("Reduced to {} models by category '{category}'", same.len()),
            );
            return (same, true);
        }

        let parallel = Self::find_in_parallel_branch(&self.gliders, category);
        if !parallel.is_empty() {
            let models = finder.find_by_categories(&parallel);
            if !models.is_empty() {
                log_details(
                    log,
                    callsign,
                    LogCategory::Summary,
                    format!(
                        "Reduced to {} parallel branch models of '{}' by categories: {}",
                        models.len(),
                        category.level_and_name(),
                        levels_string(&parallel)
                    ),
                );
                return (models, true);
            }
        }

        let siblings = Self::find_siblings(&self.gliders, category);
        if !siblings.is_empty() {
            let models = ModelFinder::new(model_set).find_by_categories(&siblings);
            if !models.is_empty() {
                log_details(
                    log,
                    callsign,
                    LogCategory::Summary,
                    format!(
                        "Reduced to {} sibling models of '{}' by categories: {}",
                        models.len(),
                        category.level_and_name(),
                        levels_string(&siblings)
                    ),
                );
                return (models, true);
            }
        }

        log_details(
            log,
            callsign,
            LogCategory::Summary,
            format!(
                "Reduced to {} models by glider category: {}",
                gliders.len(),
                model_strings_summary(&gliders, 5)
            ),
        );
        (gliders, true)
    }
}

fn levels_string(categories: &[AircraftCategory]) -> String {
    categories
        .iter()
        .map(AircraftCategory::level_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icao::{AirlineIcaoCode, Livery};
    use crate::matching::log::MatchingMessages;

    fn categories() -> Vec<AircraftCategory> {
        vec![
            AircraftCategory::new("military", &[3]),
            AircraftCategory::new("wing military", &[4]),
            AircraftCategory::new("glider", &[2]),
            AircraftCategory::new("sailplane", &[2, 1]),
            AircraftCategory::new("motor glider", &[2, 2]),
            AircraftCategory::new("open class", &[2, 1, 1]),
            AircraftCategory::new("standard class", &[2, 1, 2]),
            AircraftCategory::new("touring", &[2, 2, 1]),
        ]
    }

    fn cat(level: &[u32]) -> AircraftCategory {
        categories()
            .into_iter()
            .find(|c| c.level == level)
            .unwrap()
    }

    fn model(ms: &str, icao: &str, ct: &str, category: Option<AircraftCategory>) -> AircraftModel {
        let mut icao = AircraftIcaoCode::new(icao).with_combined_type(ct);
        icao.category = category;
        AircraftModel::new(ms, icao, Livery::standard(&AirlineIcaoCode::default()))
    }

    fn remote_glider(level: &[u32]) -> RemoteAircraft {
        RemoteAircraft::new("DGLID").with_category(cat(level))
    }

    fn reduce(
        set: &[AircraftModel],
        remote: &RemoteAircraft,
    ) -> (Vec<AircraftModel>, bool, MatchingMessages) {
        let index = CategoryIndex::new(&categories());
        let mut log = MatchingMessages::new();
        let (models, reduced) =
            index.reduce_by_categories(set.to_vec(), set, &MatcherSetup::default(), remote, &mut log);
        (models, reduced, log)
    }

    #[test]
    fn test_subtrees() {
        let index = CategoryIndex::new(&categories());
        assert_eq!(index.glider_first_level(), Some(2));
        assert_eq!(index.glider_categories().len(), 6);
        assert_eq!(index.glider_categories()[0].name, "glider");
        assert!(index.is_military_category(&AircraftCategory::new("fighter", &[4, 1])));
        assert!(!index.is_military_category(&cat(&[2, 1])));
    }

    #[test]
    fn test_is_glider() {
        let index = CategoryIndex::new(&categories());
        assert!(index.is_glider(&AircraftIcaoCode::new("GLID")));
        assert!(index.is_glider(&AircraftIcaoCode::new("DG80").with_category(cat(&[2, 2]))));
        assert!(!index.is_glider(&AircraftIcaoCode::new("A320")));
        assert!(!CategoryIndex::default().is_glider(&AircraftIcaoCode::new("DG80").with_category(cat(&[2]))));
    }

    #[test]
    fn test_relations() {
        let index = CategoryIndex::new(&categories());
        let tree = index.glider_categories();
        let open = cat(&[2, 1, 1]);
        let siblings = CategoryIndex::find_siblings(tree, &open);
        assert_eq!(siblings, vec![cat(&[2, 1, 2])]);
        let parallel = CategoryIndex::find_in_parallel_branch(tree, &open);
        assert_eq!(parallel, vec![cat(&[2, 2, 1])]);
    }

    #[test]
    fn test_no_category_unchanged() {
        let set = vec![model("A320", "A320", "L2J", None)];
        let (models, reduced, log) = reduce(&set, &RemoteAircraft::new("DLH1"));
        assert_eq!(models, set);
        assert!(!reduced);
        assert!(log.contains("No category"));
    }

    #[test]
    fn test_exact_category_wins() {
        let set = vec![
            model("ASK21", "AS21", "G0P", Some(cat(&[2, 1, 2]))),
            model("LS8", "LS8", "G0P", Some(cat(&[2, 1, 1]))),
            model("A320", "A320", "L2J", None),
        ];
        let (models, reduced, _) = reduce(&set, &remote_glider(&[2, 1, 1]));
        assert!(reduced);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_string, "LS8");
    }

    #[test]
    fn test_parallel_branch_before_siblings() {
        let set = vec![
            model("STD", "AS21", "G0P", Some(cat(&[2, 1, 2]))),
            model("TOURING", "SF25", "G1P", Some(cat(&[2, 2, 1]))),
        ];
        let (models, reduced, log) = reduce(&set, &remote_glider(&[2, 1, 1]));
        assert!(reduced);
        assert_eq!(models[0].model_string, "TOURING");
        assert!(log.contains("parallel branch"));
    }

    #[test]
    fn test_siblings() {
        let set = vec![
            model("STD", "AS21", "G0P", Some(cat(&[2, 1, 2]))),
            model("A320", "A320", "L2J", None),
        ];
        let (models, reduced, log) = reduce(&set, &remote_glider(&[2, 1, 1]));
        assert!(reduced);
        assert_eq!(models[0].model_string, "STD");
        assert!(log.contains("sibling"));
    }

    #[test]
    fn test_whole_glider_subtree() {
        let set = vec![
            model("SAILPLANE", "GLID", "G0P", Some(cat(&[2, 1]))),
            model("A320", "A320", "L2J", None),
        ];
        let (models, reduced, _) = reduce(&set, &remote_glider(&[2, 2, 1]));
        assert!(reduced);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_string, "SAILPLANE");
    }

    #[test]
    fn test_no_gliders_substitute_by_designator() {
        let mut ultralight = model("ULAC_RED", "ULAC", "L1P", None);
        ultralight.livery = Livery::color("FF0000");
        let set = vec![
            model("C172", "C172", "L1P", None),
            model("ULAC_STD", "ULAC", "L1P", None),
            ultralight,
        ];
        let (models, reduced, _) = reduce(&set, &remote_glider(&[2, 1]));
        assert!(reduced);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_string, "ULAC_RED");
    }

    #[test]
    fn test_no_gliders_substitute_by_combined_type() {
        let set = vec![
            model("B738", "B738", "L2J", None),
            model("C172", "C172", "L1P", None),
        ];
        let (models, reduced, log) = reduce(&set, &remote_glider(&[2, 1]));
        assert!(reduced);
        assert_eq!(models[0].model_string, "C172");
        assert!(log.contains("No gliders, reduced to L1P"));
    }

    #[test]
    fn test_no_substitute_unchanged() {
        let set = vec![model("B738", "B738", "L2J", None)];
        let (models, reduced, _) = reduce(&set, &remote_glider(&[2, 1]));
        assert!(!reduced);
        assert_eq!(models, set);
    }
}
