//! Screen hit testing: the verb grid and scene hotspots.

use adventure_rules::{ExhaustedText, HotspotId, Point, SceneCatalog, WorldState};

use crate::narration::NarrationLog;

/// Result of testing a point against the current scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    /// An interactable hotspot.
    Target(HotspotId),
    /// The first matching hotspot is exhausted; `text` is its exhausted narration.
    Exhausted { hotspot: HotspotId, text: String },
    Miss,
}

/// Maps screen points to hotspots of the current scene.
///
/// Hotspots are tested in definition order and the first match wins.
/// Invisible hotspots are skipped as if absent; an exhausted hotspot stops the
/// search without yielding a target.
pub struct HotspotLocator<'a> {
    catalog: &'a SceneCatalog,
    exhausted_text: &'a ExhaustedText,
}

impl<'a> HotspotLocator<'a> {
    pub fn new(catalog: &'a SceneCatalog, exhausted_text: &'a ExhaustedText) -> Self {
        Self {
            catalog,
            exhausted_text,
        }
    }

    /// Test a point without side effects.
    pub fn hit_test(&self, point: Point, state: &WorldState) -> LocateOutcome {
        let scene_id = state.current_scene();
        let Some(scene) = self.catalog.scene(scene_id.as_str()) else {
            return LocateOutcome::Miss;
        };

        for (id, hotspot) in &scene.hotspots {
            if !hotspot.rect.contains(point) {
                continue;
            }
            if let Some(flag) = &hotspot.visible_if {
                if !state.check_flag(flag) {
                    continue;
                }
            }
            if hotspot.exhausted || state.is_exhausted(scene_id, id) {
                return LocateOutcome::Exhausted {
                    hotspot: id.clone(),
                    text: self.exhausted_text.text_for(id.as_str()).to_string(),
                };
            }
            return LocateOutcome::Target(id.clone());
        }

        LocateOutcome::Miss
    }

    /// Find the hotspot under a point, narrating the exhausted text when the
    /// hit hotspot has nothing left to give.
    pub fn locate(
        &self,
        point: Point,
        state: &WorldState,
        narration: &mut NarrationLog,
    ) -> LocateOutcome {
        let outcome = self.hit_test(point, state);
        if let LocateOutcome::Exhausted { hotspot, text } = &outcome {
            tracing::debug!("Hotspot '{}' is exhausted", hotspot);
            narration.push(text.as_str());
        }
        outcome
    }
}

/// One cell of the verb grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbButton {
    pub verb: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl VerbButton {
    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, point: Point) -> bool {
        self.x <= point.x
            && point.x < self.x + self.width
            && self.y <= point.y
            && point.y < self.y + self.height
    }
}

/// The verb selector, laid out three verbs per row.
#[derive(Debug, Clone, Default)]
pub struct VerbGrid {
    buttons: Vec<VerbButton>,
}

impl VerbGrid {
    pub const COLUMNS: i32 = 3;
    pub const ORIGIN_X: i32 = 20;
    pub const ORIGIN_Y: i32 = 580;
    pub const COLUMN_PITCH: i32 = 110;
    pub const ROW_PITCH: i32 = 40;
    pub const BUTTON_WIDTH: i32 = 100;
    pub const BUTTON_HEIGHT: i32 = 30;

    pub fn new<S: AsRef<str>>(verbs: &[S]) -> Self {
        let buttons = verbs
            .iter()
            .enumerate()
            .map(|(i, verb)| {
                let i = i as i32;
                VerbButton {
                    verb: verb.as_ref().to_string(),
                    x: Self::ORIGIN_X + (i % Self::COLUMNS) * Self::COLUMN_PITCH,
                    y: Self::ORIGIN_Y + (i / Self::COLUMNS) * Self::ROW_PITCH,
                    width: Self::BUTTON_WIDTH,
                    height: Self::BUTTON_HEIGHT,
                }
            })
            .collect();
        Self { buttons }
    }

    pub fn verb_at(&self, point: Point) -> Option<&str> {
        self.buttons
            .iter()
            .find(|button| button.contains(point))
            .map(|button| button.verb.as_str())
    }

    pub fn buttons(&self) -> &[VerbButton] {
        &self.buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_rules::{Hotspot, Rect, Scene, SceneId, DEFAULT_VERBS};

    fn catalog() -> SceneCatalog {
        let scene = Scene::new()
            .with_hotspot("secret_door", Hotspot::new(Rect::new(0, 0, 100, 100)).with_visible_if("map_read"))
            .with_hotspot("seagull", Hotspot::new(Rect::new(0, 0, 50, 50)))
            .with_hotspot("pier", Hotspot::new(Rect::new(0, 0, 200, 200)));
        SceneCatalog::new().with_scene("melee_docks", scene)
    }

    fn state() -> WorldState {
        WorldState::new(SceneId::new("melee_docks"))
    }

    #[test]
    fn test_first_match_wins_in_definition_order() {
        let catalog = catalog();
        let policy = ExhaustedText::default();
        let locator = HotspotLocator::new(&catalog, &policy);

        // secret_door is invisible, seagull is next in order
        assert_eq!(
            locator.hit_test(Point::new(10, 10), &state()),
            LocateOutcome::Target(HotspotId::new("seagull"))
        );
        assert_eq!(
            locator.hit_test(Point::new(150, 150), &state()),
            LocateOutcome::Target(HotspotId::new("pier"))
        );
        assert_eq!(locator.hit_test(Point::new(300, 300), &state()), LocateOutcome::Miss);
    }

    #[test]
    fn test_visible_if_flag_reveals_hotspot() {
        let catalog = catalog();
        let policy = ExhaustedText::default();
        let locator = HotspotLocator::new(&catalog, &policy);
        let mut state = state();
        let mut log = NarrationLog::new();

        state.set_flag("map_read");
        assert_eq!(
            locator.locate(Point::new(10, 10), &state, &mut log),
            LocateOutcome::Target(HotspotId::new("secret_door"))
        );
        assert!(log.is_empty());
        assert_eq!(
            locator.hit_test(Point::new(10, 10), &state),
            LocateOutcome::Target(HotspotId::new("secret_door"))
        );
    }

    #[test]
    fn test_exhausted_hotspot_narrates_every_time() {
        let catalog = catalog();
        let policy = ExhaustedText::default();
        let locator = HotspotLocator::new(&catalog, &policy);
        let mut state = state();
        let mut log = NarrationLog::new();

        state.mark_exhausted(SceneId::new("melee_docks"), HotspotId::new("seagull"));
        for _ in 0..5 {
            assert_eq!(
                locator.locate(Point::new(10, 10), &state, &mut log),
                LocateOutcome::Exhausted {
                    hotspot: HotspotId::new("seagull"),
                    text: "The seagull ignores you now.".to_string(),
                }
            );
            assert_eq!(log.latest(), Some("The seagull ignores you now."));
        }
        assert_eq!(log.len(), 3);

        // Exhaustion stops the search; the pier underneath is not returned
        assert!(matches!(
            locator.hit_test(Point::new(10, 10), &state),
            LocateOutcome::Exhausted { .. }
        ));
    }

    #[test]
    fn test_exhausted_in_definition_data() {
        let mut hotspot = Hotspot::new(Rect::new(0, 0, 10, 10));
        hotspot.exhausted = true;
        let catalog =
            SceneCatalog::new().with_scene("melee_docks", Scene::new().with_hotspot("crate", hotspot));
        let policy = ExhaustedText::default();
        let locator = HotspotLocator::new(&catalog, &policy);

        assert_eq!(
            locator.hit_test(Point::new(5, 5), &state()),
            LocateOutcome::Exhausted {
                hotspot: HotspotId::new("crate"),
                text: "I've done that.".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_scene_misses() {
        let catalog = catalog();
        let policy = ExhaustedText::default();
        let locator = HotspotLocator::new(&catalog, &policy);
        let state = WorldState::new(SceneId::new("nowhere"));
        assert_eq!(locator.hit_test(Point::new(10, 10), &state), LocateOutcome::Miss);
    }

    #[test]
    fn test_verb_grid_layout() {
        let grid = VerbGrid::new(&DEFAULT_VERBS[..]);
        assert_eq!(grid.buttons().len(), 12);

        assert_eq!(grid.verb_at(Point::new(20, 580)), Some("GIVE"));
        assert_eq!(grid.verb_at(Point::new(130, 580)), Some("OPEN"));
        assert_eq!(grid.verb_at(Point::new(25, 625)), Some("PICK UP"));
        assert_eq!(grid.verb_at(Point::new(250, 705)), Some("BUREAUCRATIZE"));

        // Right edge and gaps are outside
        assert_eq!(grid.verb_at(Point::new(120, 585)), None);
        assert_eq!(grid.verb_at(Point::new(25, 612)), None);
        assert_eq!(grid.verb_at(Point::new(500, 300)), None);
    }
}
