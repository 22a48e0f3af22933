//! World state management - the mutable runtime state of one play session.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::entities::{HotspotId, ItemId, SceneId, TreeId};

/// Prefix of the flags that record recruited crew members.
pub const CREW_FLAG_PREFIX: &str = "crew_";

/// What the simulation is currently doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Gameplay,
    /// A dialogue tree is being traversed.
    Dialogue { tree: TreeId },
}

impl GameMode {
    pub fn is_gameplay(&self) -> bool {
        matches!(self, GameMode::Gameplay)
    }
}

/// The complete mutable state of the game world.
///
/// Flags and inventory only grow, and a hotspot once exhausted stays exhausted.
/// The definition catalog never changes; per-hotspot exhaustion is kept here as
/// an overlay keyed by `(scene, hotspot)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    current_scene: SceneId,

    /// Named boolean facts. Absent means false.
    flags: HashMap<String, bool>,

    /// Held items in pickup order, duplicates allowed.
    inventory: Vec<ItemId>,

    /// Number of hints requested so far, per scene.
    hint_progress: HashMap<SceneId, u32>,

    exhausted: HashSet<(SceneId, HotspotId)>,

    /// Most recently added item, for the inventory highlight.
    last_added_item: Option<ItemId>,
    inventory_flashed_at_ms: Option<u64>,

    /// Verb picked from the verb grid, if any.
    pub selected_verb: Option<String>,

    pub mode: GameMode,

    /// Whether the presentation layer draws hotspot outlines.
    pub debug_overlay: bool,
}

impl WorldState {
    /// Create an empty world state in the given scene.
    pub fn new(starting_scene: SceneId) -> Self {
        Self {
            current_scene: starting_scene,
            flags: HashMap::new(),
            inventory: Vec::new(),
            hint_progress: HashMap::new(),
            exhausted: HashSet::new(),
            last_added_item: None,
            inventory_flashed_at_ms: None,
            selected_verb: None,
            mode: GameMode::Gameplay,
            debug_overlay: false,
        }
    }

    pub fn current_scene(&self) -> &SceneId {
        &self.current_scene
    }

    /// Move to another scene. Returns the scene that was left.
    pub fn set_scene(&mut self, scene: SceneId) -> SceneId {
        std::mem::replace(&mut self.current_scene, scene)
    }

    /// Set a flag to true.
    pub fn set_flag(&mut self, name: impl Into<String>) {
        self.flags.insert(name.into(), true);
    }

    /// Read a flag. Absent flags are false.
    pub fn check_flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &HashMap<String, bool> {
        &self.flags
    }

    /// Append an item; duplicates are kept.
    pub fn add_item(&mut self, item: ItemId) {
        self.last_added_item = Some(item.clone());
        self.inventory.push(item);
    }

    /// Append an item and remember when, for the highlight effect.
    pub fn add_item_at(&mut self, item: ItemId, now_ms: u64) {
        self.add_item(item);
        self.inventory_flashed_at_ms = Some(now_ms);
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held.as_str() == item)
    }

    pub fn inventory(&self) -> &[ItemId] {
        &self.inventory
    }

    pub fn last_added_item(&self) -> Option<&ItemId> {
        self.last_added_item.as_ref()
    }

    pub fn inventory_flashed_at_ms(&self) -> Option<u64> {
        self.inventory_flashed_at_ms
    }

    /// Number of recruited crew members.
    pub fn crew_count(&self) -> usize {
        self.flags
            .iter()
            .filter(|(name, set)| **set && name.starts_with(CREW_FLAG_PREFIX))
            .count()
    }

    pub fn is_exhausted(&self, scene: &SceneId, hotspot: &HotspotId) -> bool {
        self.exhausted.contains(&(scene.clone(), hotspot.clone()))
    }

    pub fn mark_exhausted(&mut self, scene: SceneId, hotspot: HotspotId) {
        self.exhausted.insert((scene, hotspot));
    }

    /// Hints requested so far in a scene.
    pub fn hint_progress(&self, scene: &SceneId) -> u32 {
        self.hint_progress.get(scene).copied().unwrap_or(0)
    }

    /// Pick the next hint index for a scene and advance its counter.
    ///
    /// Returns `None` when the scene has no hints at all.
    pub fn next_hint_index(&mut self, scene: &SceneId, hint_count: usize) -> Option<usize> {
        if hint_count == 0 {
            return None;
        }
        let counter = self.hint_progress.entry(scene.clone()).or_insert(0);
        let index = *counter as usize % hint_count;
        *counter = index as u32 + 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WorldState {
        WorldState::new(SceneId::new("melee_docks"))
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = state();
        assert_eq!(state.current_scene().as_str(), "melee_docks");
        assert!(state.inventory().is_empty());
        assert!(state.flags().is_empty());
        assert!(state.mode.is_gameplay());
        assert!(state.last_added_item().is_none());
    }

    #[test]
    fn test_flags_default_false() {
        let mut state = state();
        assert!(!state.check_flag("crate_moved"));

        state.set_flag("crate_moved");
        assert!(state.check_flag("crate_moved"));
    }

    #[test]
    fn test_inventory_keeps_duplicates_in_order() {
        let mut state = state();
        state.add_item(ItemId::new("rope"));
        state.add_item(ItemId::new("grog"));
        state.add_item(ItemId::new("rope"));

        let items: Vec<_> = state.inventory().iter().map(|i| i.as_str()).collect();
        assert_eq!(items, vec!["rope", "grog", "rope"]);
        assert!(state.has_item("grog"));
        assert!(!state.has_item("hook"));
        assert_eq!(state.last_added_item().map(|i| i.as_str()), Some("rope"));
    }

    #[test]
    fn test_add_item_at_records_flash() {
        let mut state = state();
        state.add_item_at(ItemId::new("rope"), 1234);
        assert_eq!(state.inventory_flashed_at_ms(), Some(1234));
    }

    #[test]
    fn test_crew_count() {
        let mut state = state();
        state.set_flag("crew_bob");
        state.set_flag("crew_carla");
        state.set_flag("crate_moved");
        assert_eq!(state.crew_count(), 2);
    }

    #[test]
    fn test_exhaustion_overlay_is_per_scene() {
        let mut state = state();
        let docks = SceneId::new("melee_docks");
        let bar = SceneId::new("scumm_bar");
        let crate_id = HotspotId::new("crate");

        state.mark_exhausted(docks.clone(), crate_id.clone());
        assert!(state.is_exhausted(&docks, &crate_id));
        assert!(!state.is_exhausted(&bar, &crate_id));

        state.mark_exhausted(docks.clone(), crate_id.clone());
        assert!(state.is_exhausted(&docks, &crate_id));
    }

    #[test]
    fn test_hint_escalation_wraps() {
        let mut state = state();
        let docks = SceneId::new("melee_docks");

        let picks: Vec<_> = (0..5)
            .map(|_| state.next_hint_index(&docks, 3).unwrap())
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1]);
        assert_eq!(state.hint_progress(&docks), 2);

        assert_eq!(state.next_hint_index(&docks, 0), None);
    }

    #[test]
    fn test_set_scene_returns_previous() {
        let mut state = state();
        let previous = state.set_scene(SceneId::new("scumm_bar"));
        assert_eq!(previous.as_str(), "melee_docks");
        assert_eq!(state.current_scene().as_str(), "scumm_bar");
    }
}
