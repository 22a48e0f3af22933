//! The effect vocabulary shared by interaction resolution and dialogue.

use adventure_rules::{GameMode, HotspotId, ItemId, SceneId, TreeId, WorldState};
use serde::{Deserialize, Serialize};

use crate::narration::NarrationLog;

/// One state change produced by a simulation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Narrate(String),
    AddItem(ItemId),
    ExhaustHotspot { scene: SceneId, hotspot: HotspotId },
    SetFlag(String),
    EnterDialogue(TreeId),
    ExitDialogue(TreeId),
}

/// Applies effects to the world state and narration log, in order, and keeps
/// a record of what was applied.
pub struct EffectSink<'a> {
    state: &'a mut WorldState,
    narration: &'a mut NarrationLog,
    now_ms: u64,
    applied: Vec<Effect>,
}

impl<'a> EffectSink<'a> {
    pub fn new(state: &'a mut WorldState, narration: &'a mut NarrationLog, now_ms: u64) -> Self {
        Self {
            state,
            narration,
            now_ms,
            applied: Vec::new(),
        }
    }

    /// Read access to the state as it stands after the effects so far.
    pub fn state(&self) -> &WorldState {
        self.state
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn apply(&mut self, effect: Effect) {
        match &effect {
            Effect::Narrate(text) => self.narration.push(text.clone()),
            Effect::AddItem(item) => self.state.add_item_at(item.clone(), self.now_ms),
            Effect::ExhaustHotspot { scene, hotspot } => {
                self.state.mark_exhausted(scene.clone(), hotspot.clone())
            }
            Effect::SetFlag(flag) => self.state.set_flag(flag.clone()),
            Effect::EnterDialogue(tree) => {
                self.state.mode = GameMode::Dialogue { tree: tree.clone() }
            }
            Effect::ExitDialogue(_) => self.state.mode = GameMode::Gameplay,
        }
        self.applied.push(effect);
    }

    /// Narrate a line. Empty lines are pushed like any other.
    pub fn narrate(&mut self, text: impl Into<String>) {
        self.apply(Effect::Narrate(text.into()));
    }

    pub fn applied(&self) -> &[Effect] {
        &self.applied
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.applied
    }
}
