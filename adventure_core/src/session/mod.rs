//! Session - owns the world and runs one simulation step per input event.
//!
//! Steps run to completion before the next event is handled. The presentation
//! layer reads [`Session::snapshot`] after each step and never writes back.

mod transition;

pub use transition::*;

use adventure_rules::{
    EngineConfig, GameMode, HotspotId, ItemId, Point, SceneCatalog, SceneId, WorldState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::dialogue::{ChoiceSelector, FirstChoice};
use crate::events::{InputEvent, KeyCommand};
use crate::locator::{HotspotLocator, LocateOutcome, VerbGrid};
use crate::narration::NarrationLog;
use crate::resolver::{EffectSummary, InteractionResolver, Resolution};

/// Narration for a hint request in a scene without hints.
pub const NO_HINTS: &str = "No hints yet.";

/// Unique identifier for play sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepReport {
    Quit,
    VerbSelected(String),
    Interaction {
        verb: String,
        hotspot: HotspotId,
        resolution: Resolution,
    },
    /// The click hit an exhausted hotspot.
    Exhausted(HotspotId),
    /// The click hit nothing.
    Missed,
    Hint(String),
    DebugOverlay(bool),
    SceneChanged { from: SceneId, to: SceneId },
    /// The event does not apply in the current mode.
    Ignored,
}

/// Read-only view of everything the presentation layer draws.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationSnapshot {
    pub now_ms: u64,
    pub scene: SceneId,
    pub mode: GameMode,
    pub flags: BTreeMap<String, bool>,
    pub inventory: Vec<ItemId>,
    pub selected_verb: Option<String>,
    pub narration: Vec<String>,
    pub debug_overlay: bool,
    pub crew_count: usize,
    pub transition: Option<TransitionView>,
    pub last_added_item: Option<ItemId>,
    pub inventory_flashed_at_ms: Option<u64>,
    /// True while the inventory highlight should be drawn.
    pub inventory_flash: bool,
    pub room_title_at_ms: u64,
    /// True while the room title should be drawn.
    pub room_title: bool,
}

/// A play session: catalog, world state, narration, and timing.
pub struct Session {
    id: SessionId,
    config: EngineConfig,
    catalog: SceneCatalog,
    state: WorldState,
    narration: NarrationLog,
    verb_grid: VerbGrid,
    clock: Box<dyn Clock>,
    selector: Box<dyn ChoiceSelector>,
    transition: Option<Transition>,
    room_title_at_ms: u64,
    running: bool,
}

impl Session {
    /// Start a session in the configured starting scene, on the system clock.
    pub fn new(config: EngineConfig, catalog: SceneCatalog) -> Self {
        Self::with_clock(config, catalog, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: EngineConfig, catalog: SceneCatalog, clock: Box<dyn Clock>) -> Self {
        let mut state = WorldState::new(config.starting_scene.clone());
        state.debug_overlay = config.debug_overlay;
        let verb_grid = VerbGrid::new(config.verbs.as_slice());
        let room_title_at_ms = clock.now_ms();
        let id = SessionId::new();

        tracing::info!(session = %id, "Session starting in '{}'", state.current_scene());

        Self {
            id,
            config,
            catalog,
            state,
            narration: NarrationLog::new(),
            verb_grid,
            clock,
            selector: Box::new(FirstChoice),
            transition: None,
            room_title_at_ms,
            running: true,
        }
    }

    /// Replace the dialogue choice policy.
    pub fn with_selector(mut self, selector: Box<dyn ChoiceSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn narration(&self) -> &NarrationLog {
        &self.narration
    }

    pub fn verb_grid(&self) -> &VerbGrid {
        &self.verb_grid
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Run one simulation step.
    pub fn handle(&mut self, event: InputEvent) -> StepReport {
        let span = tracing::info_span!("step", session = %self.id);
        let _enter = span.enter();

        match event {
            InputEvent::Quit => {
                tracing::info!("Quit requested");
                self.running = false;
                StepReport::Quit
            }
            InputEvent::Key(KeyCommand::RequestHint) => StepReport::Hint(self.request_hint()),
            InputEvent::Key(KeyCommand::ToggleDebugOverlay) => {
                StepReport::DebugOverlay(self.toggle_debug_overlay())
            }
            InputEvent::Key(KeyCommand::SceneJump(target)) => {
                let target = target.unwrap_or_else(|| self.config.jump_scene.clone());
                self.change_scene(target)
            }
            InputEvent::Click(point) => self.click(point),
        }
    }

    /// A pointer click: verb grid first, then the scene's hotspots.
    pub fn click(&mut self, point: Point) -> StepReport {
        if !self.state.mode.is_gameplay() {
            return StepReport::Ignored;
        }

        if let Some(verb) = self.verb_grid.verb_at(point).map(str::to_string) {
            return self.select_verb(verb);
        }

        let locator = HotspotLocator::new(&self.catalog, &self.config.exhausted_text);
        match locator.locate(point, &self.state, &mut self.narration) {
            LocateOutcome::Target(hotspot) => {
                let verb = self
                    .state
                    .selected_verb
                    .clone()
                    .unwrap_or_else(|| self.config.default_verb.clone());
                self.interact(&verb, hotspot)
            }
            LocateOutcome::Exhausted { hotspot, .. } => StepReport::Exhausted(hotspot),
            LocateOutcome::Miss => StepReport::Missed,
        }
    }

    pub fn select_verb(&mut self, verb: String) -> StepReport {
        tracing::debug!("Selected verb '{}'", verb);
        self.narration.push(format!("Selected: {}", verb));
        self.state.selected_verb = Some(verb.clone());
        StepReport::VerbSelected(verb)
    }

    /// Resolve a verb on a hotspot of the current scene.
    pub fn interact(&mut self, verb: &str, hotspot: HotspotId) -> StepReport {
        let now_ms = self.clock.now_ms();
        let resolver = InteractionResolver::new(
            &self.catalog,
            &self.config.exhausted_text,
            self.config.max_dialogue_visits,
        );
        let resolution = resolver.resolve(
            verb,
            &hotspot,
            &mut self.state,
            &mut self.narration,
            now_ms,
            self.selector.as_mut(),
        );
        tracing::debug!(
            "'{}' on '{}' -> {:?} {:?}",
            verb,
            hotspot,
            resolution.outcome,
            EffectSummary::of(&resolution.effects)
        );

        StepReport::Interaction {
            verb: verb.to_string(),
            hotspot,
            resolution,
        }
    }

    /// Narrate the next hint for the current scene, escalating on every call.
    pub fn request_hint(&mut self) -> String {
        let scene = self.state.current_scene().clone();
        let hints = self.catalog.hints_for(scene.as_str());
        let hint = match self.state.next_hint_index(&scene, hints.len()) {
            Some(index) => hints[index].clone(),
            None => NO_HINTS.to_string(),
        };
        tracing::debug!(
            "Hint for '{}' (counter {}): {}",
            scene,
            self.state.hint_progress(&scene),
            hint
        );
        self.narration.push(hint.clone());
        hint
    }

    /// Flip the debug overlay, returning the new value.
    pub fn toggle_debug_overlay(&mut self) -> bool {
        self.state.debug_overlay = !self.state.debug_overlay;
        self.state.debug_overlay
    }

    /// Enter another scene and start its transition effect.
    pub fn change_scene(&mut self, to: SceneId) -> StepReport {
        if self.catalog.scene(to.as_str()).is_none() {
            tracing::warn!("Scene '{}' is not defined; entering it without hotspots", to);
        }
        let now_ms = self.clock.now_ms();
        let from = self.state.set_scene(to.clone());
        self.transition = Some(Transition::new(
            from.clone(),
            to.clone(),
            now_ms,
            self.config.transition_ms,
        ));
        self.room_title_at_ms = now_ms;
        tracing::info!("Scene change '{}' -> '{}'", from, to);

        StepReport::SceneChanged { from, to }
    }

    /// Whether a scene wipe is still playing.
    pub fn transition_active(&self) -> bool {
        let now_ms = self.clock.now_ms();
        self.transition
            .as_ref()
            .is_some_and(|t| t.is_active(now_ms))
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        let now_ms = self.clock.now_ms();
        let inventory_flash = self
            .state
            .inventory_flashed_at_ms()
            .is_some_and(|at| now_ms.saturating_sub(at) < self.config.inventory_flash_ms);

        PresentationSnapshot {
            now_ms,
            scene: self.state.current_scene().clone(),
            mode: self.state.mode.clone(),
            flags: self
                .state
                .flags()
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            inventory: self.state.inventory().to_vec(),
            selected_verb: self.state.selected_verb.clone(),
            narration: self.narration.snapshot(),
            debug_overlay: self.state.debug_overlay,
            crew_count: self.state.crew_count(),
            transition: self
                .transition
                .as_ref()
                .filter(|t| t.is_active(now_ms))
                .map(|t| t.view(now_ms)),
            last_added_item: self.state.last_added_item().cloned(),
            inventory_flashed_at_ms: self.state.inventory_flashed_at_ms(),
            inventory_flash,
            room_title_at_ms: self.room_title_at_ms,
            room_title: now_ms.saturating_sub(self.room_title_at_ms) < self.config.room_title_ms,
        }
    }
}
