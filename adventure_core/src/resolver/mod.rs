//! Interaction resolver - turns a (verb, hotspot) pair into applied effects.
//!
//! Resolution steps:
//! 1. **Lookup**: find the interaction for the verb, or fall back to the
//!    exhausted-text narration
//! 2. **Gate**: run the condition evaluator; a denial narrates and stops
//! 3. **Apply**: narration, item, exhaustion, flag, recruitment, then dialogue
//!
//! Nothing is applied before the gate passes, and every effect of one
//! resolution is applied before `resolve` returns.

use adventure_rules::{
    ConditionEvaluator, Denial, ExhaustedText, HotspotId, SceneCatalog, WorldState,
};
use serde::{Deserialize, Serialize};

use crate::dialogue::{ChoiceSelector, DialogueEngine, DialogueOutcome};
use crate::effect::{Effect, EffectSink};
use crate::narration::NarrationLog;

/// Narration for an interaction whose requirements are not met.
pub const NOT_READY: &str = "Not yet ready for that.";

/// How a resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The interaction ran; `dialogue` is set if it started a conversation.
    Applied { dialogue: Option<DialogueOutcome> },
    /// No interaction for this verb; the exhausted text was narrated.
    Fallback,
    /// Requirements failed; only the refusal was narrated.
    Denied(Denial),
    /// The hotspot is not part of the current scene.
    UnknownHotspot,
}

/// Everything one resolution did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    pub effects: Vec<Effect>,
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Applied { .. })
    }
}

/// Summary of an effect list for presentation or logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSummary {
    pub narrated: usize,
    pub items_added: usize,
    pub flags_set: usize,
    pub hotspots_exhausted: usize,
    pub dialogues: usize,
}

impl EffectSummary {
    pub fn of(effects: &[Effect]) -> Self {
        let mut summary = Self::default();
        for effect in effects {
            match effect {
                Effect::Narrate(_) => summary.narrated += 1,
                Effect::AddItem(_) => summary.items_added += 1,
                Effect::SetFlag(_) => summary.flags_set += 1,
                Effect::ExhaustHotspot { .. } => summary.hotspots_exhausted += 1,
                Effect::EnterDialogue(_) => summary.dialogues += 1,
                Effect::ExitDialogue(_) => {}
            }
        }
        summary
    }
}

/// Resolves verbs against hotspots of the current scene.
pub struct InteractionResolver<'a> {
    catalog: &'a SceneCatalog,
    exhausted_text: &'a ExhaustedText,
    evaluator: ConditionEvaluator,
    dialogue: DialogueEngine<'a>,
}

impl<'a> InteractionResolver<'a> {
    pub fn new(
        catalog: &'a SceneCatalog,
        exhausted_text: &'a ExhaustedText,
        max_dialogue_visits: usize,
    ) -> Self {
        Self {
            catalog,
            exhausted_text,
            evaluator: ConditionEvaluator::new(),
            dialogue: DialogueEngine::new(catalog, max_dialogue_visits),
        }
    }

    /// Resolve and apply a verb on a hotspot, returning the applied effects.
    pub fn resolve(
        &self,
        verb: &str,
        hotspot: &HotspotId,
        state: &mut WorldState,
        narration: &mut NarrationLog,
        now_ms: u64,
        selector: &mut dyn ChoiceSelector,
    ) -> Resolution {
        let mut sink = EffectSink::new(state, narration, now_ms);
        let outcome = self.resolve_into(verb, hotspot, &mut sink, selector);
        Resolution {
            outcome,
            effects: sink.into_effects(),
        }
    }

    /// Resolve into an existing sink.
    pub fn resolve_into(
        &self,
        verb: &str,
        hotspot_id: &HotspotId,
        sink: &mut EffectSink<'_>,
        selector: &mut dyn ChoiceSelector,
    ) -> ResolutionOutcome {
        let scene_id = sink.state().current_scene().clone();
        let fallback_text = self.exhausted_text.text_for(hotspot_id.as_str());

        let Some(hotspot) = self
            .catalog
            .scene(scene_id.as_str())
            .and_then(|scene| scene.hotspot(hotspot_id.as_str()))
        else {
            tracing::debug!("No hotspot '{}' in scene '{}'", hotspot_id, scene_id);
            sink.narrate(fallback_text);
            return ResolutionOutcome::UnknownHotspot;
        };

        let Some(interaction) = hotspot.interaction(verb) else {
            tracing::debug!("No '{}' interaction on '{}'", verb, hotspot_id);
            sink.narrate(fallback_text);
            return ResolutionOutcome::Fallback;
        };

        if let Err(denial) = self.evaluator.check(interaction, sink.state()) {
            tracing::debug!("'{}' on '{}' denied: {:?}", verb, hotspot_id, denial);
            sink.narrate(NOT_READY);
            return ResolutionOutcome::Denied(denial);
        }

        tracing::debug!("Resolving '{}' on '{}'", verb, hotspot_id);
        sink.narrate(interaction.text.as_str());

        if let Some(item) = &interaction.add_item {
            sink.apply(Effect::AddItem(item.clone()));
        }
        if interaction.exhausted {
            sink.apply(Effect::ExhaustHotspot {
                scene: scene_id.clone(),
                hotspot: hotspot_id.clone(),
            });
        }
        if let Some(flag) = &interaction.state_change {
            sink.apply(Effect::SetFlag(flag.clone()));
        }
        if interaction.is_recruit() {
            sink.narrate(format!("Recruited {}!", hotspot_id));
        }
        let dialogue = interaction
            .dialogue_tree
            .as_ref()
            .map(|tree| self.dialogue.run(tree, sink, selector));

        ResolutionOutcome::Applied { dialogue }
    }
}
