//! Dialogue engine - traverses dialogue trees using the shared effect vocabulary.
//!
//! Traversal state is the current node id. A run starts at the tree's root and
//! stops when:
//! 1. the node has no choices,
//! 2. the chosen choice carries `end`,
//! 3. `next` is missing or names an undefined node,
//! 4. the selector declines to pick a choice,
//! 5. the visit bound is reached.

use adventure_rules::{
    ChoiceAction, DialogueNode, NodeId, SceneCatalog, TreeId, WorldState, CREW_FLAG_PREFIX,
};
use serde::{Deserialize, Serialize};

use crate::effect::{Effect, EffectSink};

/// Narration when an interaction names a dialogue tree that does not exist.
pub const NOTHING_TO_SAY: &str = "Nothing to say.";

/// Picks which choice to follow at a node.
pub trait ChoiceSelector {
    /// Index into `node.choices`, or `None` to stop the conversation.
    fn select(&mut self, node_id: &NodeId, node: &DialogueNode, state: &WorldState)
        -> Option<usize>;
}

/// Always takes the first choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl ChoiceSelector for FirstChoice {
    fn select(&mut self, _: &NodeId, node: &DialogueNode, _: &WorldState) -> Option<usize> {
        if node.choices.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

impl<F> ChoiceSelector for F
where
    F: FnMut(&NodeId, &DialogueNode, &WorldState) -> Option<usize>,
{
    fn select(&mut self, node_id: &NodeId, node: &DialogueNode, state: &WorldState) -> Option<usize> {
        self(node_id, node, state)
    }
}

/// Why a dialogue run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The tree id is not in the catalog.
    UnknownTree,
    /// The root id names no node.
    MissingRoot,
    NoChoices,
    Ended,
    /// The chosen choice has no `next`.
    NoNext,
    /// `next` names a node that is not in the tree.
    UnresolvedNext(NodeId),
    /// The selector returned `None` or an index out of range.
    NoSelection,
    VisitLimit,
}

/// Summary of one dialogue run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueOutcome {
    pub tree: TreeId,
    /// Nodes visited, in order.
    pub path: Vec<NodeId>,
    pub termination: Termination,
}

impl DialogueOutcome {
    pub fn nodes_visited(&self) -> usize {
        self.path.len()
    }
}

/// Runs dialogue trees to completion.
pub struct DialogueEngine<'a> {
    catalog: &'a SceneCatalog,
    max_visits: usize,
}

impl<'a> DialogueEngine<'a> {
    pub fn new(catalog: &'a SceneCatalog, max_visits: usize) -> Self {
        Self {
            catalog,
            max_visits,
        }
    }

    /// Traverse a tree, applying every narration and action through `sink`.
    ///
    /// The world is in dialogue mode for the duration of the run and back in
    /// gameplay mode when this returns.
    pub fn run(
        &self,
        tree_id: &TreeId,
        sink: &mut EffectSink<'_>,
        selector: &mut dyn ChoiceSelector,
    ) -> DialogueOutcome {
        let Some(tree) = self.catalog.dialogue(tree_id.as_str()) else {
            tracing::warn!("Dialogue tree '{}' not found", tree_id);
            sink.narrate(NOTHING_TO_SAY);
            return DialogueOutcome {
                tree: tree_id.clone(),
                path: Vec::new(),
                termination: Termination::UnknownTree,
            };
        };

        tracing::info!("Entering dialogue '{}'", tree_id);
        sink.apply(Effect::EnterDialogue(tree_id.clone()));

        let mut path = Vec::new();
        let mut current = tree.root.clone();

        let termination = loop {
            let Some(node) = tree.node(current.as_str()) else {
                break if path.is_empty() {
                    Termination::MissingRoot
                } else {
                    Termination::UnresolvedNext(current)
                };
            };
            if path.len() >= self.max_visits {
                tracing::warn!(
                    "Dialogue '{}' stopped after {} node visits",
                    tree_id,
                    self.max_visits
                );
                break Termination::VisitLimit;
            }
            path.push(current.clone());
            sink.narrate(node.text.as_str());

            if node.choices.is_empty() {
                break Termination::NoChoices;
            }
            let choice = selector
                .select(&current, node, sink.state())
                .and_then(|index| node.choices.get(index));
            let Some(choice) = choice else {
                break Termination::NoSelection;
            };

            sink.narrate(choice.text.as_str());
            if let Some(directive) = &choice.action {
                apply_action(directive, sink);
            }
            if choice.end {
                break Termination::Ended;
            }
            match &choice.next {
                Some(next) => current = next.clone(),
                None => break Termination::NoNext,
            }
        };

        sink.apply(Effect::ExitDialogue(tree_id.clone()));
        tracing::info!(
            "Left dialogue '{}' after {} nodes ({:?})",
            tree_id,
            path.len(),
            termination
        );

        DialogueOutcome {
            tree: tree_id.clone(),
            path,
            termination,
        }
    }
}

/// Apply a choice directive. Unknown shapes are ignored.
fn apply_action(directive: &str, sink: &mut EffectSink<'_>) {
    match ChoiceAction::parse(directive) {
        Some(ChoiceAction::Recruit(name)) => {
            sink.apply(Effect::SetFlag(format!("{}{}", CREW_FLAG_PREFIX, name)));
            sink.narrate(format!("{} joins your crew!", name));
        }
        None => tracing::debug!("Ignoring unknown dialogue action '{}'", directive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::NarrationLog;
    use adventure_rules::{Choice, DialogueTree, SceneId};

    fn recruit_tree() -> DialogueTree {
        DialogueTree::new("n1")
            .with_node(
                "n1",
                DialogueNode::new("Hello").with_choice(
                    Choice::new("Join?")
                        .with_action("recruit_bob")
                        .with_next("n2"),
                ),
            )
            .with_node("n2", DialogueNode::new("Welcome aboard"))
    }

    fn run_tree(
        catalog: &SceneCatalog,
        tree: &str,
        max_visits: usize,
        selector: &mut dyn ChoiceSelector,
    ) -> (DialogueOutcome, WorldState, NarrationLog, Vec<Effect>) {
        let mut state = WorldState::new(SceneId::new("melee_docks"));
        let mut log = NarrationLog::new();
        let mut sink = EffectSink::new(&mut state, &mut log, 0);
        let outcome = DialogueEngine::new(catalog, max_visits).run(&TreeId::new(tree), &mut sink, selector);
        let effects = sink.into_effects();
        (outcome, state, log, effects)
    }

    #[test]
    fn test_recruit_tree_visits_two_nodes() {
        let catalog = SceneCatalog::new().with_dialogue("bob", recruit_tree());
        let (outcome, state, log, _) = run_tree(&catalog, "bob", 64, &mut FirstChoice);

        assert_eq!(outcome.nodes_visited(), 2);
        assert_eq!(outcome.termination, Termination::NoChoices);
        assert!(state.check_flag("crew_bob"));
        assert_eq!(state.crew_count(), 1);
        assert!(state.mode.is_gameplay());
        assert_eq!(
            log.snapshot(),
            vec!["Join?", "bob joins your crew!", "Welcome aboard"]
        );
    }

    #[test]
    fn test_mode_brackets_the_run() {
        let catalog = SceneCatalog::new().with_dialogue("bob", recruit_tree());
        let (_, _, _, effects) = run_tree(&catalog, "bob", 64, &mut FirstChoice);

        assert_eq!(effects.first(), Some(&Effect::EnterDialogue(TreeId::new("bob"))));
        assert_eq!(effects.last(), Some(&Effect::ExitDialogue(TreeId::new("bob"))));
    }

    #[test]
    fn test_cycle_stops_at_visit_bound() {
        let tree = DialogueTree::new("a")
            .with_node("a", DialogueNode::new("Ping").with_choice(Choice::new("...").with_next("b")))
            .with_node("b", DialogueNode::new("Pong").with_choice(Choice::new("...").with_next("a")));
        let catalog = SceneCatalog::new().with_dialogue("loop", tree);

        let (outcome, state, _, _) = run_tree(&catalog, "loop", 10, &mut FirstChoice);
        assert_eq!(outcome.termination, Termination::VisitLimit);
        assert_eq!(outcome.nodes_visited(), 10);
        assert!(state.mode.is_gameplay());
    }

    #[test]
    fn test_end_choice_stops() {
        let tree = DialogueTree::new("n1")
            .with_node(
                "n1",
                DialogueNode::new("Leaving?").with_choice(Choice::new("Bye").ending().with_next("n2")),
            )
            .with_node("n2", DialogueNode::new("Never reached"));
        let catalog = SceneCatalog::new().with_dialogue("t", tree);

        let (outcome, _, log, _) = run_tree(&catalog, "t", 64, &mut FirstChoice);
        assert_eq!(outcome.termination, Termination::Ended);
        assert_eq!(outcome.nodes_visited(), 1);
        assert_eq!(log.latest(), Some("Bye"));
    }

    #[test]
    fn test_dangling_next_terminates_normally() {
        let tree = DialogueTree::new("n1").with_node(
            "n1",
            DialogueNode::new("Hm").with_choice(Choice::new("Go on").with_next("missing")),
        );
        let catalog = SceneCatalog::new().with_dialogue("t", tree);

        let (outcome, _, _, _) = run_tree(&catalog, "t", 64, &mut FirstChoice);
        assert_eq!(
            outcome.termination,
            Termination::UnresolvedNext(NodeId::new("missing"))
        );
        assert_eq!(outcome.nodes_visited(), 1);

        let tree = DialogueTree::new("n1")
            .with_node("n1", DialogueNode::new("Hm").with_choice(Choice::new("Ok")));
        let catalog = SceneCatalog::new().with_dialogue("t", tree);
        let (outcome, _, _, _) = run_tree(&catalog, "t", 64, &mut FirstChoice);
        assert_eq!(outcome.termination, Termination::NoNext);
    }

    #[test]
    fn test_unknown_tree_and_missing_root() {
        let catalog = SceneCatalog::new().with_dialogue("rootless", DialogueTree::new("nope"));

        let (outcome, state, log, _) = run_tree(&catalog, "ghost", 64, &mut FirstChoice);
        assert_eq!(outcome.termination, Termination::UnknownTree);
        assert_eq!(log.latest(), Some(NOTHING_TO_SAY));
        assert!(state.mode.is_gameplay());

        let (outcome, _, _, _) = run_tree(&catalog, "rootless", 64, &mut FirstChoice);
        assert_eq!(outcome.termination, Termination::MissingRoot);
        assert_eq!(outcome.nodes_visited(), 0);
    }

    #[test]
    fn test_empty_text_lines_are_narrated() {
        let tree = DialogueTree::new("n1").with_node(
            "n1",
            DialogueNode::new("").with_choice(Choice::new("").ending()),
        );
        let catalog = SceneCatalog::new().with_dialogue("quiet", tree);
        let mut state = WorldState::new(SceneId::new("melee_docks"));
        let mut log = NarrationLog::new();
        for line in ["a", "b", "c"] {
            log.push(line);
        }

        let mut sink = EffectSink::new(&mut state, &mut log, 0);
        let outcome =
            DialogueEngine::new(&catalog, 64).run(&TreeId::new("quiet"), &mut sink, &mut FirstChoice);
        assert_eq!(outcome.termination, Termination::Ended);

        assert_eq!(log.snapshot(), vec!["c", "", ""]);
    }

    #[test]
    fn test_unknown_action_ignored() {
        let tree = DialogueTree::new("n1").with_node(
            "n1",
            DialogueNode::new("Psst").with_choice(Choice::new("Bribe").with_action("bribe_guard")),
        );
        let catalog = SceneCatalog::new().with_dialogue("t", tree);

        let (_, state, log, _) = run_tree(&catalog, "t", 64, &mut FirstChoice);
        assert!(state.flags().is_empty());
        assert_eq!(log.snapshot(), vec!["Psst", "Bribe"]);
    }

    #[test]
    fn test_custom_selector() {
        let tree = DialogueTree::new("n1")
            .with_node(
                "n1",
                DialogueNode::new("Pick one")
                    .with_choice(Choice::new("First").with_next("a"))
                    .with_choice(Choice::new("Second").with_next("b")),
            )
            .with_node("a", DialogueNode::new("Took first"))
            .with_node("b", DialogueNode::new("Took second"));
        let catalog = SceneCatalog::new().with_dialogue("t", tree);

        let mut last = |_: &NodeId, node: &DialogueNode, _: &WorldState| node.choices.len().checked_sub(1);
        let (outcome, _, log, _) = run_tree(&catalog, "t", 64, &mut last);
        assert_eq!(outcome.path, vec![NodeId::new("n1"), NodeId::new("b")]);
        assert_eq!(log.latest(), Some("Took second"));

        let mut out_of_range = |_: &NodeId, _: &DialogueNode, _: &WorldState| Some(7);
        let (outcome, _, _, _) = run_tree(&catalog, "t", 64, &mut out_of_range);
        assert_eq!(outcome.termination, Termination::NoSelection);
    }
}
