//! Dialogue tree definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::NodeId;

/// A graph of narration nodes connected by choices.
///
/// The source format keeps the root pointer next to the nodes:
/// `{ "root": "n1", "n1": { ... }, "n2": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTree {
    pub root: NodeId,
    #[serde(flatten)]
    pub nodes: HashMap<NodeId, DialogueNode>,
}

impl DialogueTree {
    pub fn new(root: impl Into<NodeId>) -> Self {
        Self {
            root: root.into(),
            nodes: HashMap::new(),
        }
    }

    pub fn with_node(mut self, id: impl Into<NodeId>, node: DialogueNode) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    pub fn root_node(&self) -> Option<&DialogueNode> {
        self.node(self.root.as_str())
    }
}

/// One line of dialogue and the choices that follow it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DialogueNode {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub choices: Vec<Choice>,
}

impl DialogueNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// A reply the player can give at a dialogue node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Choice {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub text: String,
    /// Directive such as `recruit_<name>`.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub next: Option<NodeId>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub end: bool,
}

impl Choice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_next(mut self, next: impl Into<NodeId>) -> Self {
        self.next = Some(next.into());
        self
    }

    pub fn ending(mut self) -> Self {
        self.end = true;
        self
    }
}

/// A parsed choice directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceAction {
    /// `recruit_<name>`: sets `crew_<name>`.
    Recruit(String),
}

impl ChoiceAction {
    /// Parse a directive. Unknown shapes yield `None`.
    pub fn parse(directive: &str) -> Option<Self> {
        match directive.strip_prefix("recruit_") {
            Some(name) if !name.is_empty() => Some(ChoiceAction::Recruit(name.to_string())),
            _ => None,
        }
    }
}
