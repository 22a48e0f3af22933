//! Scene and hotspot definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{HotspotId, ItemId, Rect, TreeId};

/// A scene: an ordered table of hotspots.
///
/// Hotspot order is the definition order of the source data and decides
/// which hotspot wins when rectangles overlap.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scene {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub hotspots: IndexMap<HotspotId, Hotspot>,
}

impl Scene {
    /// Create a scene without hotspots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hotspot after the existing ones.
    pub fn with_hotspot(mut self, id: impl Into<HotspotId>, hotspot: Hotspot) -> Self {
        self.hotspots.insert(id.into(), hotspot);
        self
    }

    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.get(id)
    }
}

/// A clickable rectangular region representing an interactive object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub rect: Rect,
    #[serde(default)]
    pub name: Option<String>,
    /// Flag that must be true for the hotspot to be visible at all.
    #[serde(default)]
    pub visible_if: Option<String>,
    /// Exhausted from the start. Runtime exhaustion lives in the world state overlay.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub exhausted: bool,
    /// Verb -> interaction.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub interactions: HashMap<String, Interaction>,
}

impl Hotspot {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            name: None,
            visible_if: None,
            exhausted: false,
            interactions: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_visible_if(mut self, flag: impl Into<String>) -> Self {
        self.visible_if = Some(flag.into());
        self
    }

    pub fn with_interaction(mut self, verb: impl Into<String>, interaction: Interaction) -> Self {
        self.interactions.insert(verb.into(), interaction);
        self
    }

    pub fn interaction(&self, verb: &str) -> Option<&Interaction> {
        self.interactions.get(verb)
    }
}

/// Item requirement: a single item or a list that must all be held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirement {
    Item(ItemId),
    All(Vec<ItemId>),
}

impl Requirement {
    /// The required items, in declaration order.
    pub fn items(&self) -> &[ItemId] {
        match self {
            Requirement::Item(item) => std::slice::from_ref(item),
            Requirement::All(items) => items,
        }
    }
}

/// The effect of applying one verb to one hotspot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Interaction {
    /// Narration emitted when the interaction succeeds.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub text: String,
    #[serde(default)]
    pub add_item: Option<ItemId>,
    /// Marks the owning hotspot exhausted once resolved.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub exhausted: bool,
    /// Flag set to true once resolved.
    #[serde(default)]
    pub state_change: Option<String>,
    #[serde(default)]
    pub requires: Option<Requirement>,
    #[serde(default)]
    pub requires_state: Option<String>,
    /// Boolean expression over flags, see [`crate::mechanics::Expr`].
    #[serde(default)]
    pub requires_expr: Option<String>,
    #[serde(default)]
    pub dialogue_tree: Option<TreeId>,
    /// Recruitment marker; any non-null value counts.
    #[serde(default)]
    pub recruit: Option<serde_json::Value>,
}

impl Interaction {
    /// Create an interaction that only narrates.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_item(mut self, item: impl Into<ItemId>) -> Self {
        self.add_item = Some(item.into());
        self
    }

    pub fn exhausting(mut self) -> Self {
        self.exhausted = true;
        self
    }

    pub fn with_state_change(mut self, flag: impl Into<String>) -> Self {
        self.state_change = Some(flag.into());
        self
    }

    pub fn requiring(mut self, requirement: Requirement) -> Self {
        self.requires = Some(requirement);
        self
    }

    pub fn requiring_state(mut self, flag: impl Into<String>) -> Self {
        self.requires_state = Some(flag.into());
        self
    }

    pub fn requiring_expr(mut self, expr: impl Into<String>) -> Self {
        self.requires_expr = Some(expr.into());
        self
    }

    pub fn with_dialogue(mut self, tree: impl Into<TreeId>) -> Self {
        self.dialogue_tree = Some(tree.into());
        self
    }

    pub fn recruiting(mut self) -> Self {
        self.recruit = Some(serde_json::Value::Bool(true));
        self
    }

    pub fn is_recruit(&self) -> bool {
        self.recruit.is_some()
    }
}
