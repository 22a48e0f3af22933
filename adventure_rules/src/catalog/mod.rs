//! Scene catalog - the immutable definition data loaded once at startup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

use crate::config::EngineConfig;
use crate::entities::{
    DialogueNode, DialogueTree, Hotspot, HotspotId, ItemId, NodeId, Scene, SceneId, TreeId,
};
use crate::error::CatalogError;
use crate::mechanics::Expr;

/// All definition data: scenes, hints, dialogue trees, and items.
///
/// Nothing here changes after loading; runtime mutations live in
/// [`crate::WorldState`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SceneCatalog {
    pub scenes: HashMap<SceneId, Scene>,
    /// Scene -> hints in escalation order.
    pub hints: HashMap<SceneId, Vec<String>>,
    pub dialogues: HashMap<TreeId, DialogueTree>,
    /// Item display metadata, opaque to the runtime.
    pub items: HashMap<ItemId, Value>,
}

/// A non-fatal problem found in loaded definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    MalformedExpression {
        scene: SceneId,
        hotspot: HotspotId,
        verb: String,
        reason: String,
    },
    UnknownDialogue {
        scene: SceneId,
        hotspot: HotspotId,
        tree: TreeId,
    },
    MissingRoot {
        tree: TreeId,
    },
    DanglingNext {
        tree: TreeId,
        node: String,
        next: String,
    },
    InvertedRect {
        scene: SceneId,
        hotspot: HotspotId,
    },
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogIssue::MalformedExpression {
                scene,
                hotspot,
                verb,
                reason,
            } => write!(
                f,
                "{}/{} {}: requires_expr is malformed ({}) and will always deny",
                scene, hotspot, verb, reason
            ),
            CatalogIssue::UnknownDialogue {
                scene,
                hotspot,
                tree,
            } => write!(f, "{}/{}: unknown dialogue tree '{}'", scene, hotspot, tree),
            CatalogIssue::MissingRoot { tree } => {
                write!(f, "dialogue '{}': root node is not defined", tree)
            }
            CatalogIssue::DanglingNext { tree, node, next } => write!(
                f,
                "dialogue '{}': node '{}' continues to undefined node '{}'",
                tree, node, next
            ),
            CatalogIssue::InvertedRect { scene, hotspot } => {
                write!(f, "{}/{}: rectangle corners are inverted", scene, hotspot)
            }
        }
    }
}

/// Read and parse one JSON definition source.
pub fn read_source<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a source as a JSON object, keeping its key order.
///
/// A missing, unparseable, or non-object source yields `None` with a warning.
fn read_object(path: &Path) -> Option<Map<String, Value>> {
    match read_source(path) {
        Ok(object) => Some(object),
        Err(e) => {
            tracing::warn!("{}; using built-in default", e);
            None
        }
    }
}

/// Parse one definition entry, skipping it with a warning when it does not fit.
fn parse_entry<T: DeserializeOwned>(path: &Path, key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!("{}: skipping '{}': {}", path.display(), key, e);
            None
        }
    }
}

/// Parse each entry of a source object on its own.
fn parse_entries<K, T>(path: &Path, object: Map<String, Value>) -> HashMap<K, T>
where
    K: From<String> + Eq + Hash,
    T: DeserializeOwned,
{
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let entry = parse_entry(path, &key, value)?;
            Some((K::from(key), entry))
        })
        .collect()
}

/// Parse a scene hotspot by hotspot. A hotspot without a usable `rect` is
/// dropped, so it can never be hit.
fn parse_scene(path: &Path, scene_id: &str, value: Value) -> Option<Scene> {
    let Value::Object(mut fields) = value else {
        tracing::warn!("{}: skipping scene '{}': not an object", path.display(), scene_id);
        return None;
    };

    let mut scene = Scene::new();
    match fields.remove("hotspots") {
        None | Some(Value::Null) => {}
        Some(Value::Object(hotspots)) => {
            for (hotspot_id, value) in hotspots {
                let key = format!("{}/{}", scene_id, hotspot_id);
                if let Some(hotspot) = parse_entry::<Hotspot>(path, &key, value) {
                    scene.hotspots.insert(HotspotId::from(hotspot_id), hotspot);
                }
            }
        }
        Some(_) => tracing::warn!(
            "{}: scene '{}' hotspots are not an object; scene has none",
            path.display(),
            scene_id
        ),
    }
    Some(scene)
}

/// Parse a dialogue tree node by node. Keys beside `root` that are not
/// nodes are skipped.
fn parse_tree(path: &Path, tree_id: &str, value: Value) -> Option<DialogueTree> {
    let Value::Object(fields) = value else {
        tracing::warn!("{}: skipping dialogue '{}': not an object", path.display(), tree_id);
        return None;
    };
    let Some(root) = fields.get("root").and_then(Value::as_str) else {
        tracing::warn!("{}: skipping dialogue '{}': no root", path.display(), tree_id);
        return None;
    };

    let mut tree = DialogueTree::new(root);
    for (key, value) in fields {
        if key == "root" {
            continue;
        }
        if !value.is_object() {
            tracing::debug!("{}: dialogue '{}' ignores key '{}'", path.display(), tree_id, key);
            continue;
        }
        let entry = format!("{}/{}", tree_id, key);
        if let Some(node) = parse_entry::<DialogueNode>(path, &entry, value) {
            tree.nodes.insert(NodeId::from(key), node);
        }
    }
    Some(tree)
}

impl SceneCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The data used when no scene definitions are available: the starting
    /// scene with no hotspots.
    pub fn fallback(starting_scene: &SceneId) -> Self {
        let mut catalog = Self::new();
        catalog.scenes.insert(starting_scene.clone(), Scene::new());
        catalog
    }

    /// Load every definition source named by the configuration.
    ///
    /// Never fails: each missing or unreadable source is replaced by its
    /// empty default and reported at `warn`. Inside a readable source, every
    /// scene, hotspot, dialogue tree, node, hint list, and item is parsed on
    /// its own, and a bad entry is skipped with a warning.
    pub fn load(config: &EngineConfig) -> Self {
        let scenes_path = config.scenes_path();
        let scenes: HashMap<SceneId, Scene> = match read_object(&scenes_path) {
            Some(object) => object
                .into_iter()
                .filter_map(|(id, value)| {
                    let scene = parse_scene(&scenes_path, &id, value)?;
                    Some((SceneId::from(id), scene))
                })
                .collect(),
            None => Self::fallback(&config.starting_scene).scenes,
        };

        let dialogues_path = config.dialogues_path();
        let dialogues: HashMap<TreeId, DialogueTree> = read_object(&dialogues_path)
            .map(|object| {
                object
                    .into_iter()
                    .filter_map(|(id, value)| {
                        let tree = parse_tree(&dialogues_path, &id, value)?;
                        Some((TreeId::from(id), tree))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let hints_path = config.hints_path();
        let hints: HashMap<SceneId, Vec<String>> = read_object(&hints_path)
            .map(|object| parse_entries(&hints_path, object))
            .unwrap_or_default();

        let items_path = config.items_path();
        let items: HashMap<ItemId, Value> = read_object(&items_path)
            .map(|object| parse_entries(&items_path, object))
            .unwrap_or_default();

        let catalog = Self {
            scenes,
            hints,
            dialogues,
            items,
        };

        tracing::info!(
            "Loaded {} scenes, {} hint sets, {} dialogues, {} items from {}",
            catalog.scenes.len(),
            catalog.hints.len(),
            catalog.dialogues.len(),
            catalog.items.len(),
            config.data_dir.display()
        );
        for issue in catalog.validate() {
            tracing::warn!("{}", issue);
        }

        catalog
    }

    pub fn with_scene(mut self, id: impl Into<SceneId>, scene: Scene) -> Self {
        self.scenes.insert(id.into(), scene);
        self
    }

    pub fn with_hints(mut self, scene: impl Into<SceneId>, hints: Vec<String>) -> Self {
        self.hints.insert(scene.into(), hints);
        self
    }

    pub fn with_dialogue(mut self, id: impl Into<TreeId>, tree: DialogueTree) -> Self {
        self.dialogues.insert(id.into(), tree);
        self
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn dialogue(&self, id: &str) -> Option<&DialogueTree> {
        self.dialogues.get(id)
    }

    /// Hints for a scene; empty when none are defined.
    pub fn hints_for(&self, scene: &str) -> &[String] {
        self.hints.get(scene).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn item(&self, id: &str) -> Option<&Value> {
        self.items.get(id)
    }

    /// Report definitions that will silently degrade at runtime.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        let mut scene_ids: Vec<_> = self.scenes.keys().collect();
        scene_ids.sort();
        for scene_id in scene_ids {
            let scene = &self.scenes[scene_id];
            for (hotspot_id, hotspot) in &scene.hotspots {
                if hotspot.rect.is_inverted() {
                    issues.push(CatalogIssue::InvertedRect {
                        scene: scene_id.clone(),
                        hotspot: hotspot_id.clone(),
                    });
                }

                let mut verbs: Vec<_> = hotspot.interactions.iter().collect();
                verbs.sort_by(|a, b| a.0.cmp(b.0));
                for (verb, interaction) in verbs {
                    if let Some(source) = &interaction.requires_expr {
                        if let Err(e) = Expr::parse(source) {
                            issues.push(CatalogIssue::MalformedExpression {
                                scene: scene_id.clone(),
                                hotspot: hotspot_id.clone(),
                                verb: verb.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                    if let Some(tree) = &interaction.dialogue_tree {
                        if !self.dialogues.contains_key(tree) {
                            issues.push(CatalogIssue::UnknownDialogue {
                                scene: scene_id.clone(),
                                hotspot: hotspot_id.clone(),
                                tree: tree.clone(),
                            });
                        }
                    }
                }
            }
        }

        let mut tree_ids: Vec<_> = self.dialogues.keys().collect();
        tree_ids.sort();
        for tree_id in tree_ids {
            let tree = &self.dialogues[tree_id];
            if tree.root_node().is_none() {
                issues.push(CatalogIssue::MissingRoot {
                    tree: tree_id.clone(),
                });
            }

            let mut nodes: Vec<_> = tree.nodes.iter().collect();
            nodes.sort_by(|a, b| a.0.cmp(b.0));
            for (node_id, node) in nodes {
                for choice in &node.choices {
                    if let Some(next) = &choice.next {
                        if !choice.end && !tree.nodes.contains_key(next) {
                            issues.push(CatalogIssue::DanglingNext {
                                tree: tree_id.clone(),
                                node: node_id.to_string(),
                                next: next.to_string(),
                            });
                        }
                    }
                }
            }
        }

        issues
    }
}
