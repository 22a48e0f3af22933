//! Engine configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::entities::SceneId;
use crate::error::ConfigError;

/// Generic narration for an object that has nothing more to give.
pub const GENERIC_EXHAUSTED_TEXT: &str = "I've done that.";

/// Override key that acts as the global default.
pub const DEFAULT_OVERRIDE_KEY: &str = "DEFAULT";

/// The verbs of the verb grid, in display order.
pub const DEFAULT_VERBS: [&str; 12] = [
    "GIVE",
    "OPEN",
    "CLOSE",
    "PICK UP",
    "LOOK AT",
    "USE",
    "TALK TO",
    "PUSH",
    "PULL",
    "HACK",
    "Q-ENTANGLE",
    "BUREAUCRATIZE",
];

/// Narration used when an object has no interaction left for a verb.
///
/// Lookup order: per-object override, the global default (either `default`
/// or an override keyed `DEFAULT`), then [`GENERIC_EXHAUSTED_TEXT`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhaustedText {
    pub default: Option<String>,
    /// Hotspot id -> bespoke text.
    pub overrides: HashMap<String, String>,
}

impl Default for ExhaustedText {
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert(
            "seagull".to_string(),
            "The seagull ignores you now.".to_string(),
        );
        Self {
            default: None,
            overrides,
        }
    }
}

impl ExhaustedText {
    pub fn text_for(&self, hotspot: &str) -> &str {
        self.overrides
            .get(hotspot)
            .or(self.default.as_ref())
            .or_else(|| self.overrides.get(DEFAULT_OVERRIDE_KEY))
            .map(String::as_str)
            .unwrap_or(GENERIC_EXHAUSTED_TEXT)
    }
}

/// Configuration for the runtime and its definition sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the definition files.
    pub data_dir: PathBuf,
    pub scenes_file: String,
    pub hints_file: String,
    pub dialogues_file: String,
    pub items_file: String,

    pub starting_scene: SceneId,
    /// Destination of the bare `scene-jump` key.
    pub jump_scene: SceneId,

    /// Verb used when a hotspot is clicked with no verb selected.
    pub default_verb: String,
    pub verbs: Vec<String>,

    /// Upper bound on node visits in one dialogue run.
    pub max_dialogue_visits: usize,

    pub transition_ms: u64,
    pub inventory_flash_ms: u64,
    pub room_title_ms: u64,

    pub debug_overlay: bool,

    pub exhausted_text: ExhaustedText,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            scenes_file: "scenes.json".to_string(),
            hints_file: "hints.json".to_string(),
            dialogues_file: "dialogues.json".to_string(),
            items_file: "items.json".to_string(),
            starting_scene: SceneId::new("melee_docks"),
            jump_scene: SceneId::new("scumm_bar"),
            default_verb: "LOOK AT".to_string(),
            verbs: DEFAULT_VERBS.iter().map(|v| v.to_string()).collect(),
            max_dialogue_visits: 64,
            transition_ms: 60,
            inventory_flash_ms: 1000,
            room_title_ms: 2000,
            debug_overlay: true,
            exhausted_text: ExhaustedText::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn scenes_path(&self) -> PathBuf {
        self.data_dir.join(&self.scenes_file)
    }

    pub fn hints_path(&self) -> PathBuf {
        self.data_dir.join(&self.hints_file)
    }

    pub fn dialogues_path(&self) -> PathBuf {
        self.data_dir.join(&self.dialogues_file)
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join(&self.items_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.starting_scene.as_str(), "melee_docks");
        assert_eq!(config.verbs.len(), 12);
        assert_eq!(config.verbs[3], "PICK UP");
        assert_eq!(config.scenes_path(), PathBuf::from("data/scenes.json"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            starting_scene = "lookout_point"
            max_dialogue_visits = 8

            [exhausted_text]
            default = "Nothing new here."
            "#,
        )
        .unwrap();

        assert_eq!(config.starting_scene.as_str(), "lookout_point");
        assert_eq!(config.max_dialogue_visits, 8);
        assert_eq!(config.default_verb, "LOOK AT");
        assert_eq!(config.transition_ms, 60);
        assert_eq!(config.exhausted_text.text_for("anchor"), "Nothing new here.");
    }

    #[test]
    fn test_exhausted_text_lookup_order() {
        let mut policy = ExhaustedText::default();
        assert_eq!(policy.text_for("seagull"), "The seagull ignores you now.");
        assert_eq!(policy.text_for("crate"), GENERIC_EXHAUSTED_TEXT);

        policy
            .overrides
            .insert(DEFAULT_OVERRIDE_KEY.to_string(), "Nothing new here.".to_string());
        assert_eq!(policy.text_for("crate"), "Nothing new here.");
        assert_eq!(policy.text_for("seagull"), "The seagull ignores you now.");

        policy.default = Some("Been there.".to_string());
        assert_eq!(policy.text_for("crate"), "Been there.");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = EngineConfig::load(Path::new("/nonexistent/adventure.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
