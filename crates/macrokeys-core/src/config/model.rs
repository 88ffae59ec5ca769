// Macrokeys Configuration Model
// Programs, profiles, modifier layers and key bindings

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::migrate;

/// Reserved program key for the fallback context
pub const GLOBAL_PROGRAM: &str = "Global";

/// Reserved profile name present in every program
pub const DEFAULT_PROFILE: &str = "Default";

/// Current schema version of the persisted JSON document
pub const SCHEMA_VERSION: u32 = 2;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Which edge of a key a script fragment fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Down,
    Up,
}

impl Edge {
    /// Identifier token used in synthesized macro names
    pub fn token(self) -> &'static str {
        match self {
            Edge::Down => "Down",
            Edge::Up => "Up",
        }
    }

    /// Key used in the emitted dispatch table
    pub fn slot(self) -> &'static str {
        match self {
            Edge::Down => "down",
            Edge::Up => "up",
        }
    }
}

/// Modifier layer of a profile
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Layer {
    Base,
    Shift,
    Ctrl,
    Alt,
}

impl Layer {
    /// Identifier token used in synthesized macro names
    pub fn token(self) -> &'static str {
        match self {
            Layer::Base => "Base",
            Layer::Shift => "Shift",
            Layer::Ctrl => "Ctrl",
            Layer::Alt => "Alt",
        }
    }

    /// Field name of this layer in the persisted JSON
    pub fn json_field(self) -> &'static str {
        match self {
            Layer::Base => "hotkeys",
            Layer::Shift => "shift_hotkeys",
            Layer::Ctrl => "ctrl_hotkeys",
            Layer::Alt => "alt_hotkeys",
        }
    }
}

/// A down-script/up-script pair attached to one key in one layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default)]
    pub down: String,
    #[serde(default)]
    pub up: String,
}

impl Binding {
    /// A binding with both sides blank is equivalent to "unbound" and
    /// must never be persisted.
    pub fn is_empty(&self) -> bool {
        self.down.trim().is_empty() && self.up.trim().is_empty()
    }

    /// Script fragment for one edge, if non-blank
    pub fn script(&self, edge: Edge) -> Option<&str> {
        let text = match edge {
            Edge::Down => &self.down,
            Edge::Up => &self.up,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text.as_str())
        }
    }
}

/// A named variant of key bindings within a program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Base layer (no modifiers held)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub hotkeys: IndexMap<String, Binding>,

    /// Shift layer
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub shift_hotkeys: IndexMap<String, Binding>,

    /// Ctrl layer (either physical ctrl)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub ctrl_hotkeys: IndexMap<String, Binding>,

    /// Alt layer (either physical alt)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub alt_hotkeys: IndexMap<String, Binding>,
}

impl Profile {
    pub fn layer(&self, layer: Layer) -> &IndexMap<String, Binding> {
        match layer {
            Layer::Base => &self.hotkeys,
            Layer::Shift => &self.shift_hotkeys,
            Layer::Ctrl => &self.ctrl_hotkeys,
            Layer::Alt => &self.alt_hotkeys,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut IndexMap<String, Binding> {
        match layer {
            Layer::Base => &mut self.hotkeys,
            Layer::Shift => &mut self.shift_hotkeys,
            Layer::Ctrl => &mut self.ctrl_hotkeys,
            Layer::Alt => &mut self.alt_hotkeys,
        }
    }

    /// True if some layer binds this key name (case-insensitively)
    pub fn binds_key(&self, key_name: &str) -> bool {
        use strum::IntoEnumIterator;
        Layer::iter().any(|layer| {
            self.layer(layer)
                .keys()
                .any(|bound| bound.eq_ignore_ascii_case(key_name))
        })
    }
}

/// A macro context bound to a window/executable identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// User-facing name; the program key stays immutable
    #[serde(default)]
    pub display_name: String,

    /// Full path of the executable (embedded into the script for
    /// informational purposes only; matching uses `exe_name`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Executable name matched against the foreground window.
    /// Empty only for the Global program.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exe_name: String,

    /// Optional window-title prefix filter
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub window_title: String,

    /// Name of the currently active profile
    #[serde(default = "default_profile_name")]
    pub active_profile: String,

    /// Key name that round-robins the active profile, or empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cycle_hotkey: String,

    /// Profiles in declaration order
    #[serde(default)]
    pub profiles: IndexMap<String, Profile>,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

impl Program {
    /// Fresh program with an empty Default profile
    pub fn new(display_name: &str) -> Self {
        let mut profiles = IndexMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), Profile::default());
        Self {
            display_name: display_name.to_string(),
            path: String::new(),
            exe_name: String::new(),
            window_title: String::new(),
            active_profile: DEFAULT_PROFILE.to_string(),
            cycle_hotkey: String::new(),
            profiles,
        }
    }

    /// Profile following `current` in declaration order, wrapping to
    /// the first after the last. This is the same rotation the
    /// compiled script performs when the cycle hotkey is released.
    pub fn next_profile(&self, current: &str) -> Option<&str> {
        if self.profiles.is_empty() {
            return None;
        }
        let index = self
            .profiles
            .keys()
            .position(|name| name == current)
            .map(|i| (i + 1) % self.profiles.len())
            .unwrap_or(0);
        self.profiles.keys().nth(index).map(String::as_str)
    }
}

/// The full configuration tree: programs in declaration order.
///
/// Declaration order is semantic. Context resolution scans programs
/// in order (first match wins) and profile cycling follows profile
/// declaration order, so both maps are ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub programs: IndexMap<String, Program>,
}

/// On-disk envelope carrying the schema tag
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    version: u32,
    programs: IndexMap<String, Program>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_model()
    }
}

impl Config {
    /// Built-in model used when no configuration can be loaded:
    /// a single Global program with one bound key.
    pub fn default_model() -> Self {
        let mut global = Program::new(GLOBAL_PROGRAM);
        global
            .profiles
            .get_mut(DEFAULT_PROFILE)
            .expect("fresh program has a Default profile")
            .hotkeys
            .insert(
                "F13".to_string(),
                Binding {
                    down: "MsgBox(\"This is the default Global profile.\")".to_string(),
                    up: String::new(),
                },
            );
        let mut programs = IndexMap::new();
        programs.insert(GLOBAL_PROGRAM.to_string(), global);
        Self { programs }
    }

    /// Parse a configuration document, migrating legacy shapes.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let value = migrate::upgrade(value);
        let file: ConfigFile = serde_json::from_value(value)?;
        let mut config = Self {
            programs: file.programs,
        };
        config.normalize();
        Ok(config)
    }

    /// Load a configuration file. A missing or malformed file is not
    /// fatal: the built-in default model is substituted instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => match Self::from_json(&text) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!(
                        "failed to parse {}, using default model: {}",
                        path.display(),
                        err
                    );
                    Self::default_model()
                }
            },
            Err(err) => {
                log::warn!(
                    "failed to read {}, using default model: {}",
                    path.display(),
                    err
                );
                Self::default_model()
            }
        }
    }

    /// Serialize with the current schema tag.
    pub fn to_json(&self) -> String {
        let file = ConfigFile {
            version: SCHEMA_VERSION,
            programs: self.programs.clone(),
        };
        serde_json::to_string_pretty(&file).expect("config serialization is infallible")
    }

    /// Write the configuration back to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_json())?;
        Ok(())
    }

    /// Enforce structural invariants after deserialization: the
    /// Global program and per-program Default profiles exist, active
    /// profile names resolve, and no empty binding survives.
    fn normalize(&mut self) {
        use strum::IntoEnumIterator;

        if !self.programs.contains_key(GLOBAL_PROGRAM) {
            self.programs.shift_insert(
                0,
                GLOBAL_PROGRAM.to_string(),
                Program::new(GLOBAL_PROGRAM),
            );
        }

        for program in self.programs.values_mut() {
            if !program.profiles.contains_key(DEFAULT_PROFILE) {
                program.profiles.shift_insert(
                    0,
                    DEFAULT_PROFILE.to_string(),
                    Profile::default(),
                );
            }
            if !program.profiles.contains_key(&program.active_profile) {
                program.active_profile = DEFAULT_PROFILE.to_string();
            }
            for profile in program.profiles.values_mut() {
                for layer in Layer::iter() {
                    profile.layer_mut(layer).retain(|_, binding| !binding.is_empty());
                }
            }
        }
    }
}
