//! Input events and the commands they resolve to
//!
//! Hosts translate raw device events into [`InputEvent`]s with pointer
//! positions already normalized to device coordinates. Key presses are
//! resolved to a [`Command`] once, through [`KeyBindings`].

use cloudsketch_core::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Platform-agnostic input events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved, position in NDC (`[-1, 1]`, y up)
    PointerMoved { x: f64, y: f64 },
    /// Primary button pressed or released
    PointerButton { pressed: bool },
    /// Wheel scrolled; positive moves the camera away
    Wheel { delta_y: f64 },
    /// A character key was pressed
    Key(char),
    /// Depth slider moved
    DepthChanged(f64),
    /// Color picker changed
    ColorChanged(Rgba),
}

/// Discrete operations reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Empty the working set
    Clear,
    /// Reset the working set to the fallback template
    Load,
    /// Switch between perspective and orthographic projection
    ToggleProjection,
    /// Start or stop placing points on pointer movement
    ToggleRecord,
    /// Hand a snapshot of the working set to the host for saving
    Save,
    /// Re-target the camera at the origin
    Focus,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Clear,
        Command::Load,
        Command::ToggleProjection,
        Command::ToggleRecord,
        Command::Save,
        Command::Focus,
    ];
}

/// Command → key table with a reverse lookup.
///
/// Serializes as a `snake_case` table so TOML stays readable:
/// ```toml
/// [keybindings]
/// clear = "c"
/// toggle_record = "r"
/// ```
/// Commands missing from a parsed table keep their default key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Command, String>", into = "BTreeMap<Command, String>")]
pub struct KeyBindings {
    bindings: BTreeMap<Command, char>,
    key_to_command: HashMap<char, Command>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = BTreeMap::from([
            (Command::Clear, 'c'),
            (Command::Load, 'l'),
            (Command::ToggleProjection, 'p'),
            (Command::ToggleRecord, 'r'),
            (Command::Save, 's'),
            (Command::Focus, 'f'),
        ]);

        let mut keys = Self {
            bindings,
            key_to_command: HashMap::new(),
        };
        keys.rebuild_reverse_map();
        keys
    }
}

impl KeyBindings {
    /// Bind `command` to `key`, replacing its previous key
    pub fn bind(&mut self, command: Command, key: char) {
        self.bindings.insert(command, key.to_ascii_lowercase());
        self.rebuild_reverse_map();
    }

    /// Key currently bound to `command`
    pub fn key_for(&self, command: Command) -> Option<char> {
        self.bindings.get(&command).copied()
    }

    /// Look up the command for a pressed key (case-insensitive)
    pub fn lookup(&self, key: char) -> Option<Command> {
        self.key_to_command.get(&key.to_ascii_lowercase()).copied()
    }

    fn rebuild_reverse_map(&mut self) {
        self.key_to_command.clear();
        for (command, key) in &self.bindings {
            if let Some(previous) = self.key_to_command.insert(*key, *command) {
                log::warn!("Key '{key}' bound to both {previous:?} and {command:?}; using {command:?}");
            }
        }
    }
}

impl From<BTreeMap<Command, String>> for KeyBindings {
    fn from(table: BTreeMap<Command, String>) -> Self {
        let mut keys = Self::default();
        for (command, key) in table {
            let mut chars = key.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    keys.bindings.insert(command, c.to_ascii_lowercase());
                }
                _ => log::warn!("Ignoring binding {key:?} for {command:?}: expected a single character"),
            }
        }
        keys.rebuild_reverse_map();
        keys
    }
}

impl From<KeyBindings> for BTreeMap<Command, String> {
    fn from(keys: KeyBindings) -> Self {
        keys.bindings
            .into_iter()
            .map(|(command, key)| (command, key.to_string()))
            .collect()
    }
}
