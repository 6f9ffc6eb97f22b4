//! Gesture actions and the OS capability they run against
//!
//! [`ActionMap`] binds gesture labels to [`Action`]s. Actions never touch the
//! OS directly; they go through an [`OsActions`] implementation so the
//! dispatch core can run against a recording fake in tests.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::gesture::GestureLabel;

pub mod system;

#[cfg(test)]
pub(crate) mod recording;

pub use system::SystemActions;

/// Errors raised while performing an OS action
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Key injection failed: {0}")]
    Input(String),
    #[error("Input injection unavailable: {0}")]
    Unavailable(String),
}

/// Modifier keys usable in a chord
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    /// Windows / Command / Super key
    Meta,
}

impl Modifier {
    /// Platform modifier for clipboard shortcuts
    pub fn primary() -> Self {
        if cfg!(target_os = "macos") {
            Modifier::Meta
        } else {
            Modifier::Ctrl
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Meta => "Super",
        }
    }
}

/// Non-modifier key of a chord
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordKey {
    Char(char),
    Space,
    Left,
    Right,
    Up,
    Down,
}

/// A modifier combination plus one key, pressed and released together
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyChord {
    pub modifiers: Vec<Modifier>,
    pub key: ChordKey,
}

impl KeyChord {
    pub fn new(modifiers: &[Modifier], key: ChordKey) -> Self {
        Self {
            modifiers: modifiers.to_vec(),
            key,
        }
    }

    /// A single key without modifiers
    pub fn key(key: ChordKey) -> Self {
        Self::new(&[], key)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.label())?;
        }
        match self.key {
            ChordKey::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            ChordKey::Space => f.write_str("Space"),
            ChordKey::Left => f.write_str("Left"),
            ChordKey::Right => f.write_str("Right"),
            ChordKey::Up => f.write_str("Up"),
            ChordKey::Down => f.write_str("Down"),
        }
    }
}

/// Direction of a discrete window move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDirection {
    /// Window-manager shortcut that moves the active window one step
    pub fn chord(&self) -> KeyChord {
        let key = match self {
            MoveDirection::Left => ChordKey::Left,
            MoveDirection::Right => ChordKey::Right,
            MoveDirection::Up => ChordKey::Up,
            MoveDirection::Down => ChordKey::Down,
        };
        KeyChord::new(&[Modifier::Meta], key)
    }
}

/// External program to start, fire-and-forget
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// What a gesture does once it fires
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Spawn an application
    Launch(LaunchSpec),
    /// Send one or more key chords in order
    Keys(Vec<KeyChord>),
    /// Enter or leave continuous window control
    ToggleDirectControl,
}

/// An action with the description shown to the user
#[derive(Clone, Debug, PartialEq)]
pub struct ActionBinding {
    pub action: Action,
    pub description: &'static str,
}

/// Side effects the host OS has to provide
pub trait OsActions {
    /// Start a program without waiting for it
    fn launch(&mut self, spec: &LaunchSpec) -> Result<(), ActionError>;

    /// Press and release a key chord
    fn send_keys(&mut self, chord: &KeyChord) -> Result<(), ActionError>;

    /// Move the active window one step
    fn move_window(&mut self, direction: MoveDirection) -> Result<(), ActionError> {
        self.send_keys(&direction.chord())
    }
}

/// Gesture label to action bindings
#[derive(Clone, Debug, Default)]
pub struct ActionMap {
    bindings: HashMap<GestureLabel, ActionBinding>,
}

impl ActionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Default bindings for the current platform
    pub fn standard() -> Self {
        let primary = Modifier::primary();
        let window_menu = KeyChord::new(&[Modifier::Alt], ChordKey::Space);

        let mut map = Self::new();
        map.bind(GestureLabel::Ok, Action::Launch(apps::text_editor()), "Opens the text editor");
        map.bind(GestureLabel::ThumbsUp, Action::Launch(apps::calculator()), "Opens the calculator");
        map.bind(GestureLabel::PeaceSign, Action::Launch(apps::paint()), "Opens the paint program");
        map.bind(GestureLabel::Fist, Action::Launch(apps::task_manager()), "Opens the task manager");
        map.bind(
            GestureLabel::Copy,
            Action::Keys(vec![KeyChord::new(&[primary], ChordKey::Char('c'))]),
            "Copies the selection",
        );
        map.bind(
            GestureLabel::Paste,
            Action::Keys(vec![KeyChord::new(&[primary], ChordKey::Char('v'))]),
            "Pastes the clipboard",
        );
        map.bind(
            GestureLabel::MoveWindow,
            Action::Keys(vec![window_menu.clone(), KeyChord::key(ChordKey::Char('m'))]),
            "Moves the active window",
        );
        map.bind(
            GestureLabel::ResizeWindow,
            Action::Keys(vec![window_menu, KeyChord::key(ChordKey::Char('s'))]),
            "Resizes the active window",
        );
        map.bind(
            GestureLabel::MinimizeWindow,
            Action::Keys(vec![KeyChord::new(&[Modifier::Meta], ChordKey::Down)]),
            "Minimizes the active window",
        );
        map.bind(
            GestureLabel::DirectWindowControl,
            Action::ToggleDirectControl,
            "Toggles direct window control",
        );
        map
    }

    /// Bind (or rebind) a label
    pub fn bind(&mut self, label: GestureLabel, action: Action, description: &'static str) {
        self.bindings.insert(label, ActionBinding { action, description });
    }

    pub fn get(&self, label: GestureLabel) -> Option<&ActionBinding> {
        self.bindings.get(&label)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Launch targets per platform
mod apps {
    use super::LaunchSpec;

    #[cfg(target_os = "windows")]
    pub fn text_editor() -> LaunchSpec {
        LaunchSpec::new("notepad.exe")
    }

    #[cfg(target_os = "windows")]
    pub fn calculator() -> LaunchSpec {
        LaunchSpec::new("calc.exe")
    }

    #[cfg(target_os = "windows")]
    pub fn paint() -> LaunchSpec {
        LaunchSpec::new("mspaint.exe")
    }

    #[cfg(target_os = "windows")]
    pub fn task_manager() -> LaunchSpec {
        LaunchSpec::new("taskmgr.exe")
    }

    #[cfg(target_os = "macos")]
    fn open_app(name: &str) -> LaunchSpec {
        LaunchSpec::new("open").arg("-a").arg(name)
    }

    #[cfg(target_os = "macos")]
    pub fn text_editor() -> LaunchSpec {
        open_app("TextEdit")
    }

    #[cfg(target_os = "macos")]
    pub fn calculator() -> LaunchSpec {
        open_app("Calculator")
    }

    #[cfg(target_os = "macos")]
    pub fn paint() -> LaunchSpec {
        open_app("Preview")
    }

    #[cfg(target_os = "macos")]
    pub fn task_manager() -> LaunchSpec {
        open_app("Activity Monitor")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    pub fn text_editor() -> LaunchSpec {
        LaunchSpec::new("gedit")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    pub fn calculator() -> LaunchSpec {
        LaunchSpec::new("gnome-calculator")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    pub fn paint() -> LaunchSpec {
        LaunchSpec::new("pinta")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    pub fn task_manager() -> LaunchSpec {
        LaunchSpec::new("gnome-system-monitor")
    }
}
