//! Real OS actions: detached process spawning and synthetic key events

use std::process::{Command, Stdio};

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::{ActionError, ChordKey, KeyChord, LaunchSpec, Modifier, OsActions};

/// [`OsActions`] backed by `std::process` and `enigo`
pub struct SystemActions {
    /// Keyboard injector; `None` when the platform refused a connection
    enigo: Option<Enigo>,
}

impl SystemActions {
    pub fn new() -> Self {
        let enigo = match Enigo::new(&Settings::default()) {
            Ok(enigo) => Some(enigo),
            Err(e) => {
                log::warn!("Keyboard injection unavailable, key actions disabled: {:?}", e);
                None
            }
        };
        Self { enigo }
    }

    /// Whether key chords can be sent
    pub fn can_send_keys(&self) -> bool {
        self.enigo.is_some()
    }
}

impl Default for SystemActions {
    fn default() -> Self {
        Self::new()
    }
}

impl OsActions for SystemActions {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<(), ActionError> {
        // The child is dropped immediately; it keeps running on its own
        Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|source| ActionError::Spawn {
                program: spec.program.clone(),
                source,
            })
    }

    fn send_keys(&mut self, chord: &KeyChord) -> Result<(), ActionError> {
        let enigo = self
            .enigo
            .as_mut()
            .ok_or_else(|| ActionError::Unavailable("no input connection".to_string()))?;

        let mut pressed = Vec::with_capacity(chord.modifiers.len());
        let mut result = Ok(());
        for modifier in &chord.modifiers {
            let key = modifier_key(*modifier);
            if let Err(e) = enigo.key(key, Direction::Press) {
                result = Err(ActionError::Input(format!("{} press: {}", chord, e)));
                break;
            }
            pressed.push(key);
        }

        if result.is_ok() {
            result = enigo
                .key(chord_key(chord.key), Direction::Click)
                .map_err(|e| ActionError::Input(format!("{}: {}", chord, e)));
        }

        // Release whatever went down, even after a failure
        for key in pressed.into_iter().rev() {
            if let Err(e) = enigo.key(key, Direction::Release) {
                log::warn!("Failed to release {:?}: {}", key, e);
            }
        }

        result
    }
}

fn modifier_key(modifier: Modifier) -> Key {
    match modifier {
        Modifier::Ctrl => Key::Control,
        Modifier::Alt => Key::Alt,
        Modifier::Shift => Key::Shift,
        Modifier::Meta => Key::Meta,
    }
}

fn chord_key(key: ChordKey) -> Key {
    match key {
        ChordKey::Char(c) => Key::Unicode(c),
        ChordKey::Space => Key::Space,
        ChordKey::Left => Key::LeftArrow,
        ChordKey::Right => Key::RightArrow,
        ChordKey::Up => Key::UpArrow,
        ChordKey::Down => Key::DownArrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_reported() {
        let mut actions = SystemActions { enigo: None };
        let err = actions
            .launch(&LaunchSpec::new("gestiq-definitely-not-a-real-program"))
            .unwrap_err();
        assert!(matches!(err, ActionError::Spawn { .. }));
    }

    #[test]
    fn test_keys_without_injector() {
        let mut actions = SystemActions { enigo: None };
        assert!(!actions.can_send_keys());
        let chord = KeyChord::new(&[Modifier::Ctrl], ChordKey::Char('c'));
        assert!(matches!(actions.send_keys(&chord), Err(ActionError::Unavailable(_))));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(chord_key(ChordKey::Char('v')), Key::Unicode('v'));
        assert_eq!(chord_key(ChordKey::Left), Key::LeftArrow);
        assert_eq!(modifier_key(Modifier::Meta), Key::Meta);
    }
}
