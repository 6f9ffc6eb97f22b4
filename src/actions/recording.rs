//! In-memory [`OsActions`] used by the dispatch tests

use super::{ActionError, KeyChord, LaunchSpec, MoveDirection, OsActions};

/// Everything the fake was asked to do, in order
#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Launch(LaunchSpec),
    Keys(KeyChord),
    Move(MoveDirection),
}

#[derive(Default)]
pub struct RecordingActions {
    pub calls: Vec<Recorded>,
    /// Make every launch fail, as a missing executable would
    pub fail_launches: bool,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launches(&self) -> Vec<&LaunchSpec> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Recorded::Launch(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<MoveDirection> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Recorded::Move(dir) => Some(*dir),
                _ => None,
            })
            .collect()
    }
}

impl OsActions for RecordingActions {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<(), ActionError> {
        self.calls.push(Recorded::Launch(spec.clone()));
        if self.fail_launches {
            return Err(ActionError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        Ok(())
    }

    fn send_keys(&mut self, chord: &KeyChord) -> Result<(), ActionError> {
        self.calls.push(Recorded::Keys(chord.clone()));
        Ok(())
    }

    fn move_window(&mut self, direction: MoveDirection) -> Result<(), ActionError> {
        self.calls.push(Recorded::Move(direction));
        Ok(())
    }
}
