use crate::error::{Error, PollError, Result};

/// Physical keys of the default two-row piano layout, lowest note first.
///
/// ```text
/// |   |   |   |   |   | |   |   |   |   | |   | |   |   |   |
/// |   | S |   |   | F | | G |   |   | J | | K | | L |   |   |
/// |   |___|   |   |___| |___|   |   |___| |___| |___|   |   |__
/// |     |     |     |     |     |     |     |     |     |     |
/// |  Z  |  X  |  C  |  V  |  B  |  N  |  M  |  ,  |  .  |  /  |
/// |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
/// ```
pub const PIANO_KEYS: [char; 16] = [
    'z', 's', 'x', 'c', 'f', 'v', 'g', 'b', 'n', 'j', 'm', 'k', ',', 'l', '.', '/',
];

/// Maps physical keys to key indices (semitones above the base frequency).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    keys: Vec<char>,
}

impl KeyMap {
    pub fn new(keys: impl IntoIterator<Item = char>) -> Result<Self> {
        let keys: Vec<char> = keys.into_iter().map(|c| c.to_ascii_lowercase()).collect();

        if keys.is_empty() {
            return Err(Error::config("key map is empty"));
        }
        if keys.len() > KeyStates::CAPACITY {
            return Err(Error::config(format!(
                "key map has {} keys, at most {} are supported",
                keys.len(),
                KeyStates::CAPACITY
            )));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(Error::config(format!("key '{key}' is mapped twice")));
            }
        }

        Ok(Self { keys })
    }

    pub fn index_of(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        self.keys.iter().position(|&k| k == key)
    }

    pub fn key(&self, index: usize) -> Option<char> {
        self.keys.get(index).copied()
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            keys: PIANO_KEYS.to_vec(),
        }
    }
}

/// Snapshot of which key indices are held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStates(u32);

/// One key changing state between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    pub key: usize,
    pub pressed: bool,
}

impl KeyStates {
    pub const NONE: Self = Self(0);
    pub const CAPACITY: usize = u32::BITS as usize;

    pub fn press(&mut self, key: usize) {
        if key < Self::CAPACITY {
            self.0 |= 1 << key;
        }
    }

    pub fn release(&mut self, key: usize) {
        if key < Self::CAPACITY {
            self.0 &= !(1 << key);
        }
    }

    pub fn is_down(self, key: usize) -> bool {
        key < Self::CAPACITY && self.0 & (1 << key) != 0
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..Self::CAPACITY).filter(move |&key| self.is_down(key))
    }

    /// Changes needed to go from `self` to `next`.
    ///
    /// Presses come before releases so that sliding from one key to another
    /// within a single poll is a key change rather than a release followed
    /// by a new note.
    pub fn transitions(self, next: KeyStates) -> impl Iterator<Item = KeyTransition> {
        let pressed = KeyStates(next.0 & !self.0);
        let released = KeyStates(self.0 & !next.0);

        pressed
            .iter()
            .map(|key| KeyTransition { key, pressed: true })
            .chain(released.iter().map(|key| KeyTransition { key, pressed: false }))
    }
}

impl FromIterator<usize> for KeyStates {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut states = KeyStates::NONE;
        for key in iter {
            states.press(key);
        }
        states
    }
}

/// Something that can report which mapped keys are currently held.
///
/// Implementations should wait at most one polling interval so the input
/// loop runs at a bounded cadence instead of spinning.
pub trait KeySource {
    fn poll(&mut self) -> std::result::Result<KeyStates, PollError>;
}
