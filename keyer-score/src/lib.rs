//! Typing-cost simulation for chord layouts.
//!
//! The layout search proposes character→chord mappings; this crate scores one
//! by replaying a reference text against the hand model and summing what the
//! hand motions would cost, in milliseconds.  Scoring is pure and
//! deterministic: the same map and text always produce the same number.
//!
//! Chords cross the boundary as digit strings, one digit per finger with the
//! thumb first: `"2100"` is thumb on its second button, index on its first,
//! everything else out.  Missing trailing digits leave those fingers out.

use std::collections::BTreeMap;

use thiserror::Error;

use keyer_engine::Finger;

pub mod fingers;

pub use fingers::Fingers;

/// Errors crossing the scorer boundary.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ScoreError {
    /// Layout keys are the bytes being typed, as single-byte strings.
    #[error("layout key {0:?} is not a single byte")]
    KeyNotByte(String),

    /// Chords are digit strings.
    #[error("chord {0:?} contains a non-digit")]
    ChordNotDigits(String),

    /// At most one digit per finger.
    #[error("chord {0:?} has more digits than the hand has fingers")]
    ChordTooLong(String),

    /// Each digit must name a button the finger actually has.
    #[error("chord {chord:?} puts finger {finger} on row {row}, which it does not have")]
    RowOutOfRange { chord: String, finger: usize, row: u8 },
}

/// Parse a chord string into a hand pose.
pub fn parse_chord(chord: &str) -> Result<Fingers, ScoreError> {
    let digits = chord.as_bytes();
    if digits.len() > Finger::COUNT {
        return Err(ScoreError::ChordTooLong(chord.into()));
    }
    let mut positions = [0u8; Finger::COUNT];
    for (index, &digit) in digits.iter().enumerate() {
        if !digit.is_ascii_digit() {
            return Err(ScoreError::ChordNotDigits(chord.into()));
        }
        let row = digit - b'0';
        if row > Finger::ALL[index].buttons() {
            return Err(ScoreError::RowOutOfRange { chord: chord.into(), finger: index, row });
        }
        positions[index] = row;
    }
    Ok(Fingers::from_positions(&positions))
}

/// Candidate chords for every input byte.
pub struct KeyMap {
    entries: [Vec<Fingers>; 256],
}

impl KeyMap {
    pub fn new() -> KeyMap {
        KeyMap { entries: std::array::from_fn(|_| Vec::new()) }
    }

    /// Build from the optimizer's wire shape: single-byte string keys, each
    /// with a list of chord strings.
    pub fn from_layout(layout: &BTreeMap<String, Vec<String>>) -> Result<KeyMap, ScoreError> {
        let mut map = KeyMap::new();
        for (key, chords) in layout {
            let &[byte] = key.as_bytes() else {
                return Err(ScoreError::KeyNotByte(key.clone()));
            };
            for chord in chords {
                map.insert(byte, parse_chord(chord)?);
            }
        }
        Ok(map)
    }

    pub fn insert(&mut self, byte: u8, chord: Fingers) {
        self.entries[byte as usize].push(chord);
    }

    pub fn candidates(&self, byte: u8) -> &[Fingers] {
        &self.entries[byte as usize]
    }
}

impl Default for KeyMap {
    fn default() -> KeyMap {
        KeyMap::new()
    }
}

/// Total cost in milliseconds of typing `text` with the given map.
///
/// A byte with no candidates resets the hand to the resting pose and costs
/// nothing.  A byte with several candidates is tried against a copy of the
/// hand for each, and the cheapest is committed; ties go to the earliest
/// candidate.
pub fn type_text(text: &[u8], key_map: &KeyMap) -> u64 {
    let mut fingers = Fingers::default();
    let mut total: u64 = 0;

    for &byte in text {
        match key_map.candidates(byte) {
            [] => fingers = Fingers::default(),
            [only] => total += u64::from(fingers.transition_to(only)),
            candidates => {
                let mut best: Option<(u32, Fingers)> = None;
                for target in candidates {
                    let mut attempt = fingers;
                    let cost = attempt.transition_to(target);
                    if best.map_or(true, |(cheapest, _)| cost < cheapest) {
                        best = Some((cost, attempt));
                    }
                }
                if let Some((cost, state)) = best {
                    fingers = state;
                    total += u64::from(cost);
                }
            }
        }
    }

    total
}

/// Score a layout against a reference text.
pub fn score_layout(
    layout: &BTreeMap<String, Vec<String>>,
    text: &[u8],
) -> Result<u64, ScoreError> {
    let key_map = KeyMap::from_layout(layout)?;
    Ok(type_text(text, &key_map))
}
