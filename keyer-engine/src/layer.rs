//! Chord and arpeggio lookup tables.

use usbd_human_interface_device::page::Keyboard;

use crate::action::{ActionId, Actions};
use crate::{Button, LITTLE_1, NUM_BUTTONS};

/// Slots along each axis of the chord table, position 0 (finger unused)
/// included.
pub const THUMB_SLOTS: usize = 4;
pub const FINGER_SLOTS: usize = 3;
pub const LITTLE_SLOTS: usize = 2;

/// Positions of the five fingers.  0 means the finger is not part of the
/// chord; k means it is pressing the k'th button of its column.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ChordKey {
    pub thumb: u8,
    pub index: u8,
    pub middle: u8,
    pub ring: u8,
    pub little: u8,
}

impl ChordKey {
    pub const fn new(thumb: u8, index: u8, middle: u8, ring: u8, little: u8) -> ChordKey {
        ChordKey { thumb, index, middle, ring, little }
    }

    pub fn is_empty(self) -> bool {
        self == ChordKey::default()
    }
}

/// A dense table from finger positions to an action.
///
/// The reference build only ever installs the base layer, but runtime state
/// may add and select substitutes.
pub struct Layer {
    slots: [[[[[Option<ActionId>; LITTLE_SLOTS]; FINGER_SLOTS]; FINGER_SLOTS]; FINGER_SLOTS];
        THUMB_SLOTS],
}

impl Layer {
    pub fn new() -> Layer {
        Layer {
            slots: [[[[[None; LITTLE_SLOTS]; FINGER_SLOTS]; FINGER_SLOTS]; FINGER_SLOTS];
                THUMB_SLOTS],
        }
    }

    pub fn get(&self, key: ChordKey) -> Option<ActionId> {
        self.slots[key.thumb as usize][key.index as usize][key.middle as usize]
            [key.ring as usize][key.little as usize]
    }

    pub fn set(&mut self, key: ChordKey, action: ActionId) {
        self.slots[key.thumb as usize][key.index as usize][key.middle as usize]
            [key.ring as usize][key.little as usize] = Some(action);
    }

    /// Derive the shift row: every populated slot with the little finger up
    /// gets a companion slot with the little finger down that holds shift for
    /// as long as that button is held, unless the layout already placed
    /// something there.
    pub fn synthesize_shifts(&mut self, actions: &mut Actions) {
        for thumb in 0..THUMB_SLOTS {
            for index in 0..FINGER_SLOTS {
                for middle in 0..FINGER_SLOTS {
                    for ring in 0..FINGER_SLOTS {
                        let row = &mut self.slots[thumb][index][middle][ring];
                        let Some(base) = row[0] else { continue };
                        if row[1].is_some() {
                            continue;
                        }
                        row[1] =
                            Some(actions.hold_mod(LITTLE_1, Keyboard::LeftShift, Some(base)));
                    }
                }
            }
        }
    }
}

impl Default for Layer {
    fn default() -> Layer {
        Layer::new()
    }
}

/// Actions fired by two-button arpeggios, indexed by press order.
pub struct ArpeggioMap {
    slots: [[Option<ActionId>; NUM_BUTTONS]; NUM_BUTTONS],
}

impl ArpeggioMap {
    pub fn new() -> ArpeggioMap {
        ArpeggioMap { slots: [[None; NUM_BUTTONS]; NUM_BUTTONS] }
    }

    pub fn get(&self, first: Button, second: Button) -> Option<ActionId> {
        self.slots[first as usize][second as usize]
    }

    pub fn set(&mut self, first: Button, second: Button, action: ActionId) {
        self.slots[first as usize][second as usize] = Some(action);
    }
}

impl Default for ArpeggioMap {
    fn default() -> ArpeggioMap {
        ArpeggioMap::new()
    }
}
