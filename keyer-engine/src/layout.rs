//! The bootstrap layout.
//!
//! This is the "finger-walker" table produced by the layout search:
//! consecutive letters tend to land on chords that share a release or a
//! finger move, so common bigrams roll instead of forcing a full re-press.
//! The thumb arpeggios put one-hand modifier taps on the resting thumb
//! button: leading with the thumb gives a temporary modifier for the next
//! key, leading with the finger sends the modifier as a plain keypress.

use usbd_human_interface_device::page::Keyboard;

use crate::action::{ActionId, Actions};
use crate::layer::{ArpeggioMap, ChordKey, Layer};
use crate::{
    Button, INDEX_1, INDEX_2, MIDDLE_1, MIDDLE_2, RING_1, RING_2, THUMB_2, THUMB_3,
};

/// Build the reference layout: base layer, synthesized shift row and the
/// thumb arpeggio modifiers.
pub fn reference_layout() -> (Actions, Layer, ArpeggioMap) {
    let mut actions = Actions::new();
    let mut layer = Layer::new();
    let mut arpeggios = ArpeggioMap::new();

    let modifier_pairs: [(Button, Keyboard); 6] = [
        (INDEX_1, Keyboard::RightControl),
        (INDEX_2, Keyboard::LeftControl),
        (MIDDLE_1, Keyboard::RightAlt),
        (MIDDLE_2, Keyboard::LeftAlt),
        (RING_1, Keyboard::RightGUI),
        (RING_2, Keyboard::LeftGUI),
    ];
    for (button, modifier) in modifier_pairs {
        let as_temp_mod = actions.temp_mod(modifier, None);
        arpeggios.set(THUMB_2, button, as_temp_mod);
        let as_key = actions.key(modifier, None);
        arpeggios.set(button, THUMB_2, as_key);
    }

    let set = |layer: &mut Layer, t, i, m, r, l, action: ActionId| {
        layer.set(ChordKey::new(t, i, m, r, l), action);
    };

    // No thumb.
    let ralt = actions.temp_mod(Keyboard::RightAlt, None);
    set(&mut layer, 0, 2, 1, 1, 0, ralt);

    // Thumb on its first button: editing keys.
    let backspace = actions.key(Keyboard::DeleteBackspace, None);
    set(&mut layer, 1, 0, 0, 0, 0, backspace);
    let delete = actions.key(Keyboard::DeleteForward, None);
    set(&mut layer, 1, 0, 0, 0, 1, delete);

    // Thumb resting on its second button: whitespace.
    let space = actions.key(Keyboard::Space, None);
    set(&mut layer, 2, 0, 0, 0, 0, space);
    let enter = actions.key(Keyboard::ReturnEnter, None);
    set(&mut layer, 2, 1, 0, 0, 0, enter);
    let tab = actions.key(Keyboard::Tab, None);
    set(&mut layer, 2, 2, 0, 0, 0, tab);
    let escape = actions.key(Keyboard::Escape, None);
    set(&mut layer, 2, 1, 0, 0, 1, escape);

    // Thumb stretched to its third button: modifiers and navigation.
    let ctrl = actions.temp_mod(Keyboard::LeftControl, None);
    set(&mut layer, 3, 0, 0, 0, 0, ctrl);
    let right = actions.key(Keyboard::RightArrow, None);
    set(&mut layer, 3, 0, 1, 1, 0, right);
    let down = actions.key(Keyboard::DownArrow, None);
    set(&mut layer, 3, 0, 1, 2, 0, down);
    let word_right = actions.key(Keyboard::RightArrow, None);
    let word_right = actions.temp_mod(Keyboard::LeftControl, Some(word_right));
    set(&mut layer, 3, 0, 2, 1, 0, word_right);
    let page_down = actions.key(Keyboard::PageDown, None);
    set(&mut layer, 3, 0, 2, 2, 0, page_down);
    let gui_enter = actions.key(Keyboard::ReturnEnter, None);
    let gui_enter = actions.temp_mod(Keyboard::RightGUI, Some(gui_enter));
    set(&mut layer, 3, 1, 0, 0, 0, gui_enter);
    let left = actions.key(Keyboard::LeftArrow, None);
    set(&mut layer, 3, 1, 0, 1, 0, left);
    let up = actions.key(Keyboard::UpArrow, None);
    set(&mut layer, 3, 1, 0, 2, 0, up);
    let home = actions.key(Keyboard::Home, None);
    set(&mut layer, 3, 1, 2, 1, 0, home);
    let alt_tab = actions.key(Keyboard::Tab, None);
    let alt_tab = actions.hold_mod(THUMB_3, Keyboard::LeftAlt, Some(alt_tab));
    set(&mut layer, 3, 2, 0, 0, 0, alt_tab);
    let word_left = actions.key(Keyboard::LeftArrow, None);
    let word_left = actions.temp_mod(Keyboard::LeftControl, Some(word_left));
    set(&mut layer, 3, 2, 0, 1, 0, word_left);
    let page_up = actions.key(Keyboard::PageUp, None);
    set(&mut layer, 3, 2, 0, 2, 0, page_up);
    let end = actions.key(Keyboard::End, None);
    set(&mut layer, 3, 2, 1, 1, 0, end);

    // Punctuation and digits.
    let punctuation: [(u8, u8, u8, u8, Keyboard); 21] = [
        (3, 1, 1, 1, Keyboard::Apostrophe),
        (0, 1, 2, 0, Keyboard::Comma),
        (0, 1, 0, 0, Keyboard::Minus),
        (3, 0, 0, 1, Keyboard::Dot),
        (1, 0, 1, 1, Keyboard::ForwardSlash),
        (0, 0, 2, 1, Keyboard::Keyboard0),
        (3, 0, 2, 0, Keyboard::Keyboard1),
        (1, 0, 2, 0, Keyboard::Keyboard2),
        (2, 1, 2, 1, Keyboard::Keyboard3),
        (1, 1, 2, 0, Keyboard::Keyboard4),
        (3, 1, 2, 0, Keyboard::Keyboard5),
        (1, 0, 2, 1, Keyboard::Keyboard6),
        (0, 1, 0, 2, Keyboard::Keyboard7),
        (2, 0, 2, 1, Keyboard::Keyboard8),
        (2, 1, 1, 1, Keyboard::Keyboard9),
        (2, 0, 2, 0, Keyboard::Semicolon),
        (0, 0, 0, 1, Keyboard::Equal),
        (0, 0, 2, 0, Keyboard::LeftBrace),
        (0, 0, 0, 2, Keyboard::Backslash),
        (0, 1, 2, 1, Keyboard::RightBrace),
        (1, 2, 0, 0, Keyboard::Grave),
    ];
    for (t, i, m, r, key) in punctuation {
        let action = actions.key(key, None);
        set(&mut layer, t, i, m, r, 0, action);
    }

    // The search put a capital T on its own chord; spell it as a temporary
    // shift chained into the keypress.
    let cap_t = actions.key(Keyboard::T, None);
    let cap_t = actions.temp_mod(Keyboard::LeftShift, Some(cap_t));
    set(&mut layer, 2, 2, 1, 0, 0, cap_t);

    // Letters.
    let letters: [(u8, u8, u8, u8, Keyboard); 26] = [
        (0, 0, 1, 1, Keyboard::A),
        (1, 1, 1, 0, Keyboard::B),
        (1, 0, 0, 1, Keyboard::C),
        (2, 0, 1, 1, Keyboard::D),
        (0, 1, 0, 1, Keyboard::E),
        (1, 1, 1, 1, Keyboard::F),
        (3, 0, 1, 0, Keyboard::G),
        (0, 2, 0, 1, Keyboard::H),
        (2, 1, 0, 1, Keyboard::I),
        (1, 2, 1, 0, Keyboard::J),
        (0, 2, 0, 0, Keyboard::K),
        (2, 1, 1, 0, Keyboard::L),
        (1, 1, 0, 0, Keyboard::M),
        (2, 0, 1, 0, Keyboard::N),
        (0, 1, 1, 1, Keyboard::O),
        (1, 0, 1, 0, Keyboard::P),
        (1, 2, 0, 1, Keyboard::Q),
        (0, 1, 1, 0, Keyboard::R),
        (0, 0, 1, 0, Keyboard::S),
        (2, 0, 0, 1, Keyboard::T),
        (1, 1, 0, 1, Keyboard::U),
        (3, 1, 1, 0, Keyboard::V),
        (0, 2, 1, 0, Keyboard::W),
        (2, 1, 2, 0, Keyboard::X),
        (0, 2, 1, 1, Keyboard::Y),
        (2, 2, 0, 1, Keyboard::Z),
    ];
    for (t, i, m, r, key) in letters {
        let action = actions.key(key, None);
        set(&mut layer, t, i, m, r, 0, action);
    }

    layer.synthesize_shifts(&mut actions);

    (actions, layer, arpeggios)
}
