//! Gesture recognition: debounced key events in, HID traffic out.
//!
//! Three gesture classes share the ten buttons, kept disjoint by construction:
//!
//! - Tapped chords.  Buttons accumulate while held; the first release of a
//!   member looks the full combination up in the current layer and executes
//!   its action.  Further releases of the same chord do nothing.
//! - Held chords.  If the autostart delay elapses while a chord is down, its
//!   action is started without waiting for the release, and stopped when any
//!   member comes back up.  This makes chords usable as ordinary held keys
//!   (repeat, modifiers over mouse work).
//! - Arpeggios.  Exactly two buttons pressed in sequence, the second at least
//!   80 ms after the first and released again within 240 ms, fire a separate
//!   two-button table keyed by press order.
//!
//! On top of these, a press that leaves only a single populated slot
//! compatible with the partial press state fires that slot immediately (a
//! "unique action").  The button is then excluded from the forming chord, so
//! several unique actions can be active at once alongside an unrelated chord.
//!
//! Every button also carries a stop-debt slot: the action whose stop is owed
//! when that button comes back up.  Unique actions park themselves there, and
//! hold modifiers park their deferred release half in the slot of their
//! anchor button.

use alloc::vec::Vec;

use usbd_human_interface_device::page::Keyboard;

use crate::action::{ActionId, Actions, Kind};
use crate::layer::{ArpeggioMap, ChordKey, Layer, FINGER_SLOTS, LITTLE_SLOTS, THUMB_SLOTS};
use crate::log::warn;
use crate::{
    Button, Host, KeyEvent, Params, TimerId, INDEX_1, INDEX_2, LITTLE_1, MIDDLE_1, MIDDLE_2,
    NUM_BUTTONS, RING_1, RING_2, THUMB_1, THUMB_2, THUMB_3,
};

/// Most chords assert one or two temporary modifiers; eight is far past
/// anything the layout can express.
const MAX_TEMP_MODS: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ArpeggioState {
    Ready,
    OneDown,
    TwoDown,
    Inactive,
}

/// Progress of a possible two-button arpeggio.
struct Arpeggio {
    state: ArpeggioState,
    /// When the most recent tracked button went down.
    started_micros: u64,
    first: Button,
    second: Button,
}

impl Arpeggio {
    fn new() -> Arpeggio {
        Arpeggio { state: ArpeggioState::Ready, started_micros: 0, first: 0, second: 0 }
    }
}

/// The gesture recognizer.  Owned and driven by the dispatcher task; nothing
/// here is shared.
pub struct InputEngine {
    actions: Actions,
    layers: Vec<Layer>,
    active_layer: usize,
    arpeggios: ArpeggioMap,
    params: Params,

    buttons_down: [bool; NUM_BUTTONS],
    /// Stop-debt: the action owed a stop when this button is released.
    active_action: [Option<ActionId>; NUM_BUTTONS],
    /// A chord started by the autostart timer and still held.
    chord_action: Option<ActionId>,
    autostart_armed: bool,
    /// Modifiers asserted by chords, released with the next ordinary key.
    temp_mods: heapless::Vec<Keyboard, MAX_TEMP_MODS>,
    arpeggio: Arpeggio,
}

impl InputEngine {
    pub fn new(
        actions: Actions,
        base_layer: Layer,
        arpeggios: ArpeggioMap,
        params: Params,
    ) -> InputEngine {
        let mut layers = Vec::new();
        layers.push(base_layer);
        InputEngine {
            actions,
            layers,
            active_layer: 0,
            arpeggios,
            params,
            buttons_down: [false; NUM_BUTTONS],
            active_action: [None; NUM_BUTTONS],
            chord_action: None,
            autostart_armed: false,
            temp_mods: heapless::Vec::new(),
            arpeggio: Arpeggio::new(),
        }
    }

    /// The reference layout with the given timing.
    pub fn with_reference_layout(params: Params) -> InputEngine {
        let (actions, layer, arpeggios) = crate::layout::reference_layout();
        InputEngine::new(actions, layer, arpeggios, params)
    }

    /// Install an additional layer, returning its index.
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    /// Switch chord lookups to the given layer.
    pub fn select_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.active_layer = index;
        } else {
            warn!("no such layer");
        }
    }

    /// Feed one debounced key event through the recognizer.
    pub fn handle_event<H: Host>(&mut self, event: KeyEvent, now_micros: u64, host: &mut H) {
        match event {
            KeyEvent::Press(button) => self.on_press(button, now_micros, host),
            KeyEvent::Release(button) => self.on_release(button, now_micros, host),
        }
    }

    fn on_press<H: Host>(&mut self, button: Button, now_micros: u64, host: &mut H) {
        self.arpeggio_press(button, now_micros);

        self.buttons_down[button as usize] = true;
        if let Some(unique) = self.find_unique() {
            // Only one populated slot is still compatible with what is held.
            // Fire it now and keep the button out of the forming chord, so
            // unrelated actions can be live at the same time.
            self.buttons_down[button as usize] = false;
            self.cancel_autostart(host);
            self.active_action[button as usize] = Some(unique);
            self.start(unique, host);
        } else {
            host.arm_timer(TimerId::ChordAutostart, self.params.autostart_delay_micros);
            self.autostart_armed = true;
        }
    }

    fn on_release<H: Host>(&mut self, button: Button, now_micros: u64, host: &mut H) {
        if !self.arpeggio_release(now_micros, host) {
            if let Some(action) = self.active_action[button as usize].take() {
                self.stop(action, host);
            } else if self.chord_action.is_some() && self.buttons_down[button as usize] {
                if let Some(action) = self.chord_action.take() {
                    self.stop(action, host);
                }
            } else if self.autostart_armed {
                self.cancel_autostart(host);
                if let Some(action) = self.layer().get(self.chord_key()) {
                    self.execute(action, host);
                    // The action may have parked a stop-debt on the very
                    // button that just went up; settle it immediately.
                    if let Some(debt) = self.active_action[button as usize].take() {
                        self.stop(debt, host);
                    }
                }
            }
        }

        self.buttons_down[button as usize] = false;
        if !self.buttons_down.iter().any(|&down| down) {
            self.arpeggio.state = ArpeggioState::Ready;
        }
    }

    /// The autostart timer fired: the chord being held starts now and stops
    /// when a member is released.
    pub fn on_autostart<H: Host>(&mut self, host: &mut H) {
        self.autostart_armed = false;
        if self.chord_action.is_some() {
            warn!("chord hold already active");
            return;
        }
        if let Some(action) = self.layer().get(self.chord_key()) {
            self.start(action, host);
            self.chord_action = Some(action);
        }
    }

    fn layer(&self) -> &Layer {
        &self.layers[self.active_layer]
    }

    fn cancel_autostart<H: Host>(&mut self, host: &mut H) {
        if self.autostart_armed {
            host.cancel_timer(TimerId::ChordAutostart);
            self.autostart_armed = false;
        }
    }

    /// The finger positions currently held down.  At most one button per
    /// finger can be physically depressed.
    fn chord_key(&self) -> ChordKey {
        let down = |b: Button| self.buttons_down[b as usize];
        let column = |first: Button, second: Button| {
            if down(first) {
                1
            } else if down(second) {
                2
            } else {
                0
            }
        };
        ChordKey {
            thumb: if down(THUMB_1) {
                1
            } else if down(THUMB_2) {
                2
            } else if down(THUMB_3) {
                3
            } else {
                0
            },
            index: column(INDEX_1, INDEX_2),
            middle: column(MIDDLE_1, MIDDLE_2),
            ring: column(RING_1, RING_2),
            little: if down(LITTLE_1) { 1 } else { 0 },
        }
    }

    /// Scan every slot compatible with the partial press state, treating
    /// unpressed fingers as wildcards.  Some(action) only when exactly one
    /// slot is populated.
    fn find_unique(&self) -> Option<ActionId> {
        let current = self.chord_key();
        let layer = self.layer();
        let mut found = None;
        for thumb in 0..THUMB_SLOTS as u8 {
            if current.thumb != 0 && current.thumb != thumb {
                continue;
            }
            for index in 0..FINGER_SLOTS as u8 {
                if current.index != 0 && current.index != index {
                    continue;
                }
                for middle in 0..FINGER_SLOTS as u8 {
                    if current.middle != 0 && current.middle != middle {
                        continue;
                    }
                    for ring in 0..FINGER_SLOTS as u8 {
                        if current.ring != 0 && current.ring != ring {
                            continue;
                        }
                        for little in 0..LITTLE_SLOTS as u8 {
                            if current.little != 0 && current.little != little {
                                continue;
                            }
                            let key = ChordKey::new(thumb, index, middle, ring, little);
                            if let Some(action) = layer.get(key) {
                                if found.is_some() {
                                    return None;
                                }
                                found = Some(action);
                            }
                        }
                    }
                }
            }
        }
        found
    }

    fn arpeggio_press(&mut self, button: Button, now_micros: u64) {
        match self.arpeggio.state {
            ArpeggioState::Ready => {
                self.arpeggio.state = ArpeggioState::OneDown;
                self.arpeggio.started_micros = now_micros;
                self.arpeggio.first = button;
            }
            ArpeggioState::OneDown => {
                let spacing = now_micros.saturating_sub(self.arpeggio.started_micros);
                if spacing >= self.params.arpeggio_min_spacing_micros {
                    self.arpeggio.state = ArpeggioState::TwoDown;
                    self.arpeggio.started_micros = now_micros;
                    self.arpeggio.second = button;
                } else {
                    self.arpeggio.state = ArpeggioState::Inactive;
                }
            }
            _ => self.arpeggio.state = ArpeggioState::Inactive,
        }
    }

    /// Returns true when an arpeggio action fired; the ordinary release
    /// handling is skipped in that case.
    fn arpeggio_release<H: Host>(&mut self, now_micros: u64, host: &mut H) -> bool {
        if self.arpeggio.state != ArpeggioState::TwoDown {
            return false;
        }
        self.arpeggio.state = ArpeggioState::Inactive;

        let held = now_micros.saturating_sub(self.arpeggio.started_micros);
        if held > self.params.arpeggio_max_hold_micros {
            return false;
        }
        let Some(action) = self.arpeggios.get(self.arpeggio.first, self.arpeggio.second) else {
            return false;
        };
        self.execute(action, host);
        self.cancel_autostart(host);
        true
    }

    // Action execution.  Start walks the chain head to tail, stop walks it
    // back tail to head, so the HID traffic nests.

    fn start<H: Host>(&mut self, id: ActionId, host: &mut H) {
        let node = self.actions.node(id);
        self.start_node(node.kind, host);
        if let Some(next) = node.next {
            self.start(next, host);
        }
    }

    fn stop<H: Host>(&mut self, id: ActionId, host: &mut H) {
        let node = self.actions.node(id);
        if let Some(next) = node.next {
            self.stop(next, host);
        }
        self.stop_node(node.kind, host);
    }

    fn execute<H: Host>(&mut self, id: ActionId, host: &mut H) {
        self.start(id, host);
        self.stop(id, host);
    }

    fn start_node<H: Host>(&mut self, kind: Kind, host: &mut H) {
        match kind {
            Kind::Key(key) => host.press(key),
            Kind::TempMod(modifier) => {
                if let Some(pos) = self.temp_mods.iter().position(|&m| m == modifier) {
                    // Tapping the same modifier chord again clears it.
                    host.release(modifier);
                    self.temp_mods.remove(pos);
                } else {
                    host.press(modifier);
                    if self.temp_mods.push(modifier).is_err() {
                        warn!("temporary modifier list full");
                    }
                }
            }
            Kind::HoldMod { anchor, modifier, release } => {
                if self.active_action[anchor as usize].is_some() {
                    // The anchor already owes a stop; the modifier stays as
                    // it is.
                    return;
                }
                host.press(modifier);
                self.active_action[anchor as usize] = Some(release);
            }
            Kind::ReleaseHold(_) => {}
        }
    }

    fn stop_node<H: Host>(&mut self, kind: Kind, host: &mut H) {
        match kind {
            Kind::Key(key) => {
                host.release(key);
                self.release_temp_mods(host);
            }
            Kind::TempMod(_) => {}
            Kind::HoldMod { .. } => {}
            Kind::ReleaseHold(modifier) => host.release(modifier),
        }
    }

    fn release_temp_mods<H: Host>(&mut self, host: &mut H) {
        for &modifier in self.temp_mods.iter() {
            host.release(modifier);
        }
        self.temp_mods.clear();
    }
}
