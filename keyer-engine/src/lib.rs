//! Keyer input engine
//!
//! Core of a ten-button, one-handed chord keyboard: five fingers, each with a
//! short column of buttons (three under the thumb, two under index, middle and
//! ring, one under the little finger).  Pressing a combination of buttons forms
//! a chord that maps to a keystroke, a modifier, or a small action chain sent
//! to the host over a wireless HID link.
//!
//! Everything hardware-specific is reached through the [`Host`] trait: the
//! monotonic clock, ground-truth GPIO reads, one-shot timers, and the HID
//! transport.  Edge interrupts only post an [`EdgeEvent`] into an [`EdgeQueue`];
//! a single dispatcher task drains the queue and drives the debouncers, the
//! gesture recognizer and all timer callbacks, so none of the state in this
//! crate needs locking.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;

pub use usbd_human_interface_device::page::Keyboard;

pub mod action;
pub mod debounce;
pub mod dispatch;
pub mod engine;
pub mod layer;
pub mod layout;
pub mod pairing;

#[cfg(not(feature = "defmt"))]
mod log {
    pub use ::log::info;
    pub use ::log::warn;
}

#[cfg(feature = "defmt")]
mod log {
    pub use ::defmt::info;
    pub use ::defmt::warn;
}

/// A physical switch, numbered 0-9.
pub type Button = u8;

/// How many switches the hand covers.
pub const NUM_BUTTONS: usize = 10;

// The buttons, named by finger and position along the finger's column.  The
// numbering matches the wiring order on the reference board; the arpeggio and
// chord tables index by these values.
pub const THUMB_1: Button = 0;
pub const THUMB_2: Button = 1;
pub const THUMB_3: Button = 2;
pub const INDEX_1: Button = 3;
pub const MIDDLE_1: Button = 4;
pub const RING_1: Button = 5;
pub const LITTLE_1: Button = 6;
pub const INDEX_2: Button = 7;
pub const MIDDLE_2: Button = 8;
pub const RING_2: Button = 9;

/// GPIO pin carrying each button.  Buttons are wired active-low with pull-ups.
pub const BUTTON_PINS: [u8; NUM_BUTTONS] = [2, 5, 0, 46, 13, 35, 37, 38, 8, 42];

/// The five fingers, thumb first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const COUNT: usize = 5;

    pub const ALL: [Finger; Finger::COUNT] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Little,
    ];

    /// Number of buttons in this finger's column.
    pub const fn buttons(self) -> u8 {
        match self {
            Finger::Thumb => 3,
            Finger::Index | Finger::Middle | Finger::Ring => 2,
            Finger::Little => 1,
        }
    }
}

/// Debounced key events indicate buttons going down or up.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum KeyEvent {
    Press(Button),
    Release(Button),
}

impl KeyEvent {
    pub fn button(&self) -> Button {
        match self {
            KeyEvent::Press(b) => *b,
            KeyEvent::Release(b) => *b,
        }
    }

    pub fn is_press(&self) -> bool {
        matches!(self, KeyEvent::Press(_))
    }
}

/// A raw edge record, posted from interrupt context.
///
/// The interrupt handler does nothing but construct one of these and push it
/// onto the [`EdgeQueue`]; if the queue is full the event is dropped, and the
/// debouncer's ground-truth read repairs the state once the storm passes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EdgeEvent {
    pub button: Button,
    pub micros: u64,
}

/// Interrupt-to-dispatcher queue.  Every button interrupt is a producer, so
/// this has to be the lock-free multi-producer flavor.
pub type EdgeQueue = heapless::mpmc::MpMcQueue<EdgeEvent, 128>;

/// The one-shot timers the input stack asks the [`Host`] to run.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TimerId {
    /// Ground-truth re-read for one button.
    Debounce(Button),
    /// A held chord is about to autostart.
    ChordAutostart,
    /// Periodic battery report.
    Battery,
}

/// Everything the input stack needs from the board and the HID transport.
///
/// One implementation per target; tests supply a scripted fake.  All methods
/// are called from the dispatcher task only, never from interrupt context.
/// Timer callbacks must be delivered on that same task.
pub trait Host {
    /// Monotonic microseconds.
    fn now_micros(&self) -> u64;

    /// Ground-truth read of a button's GPIO.  True means pressed.
    fn button_pressed(&self, button: Button) -> bool;

    /// Arm a one-shot timer, restarting it if it is already pending.
    fn arm_timer(&mut self, id: TimerId, after_micros: u64);

    /// Cancel a pending timer.  Cancelling an idle timer is a no-op.
    fn cancel_timer(&mut self, id: TimerId);

    /// Press a key on the HID link.
    fn press(&mut self, key: Keyboard);

    /// Release a key on the HID link.
    fn release(&mut self, key: Keyboard);

    /// Report the battery charge to the host.
    fn set_battery_level(&mut self, percent: u8);

    /// Is the HID link up?
    fn is_connected(&self) -> bool;

    /// Battery voltage in millivolts.
    fn battery_millivolts(&self) -> u32;
}

/// Chords started by holding instead of tapping are disabled by default; the
/// delay is long enough to never fire.  Set [`Params::autostart_delay_micros`]
/// to something like 350 ms once chords should also work as held keys.
pub const AUTOSTART_OFF_MICROS: u64 = u64::MAX / 2;

/// Timing knobs for the gesture recognizer.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// How long a chord must be held before its action starts without waiting
    /// for the release.
    pub autostart_delay_micros: u64,

    /// The two arpeggio buttons must go down at least this far apart.
    pub arpeggio_min_spacing_micros: u64,

    /// The second arpeggio button must come back up within this long.
    pub arpeggio_max_hold_micros: u64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            autostart_delay_micros: AUTOSTART_OFF_MICROS,
            arpeggio_min_spacing_micros: 80_000,
            arpeggio_max_hold_micros: 240_000,
        }
    }
}
