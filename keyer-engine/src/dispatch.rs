//! Event dispatch: the single task that owns the input stack.
//!
//! The firmware's main loop blocks on the [`EdgeQueue`](crate::EdgeQueue) and
//! hands every record to [`Dispatcher::handle_edge`]; the board's timer
//! service delivers expired timers to [`Dispatcher::handle_timer`] on the same
//! task.  That one task therefore serializes the debouncers, the gesture
//! recognizer and PIN entry, and nothing here needs a lock.

use crate::debounce::Debouncer;
use crate::engine::InputEngine;
use crate::log::{info, warn};
use crate::pairing::PassKey;
use crate::{Button, EdgeEvent, Host, KeyEvent, TimerId, NUM_BUTTONS};

/// How often the battery level is reported.
pub const BATTERY_PERIOD_MICROS: u64 = 5_000_000;

/// Map battery voltage to a charge percentage.  The discharge range was
/// measured on the reference hardware with a multimeter.
pub fn battery_percent(millivolts: u32) -> u8 {
    const EMPTY_MV: u32 = 3_000;
    const FULL_MV: u32 = 4_185;
    let clamped = millivolts.clamp(EMPTY_MV, FULL_MV);
    ((clamped - EMPTY_MV) * 100 / (FULL_MV - EMPTY_MV)) as u8
}

/// Owns the per-button debouncers, the gesture recognizer and the PIN entry
/// buffer, and routes events between them.
pub struct Dispatcher {
    debouncers: [Debouncer; NUM_BUTTONS],
    engine: InputEngine,
    passkey: PassKey,
}

impl Dispatcher {
    /// Reads the initial GPIO levels through `host`.
    pub fn new<H: Host>(engine: InputEngine, host: &H) -> Dispatcher {
        Dispatcher {
            debouncers: core::array::from_fn(|button| Debouncer::new(button as Button, host)),
            engine,
            passkey: PassKey::new(),
        }
    }

    /// Arm the recurring timers.  Call once before entering the event loop.
    pub fn start<H: Host>(&mut self, host: &mut H) {
        host.arm_timer(TimerId::Battery, BATTERY_PERIOD_MICROS);
    }

    /// A raw edge record arrived from interrupt context.
    pub fn handle_edge<H: Host>(&mut self, event: EdgeEvent, host: &mut H) {
        if let Some(key_event) = self.debouncers[event.button as usize].on_edge(event.micros, host)
        {
            self.deliver(key_event, host);
        }
    }

    /// A one-shot timer expired.
    pub fn handle_timer<H: Host>(&mut self, id: TimerId, host: &mut H) {
        match id {
            TimerId::Debounce(button) => {
                if let Some(key_event) = self.debouncers[button as usize].on_timer(host) {
                    self.deliver(key_event, host);
                }
            }
            TimerId::ChordAutostart => self.engine.on_autostart(host),
            TimerId::Battery => {
                host.set_battery_level(battery_percent(host.battery_millivolts()));
                host.arm_timer(TimerId::Battery, BATTERY_PERIOD_MICROS);
            }
        }
    }

    fn deliver<H: Host>(&mut self, event: KeyEvent, host: &mut H) {
        if self.passkey.is_collecting() {
            // During pairing the buttons type the PIN: button N is digit N.
            if let KeyEvent::Press(button) = event {
                self.passkey.push_digit(button);
            }
            return;
        }
        if !host.is_connected() {
            info!("link down, dropping event");
            return;
        }
        self.engine.handle_event(event, host.now_micros(), host);
    }

    pub fn engine_mut(&mut self) -> &mut InputEngine {
        &mut self.engine
    }

    // The transport's security callbacks land here.

    /// The host wants us to produce a passkey.  Start collecting digits; the
    /// caller then waits (on its own task, with its own timeout) for
    /// [`Dispatcher::finish_passkey_entry`] while this task keeps pumping
    /// events.
    pub fn on_passkey_request(&mut self) {
        info!("pairing: type the 6-digit PIN on the keyboard");
        self.passkey.begin();
    }

    /// Six digits arrived, or the caller gave up waiting.
    pub fn finish_passkey_entry(&mut self) -> u32 {
        self.passkey.finish()
    }

    /// Is the PIN fully entered?
    pub fn passkey_complete(&self) -> bool {
        self.passkey.is_complete()
    }

    /// The host is displaying a PIN for confirmation elsewhere.
    pub fn on_passkey_notify(&self, passkey: u32) {
        info!("pairing: PIN displayed: {}", passkey);
    }

    /// Numeric-comparison confirmation; the keyboard cannot show the value,
    /// so accept.
    pub fn on_passkey_confirm(&self, passkey: u32) -> bool {
        info!("pairing: confirming PIN: {}", passkey);
        true
    }

    /// Pairing finished, one way or the other.
    pub fn on_authentication_complete(&mut self, success: bool) {
        if success {
            info!("pairing complete");
        } else {
            warn!("pairing failed");
        }
        // A half-entered PIN is useless either way.
        self.passkey.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_curve_endpoints() {
        assert_eq!(battery_percent(2_500), 0);
        assert_eq!(battery_percent(3_000), 0);
        assert_eq!(battery_percent(4_185), 100);
        assert_eq!(battery_percent(4_400), 100);
    }

    #[test]
    fn battery_curve_midpoint() {
        let mid = battery_percent(3_592);
        assert!((49..=51).contains(&mid), "got {}", mid);
    }
}
