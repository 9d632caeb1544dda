//! Zero-latency button debouncing.
//!
//! The first edge after a quiet period is reported immediately.  Edges inside
//! the debounce window are ignored, and every edge re-arms a one-shot timer
//! that re-reads the GPIO once the window has passed; if the settled level
//! disagrees with what was reported, a corrective event goes out.  The result
//! is zero added latency with a worst-case mis-report bounded by one window,
//! at the price of a minimum reported press duration of the same window.

use crate::{Button, Host, KeyEvent, TimerId};

/// The shortest physically possible press measured on the reference hardware
/// was a little over 15 ms.
pub const DEBOUNCE_MICROS: u64 = 15_000;

/// Per-button debounce state.
pub struct Debouncer {
    button: Button,
    pressed: bool,
    last_change_micros: u64,
}

impl Debouncer {
    pub fn new<H: Host>(button: Button, host: &H) -> Debouncer {
        Debouncer {
            button,
            pressed: host.button_pressed(button),
            last_change_micros: host.now_micros(),
        }
    }

    /// An edge interrupt fired for this button at `micros`.
    pub fn on_edge<H: Host>(&mut self, micros: u64, host: &mut H) -> Option<KeyEvent> {
        let delta = micros.saturating_sub(self.last_change_micros);
        self.last_change_micros = micros;
        let event = if delta > DEBOUNCE_MICROS {
            self.pressed = !self.pressed;
            Some(self.report())
        } else {
            // Bounce inside the window.  The ground-truth read below repairs
            // any resulting mis-report.
            None
        };
        host.arm_timer(TimerId::Debounce(self.button), DEBOUNCE_MICROS);
        event
    }

    /// The deferred ground-truth read.
    pub fn on_timer<H: Host>(&mut self, host: &mut H) -> Option<KeyEvent> {
        let pressed = host.button_pressed(self.button);
        if pressed != self.pressed {
            self.pressed = pressed;
            self.last_change_micros = host.now_micros();
            Some(self.report())
        } else {
            None
        }
    }

    fn report(&self) -> KeyEvent {
        if self.pressed {
            KeyEvent::Press(self.button)
        } else {
            KeyEvent::Release(self.button)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbd_human_interface_device::page::Keyboard;

    /// Just enough of a host for the debouncer: a clock and one GPIO level.
    struct PinHost {
        now: u64,
        level: bool,
        armed: Option<u64>,
    }

    impl Host for PinHost {
        fn now_micros(&self) -> u64 {
            self.now
        }
        fn button_pressed(&self, _button: Button) -> bool {
            self.level
        }
        fn arm_timer(&mut self, _id: TimerId, after_micros: u64) {
            self.armed = Some(self.now + after_micros);
        }
        fn cancel_timer(&mut self, _id: TimerId) {
            self.armed = None;
        }
        fn press(&mut self, _key: Keyboard) {}
        fn release(&mut self, _key: Keyboard) {}
        fn set_battery_level(&mut self, _percent: u8) {}
        fn is_connected(&self) -> bool {
            true
        }
        fn battery_millivolts(&self) -> u32 {
            3_700
        }
    }

    fn setup() -> (Debouncer, PinHost) {
        let mut host = PinHost { now: 0, level: false, armed: None };
        let debouncer = Debouncer::new(0, &host);
        host.now = 1_000_000;
        (debouncer, host)
    }

    /// Well-spaced edges are reported one for one.
    #[test]
    fn spaced_edges_pass_through() {
        let (mut debouncer, mut host) = setup();

        host.level = true;
        assert_eq!(debouncer.on_edge(host.now, &mut host), Some(KeyEvent::Press(0)));

        host.now += 50_000;
        host.level = false;
        assert_eq!(debouncer.on_edge(host.now, &mut host), Some(KeyEvent::Release(0)));

        host.now += 50_000;
        host.level = true;
        assert_eq!(debouncer.on_edge(host.now, &mut host), Some(KeyEvent::Press(0)));
    }

    /// Edges inside the window are swallowed, and the timer is re-armed each
    /// time.
    #[test]
    fn bounces_are_swallowed() {
        let (mut debouncer, mut host) = setup();

        host.level = true;
        assert!(debouncer.on_edge(host.now, &mut host).is_some());

        host.now += 2_000;
        host.level = false;
        assert_eq!(debouncer.on_edge(host.now, &mut host), None);
        host.now += 2_000;
        host.level = true;
        assert_eq!(debouncer.on_edge(host.now, &mut host), None);
        assert_eq!(host.armed, Some(host.now + DEBOUNCE_MICROS));

        // Once quiet, the ground truth matches what was reported.
        host.now += DEBOUNCE_MICROS;
        assert_eq!(debouncer.on_timer(&mut host), None);
    }

    /// A bounce storm that ends on the wrong level is corrected by the
    /// deferred read.
    #[test]
    fn ground_truth_corrects_a_missed_release() {
        let (mut debouncer, mut host) = setup();

        host.level = true;
        assert_eq!(debouncer.on_edge(host.now, &mut host), Some(KeyEvent::Press(0)));

        // Release bounces arrive inside the window and get ignored, leaving
        // the reported state stuck at pressed.
        host.now += 3_000;
        host.level = false;
        assert_eq!(debouncer.on_edge(host.now, &mut host), None);

        host.now += DEBOUNCE_MICROS;
        assert_eq!(debouncer.on_timer(&mut host), Some(KeyEvent::Release(0)));

        // And the correction counts as a change for the next window.
        assert_eq!(debouncer.on_timer(&mut host), None);
    }
}
