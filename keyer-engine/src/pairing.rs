//! Pairing PIN entry.
//!
//! When the transport asks for a passkey, the keyboard has no display, so the
//! PIN shown by the host is typed on the buttons themselves: button N enters
//! the digit N.  The transport's security task blocks (up to
//! [`PASSKEY_TIMEOUT_MICROS`]) waiting for the buffer to fill while the
//! dispatcher keeps pumping GPIO events into it; if the wait times out, the
//! fallback PIN is used.

/// Digits in a pairing PIN.
pub const PASSKEY_DIGITS: usize = 6;

/// Used when entry times out before six digits arrived.
pub const PASSKEY_FALLBACK: u32 = 123_456;

/// How long the security task should wait for the PIN.
pub const PASSKEY_TIMEOUT_MICROS: u64 = 30_000_000;

/// PIN entry buffer.
pub struct PassKey {
    collecting: bool,
    digits: heapless::Vec<u8, PASSKEY_DIGITS>,
}

impl PassKey {
    pub fn new() -> PassKey {
        PassKey { collecting: false, digits: heapless::Vec::new() }
    }

    /// Start collecting a fresh PIN.
    pub fn begin(&mut self) {
        self.collecting = true;
        self.digits.clear();
    }

    /// Button presses are routed here instead of the gesture recognizer while
    /// this is true.
    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    /// Record one digit.  Extra digits beyond the PIN length are ignored.
    pub fn push_digit(&mut self, digit: u8) {
        if self.collecting {
            let _ = self.digits.push(digit);
        }
    }

    /// Have six digits been entered?
    pub fn is_complete(&self) -> bool {
        self.digits.len() == PASSKEY_DIGITS
    }

    /// End collection and yield the PIN, falling back if entry was cut short.
    pub fn finish(&mut self) -> u32 {
        self.collecting = false;
        if self.is_complete() {
            self.digits.iter().fold(0u32, |pin, &digit| pin * 10 + u32::from(digit))
        } else {
            PASSKEY_FALLBACK
        }
    }
}

impl Default for PassKey {
    fn default() -> PassKey {
        PassKey::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_six_digits() {
        let mut passkey = PassKey::new();
        passkey.begin();
        for digit in [3, 0, 7, 7, 4, 1] {
            assert!(!passkey.is_complete());
            passkey.push_digit(digit);
        }
        assert!(passkey.is_complete());
        assert_eq!(passkey.finish(), 307_741);
        assert!(!passkey.is_collecting());
    }

    #[test]
    fn timeout_yields_fallback() {
        let mut passkey = PassKey::new();
        passkey.begin();
        passkey.push_digit(9);
        assert_eq!(passkey.finish(), PASSKEY_FALLBACK);
    }

    #[test]
    fn digits_outside_collection_are_dropped() {
        let mut passkey = PassKey::new();
        passkey.push_digit(5);
        passkey.begin();
        for digit in [1, 2, 3, 4, 5, 6, 7] {
            passkey.push_digit(digit);
        }
        // The seventh digit fell off the end.
        assert_eq!(passkey.finish(), 123_456);
    }

    #[test]
    fn begin_discards_a_stale_pin() {
        let mut passkey = PassKey::new();
        passkey.begin();
        for digit in [1, 1, 1, 1, 1, 1] {
            passkey.push_digit(digit);
        }
        passkey.begin();
        assert!(!passkey.is_complete());
        assert_eq!(passkey.finish(), PASSKEY_FALLBACK);
    }
}
