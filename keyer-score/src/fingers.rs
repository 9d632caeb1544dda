//! The hand model.
//!
//! A [`Fingers`] value is one hand pose: which fingers are pressing and which
//! row of its column each finger hovers over.  [`Fingers::transition_to`]
//! mutates the pose into a target chord and returns the cost in milliseconds,
//! following how a practiced hand actually moves:
//!
//! - Fingers are lazy.  Only fingers the target chord uses move; everything
//!   else stays parked where it last was.
//! - Moving a held finger releases it along the way, so the move doubles as
//!   the release that terminates the previous chord.
//! - Otherwise a previous chord ends in one of two ways: a "rolling" motion
//!   (some finger comes up while another goes down, free), or a forced
//!   re-press of one of the fingers both chords share, which is charged at
//!   double its press cost on top of the press itself.

use keyer_engine::Finger;

/// Fingers on the simulated hand.
pub const NUM_FINGERS: usize = Finger::COUNT;

/// Cost of moving a finger by one row, per finger.
pub const TRAVEL_COST_MS: [u32; NUM_FINGERS] = [80, 100, 110, 150, 130];

/// Cost of pressing a button, by finger and row.
pub const PRESS_COST_MS: [[u32; 3]; NUM_FINGERS] = [
    [60, 40, 60],
    [50, 130, 0],
    [55, 140, 0],
    [60, 150, 0],
    [70, 0, 0],
];

type Mask = u8;

/// One hand pose: a bitmask of pressed fingers (bit 0 = thumb) and the row
/// each finger is over.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fingers {
    pressed: Mask,
    rows: [u8; NUM_FINGERS],
}

impl Default for Fingers {
    /// The resting pose: nothing pressed, the thumb over its middle button,
    /// every other finger over its first.
    fn default() -> Fingers {
        let mut rows = [0; NUM_FINGERS];
        rows[0] = 1;
        Fingers { pressed: 0, rows }
    }
}

impl Fingers {
    /// Build a chord pose from per-finger positions, thumb first: 0 leaves
    /// the finger out, k presses row k-1.  Positions must already be
    /// validated against the hand.
    pub(crate) fn from_positions(positions: &[u8]) -> Fingers {
        let mut fingers = Fingers::default();
        for (finger, &position) in positions.iter().enumerate() {
            if position > 0 {
                fingers.pressed |= 1 << finger;
                fingers.rows[finger] = position - 1;
            }
        }
        fingers
    }

    pub fn is_pressed(&self, finger: usize) -> bool {
        self.pressed & (1 << finger) != 0
    }

    pub fn row(&self, finger: usize) -> u8 {
        self.rows[finger]
    }

    fn release(&mut self, finger: usize) {
        self.pressed &= !(1 << finger);
    }

    fn press(&mut self, finger: usize) {
        self.pressed |= 1 << finger;
    }

    /// Move lazily into the target chord, returning the transition cost.
    /// The cost includes whatever it takes to terminate the chord currently
    /// held, a re-press included when nothing else would do it.
    pub fn transition_to(&mut self, target: &Fingers) -> u32 {
        let mut cost = 0u32;
        let mut re_press_needed = self.pressed != 0;

        // Travel.  A held finger that moves releases on the way.
        let mut to_move = target.pressed;
        while to_move != 0 {
            let finger = to_move.trailing_zeros() as usize;
            to_move &= to_move - 1;
            let distance =
                (i32::from(self.rows[finger]) - i32::from(target.rows[finger])).unsigned_abs();
            if distance != 0 {
                if self.is_pressed(finger) {
                    re_press_needed = false;
                    self.release(finger);
                }
                self.rows[finger] = target.rows[finger];
                cost += TRAVEL_COST_MS[finger] * distance;
            }
        }

        let simple_release = self.pressed & !target.pressed;
        if re_press_needed {
            let new_press = target.pressed & !self.pressed;
            if simple_release != 0 && new_press != 0 {
                // Rolling motion; the release comes for free.
            } else {
                // Forced re-press: pick the cheapest finger both chords
                // share, release it, and charge double its press cost on top
                // of the press it now owes.
                let mut candidates = self.pressed & target.pressed;
                let mut best: Option<(usize, u32)> = None;
                while candidates != 0 {
                    let finger = candidates.trailing_zeros() as usize;
                    candidates &= candidates - 1;
                    let press_cost = PRESS_COST_MS[finger][self.rows[finger] as usize];
                    if best.map_or(true, |(_, cheapest)| press_cost < cheapest) {
                        best = Some((finger, press_cost));
                    }
                }
                if let Some((finger, press_cost)) = best {
                    self.release(finger);
                    cost += press_cost * 2;
                }
            }
        }

        self.pressed &= !simple_release;

        // Press whatever the target still needs.
        let mut to_press = target.pressed & !self.pressed;
        while to_press != 0 {
            let finger = to_press.trailing_zeros() as usize;
            to_press &= to_press - 1;
            self.press(finger);
            cost += PRESS_COST_MS[finger][target.rows[finger] as usize];
        }

        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_chord;

    fn chord(s: &str) -> Fingers {
        parse_chord(s).unwrap()
    }

    /// Typing a chord from rest puts the hand in that pose.
    fn settled(s: &str) -> Fingers {
        let mut fingers = Fingers::default();
        fingers.transition_to(&chord(s));
        fingers
    }

    #[test]
    fn resting_pose() {
        let fingers = Fingers::default();
        assert_eq!(fingers.pressed, 0);
        assert_eq!(fingers.row(0), 1);
        for finger in 1..NUM_FINGERS {
            assert_eq!(fingers.row(finger), 0);
        }
    }

    #[test]
    fn single_press_from_rest() {
        let mut fingers = Fingers::default();
        assert_eq!(fingers.transition_to(&chord("0100")), PRESS_COST_MS[1][0]);
        assert!(fingers.is_pressed(1));
    }

    #[test]
    fn dropping_a_finger_forces_a_re_press() {
        let mut fingers = settled("1100");
        let target = chord("1000");
        // No roll is available: the thumb has to come up and go back down.
        let cost = fingers.transition_to(&target);
        assert_eq!(cost, PRESS_COST_MS[0][0] * 2 + PRESS_COST_MS[0][0]);
        assert_eq!(fingers.pressed, target.pressed);
    }

    #[test]
    fn moving_a_held_finger_releases_on_the_way() {
        let mut fingers = settled("1100");
        let cost = fingers.transition_to(&chord("2100"));
        assert_eq!(cost, TRAVEL_COST_MS[0] + PRESS_COST_MS[0][1]);
    }

    #[test]
    fn finger_swap_rolls_for_free() {
        let mut fingers = settled("2100");
        let target = chord("2010");
        let cost = fingers.transition_to(&target);
        assert_eq!(cost, PRESS_COST_MS[2][0]);
        assert_eq!(fingers.pressed, target.pressed);
    }

    #[test]
    fn adding_a_finger_still_needs_the_re_press() {
        let mut fingers = settled("2100");
        // Nothing is released, so the cheapest shared finger (the thumb on
        // its middle row) re-presses.
        let cost = fingers.transition_to(&chord("2110"));
        assert_eq!(
            cost,
            PRESS_COST_MS[0][1] * 2 + PRESS_COST_MS[2][0] + PRESS_COST_MS[0][1]
        );
    }

    #[test]
    fn travel_scales_with_distance() {
        let mut fingers = settled("1000");
        let cost = fingers.transition_to(&chord("3000"));
        assert_eq!(cost, TRAVEL_COST_MS[0] * 2 + PRESS_COST_MS[0][2]);
        assert_eq!(fingers.row(0), 2);
    }

    #[test]
    fn repeating_a_chord_re_presses_the_cheapest_finger() {
        let mut fingers = settled("2100");
        let cost = fingers.transition_to(&chord("2100"));
        // The thumb on its middle row (40) beats the index (50).
        assert_eq!(cost, 40 * 2 + 40);
    }

    #[test]
    fn repeating_a_full_chord() {
        let mut fingers = settled("2111");
        let cost = fingers.transition_to(&chord("2111"));
        assert_eq!(cost, 40 * 2 + 40);
    }

    #[test]
    fn mixed_travel_release_and_press() {
        let mut fingers = settled("1200");
        let target = chord("0120");
        let cost = fingers.transition_to(&target);
        // Index walks down a row, middle walks up one; the thumb's release
        // rides the index move, so nothing is re-pressed.
        assert_eq!(
            cost,
            TRAVEL_COST_MS[1] + TRAVEL_COST_MS[2] + PRESS_COST_MS[1][0] + PRESS_COST_MS[2][1]
        );
        assert!(!fingers.is_pressed(0));
        assert!(fingers.is_pressed(1));
        assert!(fingers.is_pressed(2));
    }

    #[test]
    fn pose_matches_target_after_transition() {
        let mut fingers = Fingers::default();
        let target = chord("3210");
        fingers.transition_to(&target);
        for finger in 0..NUM_FINGERS {
            assert_eq!(fingers.is_pressed(finger), target.is_pressed(finger));
            if target.is_pressed(finger) {
                assert_eq!(fingers.row(finger), target.row(finger));
            }
        }
    }
}
