//! Gamepad axis and button state
//!
//! Axis samples go through two filters before they are mapped:
//!
//! - an axis is only trusted once two different raw values have been read
//!   from it. Some hardware reports hats, analog switches or even disks as
//!   joystick axes that keep sending one constant value.
//! - values inside the dead zone count as a centered stick and release
//!   whichever direction was held before.

use super::action::{AxisDirection, DEADZONE_JOYSTICK, MAX_VALUE};

/// Result of feeding one axis sample through [`GamepadState::update_axis`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisUpdate {
    /// Directions whose bound actions must be released, in order
    resets: [Option<AxisDirection>; 2],
    /// Whether the sample should be mapped to an action
    pub passed: bool,
}

impl AxisUpdate {
    fn push_reset(&mut self, direction: AxisDirection) {
        if let Some(slot) = self.resets.iter_mut().find(|r| r.is_none()) {
            *slot = Some(direction);
        }
    }

    pub fn resets(&self) -> impl Iterator<Item = AxisDirection> + '_ {
        self.resets.iter().flatten().copied()
    }
}

/// Per-axis and per-button state of one gamepad
#[derive(Debug, Clone)]
pub struct GamepadState {
    /// Hardware index of the stick
    index: u32,
    deadzone: i32,
    prev_axis_directions: Vec<AxisDirection>,
    /// First value read from each axis while it is not yet trusted
    prev_axis_values: Vec<Option<i32>>,
    axis_ok: Vec<bool>,
    button_pressed: Vec<bool>,
}

impl GamepadState {
    pub fn new(index: u32, axis_count: usize, button_count: usize) -> Self {
        Self {
            index,
            deadzone: DEADZONE_JOYSTICK,
            prev_axis_directions: vec![AxisDirection::Neutral; axis_count],
            prev_axis_values: vec![None; axis_count],
            axis_ok: vec![false; axis_count],
            button_pressed: vec![false; button_count],
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn axis_count(&self) -> usize {
        self.axis_ok.len()
    }

    pub fn button_count(&self) -> usize {
        self.button_pressed.len()
    }

    pub fn deadzone(&self) -> i32 {
        self.deadzone
    }

    /// Set the dead zone, clamped to the axis range
    pub fn set_deadzone(&mut self, deadzone: i32) {
        self.deadzone = deadzone.clamp(0, MAX_VALUE);
    }

    pub fn is_axis_valid(&self, axis: usize) -> bool {
        self.axis_ok.get(axis).copied().unwrap_or(false)
    }

    pub fn prev_direction(&self, axis: usize) -> AxisDirection {
        self.prev_axis_directions
            .get(axis)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_button_pressed(&self, button: usize) -> bool {
        self.button_pressed.get(button).copied().unwrap_or(false)
    }

    pub fn set_button_pressed(&mut self, button: usize, pressed: bool) {
        if let Some(state) = self.button_pressed.get_mut(button) {
            *state = pressed;
        }
    }

    /// Feed one axis sample through the validity and dead zone filters.
    ///
    /// `track_resets` is set when a player owns the device; only then are
    /// direction releases reported. `axis` must be below [`axis_count`].
    ///
    /// [`axis_count`]: GamepadState::axis_count
    pub fn update_axis(&mut self, axis: usize, value: i32, track_resets: bool) -> AxisUpdate {
        let mut update = AxisUpdate::default();
        let prev = self.prev_axis_directions[axis];

        if track_resets {
            if value < 0 && prev == AxisDirection::Positive {
                update.push_reset(AxisDirection::Positive);
            } else if value > 0 && prev == AxisDirection::Negative {
                update.push_reset(AxisDirection::Negative);
            }
        }

        if value != 0 {
            self.prev_axis_directions[axis] = AxisDirection::from_value(value);
        }

        if !self.axis_ok[axis] {
            match self.prev_axis_values[axis] {
                None => self.prev_axis_values[axis] = Some(value),
                Some(first) if first != value => self.axis_ok[axis] = true,
                Some(_) => {}
            }
        }

        if value > -self.deadzone && value < self.deadzone {
            let held = self.prev_axis_directions[axis];
            if track_resets && self.axis_ok[axis] && held != AxisDirection::Neutral {
                update.push_reset(held);
            }
            self.prev_axis_directions[axis] = AxisDirection::Neutral;
            return update;
        }

        update.passed = self.axis_ok[axis];
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sizes_arrays() {
        let pad = GamepadState::new(1, 4, 12);
        assert_eq!(pad.index(), 1);
        assert_eq!(pad.axis_count(), 4);
        assert_eq!(pad.button_count(), 12);
        assert_eq!(pad.deadzone(), DEADZONE_JOYSTICK);
        assert!(!pad.is_axis_valid(0));
        assert!(!pad.is_axis_valid(10));
    }

    #[test]
    fn test_axis_invalid_until_two_distinct_values() {
        let mut pad = GamepadState::new(0, 2, 0);

        assert!(!pad.update_axis(0, 20000, false).passed);
        assert!(!pad.is_axis_valid(0));

        // Same value again: still a stuck axis
        assert!(!pad.update_axis(0, 20000, false).passed);
        assert!(!pad.is_axis_valid(0));

        assert!(pad.update_axis(0, 21000, false).passed);
        assert!(pad.is_axis_valid(0));
        assert!(!pad.is_axis_valid(1));
    }

    #[test]
    fn test_first_sample_of_minus_one_counts() {
        let mut pad = GamepadState::new(0, 1, 0);
        pad.update_axis(0, -1, false);
        pad.update_axis(0, -1, false);
        assert!(!pad.is_axis_valid(0));
        pad.update_axis(0, -30000, false);
        assert!(pad.is_axis_valid(0));
    }

    #[test]
    fn test_dead_zone_after_validation() {
        let mut pad = GamepadState::new(0, 1, 0);
        pad.update_axis(0, 100, false);
        pad.update_axis(0, 30000, false);
        assert!(pad.is_axis_valid(0));

        assert!(!pad.update_axis(0, 1999, false).passed);
        assert!(!pad.update_axis(0, -1999, false).passed);
        assert!(pad.update_axis(0, 2000, false).passed);
        assert!(pad.update_axis(0, -2000, false).passed);
    }

    #[test]
    fn test_dead_zone_releases_held_direction() {
        let mut pad = GamepadState::new(0, 1, 0);
        pad.update_axis(0, 0, true);
        let update = pad.update_axis(0, -25000, true);
        assert!(update.passed);
        assert_eq!(update.resets().count(), 0);
        assert_eq!(pad.prev_direction(0), AxisDirection::Negative);

        let update = pad.update_axis(0, -500, true);
        assert!(!update.passed);
        assert_eq!(update.resets().collect::<Vec<_>>(), vec![AxisDirection::Negative]);
        assert_eq!(pad.prev_direction(0), AxisDirection::Neutral);
    }

    #[test]
    fn test_sign_flip_releases_opposite_direction() {
        let mut pad = GamepadState::new(0, 1, 0);
        pad.update_axis(0, 0, true);
        pad.update_axis(0, 25000, true);

        let update = pad.update_axis(0, -25000, true);
        assert!(update.passed);
        assert_eq!(update.resets().collect::<Vec<_>>(), vec![AxisDirection::Positive]);
        assert_eq!(pad.prev_direction(0), AxisDirection::Negative);
    }

    #[test]
    fn test_no_resets_without_player() {
        let mut pad = GamepadState::new(0, 1, 0);
        pad.update_axis(0, 0, false);
        pad.update_axis(0, 25000, false);
        assert_eq!(pad.update_axis(0, -25000, false).resets().count(), 0);
        assert_eq!(pad.update_axis(0, 0, false).resets().count(), 0);
    }

    #[test]
    fn test_set_deadzone_clamps() {
        let mut pad = GamepadState::new(0, 1, 0);
        pad.set_deadzone(5000);
        assert_eq!(pad.deadzone(), 5000);
        pad.set_deadzone(-100);
        assert_eq!(pad.deadzone(), 0);
        pad.set_deadzone(50000);
        assert_eq!(pad.deadzone(), MAX_VALUE);
    }

    #[test]
    fn test_button_state() {
        let mut pad = GamepadState::new(0, 0, 3);
        pad.set_button_pressed(2, true);
        assert!(pad.is_button_pressed(2));
        assert!(!pad.is_button_pressed(1));
        // Out of range is ignored
        pad.set_button_pressed(7, true);
        assert!(!pad.is_button_pressed(7));
        pad.set_button_pressed(2, false);
        assert!(!pad.is_button_pressed(2));
    }
}
