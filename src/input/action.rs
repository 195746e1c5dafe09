//! Player actions and raw input events

/// Largest absolute value reported by an analog axis
pub const MAX_VALUE: i32 = 32768;

/// Default gamepad dead zone
pub const DEADZONE_JOYSTICK: i32 = 2000;

/// Actions a player can trigger, game actions first, then menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerAction {
    SteerLeft,
    SteerRight,
    Accel,
    Brake,
    Nitro,
    Drift,
    Rescue,
    Fire,
    LookBack,
    PauseRace,
    MenuUp,
    MenuDown,
    MenuLeft,
    MenuRight,
    MenuSelect,
    MenuCancel,
}

impl PlayerAction {
    pub const COUNT: usize = 16;

    pub const ALL: [PlayerAction; Self::COUNT] = [
        PlayerAction::SteerLeft,
        PlayerAction::SteerRight,
        PlayerAction::Accel,
        PlayerAction::Brake,
        PlayerAction::Nitro,
        PlayerAction::Drift,
        PlayerAction::Rescue,
        PlayerAction::Fire,
        PlayerAction::LookBack,
        PlayerAction::PauseRace,
        PlayerAction::MenuUp,
        PlayerAction::MenuDown,
        PlayerAction::MenuLeft,
        PlayerAction::MenuRight,
        PlayerAction::MenuSelect,
        PlayerAction::MenuCancel,
    ];

    const FIRST_MENU: usize = PlayerAction::MenuUp as usize;

    /// In-race actions (`SteerLeft..=PauseRace`)
    pub fn game_actions() -> &'static [PlayerAction] {
        &Self::ALL[..Self::FIRST_MENU]
    }

    /// Menu navigation actions (`MenuUp..=MenuCancel`)
    pub fn menu_actions() -> &'static [PlayerAction] {
        &Self::ALL[Self::FIRST_MENU..]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_menu_action(self) -> bool {
        self.index() >= Self::FIRST_MENU
    }

    /// Name used in configuration files
    pub fn name(self) -> &'static str {
        match self {
            PlayerAction::SteerLeft => "steer-left",
            PlayerAction::SteerRight => "steer-right",
            PlayerAction::Accel => "accel",
            PlayerAction::Brake => "brake",
            PlayerAction::Nitro => "nitro",
            PlayerAction::Drift => "drift",
            PlayerAction::Rescue => "rescue",
            PlayerAction::Fire => "fire",
            PlayerAction::LookBack => "look-back",
            PlayerAction::PauseRace => "pause-race",
            PlayerAction::MenuUp => "menu-up",
            PlayerAction::MenuDown => "menu-down",
            PlayerAction::MenuLeft => "menu-left",
            PlayerAction::MenuRight => "menu-right",
            PlayerAction::MenuSelect => "menu-select",
            PlayerAction::MenuCancel => "menu-cancel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Where input is currently routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDriverMode {
    Menu,
    InGame,
}

/// Kind of hardware input a binding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputType {
    Keyboard,
    StickMotion,
    StickButton,
    CanBus,
}

/// Direction of an analog axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisDirection {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl AxisDirection {
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v < 0 => AxisDirection::Negative,
            v if v > 0 => AxisDirection::Positive,
            _ => AxisDirection::Neutral,
        }
    }
}

/// One raw hardware event as delivered by the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    /// Keyboard key by SDL keycode
    Key { code: i32, pressed: bool },
    /// Gamepad button
    Button { id: i32, pressed: bool },
    /// Gamepad axis with its signed raw value
    Axis { id: i32, value: i32 },
    /// Decoded CAN-bus frame
    Can { id: i32, value: i32 },
}

impl RawInput {
    pub fn input_type(&self) -> InputType {
        match self {
            RawInput::Key { .. } => InputType::Keyboard,
            RawInput::Button { .. } => InputType::StickButton,
            RawInput::Axis { .. } => InputType::StickMotion,
            RawInput::Can { .. } => InputType::CanBus,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            RawInput::Key { code, .. } => code,
            RawInput::Button { id, .. } | RawInput::Axis { id, .. } | RawInput::Can { id, .. } => {
                id
            }
        }
    }

    /// Digital inputs report `MAX_VALUE` while pressed and 0 when released
    pub fn value(&self) -> i32 {
        match *self {
            RawInput::Key { pressed, .. } | RawInput::Button { pressed, .. } => {
                if pressed {
                    MAX_VALUE
                } else {
                    0
                }
            }
            RawInput::Axis { value, .. } | RawInput::Can { value, .. } => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ranges() {
        assert_eq!(PlayerAction::game_actions().len(), 10);
        assert_eq!(PlayerAction::menu_actions().len(), 6);
        assert!(PlayerAction::game_actions()
            .iter()
            .all(|a| !a.is_menu_action()));
        assert_eq!(PlayerAction::menu_actions()[0], PlayerAction::MenuUp);
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in PlayerAction::ALL {
            assert_eq!(PlayerAction::from_name(action.name()), Some(action));
        }
        assert_eq!(PlayerAction::from_name("ACCEL"), Some(PlayerAction::Accel));
        assert_eq!(PlayerAction::from_name("jump"), None);
    }

    #[test]
    fn test_axis_direction_from_value() {
        assert_eq!(AxisDirection::from_value(-5), AxisDirection::Negative);
        assert_eq!(AxisDirection::from_value(0), AxisDirection::Neutral);
        assert_eq!(AxisDirection::from_value(7), AxisDirection::Positive);
    }

    #[test]
    fn test_raw_input_values() {
        let key = RawInput::Key { code: 32, pressed: true };
        assert_eq!(key.input_type(), InputType::Keyboard);
        assert_eq!(key.value(), MAX_VALUE);
        assert_eq!(RawInput::Button { id: 1, pressed: false }.value(), 0);
        let axis = RawInput::Axis { id: 2, value: -300 };
        assert_eq!(axis.id(), 2);
        assert_eq!(axis.value(), -300);
    }
}
