//! Input devices
//!
//! A device is one physical controller: a keyboard, a gamepad or a CAN-bus
//! controller. Each device is bound to a configuration profile and at most
//! one active player, and translates raw events into player actions.

use std::sync::Arc;

use parking_lot::RwLock;

use super::action::{AxisDirection, InputDriverMode, InputType, PlayerAction, RawInput, MAX_VALUE};
use super::canbus::CanBusState;
use super::config::DeviceConfig;
use super::gamepad::GamepadState;
use super::player::{ActivePlayer, PlayerId};

/// Configuration profile shared between a device and the config registry
pub type SharedConfig = Arc<RwLock<DeviceConfig>>;

/// Device family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Keyboard,
    Gamepad,
    CanBus,
}

/// Variant-specific device state
#[derive(Debug, Clone)]
pub enum DeviceKind {
    Keyboard,
    Gamepad(GamepadState),
    CanBus(CanBusState),
}

/// One physical input device
#[derive(Debug)]
pub struct InputDevice {
    /// Hardware name; keyboards cannot be told apart and share one
    name: String,
    kind: DeviceKind,
    player: Option<PlayerId>,
    config: SharedConfig,
}

impl InputDevice {
    pub fn keyboard(config: SharedConfig) -> Self {
        Self {
            name: "keyboard".to_string(),
            kind: DeviceKind::Keyboard,
            player: None,
            config,
        }
    }

    /// A gamepad with its hardware axis and button counts
    pub fn gamepad(
        index: u32,
        name: &str,
        axis_count: usize,
        button_count: usize,
        config: SharedConfig,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: DeviceKind::Gamepad(GamepadState::new(index, axis_count, button_count)),
            player: None,
            config,
        }
    }

    /// A CAN-bus controller on a network interface such as `can0`
    pub fn canbus(interface: &str, config: SharedConfig) -> Self {
        Self {
            name: interface.to_string(),
            kind: DeviceKind::CanBus(CanBusState::new(interface)),
            player: None,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_type(&self) -> DeviceType {
        match self.kind {
            DeviceKind::Keyboard => DeviceType::Keyboard,
            DeviceKind::Gamepad(_) => DeviceType::Gamepad,
            DeviceKind::CanBus(_) => DeviceType::CanBus,
        }
    }

    pub fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    pub fn gamepad_state(&self) -> Option<&GamepadState> {
        match &self.kind {
            DeviceKind::Gamepad(pad) => Some(pad),
            _ => None,
        }
    }

    pub fn gamepad_state_mut(&mut self) -> Option<&mut GamepadState> {
        match &mut self.kind {
            DeviceKind::Gamepad(pad) => Some(pad),
            _ => None,
        }
    }

    pub fn canbus_state_mut(&mut self) -> Option<&mut CanBusState> {
        match &mut self.kind {
            DeviceKind::CanBus(bus) => Some(bus),
            _ => None,
        }
    }

    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }

    pub fn set_player(&mut self, player: Option<PlayerId>) {
        self.player = player;
    }

    pub fn configuration(&self) -> &SharedConfig {
        &self.config
    }

    pub fn set_configuration(&mut self, config: SharedConfig) {
        self.config = config;
    }

    /// Translate a raw event into an action.
    ///
    /// `player` is only used by gamepads to release actions whose stick
    /// direction was let go. Unbound input, input of another device family
    /// and input from a disabled configuration map to `None`.
    pub fn map_input(
        &mut self,
        input: RawInput,
        mode: InputDriverMode,
        player: Option<&mut ActivePlayer>,
    ) -> Option<PlayerAction> {
        let config = self.config.read();
        if !config.is_enabled() {
            return None;
        }

        match (&mut self.kind, input) {
            (DeviceKind::Keyboard, RawInput::Key { code, .. }) => {
                config.get_action(mode, InputType::Keyboard, code, input.value())
            }
            (DeviceKind::CanBus(_), RawInput::Can { id, value }) => {
                config.get_action(mode, InputType::CanBus, id, value)
            }
            (DeviceKind::Gamepad(pad), _) => map_gamepad(pad, &config, input, mode, player),
            _ => None,
        }
    }

    /// Found/not-found form of [`map_input`]: `action` is only written when
    /// the input is bound.
    ///
    /// [`map_input`]: InputDevice::map_input
    pub fn process_and_map_input(
        &mut self,
        input: RawInput,
        mode: InputDriverMode,
        player: Option<&mut ActivePlayer>,
        action: &mut PlayerAction,
    ) -> bool {
        match self.map_input(input, mode, player) {
            Some(found) => {
                *action = found;
                true
            }
            None => false,
        }
    }
}

fn map_gamepad(
    pad: &mut GamepadState,
    config: &DeviceConfig,
    input: RawInput,
    mode: InputDriverMode,
    player: Option<&mut ActivePlayer>,
) -> Option<PlayerAction> {
    let input_type = input.input_type();
    let id = input.id();
    let value = input.value();

    match input {
        RawInput::Axis { .. } => {
            let axis = usize::try_from(id).ok().filter(|a| *a < pad.axis_count())?;
            let update = pad.update_axis(axis, value, player.is_some());
            if let Some(player) = player {
                for direction in update.resets() {
                    reset_axis_direction(config, id, direction, player);
                }
            }
            if !update.passed {
                return None;
            }
        }
        RawInput::Button { pressed, .. } => {
            let button = usize::try_from(id).ok().filter(|b| *b < pad.button_count())?;
            pad.set_button_pressed(button, pressed);
        }
        _ => return None,
    }

    match mode {
        InputDriverMode::InGame => config.get_game_action(input_type, id, value),
        // Menus only react to a clear push
        InputDriverMode::Menu if value.abs() > MAX_VALUE / 2 => {
            config.get_menu_action(input_type, id, value)
        }
        InputDriverMode::Menu => None,
    }
}

/// Release the action bound to one direction of an axis
fn reset_axis_direction(
    config: &DeviceConfig,
    axis: i32,
    direction: AxisDirection,
    player: &mut ActivePlayer,
) {
    let bound = PlayerAction::ALL.iter().copied().find(|action| {
        config.binding(*action).is_some_and(|b| {
            b.input_type == InputType::StickMotion && b.id == axis && b.direction == direction
        })
    });
    if let Some(action) = bound {
        player.reset_action(action);
    }
}
