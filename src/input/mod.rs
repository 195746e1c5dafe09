//! Input devices and action mapping
//!
//! Raw hardware events (keys, gamepad buttons and axes, CAN-bus frames) are
//! translated into [`PlayerAction`]s by the device that produced them.
//!
//! # Architecture
//!
//! - [`DeviceConfig`] holds one binding per action and is shared by every
//!   device using that profile
//! - [`InputDevice`] is one physical device; its [`DeviceKind`] carries the
//!   variant-specific state such as gamepad axis filters
//! - [`DeviceManager`] owns all devices and routes actions to players
//!
//! Mapping happens synchronously on the event-polling thread.

pub mod action;
pub mod canbus;
pub mod config;
pub mod device;
pub mod gamepad;
pub mod keynames;
pub mod manager;
pub mod player;

pub use action::{
    AxisDirection, InputDriverMode, InputType, PlayerAction, RawInput, DEADZONE_JOYSTICK,
    MAX_VALUE,
};
pub use canbus::{CanBusState, CanError, CanFrame};
pub use config::{Binding, ConfigError, ConfigKind, DeviceConfig};
pub use device::{DeviceKind, DeviceType, InputDevice, SharedConfig};
pub use gamepad::{AxisUpdate, GamepadState};
pub use keynames::{key_from_name, key_name};
pub use manager::{DeviceError, DeviceId, DeviceManager, MappedAction};
pub use player::{ActivePlayer, GameState, KartController, PlayerId, StateManager};
