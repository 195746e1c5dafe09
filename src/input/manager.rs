//! Device manager
//!
//! Owns every input device and configuration profile of the session and
//! routes raw events to the player that owns the device.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use super::action::{InputDriverMode, PlayerAction, RawInput, DEADZONE_JOYSTICK, MAX_VALUE};
use super::config::{ConfigError, ConfigKind, DeviceConfig};
use super::device::{InputDevice, SharedConfig};
use super::player::{PlayerId, StateManager};

/// Error type for device management
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Device {0:?} not found")]
    NotFound(DeviceId),
    #[error("Player {0:?} already owns {1:?}")]
    PlayerHasDevice(PlayerId, DeviceId),
}

/// Handle to a device owned by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceId {
    Keyboard(usize),
    Gamepad(usize),
    CanBus(usize),
}

/// An action produced by a device, with the player it is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedAction {
    pub device: DeviceId,
    /// `None` when no player owns the device
    pub player: Option<PlayerId>,
    pub action: PlayerAction,
    pub value: i32,
}

/// All devices and configurations of the session
#[derive(Debug)]
pub struct DeviceManager {
    keyboards: Vec<InputDevice>,
    gamepads: Vec<InputDevice>,
    canbus: Vec<InputDevice>,
    configs: Vec<SharedConfig>,
    deadzone: i32,
    /// Route input from unassigned devices to the first player
    single_player: bool,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceManager {
    pub fn new() -> Self {
        Self {
            keyboards: Vec::new(),
            gamepads: Vec::new(),
            canbus: Vec::new(),
            configs: Vec::new(),
            deadzone: DEADZONE_JOYSTICK,
            single_player: true,
        }
    }

    /// Register a configuration. A stored profile with the same kind and
    /// name is updated in place so devices using it see the change.
    pub fn add_config(&mut self, config: DeviceConfig) -> SharedConfig {
        if let Some(existing) = self.find_config(config.kind(), config.name()) {
            *existing.write() = config;
            return existing;
        }
        let shared = Arc::new(RwLock::new(config));
        self.configs.push(Arc::clone(&shared));
        shared
    }

    pub fn find_config(&self, kind: ConfigKind, name: &str) -> Option<SharedConfig> {
        self.configs
            .iter()
            .find(|c| {
                let c = c.read();
                c.kind() == kind && c.name() == name
            })
            .cloned()
    }

    pub fn configs(&self) -> &[SharedConfig] {
        &self.configs
    }

    /// Load every `*.cfg` profile from a directory and return how many were
    /// read. Unreadable profiles are skipped with a warning.
    pub fn load_config_dir(&mut self, dir: &Path) -> Result<usize, ConfigError> {
        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("cfg") {
                continue;
            }
            match DeviceConfig::load(&path) {
                Ok(config) => {
                    self.add_config(config);
                    loaded += 1;
                }
                Err(e) => log::warn!("Skipping input config {}: {}", path.display(), e),
            }
        }
        log::info!("Loaded {} input configurations from {}", loaded, dir.display());
        Ok(loaded)
    }

    /// Save every profile into `dir` as `<kind>-<name>.cfg`
    pub fn save_config_dir(&self, dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(dir)?;
        for config in &self.configs {
            let config = config.read();
            config.save(&dir.join(config_file_name(&config)))?;
        }
        Ok(())
    }

    /// Add a keyboard with the given bindings
    pub fn add_keyboard(&mut self, config: DeviceConfig) -> DeviceId {
        let config = self.add_config(config);
        self.keyboards.push(InputDevice::keyboard(config));
        DeviceId::Keyboard(self.keyboards.len() - 1)
    }

    /// Add a keyboard using the stored `keyboard` profile, or the default
    /// bindings when there is none
    pub fn add_default_keyboard(&mut self) -> DeviceId {
        let config = match self.find_config(ConfigKind::Keyboard, "keyboard") {
            Some(config) => config,
            None => self.add_config(DeviceConfig::default_keyboard()),
        };
        self.keyboards.push(InputDevice::keyboard(config));
        DeviceId::Keyboard(self.keyboards.len() - 1)
    }

    /// Add a gamepad, reusing the stored profile for its name or creating
    /// a default one
    pub fn add_gamepad(
        &mut self,
        index: u32,
        name: &str,
        axis_count: usize,
        button_count: usize,
    ) -> DeviceId {
        let config = match self.find_config(ConfigKind::Gamepad, name) {
            Some(config) => config,
            None => {
                log::info!("No configuration for gamepad '{}', using defaults", name);
                self.add_config(DeviceConfig::default_gamepad(name))
            }
        };
        let mut device = InputDevice::gamepad(index, name, axis_count, button_count, config);
        if let Some(pad) = device.gamepad_state_mut() {
            pad.set_deadzone(self.deadzone);
        }
        log::info!(
            "Added gamepad '{}' ({} axes, {} buttons)",
            name,
            axis_count,
            button_count
        );
        self.gamepads.push(device);
        DeviceId::Gamepad(self.gamepads.len() - 1)
    }

    /// Add a CAN-bus controller on a network interface
    pub fn add_canbus(&mut self, interface: &str) -> DeviceId {
        let config = match self.find_config(ConfigKind::CanBus, interface) {
            Some(config) => config,
            None => self.add_config(DeviceConfig::default_canbus(interface)),
        };
        self.canbus.push(InputDevice::canbus(interface, config));
        DeviceId::CanBus(self.canbus.len() - 1)
    }

    pub fn keyboard_count(&self) -> usize {
        self.keyboards.len()
    }

    pub fn gamepad_count(&self) -> usize {
        self.gamepads.len()
    }

    pub fn canbus_count(&self) -> usize {
        self.canbus.len()
    }

    pub fn device(&self, id: DeviceId) -> Option<&InputDevice> {
        match id {
            DeviceId::Keyboard(i) => self.keyboards.get(i),
            DeviceId::Gamepad(i) => self.gamepads.get(i),
            DeviceId::CanBus(i) => self.canbus.get(i),
        }
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut InputDevice> {
        match id {
            DeviceId::Keyboard(i) => self.keyboards.get_mut(i),
            DeviceId::Gamepad(i) => self.gamepads.get_mut(i),
            DeviceId::CanBus(i) => self.canbus.get_mut(i),
        }
    }

    fn device_ids(&self) -> impl Iterator<Item = DeviceId> {
        (0..self.keyboards.len())
            .map(DeviceId::Keyboard)
            .chain((0..self.gamepads.len()).map(DeviceId::Gamepad))
            .chain((0..self.canbus.len()).map(DeviceId::CanBus))
    }

    /// Device currently owned by a player
    pub fn device_for_player(&self, player: PlayerId) -> Option<DeviceId> {
        self.device_ids()
            .find(|id| self.device(*id).and_then(|d| d.player()) == Some(player))
    }

    /// Give a device to a player. A player owns at most one device.
    pub fn assign_player(&mut self, device: DeviceId, player: PlayerId) -> Result<(), DeviceError> {
        if let Some(owned) = self.device_for_player(player) {
            if owned != device {
                return Err(DeviceError::PlayerHasDevice(player, owned));
            }
        }
        let dev = self.device_mut(device).ok_or(DeviceError::NotFound(device))?;
        dev.set_player(Some(player));
        log::debug!("Player {} now uses {:?}", player.0, device);
        Ok(())
    }

    /// Take a device away from its player, returning the previous owner
    pub fn revoke_player(&mut self, device: DeviceId) -> Result<Option<PlayerId>, DeviceError> {
        let dev = self.device_mut(device).ok_or(DeviceError::NotFound(device))?;
        let previous = dev.player();
        dev.set_player(None);
        Ok(previous)
    }

    pub fn clear_players(&mut self) {
        for dev in self
            .keyboards
            .iter_mut()
            .chain(self.gamepads.iter_mut())
            .chain(self.canbus.iter_mut())
        {
            dev.set_player(None);
        }
    }

    pub fn is_single_player(&self) -> bool {
        self.single_player
    }

    pub fn set_single_player(&mut self, single_player: bool) {
        self.single_player = single_player;
    }

    pub fn deadzone(&self) -> i32 {
        self.deadzone
    }

    /// Set the dead zone of all current and future gamepads
    pub fn set_deadzone(&mut self, deadzone: i32) {
        self.deadzone = deadzone.clamp(0, MAX_VALUE);
        for pad in self.gamepads.iter_mut().filter_map(|d| d.gamepad_state_mut()) {
            pad.set_deadzone(self.deadzone);
        }
    }

    fn route(&self, owner: Option<PlayerId>, players: &StateManager) -> Option<PlayerId> {
        match owner {
            Some(player) => Some(player),
            None if self.single_player => players.first_player(),
            None => None,
        }
    }

    /// Map a key event. Keyboards are tried in order and the first one
    /// with a binding wins.
    pub fn map_keyboard_input(
        &mut self,
        code: i32,
        pressed: bool,
        mode: InputDriverMode,
        players: &mut StateManager,
    ) -> Option<MappedAction> {
        let input = RawInput::Key { code, pressed };
        for i in 0..self.keyboards.len() {
            let player = self.route(self.keyboards[i].player(), players);
            if let Some(action) = self.keyboards[i].map_input(input, mode, None) {
                return Some(MappedAction {
                    device: DeviceId::Keyboard(i),
                    player,
                    action,
                    value: input.value(),
                });
            }
        }
        None
    }

    /// Map an axis or button event of the gamepad with hardware `index`
    pub fn map_gamepad_input(
        &mut self,
        index: u32,
        input: RawInput,
        mode: InputDriverMode,
        players: &mut StateManager,
    ) -> Option<MappedAction> {
        let i = self
            .gamepads
            .iter()
            .position(|d| d.gamepad_state().is_some_and(|pad| pad.index() == index))?;
        let player = self.route(self.gamepads[i].player(), players);
        let active = player.and_then(|id| players.player_mut(id));
        let action = self.gamepads[i].map_input(input, mode, active)?;
        Some(MappedAction {
            device: DeviceId::Gamepad(i),
            player,
            action,
            value: input.value(),
        })
    }

    /// Decode and map a raw frame received on a CAN interface
    pub fn map_canbus_input(
        &mut self,
        interface: &str,
        frame: &[u8],
        mode: InputDriverMode,
        players: &mut StateManager,
    ) -> Option<MappedAction> {
        let i = self.canbus.iter().position(|d| d.name() == interface)?;
        let input = self.canbus[i].canbus_state_mut()?.decode(frame)?;
        let player = self.route(self.canbus[i].player(), players);
        let action = self.canbus[i].map_input(input, mode, None)?;
        Some(MappedAction {
            device: DeviceId::CanBus(i),
            player,
            action,
            value: input.value(),
        })
    }
}

fn config_file_name(config: &DeviceConfig) -> String {
    let name: String = config
        .name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}-{}.cfg", config.kind().name(), name)
}
