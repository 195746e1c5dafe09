//! Device configurations
//!
//! A configuration maps every [`PlayerAction`] to at most one hardware
//! binding. Configurations are stored as small section files:
//!
//! ```text
//! # Input configuration: Logitech Dual Action
//! [device]
//! kind = gamepad
//! name = Logitech Dual Action
//! enabled = true
//!
//! [bindings]
//! steer-left = axis:0-
//! fire = button:0
//! ```

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use super::action::{AxisDirection, InputDriverMode, InputType, PlayerAction};
use super::keynames::{
    key_from_name, key_name, KEY_BACKSPACE, KEY_DOWN, KEY_ESCAPE, KEY_LEFT, KEY_RETURN,
    KEY_RIGHT, KEY_SPACE, KEY_UP,
};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Configuration has no device kind")]
    MissingKind,
    #[error("Unknown device kind '{0}'")]
    UnknownKind(String),
    #[error("Invalid binding '{0}'")]
    InvalidBinding(String),
}

/// Which device family a configuration is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Keyboard,
    Gamepad,
    CanBus,
}

impl ConfigKind {
    pub fn name(self) -> &'static str {
        match self {
            ConfigKind::Keyboard => "keyboard",
            ConfigKind::Gamepad => "gamepad",
            ConfigKind::CanBus => "canbus",
        }
    }
}

impl FromStr for ConfigKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyboard" => Ok(ConfigKind::Keyboard),
            "gamepad" => Ok(ConfigKind::Gamepad),
            "canbus" => Ok(ConfigKind::CanBus),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

/// One hardware input bound to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub input_type: InputType,
    pub id: i32,
    /// Required sign of the value; `Neutral` matches any value
    pub direction: AxisDirection,
}

impl Binding {
    pub fn key(code: i32) -> Self {
        Self {
            input_type: InputType::Keyboard,
            id: code,
            direction: AxisDirection::Neutral,
        }
    }

    pub fn button(id: i32) -> Self {
        Self {
            input_type: InputType::StickButton,
            id,
            direction: AxisDirection::Neutral,
        }
    }

    pub fn axis(id: i32, direction: AxisDirection) -> Self {
        Self {
            input_type: InputType::StickMotion,
            id,
            direction,
        }
    }

    pub fn can(id: i32, direction: AxisDirection) -> Self {
        Self {
            input_type: InputType::CanBus,
            id,
            direction,
        }
    }

    /// Does a raw event trigger this binding?
    pub fn matches(&self, input_type: InputType, id: i32, value: i32) -> bool {
        if self.input_type != input_type || self.id != id {
            return false;
        }
        match self.direction {
            AxisDirection::Neutral => true,
            dir => AxisDirection::from_value(value) == dir,
        }
    }
}

fn direction_suffix(direction: AxisDirection) -> &'static str {
    match direction {
        AxisDirection::Negative => "-",
        AxisDirection::Positive => "+",
        AxisDirection::Neutral => "",
    }
}

fn split_direction(s: &str) -> (&str, AxisDirection) {
    if let Some(rest) = s.strip_suffix('-') {
        (rest, AxisDirection::Negative)
    } else if let Some(rest) = s.strip_suffix('+') {
        (rest, AxisDirection::Positive)
    } else {
        (s, AxisDirection::Neutral)
    }
}

fn parse_id(s: &str) -> Option<i32> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.input_type {
            InputType::Keyboard => match key_name(self.id) {
                Some(name) => write!(f, "key:{}", name),
                None => write!(f, "key:{}", self.id),
            },
            InputType::StickButton => write!(f, "button:{}", self.id),
            InputType::StickMotion => {
                write!(f, "axis:{}{}", self.id, direction_suffix(self.direction))
            }
            InputType::CanBus => {
                write!(f, "can:0x{:x}{}", self.id, direction_suffix(self.direction))
            }
        }
    }
}

impl FromStr for Binding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidBinding(s.to_string());
        let (kind, rest) = s.trim().split_once(':').ok_or_else(invalid)?;
        let rest = rest.trim();

        match kind.trim().to_lowercase().as_str() {
            "key" => key_from_name(rest)
                .or_else(|| rest.parse().ok())
                .map(Binding::key)
                .ok_or_else(invalid),
            "button" => rest.parse().map(Binding::button).map_err(|_| invalid()),
            "axis" => {
                let (id, direction) = split_direction(rest);
                if direction == AxisDirection::Neutral {
                    return Err(invalid());
                }
                parse_id(id)
                    .map(|id| Binding::axis(id, direction))
                    .ok_or_else(invalid)
            }
            "can" => {
                let (id, direction) = split_direction(rest);
                parse_id(id)
                    .map(|id| Binding::can(id, direction))
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

/// Bindings and state of one configuration profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    name: String,
    kind: ConfigKind,
    enabled: bool,
    bindings: [Option<Binding>; PlayerAction::COUNT],
}

impl DeviceConfig {
    /// Create an enabled configuration without bindings
    pub fn new(kind: ConfigKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            enabled: true,
            bindings: [None; PlayerAction::COUNT],
        }
    }

    /// Arrow keys to drive and navigate
    pub fn default_keyboard() -> Self {
        let mut config = Self::new(ConfigKind::Keyboard, "keyboard");
        let keys = [
            (PlayerAction::SteerLeft, KEY_LEFT),
            (PlayerAction::SteerRight, KEY_RIGHT),
            (PlayerAction::Accel, KEY_UP),
            (PlayerAction::Brake, KEY_DOWN),
            (PlayerAction::Nitro, 'n' as i32),
            (PlayerAction::Drift, 'v' as i32),
            (PlayerAction::Rescue, KEY_BACKSPACE),
            (PlayerAction::Fire, KEY_SPACE),
            (PlayerAction::LookBack, 'b' as i32),
            (PlayerAction::PauseRace, KEY_ESCAPE),
            (PlayerAction::MenuUp, KEY_UP),
            (PlayerAction::MenuDown, KEY_DOWN),
            (PlayerAction::MenuLeft, KEY_LEFT),
            (PlayerAction::MenuRight, KEY_RIGHT),
            (PlayerAction::MenuSelect, KEY_RETURN),
            (PlayerAction::MenuCancel, KEY_BACKSPACE),
        ];
        for (action, code) in keys {
            config.set_binding(action, Binding::key(code));
        }
        config
    }

    /// First stick to steer and accelerate, face buttons for the rest
    pub fn default_gamepad(name: &str) -> Self {
        use AxisDirection::{Negative, Positive};

        let mut config = Self::new(ConfigKind::Gamepad, name);
        let bindings = [
            (PlayerAction::SteerLeft, Binding::axis(0, Negative)),
            (PlayerAction::SteerRight, Binding::axis(0, Positive)),
            (PlayerAction::Accel, Binding::axis(1, Negative)),
            (PlayerAction::Brake, Binding::axis(1, Positive)),
            (PlayerAction::Fire, Binding::button(0)),
            (PlayerAction::Nitro, Binding::button(1)),
            (PlayerAction::Drift, Binding::button(2)),
            (PlayerAction::Rescue, Binding::button(3)),
            (PlayerAction::LookBack, Binding::button(4)),
            (PlayerAction::PauseRace, Binding::button(9)),
            (PlayerAction::MenuUp, Binding::axis(1, Negative)),
            (PlayerAction::MenuDown, Binding::axis(1, Positive)),
            (PlayerAction::MenuLeft, Binding::axis(0, Negative)),
            (PlayerAction::MenuRight, Binding::axis(0, Positive)),
            (PlayerAction::MenuSelect, Binding::button(0)),
            (PlayerAction::MenuCancel, Binding::button(3)),
        ];
        for (action, binding) in bindings {
            config.set_binding(action, binding);
        }
        config
    }

    /// Steering wheel frame layout: signed wheel on 0x100, pedals on
    /// 0x101/0x102, buttons from 0x110
    pub fn default_canbus(name: &str) -> Self {
        use AxisDirection::{Negative, Neutral, Positive};

        let mut config = Self::new(ConfigKind::CanBus, name);
        let bindings = [
            (PlayerAction::SteerLeft, Binding::can(0x100, Negative)),
            (PlayerAction::SteerRight, Binding::can(0x100, Positive)),
            (PlayerAction::Accel, Binding::can(0x101, Positive)),
            (PlayerAction::Brake, Binding::can(0x102, Positive)),
            (PlayerAction::Fire, Binding::can(0x110, Neutral)),
            (PlayerAction::Nitro, Binding::can(0x111, Neutral)),
            (PlayerAction::Drift, Binding::can(0x112, Neutral)),
            (PlayerAction::Rescue, Binding::can(0x113, Neutral)),
            (PlayerAction::LookBack, Binding::can(0x114, Neutral)),
            (PlayerAction::PauseRace, Binding::can(0x115, Neutral)),
            (PlayerAction::MenuSelect, Binding::can(0x110, Neutral)),
            (PlayerAction::MenuCancel, Binding::can(0x113, Neutral)),
        ];
        for (action, binding) in bindings {
            config.set_binding(action, binding);
        }
        config
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ConfigKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn binding(&self, action: PlayerAction) -> Option<&Binding> {
        self.bindings[action.index()].as_ref()
    }

    pub fn set_binding(&mut self, action: PlayerAction, binding: Binding) {
        self.bindings[action.index()] = Some(binding);
    }

    pub fn clear_binding(&mut self, action: PlayerAction) {
        self.bindings[action.index()] = None;
    }

    /// Number of bound actions
    pub fn binding_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_some()).count()
    }

    /// Look up an in-race action
    pub fn get_game_action(&self, input_type: InputType, id: i32, value: i32) -> Option<PlayerAction> {
        self.find_action(PlayerAction::game_actions(), input_type, id, value)
    }

    /// Look up a menu action
    pub fn get_menu_action(&self, input_type: InputType, id: i32, value: i32) -> Option<PlayerAction> {
        self.find_action(PlayerAction::menu_actions(), input_type, id, value)
    }

    /// Look up an action in the range selected by `mode`
    pub fn get_action(
        &self,
        mode: InputDriverMode,
        input_type: InputType,
        id: i32,
        value: i32,
    ) -> Option<PlayerAction> {
        match mode {
            InputDriverMode::InGame => self.get_game_action(input_type, id, value),
            InputDriverMode::Menu => self.get_menu_action(input_type, id, value),
        }
    }

    // Later actions win when several bindings match
    fn find_action(
        &self,
        actions: &[PlayerAction],
        input_type: InputType,
        id: i32,
        value: i32,
    ) -> Option<PlayerAction> {
        actions.iter().rev().copied().find(|action| {
            self.binding(*action)
                .is_some_and(|b| b.matches(input_type, id, value))
        })
    }

    /// Write the configuration in section format
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "# Input configuration: {}", self.name)?;
        writeln!(out, "[device]")?;
        writeln!(out, "kind = {}", self.kind.name())?;
        writeln!(out, "name = {}", self.name)?;
        writeln!(out, "enabled = {}", self.enabled)?;
        writeln!(out)?;
        writeln!(out, "[bindings]")?;
        for action in PlayerAction::ALL {
            if let Some(binding) = self.binding(action) {
                writeln!(out, "{} = {}", action.name(), binding)?;
            }
        }
        Ok(())
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        self.write_to(&mut file)
    }

    /// Parse the section format. Unknown sections, keys and bindings are
    /// skipped with a warning.
    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let mut section = String::new();
        let mut kind = None;
        let mut name = String::new();
        let mut enabled = true;
        let mut bindings = Vec::new();

        for (lineno, line) in data.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Line {}: expected key = value", lineno + 1);
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match section.as_str() {
                "device" => match key {
                    "kind" => kind = Some(value.parse::<ConfigKind>()?),
                    "name" => name = value.to_string(),
                    "enabled" => enabled = value.eq_ignore_ascii_case("true"),
                    _ => log::warn!("Line {}: unknown device key '{}'", lineno + 1, key),
                },
                "bindings" => {
                    let Some(action) = PlayerAction::from_name(key) else {
                        log::warn!("Line {}: unknown action '{}'", lineno + 1, key);
                        continue;
                    };
                    match value.parse::<Binding>() {
                        Ok(binding) => bindings.push((action, binding)),
                        Err(e) => log::warn!("Line {}: {}", lineno + 1, e),
                    }
                }
                _ => log::warn!("Line {}: entry outside a known section", lineno + 1),
            }
        }

        let mut config = DeviceConfig::new(kind.ok_or(ConfigError::MissingKind)?, &name);
        config.enabled = enabled;
        for (action, binding) in bindings {
            config.set_binding(action, binding);
        }
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::parse(&data)
    }
}
