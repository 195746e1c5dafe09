use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::input::MAX_VALUE;
use crate::logging::LogLevel;

/// Name of the user configuration file inside the config directory
pub const CONFIG_FILE: &str = "kart.cfg";

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    // Commandline-only options
    pub log_file: Option<String>,
    pub config_dir: Option<String>,
    pub addon_type: Option<String>,
    pub install: Vec<String>,
    pub uninstall: Vec<String>,

    // Commandline and user config options
    pub addon_dir: Option<String>,
    pub cache_dir: Option<String>,
    pub catalog: Option<String>,
    pub deadzone: Option<i32>,
    pub log_level: Option<LogLevel>,
    pub single_player: Option<bool>,
}

impl Options {
    /// Config directory: `--configdir`, else `$XDG_CONFIG_HOME/kart`, else
    /// `$HOME/.config/kart`, else the working directory
    pub fn config_dir_path(&self) -> PathBuf {
        if let Some(dir) = &self.config_dir {
            return PathBuf::from(dir);
        }
        if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("kart");
        }
        match env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".config").join("kart"),
            None => PathBuf::from("."),
        }
    }

    pub fn addon_dir_path(&self) -> PathBuf {
        match &self.addon_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.config_dir_path().join("addons"),
        }
    }

    /// Where downloaded archives and the catalog are cached
    pub fn cache_dir_path(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.config_dir_path().join("cache"),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        match &self.catalog {
            Some(path) => PathBuf::from(path),
            None => self.cache_dir_path().join("addons.xml"),
        }
    }

    /// Location of the installed addon list
    pub fn installed_list_path(&self) -> PathBuf {
        self.addon_dir_path().join(crate::addons::INSTALLED_FILE)
    }

    /// Directory holding the input device profiles
    pub fn input_config_dir(&self) -> PathBuf {
        self.config_dir_path().join("input")
    }
}

/// Load configuration from kart.cfg in the config directory.
///
/// A missing file gives default options.
pub fn load_config(config_dir: &Option<String>) -> Result<Options> {
    let defaults = Options {
        config_dir: config_dir.clone(),
        ..Default::default()
    };
    let path = defaults.config_dir_path().join(CONFIG_FILE);
    if !path.exists() {
        log::debug!("No {} found, using defaults", path.display());
        return Ok(defaults);
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut opts = parse_config(&data).with_context(|| format!("Invalid {}", path.display()))?;
    opts.config_dir = config_dir.clone();
    Ok(opts)
}

/// Parse `key = value` lines; `#` starts a comment line
pub fn parse_config(data: &str) -> Result<Options> {
    let mut opts = Options::default();

    for (lineno, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .with_context(|| format!("Line {}: expected key = value", lineno + 1))?;
        let key = key.trim();
        let value = value.trim();
        let at = || format!("Line {}: invalid value for {}", lineno + 1, key);

        match key {
            "addon_dir" => opts.addon_dir = Some(value.to_string()),
            "cache_dir" => opts.cache_dir = Some(value.to_string()),
            "catalog" => opts.catalog = Some(value.to_string()),
            "deadzone" => opts.deadzone = Some(parse_deadzone(value).with_context(at)?),
            "log_level" => opts.log_level = Some(value.parse::<LogLevel>().with_context(at)?),
            "single_player" => opts.single_player = Some(parse_bool(value).with_context(at)?),
            _ => log::warn!("{}: unknown option '{}'", CONFIG_FILE, key),
        }
    }

    Ok(opts)
}

/// Write the config-file options back out
pub fn save_config(opts: &Options, path: &Path) -> Result<()> {
    let mut out = String::from("# kart configuration\n");
    let mut put = |key: &str, value: String| {
        out.push_str(&format!("{} = {}\n", key, value));
    };
    if let Some(dir) = &opts.addon_dir {
        put("addon_dir", dir.clone());
    }
    if let Some(dir) = &opts.cache_dir {
        put("cache_dir", dir.clone());
    }
    if let Some(catalog) = &opts.catalog {
        put("catalog", catalog.clone());
    }
    if let Some(deadzone) = opts.deadzone {
        put("deadzone", deadzone.to_string());
    }
    if let Some(level) = opts.log_level {
        put("log_level", level.as_i32().to_string());
    }
    if let Some(single) = opts.single_player {
        put("single_player", single.to_string());
    }
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write `kart.cfg` on first start so it can be edited.
///
/// Returns whether a file was written.
pub fn save_config_if_missing(opts: &Options) -> Result<bool> {
    let dir = opts.config_dir_path();
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    save_config(opts, &path)?;
    Ok(true)
}

/// Parse a gamepad dead zone
pub fn parse_deadzone(s: &str) -> Result<i32> {
    let deadzone: i32 = s.trim().parse().context("Invalid dead zone value")?;
    if !(0..=MAX_VALUE).contains(&deadzone) {
        anyhow::bail!("Dead zone out of range (0 to {})", MAX_VALUE);
    }
    Ok(deadzone)
}

pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Expected a boolean, got '{}'", s),
    }
}
