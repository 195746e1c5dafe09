use crate::config::{parse_deadzone, Options};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::Parser;

/// Addon types that can be listed
const ADDON_TYPES: [&str; 4] = ["kart", "track", "arena", "update"];

/// Kart - addon manager and input setup for the racing game
#[derive(Parser, Debug, Default)]
#[command(name = "kart")]
#[command(version = "0.8.0")]
#[command(about = "Kart racing game - addon management", long_about = None)]
pub struct Cli {
    /// Configuration directory path
    #[arg(short, long, value_name = "CONFIGDIR")]
    pub configdir: Option<String>,

    /// Addon directory
    #[arg(long, value_name = "ADDONDIR")]
    pub addondir: Option<String>,

    /// Directory with downloaded addon archives
    #[arg(long, value_name = "CACHEDIR")]
    pub cachedir: Option<String>,

    /// Addon catalog file
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<String>,

    /// Log level (nothing, user, error, warning, info, debug, all or 0-6)
    #[arg(long, value_name = "LEVEL")]
    pub loglevel: Option<String>,

    /// Gamepad dead zone
    #[arg(short, long, value_name = "VALUE")]
    pub deadzone: Option<String>,

    /// Addon type to list (kart, track, arena, update)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub addon_type: Option<String>,

    /// Install an addon by id (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub install: Vec<String>,

    /// Uninstall an addon by id (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub uninstall: Vec<String>,

    /// Do not route input from unassigned devices to the first player
    #[arg(long = "nosingleplayer")]
    pub nosingleplayer: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref config_dir) = self.configdir {
            opts.config_dir = Some(config_dir.clone());
        }

        if let Some(ref addon_dir) = self.addondir {
            opts.addon_dir = Some(addon_dir.clone());
        }

        if let Some(ref cache_dir) = self.cachedir {
            opts.cache_dir = Some(cache_dir.clone());
        }

        if let Some(ref catalog) = self.catalog {
            opts.catalog = Some(catalog.clone());
        }

        if let Some(ref log_file) = self.logfile {
            opts.log_file = Some(log_file.clone());
        }

        if let Some(ref level) = self.loglevel {
            opts.log_level = Some(level.parse::<LogLevel>().context("Invalid log level")?);
        }

        if let Some(ref deadzone) = self.deadzone {
            opts.deadzone = Some(parse_deadzone(deadzone)?);
        }

        if let Some(ref addon_type) = self.addon_type {
            opts.addon_type = Some(Self::parse_addon_type(addon_type)?);
        }

        if !self.install.is_empty() {
            opts.install = self.install.clone();
        }

        if !self.uninstall.is_empty() {
            opts.uninstall = self.uninstall.clone();
        }

        if self.nosingleplayer {
            opts.single_player = Some(false);
        }

        Ok(opts)
    }

    fn parse_addon_type(s: &str) -> Result<String> {
        let lower = s.to_lowercase();
        if ADDON_TYPES.contains(&lower.as_str()) {
            Ok(lower)
        } else {
            anyhow::bail!(
                "Invalid addon type: {}. Valid options: {}",
                s,
                ADDON_TYPES.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addon_type() {
        assert_eq!(Cli::parse_addon_type("Track").unwrap(), "track");
        assert_eq!(Cli::parse_addon_type("update").unwrap(), "update");
        assert!(Cli::parse_addon_type("boat").is_err());
    }

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            addondir: Some("/srv/addons".to_string()),
            deadzone: Some("5000".to_string()),
            loglevel: Some("debug".to_string()),
            install: vec!["gnu".to_string()],
            nosingleplayer: true,
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.addon_dir.as_deref(), Some("/srv/addons"));
        assert_eq!(opts.deadzone, Some(5000));
        assert_eq!(opts.log_level, Some(LogLevel::Debug));
        assert_eq!(opts.install, vec!["gnu".to_string()]);
        assert_eq!(opts.single_player, Some(false));
    }

    #[test]
    fn test_cli_overrides_config_values() {
        let config = Options {
            deadzone: Some(1000),
            catalog: Some("old.xml".to_string()),
            single_player: Some(true),
            ..Default::default()
        };
        let cli = Cli {
            catalog: Some("new.xml".to_string()),
            ..Default::default()
        };
        let opts = cli.merge_into_options(config).unwrap();
        assert_eq!(opts.catalog.as_deref(), Some("new.xml"));
        assert_eq!(opts.deadzone, Some(1000));
        assert_eq!(opts.single_player, Some(true));
    }

    #[test]
    fn test_invalid_values() {
        let cli = Cli {
            deadzone: Some("huge".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());

        let cli = Cli {
            loglevel: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "kart", "--type", "track", "-i", "gnu", "-i", "adiumy", "--configdir", "/cfg",
        ])
        .unwrap();
        assert_eq!(cli.addon_type.as_deref(), Some("track"));
        assert_eq!(cli.install, vec!["gnu", "adiumy"]);
        assert_eq!(cli.configdir.as_deref(), Some("/cfg"));
    }
}
