use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use kart_rust::addons::{AddonsManager, ArchiveInstaller, InstallEvent, SharedInstaller};
use kart_rust::cli::Cli;
use kart_rust::config::{self, Options};
use kart_rust::input::{DeviceManager, PlayerId, StateManager};
use kart_rust::logging;
use kart_rust::screens::{AddonIcon, EventOutcome, ScreenId, Screens};

/// One frame of the menu loop
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration file (defaults to user config directory)
    let options = config::load_config(&cli.configdir)?;
    let wrote_config = config::save_config_if_missing(&options)?;
    let options = cli.merge_into_options(options)?;

    logging::init(options.log_level, options.log_file.as_deref().map(Path::new))?;
    log::info!("kart {} starting", env!("CARGO_PKG_VERSION"));
    log::debug!("Options: {:?}", options);
    if wrote_config {
        log::info!("Created {}", options.config_dir_path().join(config::CONFIG_FILE).display());
    }

    let mut players = StateManager::new();
    let player = players.create_active_player("Player 1");
    let devices = setup_input(&options, player)?;
    log::info!(
        "{} keyboard(s), {} input profile(s)",
        devices.keyboard_count(),
        devices.configs().len()
    );

    let addons = AddonsManager::shared();
    let installed_path = options.installed_list_path();
    addons.write().load_installed_file(&installed_path)?;

    let installer: SharedInstaller = Arc::new(ArchiveInstaller::new(
        options.cache_dir_path(),
        options.addon_dir_path(),
    ));
    let mut screens = Screens::new(addons.clone(), installer);
    screens.push(ScreenId::Addons);

    let catalog_path = options.catalog_path();
    let catalog = addons.write().load_catalog_file(&catalog_path);
    match catalog {
        Ok(_) => screens.addons_mut().catalog_ready(),
        Err(e) => screens.addons_mut().catalog_failed(&format!("{:#}", e)),
    }

    if let Some(addon_type) = &options.addon_type {
        let tab = format!("tab_{}", addon_type);
        screens.event_callback("category", Some(tab.as_str()), player);
    }

    for id in &options.install {
        run_job(&mut screens, id, player, true);
    }
    for id in &options.uninstall {
        run_job(&mut screens, id, player, false);
    }

    print_list(&screens);

    addons
        .read()
        .save_installed_file(&installed_path)
        .context("Failed to save the installed addon list")?;

    screens.event_callback("back", None, player);
    log::info!("kart exiting");
    Ok(())
}

/// Build the device manager with the keyboard and any stored profiles.
/// The profiles are written out on first start so they can be edited.
fn setup_input(options: &Options, player: PlayerId) -> Result<DeviceManager> {
    let mut devices = DeviceManager::new();
    if let Some(deadzone) = options.deadzone {
        devices.set_deadzone(deadzone);
    }
    if let Some(single) = options.single_player {
        devices.set_single_player(single);
    }

    let input_dir = options.input_config_dir();
    if input_dir.is_dir() {
        devices
            .load_config_dir(&input_dir)
            .with_context(|| format!("Failed to read {}", input_dir.display()))?;
    }

    let kb = devices.add_default_keyboard();
    devices.assign_player(kb, player)?;

    if !input_dir.exists() {
        devices
            .save_config_dir(&input_dir)
            .with_context(|| format!("Failed to write {}", input_dir.display()))?;
    }
    Ok(devices)
}

/// Open the install dialog for `id` and run the job to completion
fn run_job(screens: &mut Screens, id: &str, player: PlayerId, install: bool) {
    match screens.event_callback("list_addons", Some(id), player) {
        EventOutcome::DialogOpened(_) => {}
        _ => {
            eprintln!("Unknown addon '{}'", id);
            return;
        }
    }

    let started = match screens.addons_mut().dialog_mut() {
        Some(dialog) if install => dialog.install(),
        Some(dialog) => dialog.uninstall(),
        None => return,
    };
    if let Err(e) = started {
        eprintln!("{}: {}", id, e);
        return;
    }

    let event = wait_for_job(screens);
    match event.result {
        Ok(()) => println!("{:?} of '{}' done", event.action, event.id),
        Err(e) => eprintln!("{:?} of '{}' failed: {}", event.action, event.id, e),
    }
    screens.addons_mut().close_dialog();
}

fn wait_for_job(screens: &mut Screens) -> InstallEvent {
    loop {
        if let Some(event) = screens.addons_mut().poll() {
            return event;
        }
        thread::sleep(FRAME);
    }
}

fn print_list(screens: &Screens) {
    let screen = screens.addons();
    let status = screen.status().text();
    if !status.is_empty() {
        println!("{}", status);
    }
    println!("[{}]", screen.addon_type());
    for row in screen.rows() {
        let icon = match row.icon {
            AddonIcon::NeedsUpdate => 'U',
            AddonIcon::Installed => '*',
            AddonIcon::NotInstalled => ' ',
        };
        println!(" {} {:<32} {}", icon, row.label, row.id);
    }
}
