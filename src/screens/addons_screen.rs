//! Addons browsing screen
//!
//! Lists the addons of one category with an icon per row and hands the
//! selected row to an [`AddonsLoading`] dialog. Widgets are drawn by the
//! GUI toolkit; this type only holds what they display.

use crate::addons::{Addon, InstallEvent, SharedAddons, SharedInstaller};
use crate::input::PlayerId;

use super::addons_loading::AddonsLoading;

/// Pseudo type listing every installed addon with a newer version
pub const UPDATE_TYPE: &str = "update";

/// Category shown when the screen is first opened
pub const DEFAULT_TYPE: &str = "kart";

/// Row icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonIcon {
    /// Installed, and the catalog has a newer version
    NeedsUpdate,
    Installed,
    NotInstalled,
}

impl AddonIcon {
    pub fn for_addon(addon: &Addon) -> Self {
        if addon.needs_update() {
            AddonIcon::NeedsUpdate
        } else if addon.is_installed() {
            AddonIcon::Installed
        } else {
            AddonIcon::NotInstalled
        }
    }
}

/// One line of the addons list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonRow {
    pub id: String,
    pub label: String,
    pub icon: AddonIcon,
}

/// Text of the status label above the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The catalog is still being fetched
    Loading,
    Ready,
    Failed(String),
}

impl UpdateStatus {
    pub fn text(&self) -> String {
        match self {
            UpdateStatus::Loading => "Updating the list...".to_string(),
            UpdateStatus::Ready => String::new(),
            UpdateStatus::Failed(reason) => format!("Can't fetch the list: {}", reason),
        }
    }
}

/// What the caller should do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    /// Leave the screen
    PopMenu,
    /// The install dialog was opened for this addon
    DialogOpened(String),
    /// Another category is now listed
    TypeChanged(String),
}

/// State behind the addons screen
pub struct AddonsScreen {
    addons: SharedAddons,
    installer: SharedInstaller,
    addon_type: String,
    rows: Vec<AddonRow>,
    status: UpdateStatus,
    /// Set once the catalog is available
    can_load_list: bool,
    dialog: Option<AddonsLoading>,
}

impl std::fmt::Debug for AddonsScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonsScreen")
            .field("addon_type", &self.addon_type)
            .field("rows", &self.rows.len())
            .field("status", &self.status)
            .field("dialog", &self.dialog)
            .finish()
    }
}

impl AddonsScreen {
    pub fn new(addons: SharedAddons, installer: SharedInstaller) -> Self {
        Self {
            addons,
            installer,
            addon_type: DEFAULT_TYPE.to_string(),
            rows: Vec::new(),
            status: UpdateStatus::Loading,
            can_load_list: false,
            dialog: None,
        }
    }

    /// Called each time the screen is shown
    pub fn init(&mut self) {
        self.can_load_list = self.addons.read().is_catalog_loaded();
        if self.can_load_list {
            self.status = UpdateStatus::Ready;
            self.load_list();
        } else if self.status != UpdateStatus::Loading {
            log::debug!("Addons screen shown before the catalog arrived");
        }
    }

    /// The catalog was fetched and merged into the addon list
    pub fn catalog_ready(&mut self) {
        self.can_load_list = true;
        self.status = UpdateStatus::Ready;
        self.load_list();
    }

    /// The catalog could not be fetched
    pub fn catalog_failed(&mut self, reason: &str) {
        log::warn!("Addon catalog unavailable: {}", reason);
        self.status = UpdateStatus::Failed(reason.to_string());
    }

    pub fn can_load_list(&self) -> bool {
        self.can_load_list
    }

    /// Rebuild the rows for the current category
    pub fn load_list(&mut self) {
        let addons = self.addons.read();
        let list: Vec<&Addon> = if self.addon_type == UPDATE_TYPE {
            let mut list: Vec<&Addon> = addons.iter().filter(|a| a.needs_update()).collect();
            list.sort_by_key(|a| a.name().to_lowercase());
            list
        } else {
            addons.iter_type(&self.addon_type)
        };

        self.rows = list
            .into_iter()
            .map(|addon| AddonRow {
                id: addon.id().to_string(),
                label: addon.name().to_string(),
                icon: AddonIcon::for_addon(addon),
            })
            .collect();
        log::debug!("Listing {} '{}' addons", self.rows.len(), self.addon_type);
    }

    pub fn rows(&self) -> &[AddonRow] {
        &self.rows
    }

    pub fn addon_type(&self) -> &str {
        &self.addon_type
    }

    pub fn status(&self) -> &UpdateStatus {
        &self.status
    }

    pub fn dialog(&self) -> Option<&AddonsLoading> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut AddonsLoading> {
        self.dialog.as_mut()
    }

    /// Close the install dialog unless a job is running
    pub fn close_dialog(&mut self) -> bool {
        if self.dialog.as_ref().is_some_and(|d| d.is_busy()) {
            return false;
        }
        self.dialog = None;
        true
    }

    /// Handle a widget event.
    ///
    /// `selection` is the selected item of the widget: the addon id for
    /// `list_addons`, the tab id for `category`.
    pub fn event_callback(
        &mut self,
        name: &str,
        selection: Option<&str>,
        player: PlayerId,
    ) -> EventOutcome {
        match (name, selection) {
            ("back", _) => EventOutcome::PopMenu,
            ("list_addons", Some(id)) => {
                if !self.can_load_list || self.dialog.as_ref().is_some_and(|d| d.is_busy()) {
                    return EventOutcome::Ignored;
                }
                match AddonsLoading::new(id, self.addons.clone(), self.installer.clone()) {
                    Some(dialog) => {
                        log::debug!("Player {} opened addon '{}'", player.0, id);
                        self.dialog = Some(dialog);
                        EventOutcome::DialogOpened(id.to_string())
                    }
                    None => {
                        log::warn!("Selected unknown addon '{}'", id);
                        EventOutcome::Ignored
                    }
                }
            }
            ("category", Some(tab)) => {
                let addon_type = match tab {
                    "tab_kart" => "kart",
                    "tab_track" => "track",
                    "tab_arena" => "arena",
                    "tab_update" => UPDATE_TYPE,
                    _ => return EventOutcome::Ignored,
                };
                self.addon_type = addon_type.to_string();
                if self.can_load_list {
                    self.load_list();
                }
                EventOutcome::TypeChanged(self.addon_type.clone())
            }
            _ => EventOutcome::Ignored,
        }
    }

    /// Poll the install dialog once per frame. When its job finishes the
    /// list is reloaded and the outcome returned.
    pub fn poll(&mut self) -> Option<InstallEvent> {
        let event = self.dialog.as_mut()?.poll()?;
        match &event.result {
            Ok(()) => log::info!("{:?} of '{}' finished", event.action, event.id),
            Err(e) => log::error!("{:?} of '{}' failed: {}", event.action, event.id, e),
        }
        self.load_list();
        Some(event)
    }
}
