//! Install/uninstall dialog
//!
//! Opened from the addons list for one addon. The dialog owns the running
//! [`InstallJob`] and is polled once per frame until the job reports back.

use crate::addons::{
    Addon, InstallAction, InstallError, InstallEvent, InstallJob, InstallStatus, SharedAddons,
    SharedInstaller,
};

/// Dialog for one addon
pub struct AddonsLoading {
    /// Snapshot taken when the dialog was opened
    addon: Addon,
    addons: SharedAddons,
    installer: SharedInstaller,
    job: Option<InstallJob>,
}

impl std::fmt::Debug for AddonsLoading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonsLoading")
            .field("addon", &self.addon.id())
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl AddonsLoading {
    /// Open the dialog for `id`; `None` if the addon is unknown
    pub fn new(id: &str, addons: SharedAddons, installer: SharedInstaller) -> Option<Self> {
        let addon = addons.read().get(id).cloned()?;
        Some(Self {
            addon,
            addons,
            installer,
            job: None,
        })
    }

    pub fn addon(&self) -> &Addon {
        &self.addon
    }

    /// Label of the main button
    pub fn action_label(&self) -> &'static str {
        if self.addon.needs_update() {
            "Update"
        } else if self.addon.is_installed() {
            "Uninstall"
        } else {
            "Install"
        }
    }

    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// Install, or update to the catalog version
    pub fn install(&mut self) -> Result<(), InstallError> {
        self.start(InstallAction::Install)
    }

    pub fn uninstall(&mut self) -> Result<(), InstallError> {
        self.start(InstallAction::Uninstall)
    }

    fn start(&mut self, action: InstallAction) -> Result<(), InstallError> {
        if self.is_busy() {
            return Err(InstallError::Busy(self.addon.id().to_string()));
        }
        let job = InstallJob::start(
            self.addon.id(),
            action,
            self.addons.clone(),
            self.installer.clone(),
        )?;
        self.job = Some(job);
        Ok(())
    }

    /// Check the running job. Returns the outcome once, when it finishes.
    pub fn poll(&mut self) -> Option<InstallEvent> {
        let job = self.job.as_mut()?;
        match job.poll() {
            InstallStatus::Running => None,
            InstallStatus::Finished(event) => {
                self.job = None;
                if let Some(addon) = self.addons.read().get(self.addon.id()) {
                    self.addon = addon.clone();
                }
                Some(event)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::addons::{AddonInstaller, AddonsManager};
    use std::sync::Arc;

    /// Installer that succeeds without touching the disk, or always fails
    pub struct FakeInstaller {
        pub fail: bool,
    }

    impl AddonInstaller for FakeInstaller {
        fn install(&self, addon: &Addon) -> Result<(), InstallError> {
            if self.fail {
                return Err(InstallError::NoArchive(addon.id().to_string()));
            }
            Ok(())
        }

        fn uninstall(&self, addon: &Addon) -> Result<(), InstallError> {
            self.install(addon)
        }
    }

    pub fn wait_for(dialog: &mut AddonsLoading) -> InstallEvent {
        loop {
            if let Some(event) = dialog.poll() {
                return event;
            }
            std::thread::yield_now();
        }
    }

    fn addons() -> SharedAddons {
        let addons = AddonsManager::shared();
        addons
            .write()
            .load_catalog(r#"<assets><kart name="Gnu" file="gnu.zip" version="3"/></assets>"#)
            .unwrap();
        addons
    }

    #[test]
    fn test_unknown_addon_has_no_dialog() {
        let installer: SharedInstaller = Arc::new(FakeInstaller { fail: false });
        assert!(AddonsLoading::new("ghost", addons(), installer).is_none());
    }

    #[test]
    fn test_install_then_uninstall() {
        let addons = addons();
        let installer: SharedInstaller = Arc::new(FakeInstaller { fail: false });
        let mut dialog = AddonsLoading::new("gnu", addons.clone(), installer).unwrap();
        assert_eq!(dialog.action_label(), "Install");
        assert!(dialog.poll().is_none());

        dialog.install().unwrap();
        assert!(dialog.is_busy());
        assert!(matches!(dialog.uninstall(), Err(InstallError::Busy(_))));

        let event = wait_for(&mut dialog);
        assert!(event.result.is_ok());
        assert!(!dialog.is_busy());
        assert!(dialog.addon().is_installed());
        assert_eq!(dialog.addon().installed_version(), 3);
        assert_eq!(dialog.action_label(), "Uninstall");

        dialog.uninstall().unwrap();
        let event = wait_for(&mut dialog);
        assert_eq!(event.action, InstallAction::Uninstall);
        assert!(!addons.read().get("gnu").unwrap().is_installed());
        assert_eq!(dialog.action_label(), "Install");
    }

    #[test]
    fn test_failed_install_keeps_state() {
        let addons = addons();
        let installer: SharedInstaller = Arc::new(FakeInstaller { fail: true });
        let mut dialog = AddonsLoading::new("gnu", addons.clone(), installer).unwrap();
        dialog.install().unwrap();
        let event = wait_for(&mut dialog);
        assert!(event.result.is_err());
        assert!(!dialog.addon().is_installed());
        assert!(!addons.read().get("gnu").unwrap().is_installed());
    }
}
