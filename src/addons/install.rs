//! Background install/uninstall of addons
//!
//! An [`InstallJob`] runs an [`AddonInstaller`] on a worker thread, updates
//! the shared addon list when the installer succeeds and reports the outcome
//! over a channel that the screen polls once per frame.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, TryRecvError};

use super::addon::Addon;
use super::manager::SharedAddons;

/// Errors raised while installing or removing an addon
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("Addon '{0}' is not known")]
    UnknownAddon(String),
    #[error("Addon '{0}' has no archive to install")]
    NoArchive(String),
    #[error("Archive {path} not found")]
    MissingArchive { path: PathBuf },
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Install worker failed: {0}")]
    Worker(String),
    #[error("Addon '{0}' is already being installed or removed")]
    Busy(String),
    #[error("Unsafe path component '{0}'")]
    UnsafePath(String),
}

/// Does the file work for an install or uninstall
pub trait AddonInstaller: Send + Sync + 'static {
    fn install(&self, addon: &Addon) -> Result<(), InstallError>;
    fn uninstall(&self, addon: &Addon) -> Result<(), InstallError>;
}

/// Installer handed to every job started from the screens
pub type SharedInstaller = Arc<dyn AddonInstaller>;

impl<T: AddonInstaller + ?Sized> AddonInstaller for Arc<T> {
    fn install(&self, addon: &Addon) -> Result<(), InstallError> {
        (**self).install(addon)
    }

    fn uninstall(&self, addon: &Addon) -> Result<(), InstallError> {
        (**self).uninstall(addon)
    }
}

/// Installs addons from archives already present in a local cache directory
#[derive(Debug, Clone)]
pub struct ArchiveInstaller {
    cache_dir: PathBuf,
    addon_dir: PathBuf,
}

impl ArchiveInstaller {
    pub fn new(cache_dir: impl Into<PathBuf>, addon_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            addon_dir: addon_dir.into(),
        }
    }

    /// Directory an addon is unpacked into: `<addon_dir>/<type>/<id>`
    ///
    /// Type and id come from the catalog and must each name exactly one
    /// directory below `addon_dir`.
    pub fn install_dir(&self, addon: &Addon) -> Result<PathBuf, InstallError> {
        let addon_type = single_component(addon.addon_type())?;
        let id = single_component(addon.id())?;
        Ok(self.addon_dir.join(addon_type).join(id))
    }

    fn archive_path(&self, addon: &Addon) -> Result<PathBuf, InstallError> {
        if addon.zip_file().is_empty() {
            return Err(InstallError::NoArchive(addon.id().to_string()));
        }
        let path = self.cache_dir.join(single_component(addon.zip_file())?);
        if !path.is_file() {
            return Err(InstallError::MissingArchive { path });
        }
        Ok(path)
    }
}

impl AddonInstaller for ArchiveInstaller {
    fn install(&self, addon: &Addon) -> Result<(), InstallError> {
        let target = self.install_dir(addon)?;
        let archive_path = self.archive_path(addon)?;
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::create_dir_all(&target)?;

        let file = fs::File::open(&archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        archive.extract(&target)?;
        log::info!(
            "Extracted {} ({} entries) into {}",
            archive_path.display(),
            archive.len(),
            target.display()
        );
        Ok(())
    }

    fn uninstall(&self, addon: &Addon) -> Result<(), InstallError> {
        let target = self.install_dir(addon)?;
        if target.exists() {
            fs::remove_dir_all(&target)?;
            log::info!("Removed {}", target.display());
        } else {
            log::warn!("Uninstalling '{}': {} does not exist", addon.id(), target.display());
        }
        Ok(())
    }
}

/// Accept `name` only if it is one plain path component
fn single_component(name: &str) -> Result<&Path, InstallError> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(InstallError::UnsafePath(name.to_string())),
    }
}

/// What the worker should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    Install,
    Uninstall,
}

/// Completion message sent by the worker
#[derive(Debug)]
pub struct InstallEvent {
    pub id: String,
    pub action: InstallAction,
    pub result: Result<(), InstallError>,
}

/// Poll state of a running job
#[derive(Debug)]
pub enum InstallStatus {
    Running,
    Finished(InstallEvent),
}

/// A running install or uninstall
pub struct InstallJob {
    id: String,
    action: InstallAction,
    events: Receiver<InstallEvent>,
    handle: Option<JoinHandle<()>>,
}

impl InstallJob {
    /// Spawn the worker thread for `id`
    pub fn start<I: AddonInstaller>(
        id: &str,
        action: InstallAction,
        addons: SharedAddons,
        installer: I,
    ) -> Result<Self, InstallError> {
        let addon = addons
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| InstallError::UnknownAddon(id.to_string()))?;
        let (tx, rx) = channel::bounded(1);

        let handle = thread::Builder::new()
            .name(format!("install-{}", id))
            .spawn(move || {
                let result = match action {
                    InstallAction::Install => installer.install(&addon),
                    InstallAction::Uninstall => installer.uninstall(&addon),
                };
                if result.is_ok() {
                    let mut list = addons.write();
                    match action {
                        InstallAction::Install => list.mark_installed(addon.id()),
                        InstallAction::Uninstall => list.mark_uninstalled(addon.id()),
                    };
                }
                let event = InstallEvent {
                    id: addon.id().to_string(),
                    action,
                    result,
                };
                // The job may have been dropped already
                let _ = tx.send(event);
            })?;

        log::debug!("Started {:?} job for '{}'", action, id);
        Ok(Self {
            id: id.to_string(),
            action,
            events: rx,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn action(&self) -> InstallAction {
        self.action
    }

    /// Non-blocking check for completion
    pub fn poll(&mut self) -> InstallStatus {
        match self.events.try_recv() {
            Ok(event) => {
                self.join();
                InstallStatus::Finished(event)
            }
            Err(TryRecvError::Empty) => InstallStatus::Running,
            Err(TryRecvError::Disconnected) => InstallStatus::Finished(self.worker_died()),
        }
    }

    /// Block until the worker finishes
    pub fn wait(mut self) -> InstallEvent {
        match self.events.recv() {
            Ok(event) => {
                self.join();
                event
            }
            Err(_) => self.worker_died(),
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Install worker for '{}' panicked", self.id);
            }
        }
    }

    fn worker_died(&mut self) -> InstallEvent {
        self.join();
        InstallEvent {
            id: self.id.clone(),
            action: self.action,
            result: Err(InstallError::Worker("worker exited without reporting".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addons::manager::AddonsManager;
    use crate::addons::xml::XmlNode;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const CATALOG: &str = r#"<assets>
  <kart name="Gnu" file="gnu.zip" version="2"/>
  <track name="Nozip" version="1"/>
</assets>"#;

    fn shared() -> SharedAddons {
        let addons = AddonsManager::shared();
        addons.write().load_catalog(CATALOG).unwrap();
        addons
    }

    fn write_archive(path: &Path) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("kart.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<kart name=\"Gnu\"/>").unwrap();
        zip.start_file("gnu.png", SimpleFileOptions::default()).unwrap();
        zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_install_and_uninstall_archive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let addon_dir = dir.path().join("addons");
        fs::create_dir_all(&cache).unwrap();
        write_archive(&cache.join("gnu.zip"));

        let addons = shared();
        let installer = ArchiveInstaller::new(&cache, &addon_dir);

        let job = InstallJob::start("gnu", InstallAction::Install, addons.clone(), installer.clone())
            .unwrap();
        let event = job.wait();
        assert!(event.result.is_ok());
        assert_eq!(event.id, "gnu");
        assert!(addon_dir.join("kart").join("gnu").join("kart.xml").is_file());
        {
            let list = addons.read();
            let gnu = list.get("gnu").unwrap();
            assert!(gnu.is_installed());
            assert_eq!(gnu.installed_version(), 2);
        }

        let job = InstallJob::start("gnu", InstallAction::Uninstall, addons.clone(), installer)
            .unwrap();
        assert!(job.wait().result.is_ok());
        assert!(!addon_dir.join("kart").join("gnu").exists());
        assert!(!addons.read().get("gnu").unwrap().is_installed());
    }

    #[test]
    fn test_missing_archive_leaves_addon_uninstalled() {
        let dir = tempfile::tempdir().unwrap();
        let addons = shared();
        let installer = ArchiveInstaller::new(dir.path(), dir.path().join("addons"));

        let event = InstallJob::start("gnu", InstallAction::Install, addons.clone(), installer)
            .unwrap()
            .wait();
        assert!(matches!(event.result, Err(InstallError::MissingArchive { .. })));
        assert!(!addons.read().get("gnu").unwrap().is_installed());
    }

    #[test]
    fn test_addon_without_archive() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ArchiveInstaller::new(dir.path(), dir.path());
        let event = InstallJob::start("nozip", InstallAction::Install, shared(), installer)
            .unwrap()
            .wait();
        assert!(matches!(event.result, Err(InstallError::NoArchive(_))));
    }

    #[test]
    fn test_unknown_addon() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ArchiveInstaller::new(dir.path(), dir.path());
        let result = InstallJob::start("ghost", InstallAction::Install, shared(), installer);
        assert!(matches!(result, Err(InstallError::UnknownAddon(_))));
    }

    #[test]
    fn test_poll_until_finished() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ArchiveInstaller::new(dir.path(), dir.path().join("addons"));
        let mut job =
            InstallJob::start("gnu", InstallAction::Uninstall, shared(), installer).unwrap();
        let event = loop {
            match job.poll() {
                InstallStatus::Running => thread::yield_now(),
                InstallStatus::Finished(event) => break event,
            }
        };
        assert_eq!(event.action, InstallAction::Uninstall);
        assert!(event.result.is_ok());
    }

    fn catalog_entry(xml: &str) -> Addon {
        let root = XmlNode::parse(xml).unwrap();
        Addon::from_xml(&root.children()[0], false)
    }

    #[test]
    fn test_nameless_entry_never_touches_type_dir() {
        let dir = tempfile::tempdir().unwrap();
        let gnu = dir.path().join("addons").join("kart").join("gnu");
        fs::create_dir_all(&gnu).unwrap();
        let installer = ArchiveInstaller::new(dir.path(), dir.path().join("addons"));

        let nameless = catalog_entry(r#"<assets><kart version="1"/></assets>"#);
        assert_eq!(nameless.id(), "");
        assert!(matches!(installer.uninstall(&nameless), Err(InstallError::UnsafePath(_))));
        assert!(gnu.is_dir());
    }

    #[test]
    fn test_parent_dir_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let victim = dir.path().join("victim");
        fs::create_dir_all(&victim).unwrap();
        fs::create_dir_all(dir.path().join("addons").join("kart")).unwrap();
        let installer = ArchiveInstaller::new(dir.path(), dir.path().join("addons"));

        let escape = catalog_entry(r#"<assets><kart name="../../victim" file="gnu.zip"/></assets>"#);
        assert!(matches!(installer.uninstall(&escape), Err(InstallError::UnsafePath(_))));
        assert!(matches!(installer.install(&escape), Err(InstallError::UnsafePath(_))));
        assert!(victim.is_dir());
    }

    #[test]
    fn test_absolute_archive_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("elsewhere.zip");
        write_archive(&outside);
        let cache = dir.path().join("cache");
        let addon_dir = dir.path().join("addons");
        let installer = ArchiveInstaller::new(&cache, &addon_dir);

        let xml = format!(
            r#"<assets><kart name="Gnu" file="{}"/></assets>"#,
            outside.display()
        );
        let addon = catalog_entry(&xml);
        assert!(matches!(installer.install(&addon), Err(InstallError::UnsafePath(_))));
        let dotted = catalog_entry(r#"<assets><kart name="Gnu" file="../elsewhere.zip"/></assets>"#);
        assert!(matches!(installer.install(&dotted), Err(InstallError::UnsafePath(_))));
        assert!(!addon_dir.join("kart").join("gnu").exists());
    }
}
