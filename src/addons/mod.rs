//! Addon metadata, lists and installation
//!
//! Addons are optional karts, tracks and arenas. The online catalog lists
//! what can be downloaded; `addons_installed.xml` remembers what is on disk.

pub mod addon;
pub mod install;
pub mod manager;
pub mod xml;

pub use addon::Addon;
pub use install::{
    AddonInstaller, ArchiveInstaller, InstallAction, InstallError, InstallEvent, InstallJob,
    InstallStatus, SharedInstaller,
};
pub use manager::{AddonsManager, SharedAddons, INSTALLED_FILE};
pub use xml::{XmlError, XmlNode};
