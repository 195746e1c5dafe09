//! Menu screens
//!
//! [`Screens`] holds one instance of every screen for the lifetime of the
//! process. It is built once at startup and passed to whoever needs a
//! screen; dropping it tears the screens down.

pub mod addons_loading;
pub mod addons_screen;

pub use addons_loading::AddonsLoading;
pub use addons_screen::{AddonIcon, AddonRow, AddonsScreen, EventOutcome, UpdateStatus};

use crate::addons::{SharedAddons, SharedInstaller};

/// Identifies a screen on the menu stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    Addons,
}

/// All screens of the game
#[derive(Debug)]
pub struct Screens {
    addons: AddonsScreen,
    /// Screens currently shown, top last
    stack: Vec<ScreenId>,
}

impl Screens {
    pub fn new(addons: SharedAddons, installer: SharedInstaller) -> Self {
        Self {
            addons: AddonsScreen::new(addons, installer),
            stack: Vec::new(),
        }
    }

    pub fn addons(&self) -> &AddonsScreen {
        &self.addons
    }

    pub fn addons_mut(&mut self) -> &mut AddonsScreen {
        &mut self.addons
    }

    /// Show a screen on top of the current one
    pub fn push(&mut self, id: ScreenId) {
        self.stack.push(id);
        match id {
            ScreenId::Addons => self.addons.init(),
        }
    }

    /// Leave the top screen
    pub fn pop(&mut self) -> Option<ScreenId> {
        let id = self.stack.pop();
        if id == Some(ScreenId::Addons) {
            self.addons.close_dialog();
        }
        id
    }

    pub fn current(&self) -> Option<ScreenId> {
        self.stack.last().copied()
    }

    /// Route an event to the top screen and apply its outcome
    pub fn event_callback(
        &mut self,
        name: &str,
        selection: Option<&str>,
        player: crate::input::PlayerId,
    ) -> EventOutcome {
        let outcome = match self.current() {
            Some(ScreenId::Addons) => self.addons.event_callback(name, selection, player),
            None => EventOutcome::Ignored,
        };
        if outcome == EventOutcome::PopMenu {
            self.pop();
        }
        outcome
    }
}
