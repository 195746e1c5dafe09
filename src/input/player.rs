//! Active players and the state manager
//!
//! Players join from the menus and keep their id for the whole session.
//! While a race runs each player drives a kart through a [`KartController`].

use super::action::PlayerAction;

/// Stable id of an active player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub usize);

/// Receives actions for a kart during a race
pub trait KartController: Send {
    fn action(&mut self, action: PlayerAction, value: i32);
}

/// A player taking part in the current session
pub struct ActivePlayer {
    id: PlayerId,
    name: String,
    controller: Option<Box<dyn KartController>>,
}

impl std::fmt::Debug for ActivePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivePlayer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("racing", &self.is_racing())
            .finish()
    }
}

impl ActivePlayer {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            controller: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_racing(&self) -> bool {
        self.controller.is_some()
    }

    pub fn attach_controller(&mut self, controller: Box<dyn KartController>) {
        self.controller = Some(controller);
    }

    pub fn detach_controller(&mut self) -> Option<Box<dyn KartController>> {
        self.controller.take()
    }

    /// Forward an action to the kart; dropped outside of races
    pub fn send_action(&mut self, action: PlayerAction, value: i32) {
        if let Some(controller) = self.controller.as_mut() {
            controller.action(action, value);
        }
    }

    /// Release an action, e.g. when its stick direction was let go
    pub fn reset_action(&mut self, action: PlayerAction) {
        self.send_action(action, 0);
    }
}

/// Whether the game shows menus or runs a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    Menu,
    Race,
}

/// Owns the active players and the game state
#[derive(Debug, Default)]
pub struct StateManager {
    players: Vec<ActivePlayer>,
    next_id: usize,
    game_state: GameState,
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player and return its id
    pub fn create_active_player(&mut self, name: &str) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.push(ActivePlayer::new(id, name));
        log::info!("Player {} ('{}') joined", id.0, name);
        id
    }

    pub fn remove_active_player(&mut self, id: PlayerId) -> bool {
        let len = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != len
    }

    pub fn player(&self, id: PlayerId) -> Option<&ActivePlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut ActivePlayer> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Player that receives input from unassigned devices in single-player
    /// mode
    pub fn first_player(&self) -> Option<PlayerId> {
        self.players.first().map(|p| p.id)
    }

    pub fn players(&self) -> &[ActivePlayer] {
        &self.players
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    /// Attach a kart controller to every player and switch to race state
    pub fn start_race<F>(&mut self, mut make_controller: F)
    where
        F: FnMut(PlayerId) -> Box<dyn KartController>,
    {
        for player in &mut self.players {
            player.attach_controller(make_controller(player.id));
        }
        self.game_state = GameState::Race;
    }

    /// Detach all kart controllers and return to the menus
    pub fn end_race(&mut self) {
        for player in &mut self.players {
            player.detach_controller();
        }
        self.game_state = GameState::Menu;
    }
}
