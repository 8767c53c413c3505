//! Player registry for connected sessions
//!
//! Holds the transient state of every connected player, keyed by the
//! connection-scoped id the gateway minted for it:
//! - Player lifecycle (join on connect, removal on disconnect)
//! - Capacity enforcement for the whole server
//! - Stable insertion-order iteration, which keeps leaderboard ties deterministic
//!
//! The registry carries no game rules. Everything that changes a player's
//! vitals, inventory or score goes through the action resolver or the tick
//! scheduler.

use log::info;
use shared::Player;

/// Owns every connected player's state
#[derive(Debug)]
pub struct PlayerRegistry {
    /// Players in join order
    players: Vec<Player>,
    /// Maximum number of concurrent players allowed
    max_players: usize,
}

impl PlayerRegistry {
    /// Creates an empty registry with the given capacity limit
    pub fn new(max_players: usize) -> Self {
        Self {
            players: Vec::new(),
            max_players,
        }
    }

    /// Registers a default player under `id`
    ///
    /// Returns `None` if the server is at capacity or the id is already
    /// taken. New players start at the origin with full vitals and an empty
    /// inventory.
    pub fn add(&mut self, id: &str) -> Option<&Player> {
        if self.players.len() >= self.max_players || self.contains(id) {
            return None;
        }

        info!("Player {} joined", id);
        self.players.push(Player::new(id));
        self.players.last()
    }

    /// Removes a player. Returns the removed state, or `None` if the player
    /// was already gone.
    pub fn remove(&mut self, id: &str) -> Option<Player> {
        let index = self.players.iter().position(|player| player.id == id)?;
        info!("Player {} left", id);
        Some(self.players.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All players in join order
    pub fn all(&self) -> &[Player] {
        &self.players
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Returns the number of currently connected players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns true if no players are currently connected
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = PlayerRegistry::new(5);
        assert_eq!(registry.max_players(), 5);
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_add_player_defaults() {
        let mut registry = PlayerRegistry::new(2);

        let player = registry.add("p1").unwrap();
        assert_eq!(player.id, "p1");
        assert_eq!((player.x, player.y), (0.0, 0.0));
        assert_eq!(player.health, 100.0);
        assert_eq!(player.hunger, 100.0);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_add_player_max_capacity() {
        let mut registry = PlayerRegistry::new(1);

        assert!(registry.add("p1").is_some());
        assert!(registry.add("p2").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_duplicate_id_rejected() {
        let mut registry = PlayerRegistry::new(4);

        assert!(registry.add("p1").is_some());
        assert!(registry.add("p1").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_player() {
        let mut registry = PlayerRegistry::new(2);
        registry.add("p1");

        let removed = registry.remove("p1").unwrap();
        assert_eq!(removed.id, "p1");
        assert!(registry.is_empty());
        assert!(registry.get("p1").is_none());
    }

    #[test]
    fn test_remove_nonexistent_player() {
        let mut registry = PlayerRegistry::new(2);
        assert!(registry.remove("ghost").is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_iteration_keeps_join_order() {
        let mut registry = PlayerRegistry::new(4);
        registry.add("p3");
        registry.add("p1");
        registry.add("p2");
        registry.remove("p1");
        registry.add("p4");

        let ids: Vec<&str> = registry.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p2", "p4"]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut registry = PlayerRegistry::new(2);
        registry.add("p1");

        registry.get_mut("p1").unwrap().score = 12;
        assert_eq!(registry.get("p1").unwrap().score, 12);
    }
}
