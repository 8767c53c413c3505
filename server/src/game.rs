use crate::registry::PlayerRegistry;
use crate::utils::server_time;
use crate::world::{RespawnReport, WorldStore};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{craft_recipes, Recipe, ServerStats, WorldCounts};

/// Everything the simulation owns: world, players and the crafting catalog.
///
/// Exactly one task holds a `GameState` at a time, so every action sees a
/// consistent view of both the world and the full player set.
#[derive(Debug)]
pub struct GameState {
    pub tick: u64,
    pub world: WorldStore,
    pub players: PlayerRegistry,
    recipes: Vec<Recipe>,
    rng: StdRng,
}

impl GameState {
    /// Creates a state with an empty world
    pub fn new(max_players: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            tick: 0,
            world: WorldStore::new(),
            players: PlayerRegistry::new(max_players),
            recipes: craft_recipes(),
            rng,
        }
    }

    /// Creates a state and runs initial world generation
    pub fn generated(max_players: usize, seed: Option<u64>) -> Self {
        let mut state = Self::new(max_players, seed);
        state.world.generate(&mut state.rng);
        state
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn recipe(&self, index: usize) -> Option<&Recipe> {
        self.recipes.get(index)
    }

    pub fn respawn_resources(&mut self) -> RespawnReport {
        let report = self.world.respawn(&mut self.rng);
        if report.trees_added > 0 {
            info!("Respawn: +{} trees", report.trees_added);
        }
        if report.stones_added > 0 {
            info!("Respawn: +{} stones", report.stones_added);
        }
        report
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            online: self.players.len(),
            total_players: self.players.all().len(),
            world: WorldCounts {
                trees: self.world.tree_count(),
                stones: self.world.stone_count(),
                blocks: self.world.block_count(),
            },
            server_time: server_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_state() {
        let state = GameState::generated(8, Some(1));
        assert_eq!(state.world.tree_count(), 50);
        assert_eq!(state.world.stone_count(), 30);
        assert!(state.players.is_empty());
        assert_eq!(state.recipes().len(), 5);
        assert!(state.recipe(5).is_none());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = GameState::generated(8, Some(99));
        let b = GameState::generated(8, Some(99));
        let (wa, wb) = (a.world.snapshot(), b.world.snapshot());
        for (ta, tb) in wa.trees.iter().zip(&wb.trees) {
            assert_eq!((ta.x, ta.y, &ta.emoji), (tb.x, tb.y, &tb.emoji));
        }
    }

    #[test]
    fn test_stats_counts() {
        let mut state = GameState::generated(8, Some(3));
        state.players.add("p1");
        state.world.place_block(0, 0);

        let stats = state.stats();
        assert_eq!(stats.online, 1);
        assert_eq!(stats.total_players, 1);
        assert_eq!(stats.world.trees, 50);
        assert_eq!(stats.world.stones, 30);
        assert_eq!(stats.world.blocks, 1);
    }
}
