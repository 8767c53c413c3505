//! World store: resource nodes and player-placed blocks
//!
//! Owns every structural object in the shared world. Trees and stones are
//! generated at random positions inside the world bounds, worn down by
//! mining and topped back up by the respawn tick. Blocks live on a fixed
//! grid with at most one block per cell.
//!
//! Lookups keep storage order: `find_resource_at` returns the
//! first node inside the hit radius, not the closest one.

use crate::ids::IdGenerator;
use log::info;
use rand::Rng;
use shared::{
    distance, Block, ResourceNode, ResourceType, WorldSnapshot,
    BLOCK_COLLISION_RADIUS, RESOURCE_NODE_HEALTH, STONE_EMOJI, TARGET_STONES, TARGET_TREES,
    TREE_EMOJIS, WORLD_HALF_EXTENT,
};

const TREE_MIN_SIZE: f32 = 50.0;
const TREE_SIZE_SPREAD: f32 = 20.0;
const STONE_SIZE: f32 = 45.0;

/// Outcome of a single successful hit on a resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    /// Node survived with the given health left
    Damaged { remaining: u32 },
    /// Node reached zero health and was removed from the world
    Depleted,
}

/// How many nodes a respawn pass added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RespawnReport {
    pub trees_added: usize,
    pub stones_added: usize,
}

impl RespawnReport {
    pub fn is_empty(&self) -> bool {
        self.trees_added == 0 && self.stones_added == 0
    }
}

#[derive(Debug, Default)]
pub struct WorldStore {
    trees: Vec<ResourceNode>,
    stones: Vec<ResourceNode>,
    blocks: Vec<Block>,
    ids: IdGenerator,
}

impl WorldStore {
    /// Creates an empty world. Call [`WorldStore::generate`] to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the world with the target number of trees and stones
    pub fn generate<R: Rng>(&mut self, rng: &mut R) {
        for _ in 0..TARGET_TREES {
            self.spawn_random(ResourceType::Wood, rng);
        }
        for _ in 0..TARGET_STONES {
            self.spawn_random(ResourceType::Stone, rng);
        }
        info!(
            "Generated world with {} trees and {} stones",
            self.trees.len(),
            self.stones.len()
        );
    }

    /// Tops trees and stones back up to their targets. Never adds more
    /// nodes than are missing.
    pub fn respawn<R: Rng>(&mut self, rng: &mut R) -> RespawnReport {
        let trees_added = TARGET_TREES.saturating_sub(self.trees.len());
        for _ in 0..trees_added {
            self.spawn_random(ResourceType::Wood, rng);
        }

        let stones_added = TARGET_STONES.saturating_sub(self.stones.len());
        for _ in 0..stones_added {
            self.spawn_random(ResourceType::Stone, rng);
        }

        RespawnReport {
            trees_added,
            stones_added,
        }
    }

    fn spawn_random<R: Rng>(&mut self, kind: ResourceType, rng: &mut R) {
        let x = rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT);
        let y = rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT);
        let (size, emoji) = match kind {
            ResourceType::Wood => (
                TREE_MIN_SIZE + rng.gen::<f32>() * TREE_SIZE_SPREAD,
                TREE_EMOJIS[rng.gen_range(0..TREE_EMOJIS.len())],
            ),
            ResourceType::Stone => (STONE_SIZE, STONE_EMOJI),
        };
        self.push_node(kind, x, y, size, emoji);
    }

    /// Places a full-health node at an exact position and returns its id
    pub fn add_node(&mut self, kind: ResourceType, x: f32, y: f32) -> String {
        let (size, emoji) = match kind {
            ResourceType::Wood => (TREE_MIN_SIZE, TREE_EMOJIS[0]),
            ResourceType::Stone => (STONE_SIZE, STONE_EMOJI),
        };
        self.push_node(kind, x, y, size, emoji)
    }

    fn push_node(&mut self, kind: ResourceType, x: f32, y: f32, size: f32, emoji: &str) -> String {
        let prefix = match kind {
            ResourceType::Wood => "tree",
            ResourceType::Stone => "stone",
        };
        let id = self.ids.next(prefix);
        self.nodes_mut(kind).push(ResourceNode {
            id: id.clone(),
            x,
            y,
            size,
            emoji: emoji.to_string(),
            health: RESOURCE_NODE_HEALTH,
        });
        id
    }

    pub fn nodes(&self, kind: ResourceType) -> &[ResourceNode] {
        match kind {
            ResourceType::Wood => &self.trees,
            ResourceType::Stone => &self.stones,
        }
    }

    fn nodes_mut(&mut self, kind: ResourceType) -> &mut Vec<ResourceNode> {
        match kind {
            ResourceType::Wood => &mut self.trees,
            ResourceType::Stone => &mut self.stones,
        }
    }

    /// First node of `kind` strictly closer than its mining radius to (x, y)
    pub fn find_resource_at(&self, kind: ResourceType, x: f32, y: f32) -> Option<&ResourceNode> {
        let radius = kind.mine_radius();
        self.nodes(kind)
            .iter()
            .find(|node| distance(node.x, node.y, x, y) < radius)
    }

    /// Takes one point of health off the node with `id`. Returns `None` when
    /// no such node exists.
    pub fn strike(&mut self, kind: ResourceType, id: &str) -> Option<Strike> {
        let nodes = self.nodes_mut(kind);
        let index = nodes.iter().position(|node| node.id == id)?;

        let node = &mut nodes[index];
        node.health = node.health.saturating_sub(1);
        if node.health > 0 {
            return Some(Strike::Damaged {
                remaining: node.health,
            });
        }

        nodes.remove(index);
        Some(Strike::Depleted)
    }

    pub fn block_at(&self, x: i32, y: i32) -> Option<&Block> {
        self.blocks.iter().find(|block| block.x == x && block.y == y)
    }

    /// Creates a block in the cell anchored at (x, y). Returns `None` if the
    /// cell is already taken.
    pub fn place_block(&mut self, x: i32, y: i32) -> Option<&Block> {
        if self.block_at(x, y).is_some() {
            return None;
        }
        let id = self.ids.next("block");
        self.blocks.push(Block { id, x, y });
        self.blocks.last()
    }

    pub fn remove_block(&mut self, x: i32, y: i32) -> Option<Block> {
        let index = self
            .blocks
            .iter()
            .position(|block| block.x == x && block.y == y)?;
        Some(self.blocks.remove(index))
    }

    /// True if any block's cell center is strictly within `radius` of (x, y)
    pub fn collides_with_blocks(&self, x: f32, y: f32, radius: f32) -> bool {
        self.blocks.iter().any(|block| {
            let (cx, cy) = block.center();
            distance(x, y, cx, cy) < radius
        })
    }

    /// Resolves a move from `from` towards `to` against block collisions.
    ///
    /// Tries the full move first, then each axis on its own so players slide
    /// along walls. Stays put if every candidate is blocked.
    pub fn resolve_move(&self, from: (f32, f32), to: (f32, f32)) -> (f32, f32) {
        let candidates = [to, (to.0, from.1), (from.0, to.1)];
        candidates
            .into_iter()
            .find(|&(x, y)| !self.collides_with_blocks(x, y, BLOCK_COLLISION_RADIUS))
            .unwrap_or(from)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn stone_count(&self) -> usize {
        self.stones.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            trees: self.trees.clone(),
            stones: self.stones.clone(),
            blocks: self.blocks.clone(),
        }
    }
}
