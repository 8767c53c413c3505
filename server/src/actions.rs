//! Action resolver: the rules engine for every client intent
//!
//! Each handler takes the acting player's id and a decoded intent, checks
//! every precondition against the current state, and only then mutates.
//! A failed precondition is a silent no-op: nothing changes and no event
//! is produced. Handlers return the events the mutation should produce and
//! leave delivery to the broadcast bus.
//!
//! Intents from players that are no longer registered are dropped.

use crate::broadcast::Outbound;
use crate::game::GameState;
use crate::leaderboard;
use crate::world::Strike;
use log::debug;
use shared::{
    cell_center, clamp_to_world, distance, snap_to_grid, ActionRequest, ClientMessage, ItemKind,
    Player, ResourceType, ServerEvent, ATTACK_DAMAGE, BLOCK_COLLISION_RADIUS, MAX_HEALTH,
    MAX_HUNGER,
};

const MINE_SCORE: i64 = 1;
const HIT_SCORE: i64 = 5;
const KILL_SCORE: i64 = 20;
const PLACE_BLOCK_SCORE: i64 = 2;
const REMOVE_BLOCK_SCORE: i64 = -1;
const CRAFT_SCORE: i64 = 3;
const FOOD_HUNGER_RESTORE: f32 = 25.0;

/// Routes a decoded client message to its handler
pub fn handle_message(
    state: &mut GameState,
    player_id: &str,
    message: ClientMessage,
    now_ms: u64,
) -> Vec<Outbound> {
    match message {
        ClientMessage::PlayerInfo {
            nickname,
            emoji,
            device_type,
        } => update_player_info(state, player_id, nickname, emoji, device_type),
        ClientMessage::Move {
            x,
            y,
            emoji,
            health,
            hunger,
            is_attacking,
        } => move_player(
            state,
            player_id,
            MoveReport {
                x,
                y,
                emoji,
                health,
                hunger,
                is_attacking,
            },
            now_ms,
        ),
        ClientMessage::Action(action) => handle_action(state, player_id, action),
        ClientMessage::Craft { recipe_index } => craft(state, player_id, recipe_index),
        ClientMessage::Chat { message } => chat(state, player_id, message),
    }
}

pub fn handle_action(state: &mut GameState, player_id: &str, action: ActionRequest) -> Vec<Outbound> {
    match action {
        ActionRequest::Mine {
            resource_type,
            x,
            y,
        } => mine(state, player_id, resource_type, x, y),
        ActionRequest::Attack => attack(state, player_id),
        ActionRequest::PlaceBlock { block_x, block_y } => {
            place_block(state, player_id, block_x, block_y)
        }
        ActionRequest::RemoveBlock { block_x, block_y } => {
            remove_block(state, player_id, block_x, block_y)
        }
        ActionRequest::UseFood => use_food(state, player_id),
    }
}

/// Registers a new player and produces the join handshake.
///
/// Returns `None` when the registry refuses the player (server full).
pub fn join(state: &mut GameState, player_id: &str) -> Option<Vec<Outbound>> {
    let player = state.players.add(player_id)?.clone();

    Some(vec![
        Outbound::only(
            player_id,
            ServerEvent::Init {
                player_id: player_id.to_string(),
                players: state.players.all().to_vec(),
                world: state.world.snapshot(),
                recipes: state.recipes().to_vec(),
            },
        ),
        Outbound::all_except(player_id, ServerEvent::PlayerJoined { player }),
        leaderboard::broadcast(&state.players),
    ])
}

pub fn leave(state: &mut GameState, player_id: &str) -> Vec<Outbound> {
    if state.players.remove(player_id).is_none() {
        return Vec::new();
    }

    vec![
        Outbound::all(ServerEvent::PlayerLeft {
            player_id: player_id.to_string(),
        }),
        leaderboard::broadcast(&state.players),
    ]
}

/// Position and vitals as reported by the client on every move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub x: f32,
    pub y: f32,
    pub emoji: String,
    pub health: f32,
    pub hunger: f32,
    pub is_attacking: bool,
}

/// Applies a client position report.
///
/// The target is clamped to the world bounds and resolved against blocks
/// (full move, then x-only, then y-only). Cosmetic and vitals fields are
/// taken from the client, vitals clamped to their valid range.
pub fn move_player(
    state: &mut GameState,
    player_id: &str,
    report: MoveReport,
    now_ms: u64,
) -> Vec<Outbound> {
    let Some(player) = state.players.get(player_id) else {
        return Vec::new();
    };

    let from = (player.x, player.y);
    let target = (clamp_to_world(report.x), clamp_to_world(report.y));
    let (x, y) = state.world.resolve_move(from, target);

    let Some(player) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    player.x = x;
    player.y = y;
    player.emoji = report.emoji;
    player.health = clamp_vital(report.health, MAX_HEALTH);
    player.hunger = clamp_vital(report.hunger, MAX_HUNGER);
    player.is_attacking = report.is_attacking;
    player.last_update = now_ms;

    vec![player_update(player)]
}

pub fn update_player_info(
    state: &mut GameState,
    player_id: &str,
    nickname: String,
    emoji: String,
    device_type: String,
) -> Vec<Outbound> {
    let Some(player) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    player.nickname = nickname;
    player.emoji = emoji;
    player.device_type = device_type;

    let update = player_update(player);
    vec![update, leaderboard::broadcast(&state.players)]
}

/// One hit on the first matching node near (x, y).
///
/// The inventory is re-sent on every hit; the world and leaderboard only
/// when the hit depleted the node.
pub fn mine(
    state: &mut GameState,
    player_id: &str,
    kind: ResourceType,
    x: f32,
    y: f32,
) -> Vec<Outbound> {
    if !state.players.contains(player_id) {
        return Vec::new();
    }
    let Some(node_id) = state
        .world
        .find_resource_at(kind, x, y)
        .map(|node| node.id.clone())
    else {
        return Vec::new();
    };
    let Some(strike) = state.world.strike(kind, &node_id) else {
        return Vec::new();
    };

    let mut events = Vec::new();
    if strike == Strike::Depleted {
        if let Some(player) = state.players.get_mut(player_id) {
            player.inventory.add(kind.item(), 1);
            player.score += MINE_SCORE;
        }
        debug!("{} depleted {}", player_id, node_id);
        events.push(world_update(state));
        events.push(leaderboard::broadcast(&state.players));
    }

    if let Some(player) = state.players.get(player_id) {
        events.push(inventory_update(player));
    }
    events
}

/// Swings a sword at everyone in range.
///
/// Costs one sword. Each other player strictly inside the attack radius
/// loses health; a target brought to zero respawns at the origin with full
/// health and the attacker earns the kill bonus in the same action.
pub fn attack(state: &mut GameState, player_id: &str) -> Vec<Outbound> {
    let Some(attacker) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    if !attacker.inventory.take_one(ItemKind::Sword) {
        return Vec::new();
    }
    attacker.is_attacking = true;
    let (ax, ay, radius) = (attacker.x, attacker.y, attacker.attack_radius);

    let mut events = Vec::new();
    let mut earned = 0;
    for target in state.players.iter_mut() {
        if target.id == player_id || target.distance_to(ax, ay) >= radius {
            continue;
        }

        target.health -= ATTACK_DAMAGE;
        earned += HIT_SCORE;
        if target.health <= 0.0 {
            earned += KILL_SCORE;
            target.health = MAX_HEALTH;
            target.x = 0.0;
            target.y = 0.0;
            debug!("{} knocked out {}", player_id, target.id);
        }
        events.push(player_update(target));
    }

    let hit = earned > 0;
    let Some(attacker) = state.players.get_mut(player_id) else {
        return events;
    };
    attacker.score += earned;
    let inventory = inventory_update(attacker);

    if hit {
        events.push(leaderboard::broadcast(&state.players));
    }
    events.push(inventory);
    events
}

/// Builds a block in the grid cell containing (block_x, block_y).
///
/// Rejected when the player has no block, the cell is taken, or any
/// connected player stands within the collision radius of the cell center.
pub fn place_block(state: &mut GameState, player_id: &str, block_x: f32, block_y: f32) -> Vec<Outbound> {
    let (x, y) = (snap_to_grid(block_x), snap_to_grid(block_y));

    let Some(player) = state.players.get(player_id) else {
        return Vec::new();
    };
    if player.inventory.block == 0 || state.world.block_at(x, y).is_some() {
        return Vec::new();
    }
    let (cx, cy) = cell_center(x, y);
    let occupied = state
        .players
        .all()
        .iter()
        .any(|p| distance(p.x, p.y, cx, cy) < BLOCK_COLLISION_RADIUS);
    if occupied {
        return Vec::new();
    }

    if state.world.place_block(x, y).is_none() {
        return Vec::new();
    }
    let Some(player) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    player.inventory.take_one(ItemKind::Block);
    player.score += PLACE_BLOCK_SCORE;
    let inventory = inventory_update(player);

    vec![
        world_update(state),
        inventory,
        leaderboard::broadcast(&state.players),
    ]
}

/// Tears down the block in the given cell. Anyone may remove any block;
/// the refund goes to whoever removed it.
pub fn remove_block(state: &mut GameState, player_id: &str, block_x: f32, block_y: f32) -> Vec<Outbound> {
    let (x, y) = (snap_to_grid(block_x), snap_to_grid(block_y));

    if !state.players.contains(player_id) || state.world.block_at(x, y).is_none() {
        return Vec::new();
    }
    state.world.remove_block(x, y);

    let Some(player) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    player.inventory.add(ItemKind::Block, 1);
    player.score += REMOVE_BLOCK_SCORE;
    let inventory = inventory_update(player);

    vec![
        world_update(state),
        inventory,
        leaderboard::broadcast(&state.players),
    ]
}

pub fn use_food(state: &mut GameState, player_id: &str) -> Vec<Outbound> {
    let Some(player) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    if !player.inventory.take_one(ItemKind::Food) {
        return Vec::new();
    }
    player.hunger = (player.hunger + FOOD_HUNGER_RESTORE).min(MAX_HUNGER);

    vec![inventory_update(player), player_update(player)]
}

/// Crafts recipe `recipe_index`, paying the full cost or nothing.
pub fn craft(state: &mut GameState, player_id: &str, recipe_index: usize) -> Vec<Outbound> {
    let Some(recipe) = state.recipe(recipe_index).cloned() else {
        debug!("{} asked for unknown recipe {}", player_id, recipe_index);
        return Vec::new();
    };
    let Some(player) = state.players.get_mut(player_id) else {
        return Vec::new();
    };
    if !player.inventory.pay(&recipe.cost) {
        return Vec::new();
    }

    player.inventory.add(recipe.result, recipe.quantity);
    if recipe.result == ItemKind::Bow {
        player.bow_durability = player.max_bow_durability;
    }
    player.score += CRAFT_SCORE;

    let mut events = vec![inventory_update(player), player_update(player)];
    events.push(leaderboard::broadcast(&state.players));
    events
}

pub fn chat(state: &mut GameState, player_id: &str, message: String) -> Vec<Outbound> {
    let Some(player) = state.players.get(player_id) else {
        return Vec::new();
    };

    vec![Outbound::all(ServerEvent::Chat {
        player_id: player_id.to_string(),
        username: player.nickname.clone(),
        message,
    })]
}

fn clamp_vital(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        return max;
    }
    value.clamp(0.0, max)
}

pub(crate) fn player_update(player: &Player) -> Outbound {
    Outbound::all(ServerEvent::PlayerUpdate {
        player: player.clone(),
    })
}

fn inventory_update(player: &Player) -> Outbound {
    Outbound::all(ServerEvent::PlayerInventory {
        player_id: player.id.clone(),
        inventory: player.inventory.clone(),
    })
}

pub(crate) fn world_update(state: &GameState) -> Outbound {
    Outbound::all(ServerEvent::WorldUpdate {
        world: state.world.snapshot(),
    })
}
