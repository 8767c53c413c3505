//! Periodic simulation work
//!
//! Two independent schedules drive the world forward between client
//! messages. The vitals tick decays hunger, moves health depending on how
//! fed a player is and counts attack cooldowns down. The respawn tick
//! tops resource nodes back up to their targets.

use crate::actions::{player_update, world_update};
use crate::broadcast::Outbound;
use crate::game::GameState;
use log::debug;
use shared::{Player, MAX_HEALTH, MAX_HUNGER};

pub const HUNGER_DECAY: f32 = 0.1;
pub const STARVATION_DAMAGE: f32 = 0.1;
pub const WELL_FED_REGEN: f32 = 0.1;
pub const STARVING_BELOW: f32 = 20.0;
pub const WELL_FED_ABOVE: f32 = 70.0;

/// Advances one player's vitals by a single tick
pub fn apply_vitals(player: &mut Player) {
    player.hunger = (player.hunger - HUNGER_DECAY).max(0.0);

    if player.hunger < STARVING_BELOW {
        player.health = (player.health - STARVATION_DAMAGE).max(0.0);
    } else if player.hunger > WELL_FED_ABOVE && player.health < MAX_HEALTH {
        player.health = (player.health + WELL_FED_REGEN).min(MAX_HEALTH);
    }
    player.hunger = player.hunger.min(MAX_HUNGER);

    if player.attack_cooldown > 0 {
        player.attack_cooldown -= 1;
    } else {
        player.is_attacking = false;
    }
}

/// Runs the vitals tick over every player and reports each of them
pub fn vitals_tick(state: &mut GameState) -> Vec<Outbound> {
    state.tick += 1;
    state
        .players
        .iter_mut()
        .map(|player| {
            apply_vitals(player);
            player_update(player)
        })
        .collect()
}

/// Refills the world and always re-sends it, even when nothing was added
pub fn respawn_tick(state: &mut GameState) -> Vec<Outbound> {
    let report = state.respawn_resources();
    if report.is_empty() {
        debug!("Respawn tick: world already at target");
    }
    vec![world_update(state)]
}
