//! Leaderboard projection
//!
//! Never stored: rebuilt from the registry whenever a score changes or a
//! player joins or leaves, and always sent in full.

use crate::broadcast::Outbound;
use crate::registry::PlayerRegistry;
use shared::{LeaderboardEntry, ServerEvent, LEADERBOARD_SIZE};

/// Top players by descending score. Ties keep join order.
pub fn compute(players: &PlayerRegistry) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<_> = players.all().iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|player| LeaderboardEntry {
            nickname: player.nickname.clone(),
            score: player.score,
        })
        .collect()
}

pub fn broadcast(players: &PlayerRegistry) -> Outbound {
    Outbound::all(ServerEvent::Leaderboard {
        leaderboard: compute(players),
    })
}
