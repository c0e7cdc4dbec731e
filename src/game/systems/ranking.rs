//! Length ranking and leaderboard.

use serde::Serialize;

use crate::game::state::{GameState, WormId};

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: WormId,
    pub name: String,
    pub length: usize,
    pub score: u32,
    pub is_player: bool,
}

/// Recompute the player's 1-based rank: one plus the number of living
/// worms strictly longer than the player. Ties share the better rank.
pub fn update(state: &mut GameState) {
    let Some(player_len) = state.player().map(|p| p.len()) else {
        return;
    };
    let longer = state
        .worms
        .iter()
        .filter(|w| !w.is_player() && w.len() > player_len)
        .count();
    state.player_rank = longer + 1;
}

/// Top `n` living worms by length, longest first
pub fn leaderboard(state: &GameState, n: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = state
        .worms
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| LeaderboardEntry {
            id: w.id.clone(),
            name: w.name.clone(),
            length: w.len(),
            score: w.score,
            is_player: w.is_player(),
        })
        .collect();
    // Stable sort keeps slot order among equal lengths
    entries.sort_by(|a, b| b.length.cmp(&a.length));
    entries.truncate(n);
    entries
}
