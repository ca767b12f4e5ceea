use crate::room::ConnectionId;

/// Derived standing of one player. Ranks are 1-based competition ranks:
/// equal scores share a rank, and ties consume rank numbers, so scores
/// `[10, 10, 5]` rank as `[1, 1, 3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankEntry {
    pub player_id: ConnectionId,
    pub score: i64,
    pub rank: usize,
}

/// Sort by score descending and assign skip-style competition ranks.
pub fn rank_scores(scores: &[(ConnectionId, i64)]) -> Vec<RankEntry> {
    let mut sorted: Vec<(ConnectionId, i64)> = scores.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut entries = Vec::with_capacity(sorted.len());
    let mut rank = 0;
    let mut prev_score = None;
    for (position, (player_id, score)) in sorted.into_iter().enumerate() {
        if prev_score != Some(score) {
            rank = position + 1;
            prev_score = Some(score);
        }
        entries.push(RankEntry {
            player_id,
            score,
            rank,
        });
    }
    entries
}

/// Placement bonus for one player. The rank-indexed table pays out only
/// when the rank is strictly better than last place and exactly one
/// player holds it; a shared rank forfeits the bonus entirely.
pub fn bonus_for(
    entries: &[RankEntry],
    player_id: ConnectionId,
    room_size: usize,
    table: &[i64],
) -> i64 {
    let Some(entry) = entries.iter().find(|e| e.player_id == player_id) else {
        return 0;
    };
    if entry.rank >= room_size {
        return 0;
    }
    if entries.iter().filter(|e| e.rank == entry.rank).count() != 1 {
        return 0;
    }
    table.get(entry.rank - 1).copied().unwrap_or(0)
}
