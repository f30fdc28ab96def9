//! Flee rolls and escape directions.

use aw_core::{Direction, Position};
use rand::Rng;

/// Default chance basis for a given agility: `agility * 10`.
pub fn flee_chance(agility: u32) -> u32 {
    agility.saturating_mul(10).min(100)
}

/// Rolls `1..=100` once; the flee succeeds when the roll does not exceed
/// `chance_basis`, clamped to 100.
pub fn roll_flee<R: Rng>(rng: &mut R, chance_basis: u32) -> bool {
    let roll: u32 = rng.random_range(1..=100);
    roll <= chance_basis.min(100)
}

/// Cardinal steps that put distance between `from` and `opponent`, best
/// first. Horizontal retreat is tried before vertical; a purely horizontal
/// or vertical retreat falls back to the two perpendicular sidesteps. When
/// both share a tile, every direction is a candidate.
pub fn escape_directions(from: Position, opponent: Position) -> Vec<Direction> {
    let sx = (from.x - opponent.x).signum();
    let sy = (from.y - opponent.y).signum();
    let horizontal = Direction::from_delta(sx, 0);
    let vertical = Direction::from_delta(0, sy);

    match (horizontal, vertical) {
        (None, None) => Direction::ALL.to_vec(),
        (Some(h), None) => vec![h, Direction::Up, Direction::Down],
        (None, Some(v)) => vec![v, Direction::Left, Direction::Right],
        (Some(h), Some(v)) => vec![h, v],
    }
}
