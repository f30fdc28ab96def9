//! The layered tile grid.
//!
//! Ground, collision, and tree tiles share one flat buffer indexed by
//! `(layer, y * width + x)`. The occupant layer maps each tile to at most one
//! living actor, and actors live in an arena addressed by [`ActorId`].

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{Actor, ActorId};
use crate::error::{CoreError, CoreResult};
use crate::position::{Direction, Position};

/// A map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Decorative floor tiles. Never blocks.
    Ground,
    /// Any nonzero tile blocks movement.
    Collision,
    /// Nonzero trunk tiles block; canopy tiles can be walked under.
    Tree,
    /// Living actors, at most one per tile.
    Occupant,
}

impl Layer {
    const fn tile_plane(self) -> Option<usize> {
        match self {
            Self::Ground => Some(0),
            Self::Collision => Some(1),
            Self::Tree => Some(2),
            Self::Occupant => None,
        }
    }
}

const TILE_PLANES: usize = 3;

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFailure {
    /// The target lies outside the grid.
    OutOfBounds,
    /// The target is blocked by collision, a trunk, or a non-interactable actor.
    Blocked,
    /// The step was not a single cardinal step.
    InvalidStep,
}

impl fmt::Display for MoveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OutOfBounds => "out of bounds",
            Self::Blocked => "blocked",
            Self::InvalidStep => "invalid step",
        };
        write!(f, "{s}")
    }
}

/// Result of [`GridWorld::try_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// True if the actor moved or bumped an interactable occupant.
    pub success: bool,
    /// Set when `success` is false.
    pub reason: Option<MoveFailure>,
    /// The interactable occupant that was bumped. The mover stays in place.
    pub triggered_occupant: Option<ActorId>,
}

impl MoveResult {
    fn moved() -> Self {
        Self {
            success: true,
            reason: None,
            triggered_occupant: None,
        }
    }

    fn bumped(occupant: ActorId) -> Self {
        Self {
            success: true,
            reason: None,
            triggered_occupant: Some(occupant),
        }
    }

    fn failed(reason: MoveFailure) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            triggered_occupant: None,
        }
    }

    /// True when the mover actually changed tiles.
    pub fn moved_tiles(&self) -> bool {
        self.success && self.triggered_occupant.is_none()
    }
}

/// The world map together with every actor placed on it.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: u32,
    height: u32,
    tiles: Vec<u16>,
    canopy: HashSet<u16>,
    occupants: Vec<Option<ActorId>>,
    actors: Vec<Actor>,
}

impl GridWorld {
    /// An empty map of the given size. Both dimensions must be nonzero.
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidMap(format!(
                "map dimensions must be nonzero, got {width}x{height}"
            )));
        }
        let cells = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            tiles: vec![0; cells * TILE_PLANES],
            canopy: HashSet::new(),
            occupants: vec![None; cells],
            actors: Vec::new(),
        })
    }

    /// Map width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true if `pos` lies on the map.
    pub fn is_within_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn cell(&self, pos: Position) -> Option<usize> {
        self.is_within_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    fn tile_index(&self, layer: Layer, pos: Position) -> Option<usize> {
        let plane = layer.tile_plane()?;
        let cell = self.cell(pos)?;
        Some(plane * self.width as usize * self.height as usize + cell)
    }

    /// Tile id on a tile layer. `None` off the map or for [`Layer::Occupant`].
    pub fn tile(&self, layer: Layer, pos: Position) -> Option<u16> {
        self.tile_index(layer, pos).map(|i| self.tiles[i])
    }

    /// Sets the tile id on a tile layer.
    pub fn set_tile(&mut self, layer: Layer, pos: Position, id: u16) -> CoreResult<()> {
        if layer == Layer::Occupant {
            return Err(CoreError::InvalidMap(
                "the occupant layer is managed through actors".into(),
            ));
        }
        let index = self
            .tile_index(layer, pos)
            .ok_or(CoreError::OutOfBounds(pos))?;
        self.tiles[index] = id;
        Ok(())
    }

    /// Registers a tree tile id as canopy, which does not block movement.
    pub fn add_canopy_tile(&mut self, id: u16) {
        self.canopy.insert(id);
    }

    /// Returns true if `pos` cannot be entered: off the map, a nonzero
    /// collision tile, a trunk tile, or a living occupant.
    pub fn is_blocked(&self, pos: Position) -> bool {
        let Some(cell) = self.cell(pos) else {
            return true;
        };
        if self.tile(Layer::Collision, pos).unwrap_or(0) != 0 {
            return true;
        }
        let tree = self.tile(Layer::Tree, pos).unwrap_or(0);
        if tree != 0 && !self.canopy.contains(&tree) {
            return true;
        }
        self.occupants[cell].is_some()
    }

    /// The actor standing on `pos`.
    pub fn occupant_at(&self, pos: Position) -> Option<ActorId> {
        self.cell(pos).and_then(|c| self.occupants[c])
    }

    /// In-bounds cardinal neighbours of `pos`.
    pub fn neighbors4(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |d| {
                let (dx, dy) = d.delta();
                pos.offset(dx, dy)
            })
            .filter(|p| self.is_within_bounds(*p))
    }

    /// Places `actor` on `pos` and returns its new id.
    pub fn spawn_actor(&mut self, mut actor: Actor, pos: Position) -> CoreResult<ActorId> {
        let cell = self.cell(pos).ok_or(CoreError::OutOfBounds(pos))?;
        if self.occupants[cell].is_some() {
            return Err(CoreError::Occupied(pos));
        }
        if self.is_blocked(pos) {
            return Err(CoreError::Blocked(pos));
        }
        let id = ActorId(self.actors.len() as u32);
        actor.set_id(id);
        actor.set_position(pos);
        self.occupants[cell] = Some(id);
        debug!(actor = %actor.name, id = %id, at = %pos, "actor spawned");
        self.actors.push(actor);
        Ok(id)
    }

    /// Removes the actor from the occupant layer and hides it. The arena
    /// entry remains so ids stay valid.
    pub fn retire_actor(&mut self, id: ActorId) -> CoreResult<()> {
        let pos = self.actor(id)?.position();
        if let Some(cell) = self.cell(pos) {
            if self.occupants[cell] == Some(id) {
                self.occupants[cell] = None;
            }
        }
        let actor = self.actor_mut(id)?;
        actor.visible = false;
        actor.interactable = false;
        debug!(actor = %actor.name, id = %id, "actor retired");
        Ok(())
    }

    /// The actor with `id`.
    pub fn actor(&self, id: ActorId) -> CoreResult<&Actor> {
        self.actors.get(id.index()).ok_or(CoreError::ActorNotFound(id))
    }

    /// The actor with `id`, mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> CoreResult<&mut Actor> {
        self.actors
            .get_mut(id.index())
            .ok_or(CoreError::ActorNotFound(id))
    }

    /// Two distinct actors, both mutably.
    pub fn pair_mut(&mut self, a: ActorId, b: ActorId) -> CoreResult<(&mut Actor, &mut Actor)> {
        let (ia, ib) = (a.index(), b.index());
        if ia >= self.actors.len() {
            return Err(CoreError::ActorNotFound(a));
        }
        if ib >= self.actors.len() || ia == ib {
            return Err(CoreError::ActorNotFound(b));
        }
        if ia < ib {
            let (left, right) = self.actors.split_at_mut(ib);
            Ok((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.actors.split_at_mut(ia);
            Ok((&mut right[0], &mut left[ib]))
        }
    }

    /// Every actor ever spawned, retired ones included.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    /// Attempts a single cardinal step. Checks run in order: step shape,
    /// bounds, interactable occupant (bump, no move), blocked.
    pub fn try_move(&mut self, id: ActorId, dx: i32, dy: i32) -> CoreResult<MoveResult> {
        let actor = self.actor(id)?;
        if !actor.visible {
            return Err(CoreError::ActorRetired(id));
        }
        let from = actor.position();
        if dx.abs() + dy.abs() != 1 {
            return Ok(MoveResult::failed(MoveFailure::InvalidStep));
        }
        let target = from.offset(dx, dy);
        let (Some(from_cell), Some(to_cell)) = (self.cell(from), self.cell(target)) else {
            debug!(actor = %id, to = %target, "move rejected: out of bounds");
            return Ok(MoveResult::failed(MoveFailure::OutOfBounds));
        };
        if let Some(other) = self.occupants[to_cell] {
            if self.actors[other.index()].interactable {
                return Ok(MoveResult::bumped(other));
            }
        }
        if self.is_blocked(target) {
            debug!(actor = %id, to = %target, "move rejected: blocked");
            return Ok(MoveResult::failed(MoveFailure::Blocked));
        }
        self.occupants[from_cell] = None;
        self.occupants[to_cell] = Some(id);
        self.actors[id.index()].set_position(target);
        Ok(MoveResult::moved())
    }

    /// Returns true if `pos` is on the map and free to enter.
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.is_within_bounds(pos) && !self.is_blocked(pos)
    }

    /// Lazily samples up to `max_attempts` random tiles, yielding each one
    /// that is vacant and satisfies `predicate`.
    pub fn find_empty_positions<'a, R, F>(
        &'a self,
        rng: &'a mut R,
        max_attempts: usize,
        predicate: F,
    ) -> EmptyPositions<'a, R, F>
    where
        R: Rng,
        F: FnMut(&GridWorld, Position) -> bool,
    {
        EmptyPositions {
            grid: self,
            rng,
            remaining: max_attempts,
            predicate,
        }
    }
}

/// Iterator returned by [`GridWorld::find_empty_positions`].
pub struct EmptyPositions<'a, R, F> {
    grid: &'a GridWorld,
    rng: &'a mut R,
    remaining: usize,
    predicate: F,
}

impl<R, F> Iterator for EmptyPositions<'_, R, F>
where
    R: Rng,
    F: FnMut(&GridWorld, Position) -> bool,
{
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        while self.remaining > 0 {
            self.remaining -= 1;
            let pos = Position::new(
                self.rng.random_range(0..self.grid.width as i32),
                self.rng.random_range(0..self.grid.height as i32),
            );
            if self.grid.is_vacant(pos) && (self.predicate)(self.grid, pos) {
                return Some(pos);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Faction;
    use crate::stats::Stats;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn walker() -> Actor {
        Actor::enemy("Walker", Faction::Mists, Stats::uniform(5))
    }

    fn player_like() -> Actor {
        let mut a = walker();
        a.interactable = false;
        a
    }

    #[test]
    fn zero_sized_map_rejected() {
        assert!(matches!(GridWorld::new(0, 5), Err(CoreError::InvalidMap(_))));
    }

    #[test]
    fn bounds_and_tiles() {
        let mut g = GridWorld::new(4, 3).unwrap();
        assert!(g.is_within_bounds(Position::new(3, 2)));
        assert!(!g.is_within_bounds(Position::new(4, 0)));
        assert!(!g.is_within_bounds(Position::new(0, -1)));
        g.set_tile(Layer::Ground, Position::new(1, 1), 7).unwrap();
        assert_eq!(g.tile(Layer::Ground, Position::new(1, 1)), Some(7));
        assert_eq!(g.tile(Layer::Collision, Position::new(1, 1)), Some(0));
        assert_eq!(g.tile(Layer::Occupant, Position::new(1, 1)), None);
        assert!(g.set_tile(Layer::Tree, Position::new(9, 9), 1).is_err());
        assert!(g.set_tile(Layer::Occupant, Position::new(0, 0), 1).is_err());
    }

    #[test]
    fn blocking_rules() {
        let mut g = GridWorld::new(5, 5).unwrap();
        g.set_tile(Layer::Collision, Position::new(1, 0), 3).unwrap();
        g.set_tile(Layer::Tree, Position::new(2, 0), 10).unwrap();
        g.set_tile(Layer::Tree, Position::new(3, 0), 11).unwrap();
        g.add_canopy_tile(11);
        assert!(g.is_blocked(Position::new(1, 0)));
        assert!(g.is_blocked(Position::new(2, 0)));
        assert!(!g.is_blocked(Position::new(3, 0)));
        assert!(g.is_blocked(Position::new(-1, 0)));
        g.spawn_actor(walker(), Position::new(4, 4)).unwrap();
        assert!(g.is_blocked(Position::new(4, 4)));
    }

    #[test]
    fn move_updates_occupancy() {
        let mut g = GridWorld::new(5, 5).unwrap();
        let id = g.spawn_actor(player_like(), Position::new(2, 2)).unwrap();
        let r = g.try_move(id, 1, 0).unwrap();
        assert!(r.success && r.moved_tiles());
        assert_eq!(g.actor(id).unwrap().position(), Position::new(3, 2));
        assert_eq!(g.occupant_at(Position::new(3, 2)), Some(id));
        assert_eq!(g.occupant_at(Position::new(2, 2)), None);
    }

    #[test]
    fn move_failures() {
        let mut g = GridWorld::new(3, 3).unwrap();
        g.set_tile(Layer::Collision, Position::new(1, 0), 1).unwrap();
        let id = g.spawn_actor(player_like(), Position::new(0, 0)).unwrap();
        let r = g.try_move(id, -1, 0).unwrap();
        assert_eq!(r.reason, Some(MoveFailure::OutOfBounds));
        let r = g.try_move(id, 1, 0).unwrap();
        assert_eq!(r.reason, Some(MoveFailure::Blocked));
        let r = g.try_move(id, 1, 1).unwrap();
        assert_eq!(r.reason, Some(MoveFailure::InvalidStep));
        assert_eq!(g.actor(id).unwrap().position(), Position::new(0, 0));
    }

    #[test]
    fn bump_interactable_does_not_move() {
        let mut g = GridWorld::new(3, 1).unwrap();
        let mover = g.spawn_actor(player_like(), Position::new(0, 0)).unwrap();
        let npc = g
            .spawn_actor(Actor::npc("Guide", Faction::Forest), Position::new(1, 0))
            .unwrap();
        let r = g.try_move(mover, 1, 0).unwrap();
        assert!(r.success);
        assert_eq!(r.triggered_occupant, Some(npc));
        assert!(!r.moved_tiles());
        assert_eq!(g.actor(mover).unwrap().position(), Position::new(0, 0));
    }

    #[test]
    fn non_interactable_occupant_blocks() {
        let mut g = GridWorld::new(2, 1).unwrap();
        let a = g.spawn_actor(player_like(), Position::new(0, 0)).unwrap();
        g.spawn_actor(player_like(), Position::new(1, 0)).unwrap();
        let r = g.try_move(a, 1, 0).unwrap();
        assert_eq!(r.reason, Some(MoveFailure::Blocked));
    }

    #[test]
    fn retire_frees_tile() {
        let mut g = GridWorld::new(3, 1).unwrap();
        let npc = g
            .spawn_actor(Actor::npc("Guide", Faction::Forest), Position::new(1, 0))
            .unwrap();
        g.retire_actor(npc).unwrap();
        assert_eq!(g.occupant_at(Position::new(1, 0)), None);
        assert!(!g.actor(npc).unwrap().visible);
        assert!(matches!(g.try_move(npc, 1, 0), Err(CoreError::ActorRetired(_))));
    }

    #[test]
    fn spawn_conflicts() {
        let mut g = GridWorld::new(3, 3).unwrap();
        g.spawn_actor(walker(), Position::new(1, 1)).unwrap();
        assert!(matches!(
            g.spawn_actor(walker(), Position::new(1, 1)),
            Err(CoreError::Occupied(_))
        ));
        assert!(matches!(
            g.spawn_actor(walker(), Position::new(5, 1)),
            Err(CoreError::OutOfBounds(_))
        ));
        g.set_tile(Layer::Collision, Position::new(0, 0), 1).unwrap();
        assert!(matches!(
            g.spawn_actor(walker(), Position::new(0, 0)),
            Err(CoreError::Blocked(_))
        ));
    }

    #[test]
    fn pair_mut_gives_both() {
        let mut g = GridWorld::new(3, 1).unwrap();
        let a = g.spawn_actor(walker(), Position::new(0, 0)).unwrap();
        let b = g.spawn_actor(walker(), Position::new(2, 0)).unwrap();
        let (x, y) = g.pair_mut(b, a).unwrap();
        x.name = "B".into();
        y.name = "A".into();
        assert_eq!(g.actor(a).unwrap().name, "A");
        assert_eq!(g.actor(b).unwrap().name, "B");
        assert!(g.pair_mut(a, a).is_err());
    }

    #[test]
    fn empty_positions_respect_predicate() {
        let mut g = GridWorld::new(6, 6).unwrap();
        g.set_tile(Layer::Collision, Position::new(2, 2), 1).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let found: Vec<_> = g
            .find_empty_positions(&mut rng, 200, |_, p| p.x > 0 && p.y > 0)
            .collect();
        assert!(!found.is_empty());
        for p in found {
            assert!(g.is_vacant(p));
            assert!(p.x > 0 && p.y > 0);
            assert_ne!(p, Position::new(2, 2));
        }
    }

    #[test]
    fn empty_positions_bounded_by_attempts() {
        let mut g = GridWorld::new(1, 1).unwrap();
        g.set_tile(Layer::Collision, Position::new(0, 0), 1).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(g.find_empty_positions(&mut rng, 50, |_, _| true).count(), 0);
    }

    proptest! {
        #[test]
        fn random_walk_keeps_invariants(steps in prop::collection::vec(0usize..4, 0..60)) {
            let mut g = GridWorld::new(6, 5).unwrap();
            g.set_tile(Layer::Collision, Position::new(2, 2), 1).unwrap();
            let a = g.spawn_actor(player_like(), Position::new(0, 0)).unwrap();
            let b = g.spawn_actor(player_like(), Position::new(5, 4)).unwrap();
            for (i, s) in steps.into_iter().enumerate() {
                let (dx, dy) = Direction::ALL[s].delta();
                let id = if i % 2 == 0 { a } else { b };
                g.try_move(id, dx, dy).unwrap();
                let pa = g.actor(a).unwrap().position();
                let pb = g.actor(b).unwrap().position();
                prop_assert!(g.is_within_bounds(pa) && g.is_within_bounds(pb));
                prop_assert_ne!(pa, pb);
                prop_assert_eq!(g.occupant_at(pa), Some(a));
                prop_assert_eq!(g.occupant_at(pb), Some(b));
            }
        }
    }
}
