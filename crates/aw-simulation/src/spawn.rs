//! Ground items and the random spawner that keeps the map stocked.
//!
//! The map holds at most `max(2, width * height / 50)` items. Each update
//! spawns one more with probability `0.2` per missing item, picking the kind
//! by weight and the tile at random away from the map edge.

use std::collections::BTreeMap;

use aw_core::{GridWorld, Item, ItemCatalog, ItemKind, Position};
use rand::Rng;
use tracing::debug;

use crate::error::{SimError, SimResult};

/// Relative odds of each item kind being spawned.
pub const SPAWN_WEIGHTS: [(ItemKind, f64); 4] = [
    (ItemKind::Weapon, 0.3),
    (ItemKind::Armor, 0.2),
    (ItemKind::Potion, 0.4),
    (ItemKind::Misc, 0.1),
];

/// Items lying on the map, at most one per tile.
#[derive(Debug, Clone)]
pub struct ItemSpawner {
    ground: BTreeMap<(i32, i32), Item>,
    capacity: usize,
    attempts: usize,
}

impl ItemSpawner {
    /// A spawner sized for `grid`, sampling up to `attempts` tiles per spawn.
    pub fn new(grid: &GridWorld, attempts: usize) -> Self {
        let area = grid.width() as usize * grid.height() as usize;
        Self {
            ground: BTreeMap::new(),
            capacity: (area / 50).max(2),
            attempts,
        }
    }

    /// Maximum number of randomly spawned items on the map.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items on the ground.
    pub fn len(&self) -> usize {
        self.ground.len()
    }

    /// Returns true if nothing lies on the ground.
    pub fn is_empty(&self) -> bool {
        self.ground.is_empty()
    }

    /// Puts `item` on `pos`. The tile must be on the map, free of walls,
    /// and free of other items.
    pub fn place(&mut self, grid: &GridWorld, pos: Position, item: Item) -> SimResult<()> {
        if !grid.is_within_bounds(pos) {
            return Err(aw_core::CoreError::OutOfBounds(pos).into());
        }
        if self.ground.contains_key(&(pos.x, pos.y)) {
            return Err(SimError::Scenario(format!("two items placed on {pos}")));
        }
        if grid.occupant_at(pos).is_none() && grid.is_blocked(pos) {
            return Err(aw_core::CoreError::Blocked(pos).into());
        }
        self.ground.insert((pos.x, pos.y), item);
        Ok(())
    }

    /// The item on `pos`, if any.
    pub fn item_at(&self, pos: Position) -> Option<&Item> {
        self.ground.get(&(pos.x, pos.y))
    }

    /// Removes and returns the item on `pos`.
    pub fn take(&mut self, pos: Position) -> Option<Item> {
        self.ground.remove(&(pos.x, pos.y))
    }

    /// Puts `item` on `pos`, or on the first free cardinal neighbour when
    /// `pos` already holds an item. Gives the item back if nowhere is free.
    pub fn drop_at(&mut self, grid: &GridWorld, pos: Position, item: Item) -> Result<Position, Item> {
        let target = std::iter::once(pos)
            .chain(grid.neighbors4(pos))
            .find(|&p| {
                !self.ground.contains_key(&(p.x, p.y))
                    && (grid.occupant_at(p).is_some() || !grid.is_blocked(p))
            });
        match target {
            Some(p) => {
                self.ground.insert((p.x, p.y), item);
                Ok(p)
            }
            None => Err(item),
        }
    }

    /// Every ground item with its tile, ordered by column, then row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Item)> {
        self.ground
            .iter()
            .map(|(&(x, y), item)| (Position::new(x, y), item))
    }

    /// Draws an item kind according to [`SPAWN_WEIGHTS`].
    pub fn pick_kind<R: Rng>(rng: &mut R) -> ItemKind {
        let total: f64 = SPAWN_WEIGHTS.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0.0..total);
        for (kind, weight) in SPAWN_WEIGHTS {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        ItemKind::Misc
    }

    /// Spawns one random item on a random free tile. Returns `None` when no
    /// suitable tile or template was found.
    pub fn spawn_random<R: Rng>(
        &mut self,
        grid: &GridWorld,
        catalog: &ItemCatalog,
        rng: &mut R,
    ) -> Option<(Position, Item)> {
        let kind = Self::pick_kind(rng);
        let templates = catalog.of_kind(kind);
        if templates.is_empty() {
            return None;
        }
        let item = templates[rng.random_range(0..templates.len())].clone();

        let (w, h) = (grid.width() as i32, grid.height() as i32);
        let ground = &self.ground;
        let pos = grid
            .find_empty_positions(rng, self.attempts, |g, p| {
                let inland = p.x > 0 && p.y > 0 && p.x < w - 1 && p.y < h - 1;
                inland
                    && !ground.contains_key(&(p.x, p.y))
                    && g.neighbors4(p).any(|n| g.is_vacant(n))
            })
            .next()?;

        debug!(item = %item.id, at = %pos, "item spawned");
        self.ground.insert((pos.x, pos.y), item.clone());
        Some((pos, item))
    }

    /// Periodic top-up: below capacity, spawns one item with probability
    /// `(capacity - len) * 0.2`.
    pub fn update<R: Rng>(
        &mut self,
        grid: &GridWorld,
        catalog: &ItemCatalog,
        rng: &mut R,
    ) -> Option<(Position, Item)> {
        if self.len() >= self.capacity {
            return None;
        }
        let chance = ((self.capacity - self.len()) as f64 * 0.2).min(1.0);
        if rng.random_bool(chance) {
            self.spawn_random(grid, catalog, rng)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::Layer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn capacity_scales_with_area() {
        assert_eq!(ItemSpawner::new(&GridWorld::new(5, 5).unwrap(), 50).capacity(), 2);
        assert_eq!(ItemSpawner::new(&GridWorld::new(30, 30).unwrap(), 50).capacity(), 18);
    }

    #[test]
    fn place_and_take() {
        let mut grid = GridWorld::new(5, 5).unwrap();
        grid.set_tile(Layer::Collision, Position::new(0, 0), 1).unwrap();
        let mut spawner = ItemSpawner::new(&grid, 50);
        let banana = ItemCatalog::standard().get("banana").unwrap();
        spawner.place(&grid, Position::new(2, 2), banana.clone()).unwrap();
        assert!(spawner.place(&grid, Position::new(2, 2), banana.clone()).is_err());
        assert!(spawner.place(&grid, Position::new(0, 0), banana.clone()).is_err());
        assert!(spawner.place(&grid, Position::new(9, 0), banana).is_err());
        assert_eq!(spawner.item_at(Position::new(2, 2)).unwrap().id, "banana");
        assert_eq!(spawner.take(Position::new(2, 2)).unwrap().id, "banana");
        assert!(spawner.is_empty());
    }

    #[test]
    fn drop_spills_to_neighbour() {
        let mut grid = GridWorld::new(3, 1).unwrap();
        grid.set_tile(Layer::Collision, Position::new(2, 0), 1).unwrap();
        let mut spawner = ItemSpawner::new(&grid, 50);
        let catalog = ItemCatalog::standard();
        let at = Position::new(0, 0);
        assert_eq!(spawner.drop_at(&grid, at, catalog.get("gem").unwrap()), Ok(at));
        assert_eq!(
            spawner.drop_at(&grid, at, catalog.get("banana").unwrap()),
            Ok(Position::new(1, 0))
        );
        let back = spawner.drop_at(&grid, at, catalog.get("m4").unwrap());
        assert_eq!(back.unwrap_err().id, "m4");
    }

    #[test]
    fn weights_roughly_respected() {
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;
        let potions = (0..trials)
            .filter(|_| ItemSpawner::pick_kind(&mut rng) == ItemKind::Potion)
            .count();
        let rate = potions as f64 / trials as f64;
        assert!((rate - 0.4).abs() < 0.03, "potion rate {rate}");
    }

    #[test]
    fn random_spawns_avoid_edges_and_stop_at_capacity() {
        let grid = GridWorld::new(12, 10).unwrap();
        let catalog = ItemCatalog::standard();
        let mut spawner = ItemSpawner::new(&grid, 50);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            spawner.update(&grid, &catalog, &mut rng);
        }
        assert_eq!(spawner.len(), spawner.capacity());
        for (pos, _) in spawner.iter() {
            assert!(pos.x > 0 && pos.y > 0 && pos.x < 11 && pos.y < 9);
        }
        assert!(spawner.update(&grid, &catalog, &mut rng).is_none());
    }
}
