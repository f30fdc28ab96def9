use std::path::Path;

use aw_core::{
    Actor, Faction, GridWorld, Inventory, ItemCatalog, Layer, Position, Race, RaceTable, Stats,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SessionConfig;
use crate::dialogue::{Dialogue, guide_lines};
use crate::error::{SimError, SimResult};
use crate::quest::{QuestStep, QuestTracker};
use crate::session::GameSession;

/// Collision tile id used for walls and ridges.
pub const WALL_TILE: u16 = 1;
/// Tree tile id for trunks, which block movement.
pub const TRUNK_TILE: u16 = 1;
/// Tree tile id for canopy, which does not block movement.
pub const CANOPY_TILE: u16 = 2;

/// The player's starting setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name.
    pub name: String,
    /// Race key or name.
    pub race: String,
    /// Faction key or name.
    pub faction: String,
    /// Starting column.
    pub x: i32,
    /// Starting row.
    pub y: i32,
}

/// A talking NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcSetup {
    /// Display name.
    pub name: String,
    /// Faction key or name.
    pub faction: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Lines spoken one per interaction.
    #[serde(default)]
    pub dialogue: Vec<String>,
}

/// An enemy, optionally guarding the ring of tiles around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySetup {
    /// Display name.
    pub name: String,
    /// Faction key or name.
    pub faction: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Race key or name, for weapon affinities.
    #[serde(default)]
    pub race: Option<String>,
    /// Attributes. Rolled from the session RNG when absent.
    #[serde(default)]
    pub stats: Option<Stats>,
    /// Catalog id of a weapon to equip.
    #[serde(default)]
    pub weapon: Option<String>,
    /// Whether the surrounding tiles form a combat zone.
    #[serde(default = "default_true")]
    pub zone: bool,
}

fn default_true() -> bool {
    true
}

/// An item lying on the ground at start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSetup {
    /// Catalog id.
    pub item: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// A complete starting world, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name.
    pub name: String,
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Wall tiles.
    #[serde(default)]
    pub collision: Vec<Position>,
    /// Tree trunks.
    #[serde(default)]
    pub trunks: Vec<Position>,
    /// Tree canopy, walkable.
    #[serde(default)]
    pub canopy: Vec<Position>,
    /// The player.
    pub player: PlayerSetup,
    /// Talking NPCs.
    #[serde(default)]
    pub npcs: Vec<NpcSetup>,
    /// Enemies.
    #[serde(default)]
    pub enemies: Vec<EnemySetup>,
    /// Ground items.
    #[serde(default)]
    pub items: Vec<ItemSetup>,
    /// Tiles that end the journey.
    #[serde(default)]
    pub final_zone: Vec<Position>,
    /// Quest steps. The standard rescue quest when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quest: Vec<QuestStep>,
}

impl Scenario {
    /// Parse a scenario from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scenario file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the grid, spawn everyone, and return a ready session.
    pub fn into_session(self, config: SessionConfig) -> SimResult<GameSession> {
        let mut grid = GridWorld::new(self.width, self.height)?;
        grid.add_canopy_tile(CANOPY_TILE);
        for &pos in &self.collision {
            grid.set_tile(Layer::Collision, pos, WALL_TILE)?;
        }
        for &pos in &self.trunks {
            grid.set_tile(Layer::Tree, pos, TRUNK_TILE)?;
        }
        for &pos in &self.canopy {
            grid.set_tile(Layer::Tree, pos, CANOPY_TILE)?;
        }

        let setup = &self.player;
        let race: Race = setup.race.parse()?;
        let faction: Faction = setup.faction.parse()?;
        let player = Actor::player(setup.name.as_str(), race, faction, &RaceTable::standard())?
            .with_inventory(Inventory::new(config.inventory_slots));
        let player = grid.spawn_actor(player, Position::new(setup.x, setup.y))?;

        let mut session = GameSession::new(grid, player, config)?;
        if !self.quest.is_empty() {
            session = session.with_quest(QuestTracker::new(self.quest.clone()));
        }
        let catalog = ItemCatalog::standard();

        for npc in &self.npcs {
            let actor = Actor::npc(npc.name.as_str(), npc.faction.parse()?);
            session.spawn_npc(
                actor,
                Position::new(npc.x, npc.y),
                Dialogue::new(npc.dialogue.iter().cloned()),
            )?;
        }

        for enemy in &self.enemies {
            let stats = match enemy.stats {
                Some(stats) => stats,
                None => Stats::random(session.rng_mut()),
            };
            let mut actor = Actor::enemy(enemy.name.as_str(), enemy.faction.parse()?, stats);
            if let Some(race) = &enemy.race {
                actor = actor.with_race(race.parse()?);
            }
            if let Some(weapon) = &enemy.weapon {
                actor = actor.with_equipped(catalog.get(weapon)?)?;
            }
            session.spawn_enemy(actor, Position::new(enemy.x, enemy.y), enemy.zone)?;
        }

        for item in &self.items {
            session.place_item(Position::new(item.x, item.y), catalog.get(&item.item)?)?;
        }

        if !self.final_zone.is_empty() {
            session.set_final_zone(self.final_zone.iter().copied());
        }

        info!(
            scenario = %self.name,
            width = self.width,
            height = self.height,
            npcs = self.npcs.len(),
            enemies = self.enemies.len(),
            items = self.items.len(),
            "scenario loaded"
        );
        Ok(session)
    }

    /// The built-in valley: a guide near the start, a sword and a banana on
    /// the way up, a ridge with a single pass, the guardian beyond it, and
    /// the summit along the top two rows.
    pub fn valley() -> Self {
        let ridge = (0..30)
            .filter(|x| !(12..=16).contains(x))
            .map(|x| Position::new(x, 14))
            .collect();
        let summit = (0..30)
            .flat_map(|x| [Position::new(x, 0), Position::new(x, 1)])
            .collect();
        Self {
            name: "The Valley".into(),
            width: 30,
            height: 30,
            collision: ridge,
            trunks: [(3, 22), (4, 22), (20, 25), (21, 25), (22, 25), (24, 8), (25, 8)]
                .into_iter()
                .map(Position::from)
                .collect(),
            canopy: [(3, 21), (4, 21), (21, 24), (24, 7)]
                .into_iter()
                .map(Position::from)
                .collect(),
            player: PlayerSetup {
                name: "Kito".into(),
                race: "gorilla".into(),
                faction: "veilleurs".into(),
                x: 6,
                y: 28,
            },
            npcs: vec![NpcSetup {
                name: "Old Baboon".into(),
                faction: "foret".into(),
                x: 6,
                y: 26,
                dialogue: guide_lines(),
            }],
            enemies: vec![EnemySetup {
                name: "Shadow Guardian".into(),
                faction: "ombres".into(),
                x: 14,
                y: 10,
                race: None,
                stats: Some(Stats::new(6, 6, 4, 6, 4)),
                weapon: None,
                zone: true,
            }],
            items: vec![
                ItemSetup {
                    item: "rusty_sword".into(),
                    x: 6,
                    y: 24,
                },
                ItemSetup {
                    item: "banana".into(),
                    x: 8,
                    y: 20,
                },
                ItemSetup {
                    item: "m4".into(),
                    x: 5,
                    y: 17,
                },
            ],
            final_zone: summit,
            quest: Vec::new(),
        }
    }
}

impl TryFrom<&str> for Scenario {
    type Error = SimError;

    fn try_from(json: &str) -> SimResult<Self> {
        Self::from_json(json)
    }
}
