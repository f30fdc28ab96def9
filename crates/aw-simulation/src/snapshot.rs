use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SimResult;
use crate::session::{GameOutcome, GameSession};

/// The player as recorded in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    /// Display name.
    pub name: String,
    /// Race key, if the player has a race.
    pub race: Option<String>,
    /// Faction key.
    pub faction: String,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// One inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Catalog id.
    pub item_id: String,
    /// Display name.
    pub name: String,
    /// Kind, lowercase.
    pub kind: String,
    /// Damage, protection, or healing value.
    pub value: u32,
    /// True if the slot is equipped.
    pub equipped: bool,
}

/// A serializable summary of a running or finished session.
///
/// Snapshots are a save-game record for tooling, not a full world dump: the
/// map, enemies, and ground items are not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Id of the session that produced this snapshot.
    pub session_id: Uuid,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// The player.
    pub player: ActorRecord,
    /// The player's inventory, in slot order.
    pub inventory: Vec<InventoryRecord>,
    /// Ticks played.
    pub elapsed_ticks: u64,
    /// Seconds represented by those ticks.
    pub elapsed_seconds: f64,
    /// Flag of the current quest step, if the quest is not complete.
    pub quest_step: Option<String>,
    /// True once every quest step is done.
    pub quest_complete: bool,
    /// Names of zones whose guardian was defeated.
    pub cleared_zones: Vec<String>,
    /// How the session ended, if it did.
    #[serde(default)]
    pub outcome: Option<GameOutcome>,
}

impl SessionSnapshot {
    /// Capture the current state of `session`.
    pub fn capture(session: &GameSession) -> SimResult<Self> {
        let actor = session.player_actor()?;
        let pos = actor.position();
        let player = ActorRecord {
            name: actor.name.clone(),
            race: actor.race.map(|r| r.key().to_string()),
            faction: actor.faction.key().to_string(),
            hp: actor.health.current(),
            max_hp: actor.health.max(),
            x: pos.x,
            y: pos.y,
        };
        let inventory = actor
            .inventory
            .items()
            .iter()
            .enumerate()
            .map(|(slot, item)| InventoryRecord {
                item_id: item.id.clone(),
                name: item.name.clone(),
                kind: item.kind.to_string(),
                value: item.value,
                equipped: actor.inventory.is_equipped(slot),
            })
            .collect();

        let quest = session.quest();
        let quest_step = quest.and_then(|q| {
            q.current_step()
                .and_then(|i| q.steps().get(i))
                .map(|step| step.flag.clone())
        });
        let cleared_zones = session
            .encounters()
            .map(|e| {
                e.zones()
                    .iter()
                    .filter(|z| z.is_cleared())
                    .map(|z| z.name.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_id: session.id(),
            saved_at: Utc::now(),
            player,
            inventory,
            elapsed_ticks: session.clock().tick(),
            elapsed_seconds: session.clock().elapsed_seconds(),
            quest_step,
            quest_complete: quest.is_some_and(|q| q.is_complete()),
            cleared_zones,
            outcome: session.outcome(),
        })
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl GameSession {
    /// Capture a [`SessionSnapshot`] of this session.
    pub fn snapshot(&self) -> SimResult<SessionSnapshot> {
        SessionSnapshot::capture(self)
    }
}
