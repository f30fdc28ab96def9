use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::faction::Faction;
use crate::health::{BASE_HP, Health};
use crate::inventory::Inventory;
use crate::item::{Item, ItemKind};
use crate::position::Position;
use crate::stats::{Race, RaceTable, Stats};

/// Index of an actor in its grid's actor arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl ActorId {
    /// The arena index this id points at.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The role an actor plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// The player character.
    Player,
    /// A character that talks but does not fight.
    Npc,
    /// A character that fights.
    Enemy,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Player => "player",
            Self::Npc => "npc",
            Self::Enemy => "enemy",
        };
        write!(f, "{s}")
    }
}

/// Outcome of using an inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemUse {
    /// A potion was consumed.
    Healed {
        /// Name of the consumed potion.
        item: String,
        /// Hit points actually restored.
        amount: u32,
    },
    /// A weapon or armor was equipped.
    Equipped {
        /// Name of the equipped item.
        item: String,
        /// Which equipment slot it went into.
        kind: ItemKind,
    },
}

impl fmt::Display for ItemUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healed { item, amount } => write!(f, "ate {item} and recovered {amount} HP"),
            Self::Equipped { item, kind } => write!(f, "equipped {item} as {kind}"),
        }
    }
}

/// A positioned, health-bearing participant in the world.
#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    /// Display name.
    pub name: String,
    /// Player, NPC, or enemy.
    pub kind: ActorKind,
    position: Position,
    /// Race, when the actor has one. Drives weapon affinities.
    pub race: Option<Race>,
    /// Faction allegiance.
    pub faction: Faction,
    /// Base attributes.
    pub stats: Stats,
    /// Hit points.
    pub health: Health,
    /// Carried items and equipment.
    pub inventory: Inventory,
    /// Retired actors are hidden and off the occupant layer.
    pub visible: bool,
    /// Bumping into an interactable actor triggers it instead of blocking.
    pub interactable: bool,
}

impl Actor {
    fn base(name: impl Into<String>, kind: ActorKind, faction: Faction, stats: Stats) -> Self {
        Self {
            id: ActorId(0),
            name: name.into(),
            kind,
            position: Position::default(),
            race: None,
            faction,
            stats,
            health: Health::new(BASE_HP),
            inventory: Inventory::default(),
            visible: true,
            interactable: false,
        }
    }

    /// A player character whose stats come from `races`.
    pub fn player(
        name: impl Into<String>,
        race: Race,
        faction: Faction,
        races: &RaceTable,
    ) -> CoreResult<Self> {
        let stats = races.stats(race)?;
        let mut actor = Self::base(name, ActorKind::Player, faction, stats);
        actor.race = Some(race);
        Ok(actor)
    }

    /// A hostile character with explicit stats. Enemies are bumpable so
    /// walking into one can open an encounter.
    pub fn enemy(name: impl Into<String>, faction: Faction, stats: Stats) -> Self {
        let mut actor = Self::base(name, ActorKind::Enemy, faction, stats);
        actor.interactable = true;
        actor
    }

    /// A talking character.
    pub fn npc(name: impl Into<String>, faction: Faction) -> Self {
        let mut actor = Self::base(name, ActorKind::Npc, faction, Stats::uniform(5));
        actor.interactable = true;
        actor
    }

    /// Sets the race.
    pub fn with_race(mut self, race: Race) -> Self {
        self.race = Some(race);
        self
    }

    /// Replaces the inventory (used to apply a configured slot count).
    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Gives the actor `item` and equips it if it is a weapon or armor.
    /// An actor built at full health stays at full health.
    pub fn with_equipped(mut self, item: Item) -> CoreResult<Self> {
        let was_full = self.health.current() == self.health.max();
        let slot = self.inventory.add(item)?;
        self.equip(slot)?;
        if was_full && !self.health.is_depleted() {
            self.health.heal(self.health.max());
        }
        Ok(self)
    }

    /// Arena id, assigned when the actor is spawned on a grid.
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ActorId) {
        self.id = id;
    }

    /// Current tile.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Returns true while hit points remain and the actor is not retired.
    pub fn is_alive(&self) -> bool {
        self.visible && !self.health.is_depleted()
    }

    /// Equips the item in `slot` and refreshes armor-derived max HP.
    pub fn equip(&mut self, slot: usize) -> CoreResult<ItemKind> {
        let kind = self.inventory.equip(slot)?;
        if kind == ItemKind::Armor {
            self.refresh_max_hp();
        }
        Ok(kind)
    }

    /// Uses the item in `slot`: potions are consumed, weapons and armor are
    /// equipped, anything else is refused.
    pub fn use_item(&mut self, slot: usize) -> CoreResult<ItemUse> {
        let item = self
            .inventory
            .get(slot)
            .ok_or(CoreError::InvalidSlot(slot))?;
        match item.kind {
            ItemKind::Potion => {
                let potion = self.inventory.remove(slot)?;
                let amount = self.health.heal(potion.value);
                Ok(ItemUse::Healed {
                    item: potion.name,
                    amount,
                })
            }
            ItemKind::Weapon | ItemKind::Armor => {
                let name = item.name.clone();
                let kind = self.equip(slot)?;
                Ok(ItemUse::Equipped { item: name, kind })
            }
            ItemKind::Misc => Err(CoreError::NotUsable {
                name: item.name.clone(),
                verb: "used",
            }),
        }
    }

    /// Takes the item in `slot` out of the inventory. Dropping worn armor
    /// lowers max HP back.
    pub fn drop_item(&mut self, slot: usize) -> CoreResult<Item> {
        let was_armor = self.inventory.is_equipped(slot)
            && self.inventory.get(slot).is_some_and(|i| i.kind == ItemKind::Armor);
        let item = self.inventory.remove(slot)?;
        if was_armor {
            self.refresh_max_hp();
        }
        Ok(item)
    }

    fn refresh_max_hp(&mut self) {
        let bonus = self.inventory.equipped_armor().map_or(0, |a| a.value);
        self.health.set_max(BASE_HP + bonus);
    }
}
