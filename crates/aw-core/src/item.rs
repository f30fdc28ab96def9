use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// What an item does when used or equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Adds `value` to base damage when equipped.
    Weapon,
    /// Adds `value` to maximum hit points when equipped.
    Armor,
    /// Restores `value` hit points when consumed.
    Potion,
    /// Valuables with no mechanical effect.
    Misc,
}

impl ItemKind {
    /// Weapons and armor go into an equipment slot.
    pub const fn is_equippable(self) -> bool {
        matches!(self, Self::Weapon | Self::Armor)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Potion => "potion",
            Self::Misc => "misc",
        };
        write!(f, "{s}")
    }
}

/// A collectible item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Catalog key, also used for race/weapon multipliers.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Item category.
    pub kind: ItemKind,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
    /// Damage, armor, or heal amount depending on `kind`.
    pub value: u32,
}

impl Item {
    /// Creates an item with an empty description.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind, value: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: String::new(),
            value,
        }
    }

    /// Attaches flavor text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.kind, self.value)
    }
}

/// An ordered set of item templates, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The items found in the valley.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            Item::new("rusty_sword", "Rusty sword", ItemKind::Weapon, 10)
                .with_description("An old blade, still sharp enough."),
        );
        catalog.insert(
            Item::new("m4", "M4", ItemKind::Weapon, 20)
                .with_description("A rifle left behind by the humans."),
        );
        catalog.insert(
            Item::new("glock", "Glock", ItemKind::Weapon, 15)
                .with_description("A compact pistol."),
        );
        catalog.insert(
            Item::new("banana", "Banana", ItemKind::Potion, 20)
                .with_description("Restores a little health."),
        );
        catalog.insert(
            Item::new("plantain", "Plantain", ItemKind::Potion, 30)
                .with_description("Restores a fair amount of health."),
        );
        catalog.insert(
            Item::new("leather_armor", "Leather armor", ItemKind::Armor, 20)
                .with_description("Light protection against blows."),
        );
        catalog.insert(
            Item::new("gem", "Precious gem", ItemKind::Misc, 50)
                .with_description("It glitters. Someone will want it."),
        );
        catalog
    }

    /// Adds a template, replacing any existing one with the same id.
    pub fn insert(&mut self, item: Item) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Returns a fresh copy of the item with `id`.
    pub fn get(&self, id: &str) -> CoreResult<Item> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownItem(id.to_string()))
    }

    /// Templates of the given kind, in insertion order.
    pub fn of_kind(&self, kind: ItemKind) -> Vec<&Item> {
        self.items.iter().filter(|i| i.kind == kind).collect()
    }

    /// All templates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}
