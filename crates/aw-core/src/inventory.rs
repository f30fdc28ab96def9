//! Bounded item storage with one weapon slot and one armor slot.
//!
//! Equipped items stay in their inventory slot and are tracked by index,
//! so removing an earlier item shifts the equipped indices with it.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::item::{Item, ItemKind};

/// Default number of inventory slots.
pub const DEFAULT_SLOTS: usize = 15;

/// An actor's carried items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    capacity: usize,
    weapon: Option<usize>,
    armor: Option<usize>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

impl Inventory {
    /// An empty inventory with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            weapon: None,
            armor: None,
        }
    }

    /// Stores `item` in the first free slot and returns that slot.
    pub fn add(&mut self, item: Item) -> CoreResult<usize> {
        if self.is_full() {
            return Err(CoreError::InventoryFull {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Removes and returns the item in `slot`, unequipping it if needed.
    pub fn remove(&mut self, slot: usize) -> CoreResult<Item> {
        if slot >= self.items.len() {
            return Err(CoreError::InvalidSlot(slot));
        }
        shift_after_remove(&mut self.weapon, slot);
        shift_after_remove(&mut self.armor, slot);
        Ok(self.items.remove(slot))
    }

    /// The item in `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<&Item> {
        self.items.get(slot)
    }

    /// Equips the weapon or armor in `slot`, replacing whatever was in that
    /// equipment slot. Returns the kind that was equipped.
    pub fn equip(&mut self, slot: usize) -> CoreResult<ItemKind> {
        let item = self.items.get(slot).ok_or(CoreError::InvalidSlot(slot))?;
        match item.kind {
            ItemKind::Weapon => self.weapon = Some(slot),
            ItemKind::Armor => self.armor = Some(slot),
            ItemKind::Potion | ItemKind::Misc => {
                return Err(CoreError::NotUsable {
                    name: item.name.clone(),
                    verb: "equipped",
                });
            }
        }
        Ok(item.kind)
    }

    /// Clears the weapon slot.
    pub fn unequip_weapon(&mut self) {
        self.weapon = None;
    }

    /// Clears the armor slot.
    pub fn unequip_armor(&mut self) {
        self.armor = None;
    }

    /// The currently equipped weapon.
    pub fn equipped_weapon(&self) -> Option<&Item> {
        self.weapon.and_then(|i| self.items.get(i))
    }

    /// The currently equipped armor.
    pub fn equipped_armor(&self) -> Option<&Item> {
        self.armor.and_then(|i| self.items.get(i))
    }

    /// Returns true if `slot` holds the equipped weapon or armor.
    pub fn is_equipped(&self, slot: usize) -> bool {
        self.weapon == Some(slot) || self.armor == Some(slot)
    }

    /// Slots holding potions, paired with the potion.
    pub fn potions(&self) -> impl Iterator<Item = (usize, &Item)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.kind == ItemKind::Potion)
    }

    /// Removes and returns the first unequipped item of `kind`.
    pub fn take(&mut self, kind: ItemKind) -> Option<Item> {
        let slot = (0..self.items.len())
            .find(|&i| self.items[i].kind == kind && !self.is_equipped(i))?;
        self.remove(slot).ok()
    }

    /// Returns true if any carried item has the given kind.
    pub fn has_kind(&self, kind: ItemKind) -> bool {
        self.items.iter().any(|i| i.kind == kind)
    }

    /// All carried items in slot order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of carried items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots still free.
    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    /// Returns true if no slot is free.
    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }
}

fn shift_after_remove(equipped: &mut Option<usize>, removed: usize) {
    *equipped = match *equipped {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCatalog;

    fn catalog() -> ItemCatalog {
        ItemCatalog::standard()
    }

    #[test]
    fn add_until_full() {
        let mut inv = Inventory::new(2);
        inv.add(catalog().get("banana").unwrap()).unwrap();
        inv.add(catalog().get("gem").unwrap()).unwrap();
        assert!(inv.is_full());
        assert_eq!(inv.free_slots(), 0);
        let err = inv.add(catalog().get("m4").unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::InventoryFull { capacity: 2 }));
    }

    #[test]
    fn equip_weapon_and_armor() {
        let mut inv = Inventory::default();
        let sword = inv.add(catalog().get("rusty_sword").unwrap()).unwrap();
        let armor = inv.add(catalog().get("leather_armor").unwrap()).unwrap();
        assert_eq!(inv.equip(sword).unwrap(), ItemKind::Weapon);
        assert_eq!(inv.equip(armor).unwrap(), ItemKind::Armor);
        assert_eq!(inv.equipped_weapon().unwrap().id, "rusty_sword");
        assert_eq!(inv.equipped_armor().unwrap().id, "leather_armor");
        assert!(inv.is_equipped(sword));

        inv.unequip_weapon();
        assert!(inv.equipped_weapon().is_none());
        assert!(!inv.is_equipped(sword));
        inv.unequip_armor();
        assert!(inv.equipped_armor().is_none());
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn take_skips_equipped_items() {
        let mut inv = Inventory::default();
        let first = inv.add(catalog().get("glock").unwrap()).unwrap();
        inv.add(catalog().get("banana").unwrap()).unwrap();
        inv.add(catalog().get("m4").unwrap()).unwrap();
        inv.equip(first).unwrap();
        assert_eq!(inv.take(ItemKind::Weapon).unwrap().id, "m4");
        assert_eq!(inv.take(ItemKind::Potion).unwrap().id, "banana");
        assert!(inv.take(ItemKind::Weapon).is_none());
        assert_eq!(inv.equipped_weapon().unwrap().id, "glock");
    }

    #[test]
    fn potions_cannot_be_equipped() {
        let mut inv = Inventory::default();
        let slot = inv.add(catalog().get("banana").unwrap()).unwrap();
        assert!(matches!(inv.equip(slot), Err(CoreError::NotUsable { .. })));
        assert!(matches!(inv.equip(7), Err(CoreError::InvalidSlot(7))));
    }

    #[test]
    fn remove_shifts_equipped_indices() {
        let mut inv = Inventory::default();
        inv.add(catalog().get("banana").unwrap()).unwrap();
        let glock = inv.add(catalog().get("glock").unwrap()).unwrap();
        inv.equip(glock).unwrap();
        inv.remove(0).unwrap();
        assert_eq!(inv.equipped_weapon().unwrap().id, "glock");
        inv.remove(0).unwrap();
        assert!(inv.equipped_weapon().is_none());
        assert!(inv.is_empty());
    }

    #[test]
    fn potions_listed_with_slots() {
        let mut inv = Inventory::default();
        inv.add(catalog().get("m4").unwrap()).unwrap();
        inv.add(catalog().get("plantain").unwrap()).unwrap();
        let potions: Vec<_> = inv.potions().map(|(slot, p)| (slot, p.value)).collect();
        assert_eq!(potions, vec![(1, 30)]);
        assert!(inv.has_kind(ItemKind::Weapon));
        assert!(!inv.has_kind(ItemKind::Armor));
    }
}
