//! The damage formula and the tables that feed it.

use std::collections::HashMap;

use aw_core::{Actor, FactionTable, Item, ItemKind, Race};
use serde::{Deserialize, Serialize};

/// Per-race damage multipliers for specific weapons.
#[derive(Debug, Clone, Default)]
pub struct WeaponBonusTable {
    bonuses: HashMap<(Race, String), f64>,
}

impl WeaponBonusTable {
    /// An empty table: every multiplier is 1.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weapon affinities of the valley's races.
    pub fn standard() -> Self {
        let mut table = Self::new();
        let rows = [
            (Race::Chimpanzee, [1.2, 0.8, 1.0]),
            (Race::Gorilla, [1.4, 0.7, 0.8]),
            (Race::Orangutan, [1.0, 1.2, 1.2]),
            (Race::Bonobo, [0.8, 1.3, 1.2]),
            (Race::HowlerMonkey, [1.1, 1.0, 1.1]),
        ];
        for (race, [sword, m4, glock]) in rows {
            table.set(race, "rusty_sword", sword);
            table.set(race, "m4", m4);
            table.set(race, "glock", glock);
        }
        table
    }

    /// Sets the multiplier for `race` wielding weapon `weapon_id`.
    pub fn set(&mut self, race: Race, weapon_id: impl Into<String>, multiplier: f64) {
        self.bonuses.insert((race, weapon_id.into()), multiplier);
    }

    /// Multiplier for `race` wielding `weapon_id`; 1.0 when unknown or raceless.
    pub fn multiplier(&self, race: Option<Race>, weapon_id: &str) -> f64 {
        race.and_then(|r| self.bonuses.get(&(r, weapon_id.to_string())))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Which damage formula to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageFormula {
    /// Strength and weapon, scaled by agility and faction, minus the
    /// defender's soak, rounded to one decimal.
    #[default]
    Canonical,
    /// `trunc(strength * 2 + weapon * multiplier)` with no other terms.
    Flat,
}

/// Everything the resolver needs besides the two combatants.
#[derive(Debug, Clone)]
pub struct CombatRules {
    /// Faction relations, for legality and the faction multiplier.
    pub factions: FactionTable,
    /// Race/weapon affinities.
    pub weapon_bonus: WeaponBonusTable,
    /// Formula in use.
    pub formula: DamageFormula,
    /// Fraction of damage removed by [`super::Stance::Block`].
    pub block_reduction: f64,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            factions: FactionTable::standard(),
            weapon_bonus: WeaponBonusTable::standard(),
            formula: DamageFormula::Canonical,
            block_reduction: 0.95,
        }
    }
}

impl CombatRules {
    /// Replace the faction table.
    pub fn with_factions(mut self, factions: FactionTable) -> Self {
        self.factions = factions;
        self
    }

    /// Replace the weapon affinity table.
    pub fn with_weapon_bonus(mut self, weapon_bonus: WeaponBonusTable) -> Self {
        self.weapon_bonus = weapon_bonus;
        self
    }

    /// Select the damage formula.
    pub fn with_formula(mut self, formula: DamageFormula) -> Self {
        self.formula = formula;
        self
    }

    /// Set the block reduction, clamped to `0.0..=1.0`.
    pub fn with_block_reduction(mut self, reduction: f64) -> Self {
        self.block_reduction = reduction.clamp(0.0, 1.0);
        self
    }

    /// Raw damage `attacker` would deal to `defender` with `weapon`, before
    /// any defensive stance. Never negative.
    pub fn calculate_damage(&self, attacker: &Actor, weapon: Option<&Item>, defender: &Actor) -> f64 {
        let weapon_term = weapon
            .filter(|w| w.kind == ItemKind::Weapon)
            .map_or(0.0, |w| {
                f64::from(w.value) * self.weapon_bonus.multiplier(attacker.race, &w.id)
            });
        let base = f64::from(attacker.stats.strength) * 2.0 + weapon_term;

        match self.formula {
            DamageFormula::Flat => base.trunc(),
            DamageFormula::Canonical => {
                let accuracy = f64::from(attacker.stats.agility) / 10.0;
                let faction = self
                    .factions
                    .relation(attacker.faction, defender.faction)
                    .damage_multiplier();
                let soak = f64::from(defender.stats.strength) * 0.5;
                let damage = base * accuracy * faction - soak;
                ((damage * 10.0).round() / 10.0).max(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::{Faction, ItemCatalog, Stats};
    use proptest::prelude::*;

    fn fighter(strength: u32, agility: u32, faction: Faction) -> Actor {
        Actor::enemy("F", faction, Stats::new(strength, agility, 5, 5, 5))
    }

    #[test]
    fn unarmed_neutral_example() {
        let rules = CombatRules::default();
        let a = fighter(6, 8, Faction::Watchers);
        let d = fighter(9, 5, Faction::Mists);
        let dmg = rules.calculate_damage(&a, None, &d);
        assert!((dmg - 5.1).abs() < 1e-9, "got {dmg}");
    }

    #[test]
    fn weapon_and_race_multiplier_apply() {
        let rules = CombatRules::default();
        let sword = ItemCatalog::standard().get("rusty_sword").unwrap();
        let a = fighter(9, 5, Faction::Watchers).with_race(Race::Gorilla);
        let d = fighter(4, 5, Faction::Mists);
        // (18 + 10 * 1.4) * 0.5 * 1.0 - 2.0
        let dmg = rules.calculate_damage(&a, Some(&sword), &d);
        assert!((dmg - 14.0).abs() < 1e-9, "got {dmg}");
    }

    #[test]
    fn custom_weapon_bonus_table() {
        let sword = ItemCatalog::standard().get("rusty_sword").unwrap();
        let a = fighter(9, 5, Faction::Watchers).with_race(Race::Gorilla);
        let d = fighter(4, 5, Faction::Mists);

        let plain = CombatRules::default().with_weapon_bonus(WeaponBonusTable::new());
        // (18 + 10) * 0.5 - 2.0
        assert!((plain.calculate_damage(&a, Some(&sword), &d) - 12.0).abs() < 1e-9);

        let mut table = WeaponBonusTable::new();
        table.set(Race::Gorilla, "rusty_sword", 2.0);
        let boosted = CombatRules::default().with_weapon_bonus(table);
        // (18 + 20) * 0.5 - 2.0
        assert!((boosted.calculate_damage(&a, Some(&sword), &d) - 17.0).abs() < 1e-9);
    }

    #[test]
    fn non_weapon_item_ignored() {
        let rules = CombatRules::default();
        let banana = ItemCatalog::standard().get("banana").unwrap();
        let a = fighter(6, 10, Faction::Watchers);
        let d = fighter(4, 5, Faction::Mists);
        assert_eq!(
            rules.calculate_damage(&a, Some(&banana), &d),
            rules.calculate_damage(&a, None, &d)
        );
    }

    #[test]
    fn hostile_hits_harder_than_allied() {
        let rules = CombatRules::default();
        let a = fighter(8, 10, Faction::Watchers);
        let hostile = fighter(4, 5, Faction::Shadows);
        let allied = fighter(4, 5, Faction::Forest);
        // 16 * 1.0 * 1.2 - 2 = 17.2 ; 16 * 0.5 - 2 = 6.0
        assert!((rules.calculate_damage(&a, None, &hostile) - 17.2).abs() < 1e-9);
        assert!((rules.calculate_damage(&a, None, &allied) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn damage_never_negative() {
        let rules = CombatRules::default();
        let a = fighter(1, 1, Faction::Watchers);
        let d = fighter(10, 5, Faction::Mists);
        assert_eq!(rules.calculate_damage(&a, None, &d), 0.0);
    }

    #[test]
    fn flat_formula_truncates() {
        let rules = CombatRules::default().with_formula(DamageFormula::Flat);
        let m4 = ItemCatalog::standard().get("m4").unwrap();
        let a = fighter(6, 8, Faction::Watchers).with_race(Race::Chimpanzee);
        let d = fighter(9, 5, Faction::Shadows);
        // 12 + 20 * 0.8 = 28
        assert_eq!(rules.calculate_damage(&a, Some(&m4), &d), 28.0);
    }

    #[test]
    fn unknown_weapon_multiplier_defaults() {
        let table = WeaponBonusTable::standard();
        assert!((table.multiplier(Some(Race::Bonobo), "m4") - 1.3).abs() < f64::EPSILON);
        assert!((table.multiplier(Some(Race::Bonobo), "m16") - 1.0).abs() < f64::EPSILON);
        assert!((table.multiplier(None, "m4") - 1.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn monotonic_in_strength_and_agility(
            s in 1u32..12, a in 1u32..12, ds in 1u32..12, extra in 0u32..3,
        ) {
            let rules = CombatRules::default();
            let d = fighter(ds, 5, Faction::Shadows);
            let base = rules.calculate_damage(&fighter(s, a, Faction::Watchers), None, &d);
            let stronger = rules.calculate_damage(&fighter(s + extra, a, Faction::Watchers), None, &d);
            let quicker = rules.calculate_damage(&fighter(s, a + extra, Faction::Watchers), None, &d);
            prop_assert!(stronger >= base);
            prop_assert!(quicker >= base);
        }
    }
}
