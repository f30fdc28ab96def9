//! Races and their base attributes.
//!
//! Every playable race maps to one fixed [`Stats`] row. The standard table
//! reproduces the five ape races of the valley; custom tables can be built
//! for tests or alternative scenarios.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The five attributes every actor carries. Observed values fall in `4..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Raw physical power; drives base damage and damage soak.
    pub strength: u32,
    /// Speed and accuracy; scales damage and flee chance.
    pub agility: u32,
    /// Reasoning.
    pub intelligence: u32,
    /// Moving unseen.
    pub stealth: u32,
    /// Talking one's way through.
    pub diplomacy: u32,
}

impl Stats {
    /// Creates a stat block from its five attributes in declaration order.
    pub const fn new(
        strength: u32,
        agility: u32,
        intelligence: u32,
        stealth: u32,
        diplomacy: u32,
    ) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            stealth,
            diplomacy,
        }
    }

    /// A stat block with every attribute set to `value`.
    pub const fn uniform(value: u32) -> Self {
        Self::new(value, value, value, value, value)
    }

    /// Rolls every attribute independently in `5..=9`, the range used for
    /// generic enemies.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            strength: rng.random_range(5..=9),
            agility: rng.random_range(5..=9),
            intelligence: rng.random_range(5..=9),
            stealth: rng.random_range(5..=9),
            diplomacy: rng.random_range(5..=9),
        }
    }
}

/// A playable race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    /// Quick and sociable.
    Chimpanzee,
    /// The strongest, and the slowest.
    Gorilla,
    /// The sharpest mind in the valley.
    Orangutan,
    /// Stealthy diplomats.
    Bonobo,
    /// Agile and loud.
    HowlerMonkey,
}

impl Race {
    /// Every race, in table order.
    pub const ALL: [Race; 5] = [
        Self::Chimpanzee,
        Self::Gorilla,
        Self::Orangutan,
        Self::Bonobo,
        Self::HowlerMonkey,
    ];

    /// The short key used in save files and scenario data.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Chimpanzee => "chimpanze",
            Self::Gorilla => "gorille",
            Self::Orangutan => "orang_outan",
            Self::Bonobo => "bonobo",
            Self::HowlerMonkey => "singe_hurleur",
        }
    }

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Chimpanzee => "Chimpanzee",
            Self::Gorilla => "Gorilla",
            Self::Orangutan => "Orangutan",
            Self::Bonobo => "Bonobo",
            Self::HowlerMonkey => "Howler monkey",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Race {
    type Err = CoreError;

    /// Accepts either the short key (`orang_outan`) or the display name in
    /// any case, with spaces, dashes, and underscores treated alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|race| {
                race.key() == normalized
                    || race.display_name().to_lowercase().replace(' ', "_") == normalized
            })
            .ok_or_else(|| CoreError::UnknownRace(s.to_string()))
    }
}

/// Lookup table from race to base stats.
#[derive(Debug, Clone, Default)]
pub struct RaceTable {
    rows: HashMap<Race, Stats>,
}

impl RaceTable {
    /// An empty table. Every lookup fails until rows are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// The five standard races of the valley.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.insert(Race::Chimpanzee, Stats::new(6, 8, 7, 6, 8));
        table.insert(Race::Gorilla, Stats::new(9, 5, 6, 4, 5));
        table.insert(Race::Orangutan, Stats::new(7, 6, 9, 5, 7));
        table.insert(Race::Bonobo, Stats::new(5, 7, 7, 9, 9));
        table.insert(Race::HowlerMonkey, Stats::new(6, 8, 6, 7, 6));
        table
    }

    /// Sets (or replaces) the row for `race`.
    pub fn insert(&mut self, race: Race, stats: Stats) {
        self.rows.insert(race, stats);
    }

    /// Base stats for `race`.
    pub fn stats(&self, race: Race) -> CoreResult<Stats> {
        self.rows
            .get(&race)
            .copied()
            .ok_or_else(|| CoreError::UnknownRace(race.key().to_string()))
    }

    /// Parses `name` and looks up its row.
    pub fn stats_by_name(&self, name: &str) -> CoreResult<Stats> {
        self.stats(name.parse()?)
    }

    /// Rows in [`Race::ALL`] order, skipping races the table lacks.
    pub fn iter(&self) -> impl Iterator<Item = (Race, Stats)> + '_ {
        Race::ALL
            .into_iter()
            .filter_map(|race| self.rows.get(&race).map(|s| (race, *s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn standard_table_rows() {
        let table = RaceTable::standard();
        let gorilla = table.stats(Race::Gorilla).unwrap();
        assert_eq!(gorilla.strength, 9);
        assert_eq!(gorilla.agility, 5);
        let chimp = table.stats(Race::Chimpanzee).unwrap();
        assert_eq!(chimp, Stats::new(6, 8, 7, 6, 8));
        assert_eq!(table.iter().count(), 5);
    }

    #[test]
    fn parse_accepts_keys_and_names() {
        assert_eq!("orang_outan".parse::<Race>().unwrap(), Race::Orangutan);
        assert_eq!("Howler Monkey".parse::<Race>().unwrap(), Race::HowlerMonkey);
        assert_eq!("singe-hurleur".parse::<Race>().unwrap(), Race::HowlerMonkey);
        assert_eq!(" GORILLE ".parse::<Race>().unwrap(), Race::Gorilla);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "lemur".parse::<Race>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownRace(ref name) if name == "lemur"));
    }

    #[test]
    fn missing_row_is_unknown_race() {
        let mut table = RaceTable::new();
        table.insert(Race::Bonobo, Stats::uniform(5));
        assert!(table.stats(Race::Bonobo).is_ok());
        assert!(matches!(
            table.stats(Race::Gorilla),
            Err(CoreError::UnknownRace(_))
        ));
        assert!(table.stats_by_name("chimpanze").is_err());
    }

    #[test]
    fn random_stats_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let s = Stats::random(&mut rng);
            for v in [s.strength, s.agility, s.intelligence, s.stealth, s.diplomacy] {
                assert!((5..=9).contains(&v));
            }
        }
    }
}
