//! Factions and the relation table between them.
//!
//! A relation decides two things at once: whether one faction may attack
//! another, and how hard the blow lands. Pairs missing from the table are
//! [`Relation::Neutral`]. The table is directed and never symmetrized
//! behind the caller's back; [`FactionTable::validate`] reports mismatches.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;

/// One of the four factions of the valley.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Watchers of the Mountains.
    Watchers,
    /// Circle of Shadows.
    Shadows,
    /// Clan of the Mists.
    Mists,
    /// Children of the Forest.
    Forest,
}

impl Faction {
    /// Every faction, in table order.
    pub const ALL: [Faction; 4] = [Self::Watchers, Self::Shadows, Self::Mists, Self::Forest];

    /// The short key used in save files and scenario data.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Watchers => "veilleurs",
            Self::Shadows => "ombres",
            Self::Mists => "brumes",
            Self::Forest => "foret",
        }
    }

    /// Full name of the faction.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Watchers => "Watchers of the Mountains",
            Self::Shadows => "Circle of Shadows",
            Self::Mists => "Clan of the Mists",
            Self::Forest => "Children of the Forest",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Self::Watchers => "watchers",
            Self::Shadows => "shadows",
            Self::Mists => "mists",
            Self::Forest => "forest",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Faction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|faction| {
                faction.key() == normalized
                    || faction.short_name() == normalized
                    || faction.display_name().to_lowercase() == normalized
            })
            .ok_or_else(|| CoreError::UnknownFaction(s.to_string()))
    }
}

/// How one faction regards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Friends. Cannot attack each other.
    Allied,
    /// No standing quarrel.
    #[default]
    Neutral,
    /// Open enemies.
    Hostile,
}

impl Relation {
    /// Multiplier applied to damage dealt across this relation.
    pub const fn damage_multiplier(self) -> f64 {
        match self {
            Self::Allied => 0.5,
            Self::Neutral => 1.0,
            Self::Hostile => 1.2,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Allied => "allied",
            Self::Neutral => "neutral",
            Self::Hostile => "hostile",
        };
        write!(f, "{s}")
    }
}

/// Directed relation table between factions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionTable {
    relations: HashMap<Faction, HashMap<Faction, Relation>>,
}

impl FactionTable {
    /// An empty table: every pair is neutral.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standing relations of the valley, stated in both directions.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.set_mutual(Faction::Watchers, Faction::Forest, Relation::Allied);
        table.set_mutual(Faction::Watchers, Faction::Shadows, Relation::Hostile);
        table.set_mutual(Faction::Shadows, Faction::Mists, Relation::Allied);
        table.set_mutual(Faction::Mists, Faction::Forest, Relation::Neutral);
        table
    }

    /// Sets how `from` regards `to`. The reverse entry is left untouched.
    pub fn set_relation(&mut self, from: Faction, to: Faction, relation: Relation) {
        self.relations.entry(from).or_default().insert(to, relation);
    }

    /// Sets the same relation in both directions.
    pub fn set_mutual(&mut self, a: Faction, b: Faction, relation: Relation) {
        self.set_relation(a, b, relation);
        self.set_relation(b, a, relation);
    }

    /// How `from` regards `to`; [`Relation::Neutral`] when unspecified.
    pub fn relation(&self, from: Faction, to: Faction) -> Relation {
        self.relations
            .get(&from)
            .and_then(|row| row.get(&to))
            .copied()
            .unwrap_or_default()
    }

    /// Attacks are legal between any two factions that are not allied.
    pub fn can_attack(&self, attacker: Faction, defender: Faction) -> bool {
        self.relation(attacker, defender) != Relation::Allied
    }

    /// Unordered pairs whose two directions disagree, each listed once with
    /// the lower faction first.
    pub fn asymmetries(&self) -> Vec<(Faction, Faction)> {
        let mut pairs = Vec::new();
        for (i, &a) in Faction::ALL.iter().enumerate() {
            for &b in &Faction::ALL[i + 1..] {
                if self.relation(a, b) != self.relation(b, a) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Logs a warning for each asymmetric pair and returns how many there were.
    pub fn validate(&self) -> usize {
        let pairs = self.asymmetries();
        for (a, b) in &pairs {
            warn!(
                from = a.key(),
                to = b.key(),
                forward = %self.relation(*a, *b),
                backward = %self.relation(*b, *a),
                "asymmetric faction relation"
            );
        }
        pairs.len()
    }
}
