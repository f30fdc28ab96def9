//! Encounter state machine.
//!
//! An [`EncounterSession`] pits the player against one enemy. Each action
//! resolves a full turn (the player's move and the enemy's answer) and
//! appends a [`TurnReport`] of human-readable lines to the session log.
//! Once the session leaves [`EncounterState::Active`] it accepts no more
//! actions, and the loser is retired from the grid.

pub mod attack;
pub mod damage;
pub mod flee;

pub use attack::{AttackOutcome, Stance};
pub use damage::{CombatRules, DamageFormula, WeaponBonusTable};

use std::fmt;

use aw_core::{Actor, ActorId, GridWorld};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MechError, MechResult};

/// Lifecycle of an encounter. Every state but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterState {
    /// Turns are still being exchanged.
    Active,
    /// The enemy reached zero hit points.
    PlayerWon,
    /// The player reached zero hit points.
    PlayerLost,
    /// The player got away.
    Fled,
}

impl EncounterState {
    /// Returns true for every state except [`EncounterState::Active`].
    pub fn is_terminal(self) -> bool {
        self != Self::Active
    }
}

impl fmt::Display for EncounterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::PlayerWon => "player won",
            Self::PlayerLost => "player lost",
            Self::Fled => "fled",
        };
        write!(f, "{s}")
    }
}

/// What the player chose to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    /// Strike; the enemy ripostes if it survives.
    Attack,
    /// Optionally use an item, then take the enemy's blow in a stance.
    Defend {
        /// How the blow is met.
        stance: Stance,
        /// Inventory slot to use before the blow lands.
        item: Option<usize>,
    },
    /// Try to step away from the enemy.
    Flee,
}

impl fmt::Display for CombatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "Attack"),
            Self::Defend { stance, item: None } => write!(f, "Defend ({stance})"),
            Self::Defend {
                stance,
                item: Some(slot),
            } => write!(f, "Use slot #{slot}, defend ({stance})"),
            Self::Flee => write!(f, "Flee"),
        }
    }
}

/// The record of one resolved turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    /// 1-based turn number.
    pub turn: u32,
    /// The player's chosen action.
    pub action: CombatAction,
    /// Narrative summary, one sentence per line.
    pub lines: Vec<String>,
    /// Session state after the turn.
    pub state: EncounterState,
}

/// One combat between the player and an enemy.
#[derive(Debug, Clone)]
pub struct EncounterSession {
    player: ActorId,
    enemy: ActorId,
    state: EncounterState,
    turn: u32,
    log: Vec<TurnReport>,
}

impl EncounterSession {
    /// Opens an active encounter between two actors on the grid.
    pub fn new(player: ActorId, enemy: ActorId) -> Self {
        Self {
            player,
            enemy,
            state: EncounterState::Active,
            turn: 0,
            log: Vec::new(),
        }
    }

    /// The player's id.
    pub fn player(&self) -> ActorId {
        self.player
    }

    /// The enemy's id.
    pub fn enemy(&self) -> ActorId {
        self.enemy
    }

    /// Current state.
    pub fn state(&self) -> EncounterState {
        self.state
    }

    /// Returns true while turns can still be played.
    pub fn is_active(&self) -> bool {
        self.state == EncounterState::Active
    }

    /// Number of turns resolved so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Every resolved turn, oldest first.
    pub fn log(&self) -> &[TurnReport] {
        &self.log
    }

    /// Dispatches `action` to the matching turn resolver.
    pub fn resolve<R: Rng>(
        &mut self,
        action: CombatAction,
        grid: &mut GridWorld,
        rules: &CombatRules,
        rng: &mut R,
    ) -> MechResult<TurnReport> {
        match action {
            CombatAction::Attack => self.attack(grid, rules),
            CombatAction::Defend { stance, item } => self.defend(grid, rules, stance, item),
            CombatAction::Flee => self.flee(grid, rules, rng),
        }
    }

    /// The player strikes. A surviving enemy strikes back at an undefended
    /// player.
    pub fn attack(&mut self, grid: &mut GridWorld, rules: &CombatRules) -> MechResult<TurnReport> {
        self.ensure_active()?;
        let mut lines = Vec::new();
        let (player, enemy) = grid.pair_mut(self.player, self.enemy)?;

        let hit = rules.attack(player, enemy, Stance::Open)?;
        lines.push(hit_line(player, enemy, hit));
        if hit.fatal {
            lines.push(format!("{} is defeated!", enemy.name));
            self.state = EncounterState::PlayerWon;
        } else if let Some(riposte) = counter(rules, enemy, player, Stance::Open, &mut lines)? {
            if riposte.fatal {
                lines.push(format!("{} has fallen.", player.name));
                self.state = EncounterState::PlayerLost;
            }
        }
        self.close_turn(grid, CombatAction::Attack, lines)
    }

    /// The player optionally uses an item from `item`, then meets the
    /// enemy's blow in `stance`. A failed item use aborts the turn before
    /// anything changes.
    pub fn defend(
        &mut self,
        grid: &mut GridWorld,
        rules: &CombatRules,
        stance: Stance,
        item: Option<usize>,
    ) -> MechResult<TurnReport> {
        self.ensure_active()?;
        let mut lines = Vec::new();
        let (player, enemy) = grid.pair_mut(self.player, self.enemy)?;

        if let Some(slot) = item {
            let used = player.use_item(slot)?;
            lines.push(format!("{} {used}.", player.name));
        }
        lines.push(format!("{} braces ({stance}).", player.name));
        if let Some(hit) = counter(rules, enemy, player, stance, &mut lines)? {
            if hit.fatal {
                lines.push(format!("{} has fallen.", player.name));
                self.state = EncounterState::PlayerLost;
            }
        }
        self.close_turn(grid, CombatAction::Defend { stance, item }, lines)
    }

    /// The player tries to run, with a chance basis of `agility * 10`.
    pub fn flee<R: Rng>(
        &mut self,
        grid: &mut GridWorld,
        rules: &CombatRules,
        rng: &mut R,
    ) -> MechResult<TurnReport> {
        let agility = grid.actor(self.player)?.stats.agility;
        self.flee_with_chance(grid, rules, rng, flee::flee_chance(agility))
    }

    /// The player tries to run, succeeding when a `1..=100` roll does not
    /// exceed `chance_basis`. On success they step away from the enemy, or
    /// stay put if every escape tile is taken. On a failed roll the enemy
    /// gets a free blow.
    pub fn flee_with_chance<R: Rng>(
        &mut self,
        grid: &mut GridWorld,
        rules: &CombatRules,
        rng: &mut R,
        chance_basis: u32,
    ) -> MechResult<TurnReport> {
        self.ensure_active()?;
        let mut lines = Vec::new();
        let player = grid.actor(self.player)?;
        let (name, from) = (player.name.clone(), player.position());
        let opponent = grid.actor(self.enemy)?.position();

        if flee::roll_flee(rng, chance_basis) {
            let mut escaped = None;
            for dir in flee::escape_directions(from, opponent) {
                let (dx, dy) = dir.delta();
                if grid.try_move(self.player, dx, dy)?.moved_tiles() {
                    escaped = Some(dir);
                    break;
                }
            }
            match escaped {
                Some(dir) => {
                    lines.push(format!("{name} flees {dir}."));
                    self.state = EncounterState::Fled;
                }
                None => lines.push(format!("{name} is cornered and cannot escape.")),
            }
        } else {
            lines.push(format!("{name} fails to get away."));
            let (player, enemy) = grid.pair_mut(self.player, self.enemy)?;
            if let Some(hit) = counter(rules, enemy, player, Stance::Open, &mut lines)? {
                if hit.fatal {
                    lines.push(format!("{} has fallen.", player.name));
                    self.state = EncounterState::PlayerLost;
                }
            }
        }
        self.close_turn(grid, CombatAction::Flee, lines)
    }

    fn ensure_active(&self) -> MechResult<()> {
        if self.state.is_terminal() {
            return Err(MechError::EncounterOver(self.state));
        }
        Ok(())
    }

    fn close_turn(
        &mut self,
        grid: &mut GridWorld,
        action: CombatAction,
        lines: Vec<String>,
    ) -> MechResult<TurnReport> {
        self.turn += 1;
        match self.state {
            EncounterState::PlayerWon => grid.retire_actor(self.enemy)?,
            EncounterState::PlayerLost => grid.retire_actor(self.player)?,
            EncounterState::Active | EncounterState::Fled => {}
        }
        if self.state.is_terminal() {
            info!(
                player = %self.player,
                enemy = %self.enemy,
                state = %self.state,
                turns = self.turn,
                "encounter ended"
            );
        }
        let report = TurnReport {
            turn: self.turn,
            action,
            lines,
            state: self.state,
        };
        self.log.push(report.clone());
        Ok(report)
    }
}

/// The enemy's answer. Returns `None` when its faction may not strike the
/// player.
fn counter(
    rules: &CombatRules,
    enemy: &Actor,
    player: &mut Actor,
    stance: Stance,
    lines: &mut Vec<String>,
) -> MechResult<Option<AttackOutcome>> {
    if !rules.factions.can_attack(enemy.faction, player.faction) {
        lines.push(format!("{} holds back.", enemy.name));
        return Ok(None);
    }
    let hit = rules.attack(enemy, player, stance)?;
    lines.push(hit_line(enemy, player, hit));
    Ok(Some(hit))
}

fn hit_line(attacker: &Actor, defender: &Actor, hit: AttackOutcome) -> String {
    format!(
        "{} hits {} for {} damage ({}).",
        attacker.name, defender.name, hit.damage, defender.health
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::{Faction, Health, ItemCatalog, Position, Relation, Stats};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn arena(width: u32, player: Stats, enemy: Stats) -> (GridWorld, EncounterSession) {
        let mut grid = GridWorld::new(width, 1).unwrap();
        let mut p = Actor::enemy("Kito", Faction::Watchers, player);
        p.interactable = false;
        let e = Actor::enemy("Raider", Faction::Shadows, enemy);
        let pid = grid.spawn_actor(p, Position::new(1, 0)).unwrap();
        let eid = grid.spawn_actor(e, Position::new(0, 0)).unwrap();
        (grid, EncounterSession::new(pid, eid))
    }

    #[test]
    fn attack_until_won() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::new(10, 10, 5, 5, 5), Stats::uniform(1));
        // 20 * 1.0 * 1.2 - 0.5 = 23.5 -> 24 per hit; the riposte rounds to 0
        for _ in 0..4 {
            let r = s.attack(&mut grid, &rules).unwrap();
            assert_eq!(r.state, EncounterState::Active);
            assert_eq!(r.lines.len(), 2);
        }
        let r = s.attack(&mut grid, &rules).unwrap();
        assert_eq!(r.state, EncounterState::PlayerWon);
        assert_eq!(s.turn(), 5);
        assert!(!grid.actor(s.enemy()).unwrap().visible);
        assert_eq!(grid.occupant_at(Position::new(0, 0)), None);
        assert_eq!(grid.actor(s.player()).unwrap().health.current(), 100);
    }

    #[test]
    fn actions_after_end_are_rejected() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::new(10, 10, 5, 5, 5), Stats::uniform(1));
        while s.is_active() {
            s.attack(&mut grid, &rules).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            s.flee(&mut grid, &rules, &mut rng),
            Err(MechError::EncounterOver(EncounterState::PlayerWon))
        ));
        assert_eq!(s.log().len(), 5);
    }

    #[test]
    fn riposte_can_kill_player() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::uniform(1), Stats::new(10, 10, 5, 5, 5));
        grid.actor_mut(s.player()).unwrap().health = Health::with_current(1, 100);
        let r = s.attack(&mut grid, &rules).unwrap();
        assert_eq!(r.state, EncounterState::PlayerLost);
        assert!(!grid.actor(s.player()).unwrap().visible);
        assert!(grid.actor(s.enemy()).unwrap().visible);
    }

    #[test]
    fn interrupted_defense_loses() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::uniform(5), Stats::new(9, 9, 5, 5, 5));
        grid.actor_mut(s.player()).unwrap().health = Health::with_current(1, 100);
        let r = s.defend(&mut grid, &rules, Stance::Block, None).unwrap();
        assert_eq!(r.state, EncounterState::PlayerLost);
    }

    #[test]
    fn defend_with_potion_heals_first() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::uniform(5), Stats::new(6, 8, 5, 5, 5));
        let banana = ItemCatalog::standard().get("banana").unwrap();
        let player = grid.actor_mut(s.player()).unwrap();
        player.health = Health::with_current(50, 100);
        let slot = player.inventory.add(banana).unwrap();
        // enemy: 12 * 0.8 * 1.2 - 2.5 = 9.02 -> 9.0, guarded -> 5 (4.5 rounds up)
        let r = s.defend(&mut grid, &rules, Stance::Guard, Some(slot)).unwrap();
        assert_eq!(r.state, EncounterState::Active);
        assert_eq!(grid.actor(s.player()).unwrap().health.current(), 65);
        assert!(r.lines[0].contains("Banana"));
    }

    #[test]
    fn bad_item_slot_does_not_consume_turn() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::uniform(5), Stats::uniform(5));
        assert!(s.defend(&mut grid, &rules, Stance::Guard, Some(3)).is_err());
        assert_eq!(s.turn(), 0);
        assert_eq!(grid.actor(s.player()).unwrap().health.current(), 100);
    }

    #[test]
    fn successful_flee_moves_away() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::new(5, 10, 5, 5, 5), Stats::uniform(5));
        let mut rng = StdRng::seed_from_u64(42);
        let r = s.flee(&mut grid, &rules, &mut rng).unwrap();
        assert_eq!(r.state, EncounterState::Fled);
        assert_eq!(grid.actor(s.player()).unwrap().position(), Position::new(2, 0));
    }

    #[test]
    fn cornered_flee_stays_active_without_free_attack() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(2, Stats::new(5, 10, 5, 5, 5), Stats::uniform(9));
        let mut rng = StdRng::seed_from_u64(42);
        let r = s.flee(&mut grid, &rules, &mut rng).unwrap();
        assert_eq!(r.state, EncounterState::Active);
        assert!(r.lines[0].contains("cornered"));
        assert_eq!(grid.actor(s.player()).unwrap().health.current(), 100);
        assert_eq!(grid.actor(s.player()).unwrap().position(), Position::new(1, 0));
    }

    #[test]
    fn failed_flee_grants_free_attack() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::new(5, 0, 5, 5, 5), Stats::new(8, 10, 5, 5, 5));
        let mut rng = StdRng::seed_from_u64(42);
        let r = s.flee(&mut grid, &rules, &mut rng).unwrap();
        assert_eq!(r.state, EncounterState::Active);
        // 16 * 1.0 * 1.2 - 2.5 = 16.7 -> 17
        assert_eq!(grid.actor(s.player()).unwrap().health.current(), 83);
        assert_eq!(grid.actor(s.player()).unwrap().position(), Position::new(1, 0));
    }

    #[test]
    fn failed_flee_with_fatal_free_attack_loses() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::new(5, 0, 5, 5, 5), Stats::new(8, 10, 5, 5, 5));
        grid.actor_mut(s.player()).unwrap().health = Health::with_current(1, 100);
        let mut rng = StdRng::seed_from_u64(42);
        let r = s.flee(&mut grid, &rules, &mut rng).unwrap();
        assert_eq!(r.state, EncounterState::PlayerLost);
        assert!(r.lines[0].contains("fails to get away"));
        let player = grid.actor(s.player()).unwrap();
        assert_eq!(player.health.current(), 0);
        assert!(!player.visible);
        assert!(s.flee(&mut grid, &rules, &mut rng).is_err());
    }

    #[test]
    fn explicit_chance_overrides_agility() {
        let rules = CombatRules::default();
        let (mut grid, mut s) = arena(4, Stats::new(5, 0, 5, 5, 5), Stats::uniform(5));
        let mut rng = StdRng::seed_from_u64(42);
        let r = s.flee_with_chance(&mut grid, &rules, &mut rng, 100).unwrap();
        assert_eq!(r.state, EncounterState::Fled);
        assert_eq!(grid.actor(s.player()).unwrap().position(), Position::new(2, 0));
    }

    #[test]
    fn enemy_holds_back_when_it_regards_player_as_ally() {
        let mut rules = CombatRules::default();
        rules
            .factions
            .set_relation(Faction::Shadows, Faction::Watchers, Relation::Allied);
        let (mut grid, mut s) = arena(4, Stats::uniform(5), Stats::uniform(9));
        let r = s.attack(&mut grid, &rules).unwrap();
        assert!(r.lines[1].contains("holds back"));
        assert_eq!(grid.actor(s.player()).unwrap().health.current(), 100);
    }

    #[test]
    fn action_display() {
        assert_eq!(CombatAction::Attack.to_string(), "Attack");
        let defend = CombatAction::Defend {
            stance: Stance::Block,
            item: Some(2),
        };
        assert_eq!(defend.to_string(), "Use slot #2, defend (block)");
    }
}
