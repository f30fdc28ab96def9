//! Combat zones and the encounter controller.
//!
//! A zone is a fixed set of tiles guarded by one enemy. Walking into a zone
//! (from outside it) starts an encounter with that enemy; so does bumping
//! into any enemy the player's faction may attack. At most one encounter is
//! active at a time. A zone whose enemy was defeated never triggers again.

use std::collections::HashSet;

use aw_core::{ActorId, ActorKind, CoreError, Position};
use aw_mechanics::{CombatAction, EncounterSession, EncounterState, MechError, Stance};
use tracing::{debug, info};

use crate::context::TickContext;
use crate::error::{SimError, SimResult};
use crate::event::GameEventKind;
use crate::input::Action;
use crate::system::System;

/// Tiles that start an encounter with their guardian.
#[derive(Debug, Clone)]
pub struct CombatZone {
    /// Display name.
    pub name: String,
    /// Guardian enemy.
    pub enemy: ActorId,
    cells: HashSet<Position>,
    cleared: bool,
    player_inside: bool,
}

impl CombatZone {
    /// A zone made of explicit tiles.
    pub fn new(
        name: impl Into<String>,
        enemy: ActorId,
        cells: impl IntoIterator<Item = Position>,
    ) -> Self {
        Self {
            name: name.into(),
            enemy,
            cells: cells.into_iter().collect(),
            cleared: false,
            player_inside: false,
        }
    }

    /// The eight tiles surrounding `center`.
    pub fn around(name: impl Into<String>, enemy: ActorId, center: Position) -> Self {
        let ring = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| (dx, dy) != (0, 0))
            .map(|(dx, dy)| center.offset(dx, dy));
        Self::new(name, enemy, ring)
    }

    /// Returns true if `pos` belongs to the zone.
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// Returns true once the guardian was defeated.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

/// Starts encounters and plays their turns.
#[derive(Debug, Default)]
pub struct EncounterController {
    zones: Vec<CombatZone>,
    active: Option<EncounterSession>,
    finished: Vec<EncounterSession>,
}

impl EncounterController {
    /// A controller with no zones.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a zone.
    pub fn add_zone(&mut self, zone: CombatZone) {
        self.zones.push(zone);
    }

    /// Registered zones.
    pub fn zones(&self) -> &[CombatZone] {
        &self.zones
    }

    /// The encounter in progress.
    pub fn active(&self) -> Option<&EncounterSession> {
        self.active.as_ref()
    }

    /// Returns true while an encounter is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Encounters that already ended, oldest first.
    pub fn finished(&self) -> &[EncounterSession] {
        &self.finished
    }

    /// Records the player's position. Returns the guardian of the first
    /// uncleared zone the player just stepped into from outside.
    pub fn on_player_moved(&mut self, pos: Position) -> Option<ActorId> {
        let mut trigger = None;
        for zone in &mut self.zones {
            let inside = zone.contains(pos);
            let entered = inside && !zone.player_inside;
            zone.player_inside = inside;
            if entered && !zone.cleared && trigger.is_none() {
                debug!(zone = %zone.name, at = %pos, "combat zone entered");
                trigger = Some(zone.enemy);
            }
        }
        trigger
    }

    /// Opens an encounter. Fails if one is already active.
    pub fn start_encounter(
        &mut self,
        player: ActorId,
        enemy: ActorId,
    ) -> SimResult<&EncounterSession> {
        if let Some(active) = &self.active {
            return Err(SimError::EncounterAlreadyActive {
                active: active.enemy(),
                requested: enemy,
            });
        }
        Ok(self.active.insert(EncounterSession::new(player, enemy)))
    }

    fn try_start(&mut self, ctx: &mut TickContext<'_>, enemy: ActorId) -> SimResult<()> {
        let player = ctx.grid.actor(ctx.player)?;
        let foe = ctx.grid.actor(enemy)?;
        if !foe.is_alive() || foe.kind != ActorKind::Enemy {
            return Ok(());
        }
        if !ctx.rules.factions.can_attack(player.faction, foe.faction) {
            debug!(enemy = %foe.name, "allied enemy ignored");
            return Ok(());
        }
        let description = format!("{} confronts {}!", foe.name, player.name);
        info!(player = %player.name, enemy = %foe.name, "encounter started");
        self.start_encounter(ctx.player, enemy)?;
        ctx.emit(
            GameEventKind::EncounterStarted {
                player: ctx.player,
                enemy,
            },
            description,
        );
        Ok(())
    }

    fn play_turn(&mut self, ctx: &mut TickContext<'_>, action: CombatAction) -> SimResult<()> {
        let Some(session) = self.active.as_mut() else {
            return Ok(());
        };
        let report = match session.resolve(action, ctx.grid, ctx.rules, ctx.rng) {
            Ok(report) => report,
            Err(MechError::Core(e @ (CoreError::InvalidSlot(_) | CoreError::NotUsable { .. }))) => {
                ctx.emit(
                    GameEventKind::ActionRejected {
                        reason: e.to_string(),
                    },
                    e.to_string(),
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let enemy = session.enemy();
        ctx.emit(
            GameEventKind::CombatTurn {
                enemy,
                turn: report.turn,
                state: report.state,
            },
            report.lines.join(" "),
        );
        if report.state.is_terminal() {
            self.finish(ctx);
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut TickContext<'_>) {
        let Some(session) = self.active.take() else {
            return;
        };
        let (enemy, state) = (session.enemy(), session.state());
        if state == EncounterState::PlayerWon {
            for zone in self.zones.iter_mut().filter(|z| z.enemy == enemy && !z.cleared) {
                zone.cleared = true;
                ctx.emit(
                    GameEventKind::ZoneCleared {
                        zone: zone.name.clone(),
                    },
                    format!("{} is safe now", zone.name),
                );
            }
        }
        let description = match state {
            EncounterState::PlayerWon => "Victory!",
            EncounterState::PlayerLost => "Defeat...",
            EncounterState::Fled => "Got away",
            EncounterState::Active => "Encounter interrupted",
        };
        ctx.emit(GameEventKind::EncounterEnded { enemy, state }, description);
        if state == EncounterState::PlayerLost {
            ctx.emit(GameEventKind::PlayerDefeated, "Game over");
        }
        self.finished.push(session);
    }
}

fn combat_action(action: Action) -> Option<CombatAction> {
    match action {
        Action::Attack => Some(CombatAction::Attack),
        Action::Defend => Some(CombatAction::Defend {
            stance: Stance::Guard,
            item: None,
        }),
        Action::Block => Some(CombatAction::Defend {
            stance: Stance::Block,
            item: None,
        }),
        Action::UseItem(slot) => Some(CombatAction::Defend {
            stance: Stance::Guard,
            item: Some(slot),
        }),
        Action::Flee => Some(CombatAction::Flee),
        Action::Interact | Action::Drop(_) => None,
    }
}

impl System for EncounterController {
    fn name(&self) -> &str {
        "encounter"
    }

    /// Records the starting tile so a player who begins inside a zone does
    /// not trigger it without leaving first.
    fn init(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let pos = ctx.grid.actor(ctx.player)?.position();
        if self.on_player_moved(pos).is_some() {
            debug!(at = %pos, "player starts inside a combat zone");
        }
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let player = ctx.grid.actor(ctx.player)?;
        if !player.is_alive() {
            return Ok(());
        }
        let pos = player.position();
        let zone_trigger = self.on_player_moved(pos);

        if !self.is_active() {
            let bumped = ctx.fired().iter().find_map(|e| match e.kind {
                GameEventKind::Bumped { actor, target } if actor == ctx.player => Some(target),
                _ => None,
            });
            if let Some(enemy) = zone_trigger.or(bumped) {
                self.try_start(ctx, enemy)?;
            }
        } else if let Some(enemy) = zone_trigger {
            self.try_start(ctx, enemy)?;
        }

        // Exploration already consumed this tick's action if combat was not
        // open when the tick began.
        if ctx.in_encounter {
            if let Some(action) = ctx.input.action.and_then(combat_action) {
                self.play_turn(ctx, action)?;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
