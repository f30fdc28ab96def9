//! Movement, ground-item pickup, and NPC dialogue.
//!
//! While an encounter is active the player is locked in place and only
//! combat actions apply; this system then does nothing.

use std::collections::{HashMap, HashSet};

use aw_core::{ActorId, ActorKind, CoreError, Direction, ItemKind, Position};
use tracing::debug;

use crate::context::TickContext;
use crate::dialogue::Dialogue;
use crate::error::SimResult;
use crate::event::GameEventKind;
use crate::input::Action;
use crate::system::System;

/// Moves the player, picks up items, and runs NPC dialogue.
#[derive(Debug, Default)]
pub struct ExplorationSystem {
    dialogues: HashMap<ActorId, Dialogue>,
    talking_to: Option<ActorId>,
    final_zone: HashSet<Position>,
    in_final_zone: bool,
}

impl ExplorationSystem {
    /// A system with no dialogues and no final zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `npc` a dialogue.
    pub fn add_dialogue(&mut self, npc: ActorId, dialogue: Dialogue) {
        self.dialogues.insert(npc, dialogue);
    }

    /// Sets the tiles that end the journey.
    pub fn set_final_zone(&mut self, cells: impl IntoIterator<Item = Position>) {
        self.final_zone = cells.into_iter().collect();
    }

    /// Tiles that end the journey.
    pub fn final_zone(&self) -> &HashSet<Position> {
        &self.final_zone
    }

    /// The NPC currently in conversation with the player.
    pub fn talking_to(&self) -> Option<ActorId> {
        self.talking_to
    }

    fn step(&mut self, ctx: &mut TickContext<'_>, direction: Direction) -> SimResult<()> {
        let player = ctx.player;
        let from = ctx.grid.actor(player)?.position();
        let (dx, dy) = direction.delta();
        let result = ctx.grid.try_move(player, dx, dy)?;

        if let Some(target) = result.triggered_occupant {
            let name = ctx.grid.actor(target)?.name.clone();
            ctx.emit(
                GameEventKind::Bumped {
                    actor: player,
                    target,
                },
                format!("Bumped into {name}"),
            );
            if ctx.grid.actor(target)?.kind == ActorKind::Npc {
                self.talk(ctx, target)?;
            }
        } else if result.success {
            let to = ctx.grid.actor(player)?.position();
            ctx.emit(
                GameEventKind::Moved {
                    actor: player,
                    from,
                    to,
                },
                format!("Moved {direction} to {to}"),
            );
            self.pick_up(ctx, to)?;
            self.check_final_zone(ctx, to);
        } else if let Some(reason) = result.reason {
            ctx.emit(
                GameEventKind::MoveRejected {
                    actor: player,
                    reason,
                },
                format!("Cannot move {direction}: {reason}"),
            );
        }
        Ok(())
    }

    fn pick_up(&mut self, ctx: &mut TickContext<'_>, pos: Position) -> SimResult<()> {
        let Some((id, kind, name)) = ctx
            .items
            .item_at(pos)
            .map(|i| (i.id.clone(), i.kind, i.name.clone()))
        else {
            return Ok(());
        };
        if ctx.grid.actor(ctx.player)?.inventory.is_full() {
            ctx.emit(
                GameEventKind::PickupFailed {
                    actor: ctx.player,
                    item: id,
                },
                format!("No room for {name}"),
            );
            return Ok(());
        }
        let Some(item) = ctx.items.take(pos) else {
            return Ok(());
        };
        let player = ctx.grid.actor_mut(ctx.player)?;
        let slot = player.inventory.add(item)?;
        let auto_equip = match kind {
            ItemKind::Weapon => player.inventory.equipped_weapon().is_none(),
            ItemKind::Armor => player.inventory.equipped_armor().is_none(),
            ItemKind::Potion | ItemKind::Misc => false,
        };
        if auto_equip {
            player.equip(slot)?;
        }
        ctx.emit(
            GameEventKind::ItemCollected {
                actor: ctx.player,
                item: id,
                item_kind: kind,
            },
            format!("Picked up {name}"),
        );
        Ok(())
    }

    fn check_final_zone(&mut self, ctx: &mut TickContext<'_>, pos: Position) {
        let inside = self.final_zone.contains(&pos);
        if inside && !self.in_final_zone {
            ctx.emit(
                GameEventKind::EnteredFinalZone { actor: ctx.player },
                "Reached the summit",
            );
        }
        self.in_final_zone = inside;
    }

    fn interact(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let pos = ctx.grid.actor(ctx.player)?.position();
        if let Some(npc) = self.talking_to {
            let beside = ctx
                .grid
                .neighbors4(pos)
                .any(|p| ctx.grid.occupant_at(p) == Some(npc));
            if beside {
                return self.talk(ctx, npc);
            }
            // Walked away mid-conversation.
            self.talking_to = None;
        }
        let neighbour = ctx.grid.neighbors4(pos).find_map(|p| {
            ctx.grid
                .occupant_at(p)
                .filter(|id| self.dialogues.contains_key(id))
        });
        match neighbour {
            Some(npc) => self.talk(ctx, npc),
            None => {
                ctx.emit(
                    GameEventKind::ActionRejected {
                        reason: "nobody to talk to".into(),
                    },
                    "Nobody to talk to",
                );
                Ok(())
            }
        }
    }

    /// Speaks the next line of `npc`'s dialogue, or ends it and retires the
    /// NPC once every line was read.
    fn talk(&mut self, ctx: &mut TickContext<'_>, npc: ActorId) -> SimResult<()> {
        let Some(dialogue) = self.dialogues.get_mut(&npc) else {
            debug!(npc = %npc, "npc has nothing to say");
            return Ok(());
        };
        let name = ctx.grid.actor(npc)?.name.clone();
        self.talking_to = Some(npc);
        match dialogue.advance().map(str::to_string) {
            Some(line) => {
                let description = format!("{name}: {line}");
                ctx.emit(GameEventKind::DialogueLine { npc, line }, description);
            }
            None => {
                self.talking_to = None;
                self.dialogues.remove(&npc);
                ctx.grid.retire_actor(npc)?;
                ctx.emit(
                    GameEventKind::DialogueCompleted { npc },
                    format!("{name} leaves"),
                );
            }
        }
        Ok(())
    }

    fn use_item(&mut self, ctx: &mut TickContext<'_>, slot: usize) -> SimResult<()> {
        let player = ctx.grid.actor_mut(ctx.player)?;
        let item_id = player.inventory.get(slot).map(|i| i.id.clone());
        match (player.use_item(slot), item_id) {
            (Ok(used), Some(item)) => {
                let description = format!("{} {used}", player.name);
                ctx.emit(
                    GameEventKind::ItemUsed {
                        actor: ctx.player,
                        item,
                    },
                    description,
                );
            }
            (Err(e @ (CoreError::InvalidSlot(_) | CoreError::NotUsable { .. })), _) => {
                ctx.emit(
                    GameEventKind::ActionRejected {
                        reason: e.to_string(),
                    },
                    e.to_string(),
                );
            }
            (Err(e), _) => return Err(e.into()),
            (Ok(_), None) => {}
        }
        Ok(())
    }

    fn drop_item(&mut self, ctx: &mut TickContext<'_>, slot: usize) -> SimResult<()> {
        let player = ctx.grid.actor_mut(ctx.player)?;
        let pos = player.position();
        let item = match player.drop_item(slot) {
            Ok(item) => item,
            Err(e @ CoreError::InvalidSlot(_)) => {
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
        match ctx.items.drop_at(ctx.grid, pos, item) {
            Ok(at) => {
                let item = ctx.items.item_at(at).map(|i| (i.id.clone(), i.name.clone()));
                if let Some((id, name)) = item {
                    ctx.emit(
                        GameEventKind::ItemDropped {
                            actor: ctx.player,
                            item: id,
                            at,
                        },
                        format!("Dropped {name} at {at}"),
                    );
                }
            }
            Err(item) => {
                // Nowhere to put it: keep it.
                ctx.grid.actor_mut(ctx.player)?.inventory.add(item)?;
                ctx.emit(
                    GameEventKind::ActionRejected {
                        reason: "no room on the ground".into(),
                    },
                    "No room on the ground",
                );
            }
        }
        Ok(())
    }
}

impl System for ExplorationSystem {
    fn name(&self) -> &str {
        "exploration"
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        if ctx.in_encounter {
            return Ok(());
        }
        if let Some(direction) = ctx.input.direction {
            self.step(ctx, direction)?;
        }
        match ctx.input.action {
            Some(Action::Interact) => self.interact(ctx)?,
            Some(Action::UseItem(slot)) => self.use_item(ctx, slot)?,
            Some(Action::Drop(slot)) => self.drop_item(ctx, slot)?,
            Some(action) => debug!(%action, "combat action outside an encounter ignored"),
            None => {}
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
