use aw_core::{ActorId, ItemKind, MoveFailure, Position};
use aw_mechanics::EncounterState;
use serde::{Deserialize, Serialize};

/// What kind of game event occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEventKind {
    // Exploration
    /// An actor stepped onto a new tile.
    Moved {
        /// The actor that moved.
        actor: ActorId,
        /// The tile it left.
        from: Position,
        /// The tile it entered.
        to: Position,
    },
    /// A step was refused.
    MoveRejected {
        /// The actor that tried to move.
        actor: ActorId,
        /// Why the step failed.
        reason: MoveFailure,
    },
    /// An actor walked into an interactable occupant.
    Bumped {
        /// The actor that moved.
        actor: ActorId,
        /// The occupant it bumped.
        target: ActorId,
    },
    /// An action was ignored because it could not apply.
    ActionRejected {
        /// Why it was refused.
        reason: String,
    },

    // Dialogue
    /// An NPC spoke one line.
    DialogueLine {
        /// The speaker.
        npc: ActorId,
        /// The line spoken.
        line: String,
    },
    /// An NPC finished talking and left.
    DialogueCompleted {
        /// The NPC whose dialogue ended.
        npc: ActorId,
    },

    // Items
    /// The spawner dropped a new item.
    ItemSpawned {
        /// Catalog id of the item.
        item: String,
        /// Where it landed.
        at: Position,
    },
    /// An actor picked up a ground item.
    ItemCollected {
        /// The collector.
        actor: ActorId,
        /// Catalog id of the item.
        item: String,
        /// Its category.
        item_kind: ItemKind,
    },
    /// An item stayed on the ground because the inventory was full.
    PickupFailed {
        /// The actor that tried to pick it up.
        actor: ActorId,
        /// Catalog id of the item.
        item: String,
    },
    /// An actor put an inventory item on the ground.
    ItemDropped {
        /// The actor that dropped it.
        actor: ActorId,
        /// Catalog id of the item.
        item: String,
        /// Where it landed.
        at: Position,
    },
    /// An inventory item was used outside combat.
    ItemUsed {
        /// The actor that used it.
        actor: ActorId,
        /// Catalog id of the item.
        item: String,
    },

    // Encounters
    /// Combat began.
    EncounterStarted {
        /// The player.
        player: ActorId,
        /// The enemy.
        enemy: ActorId,
    },
    /// One combat turn resolved.
    CombatTurn {
        /// The enemy in this encounter.
        enemy: ActorId,
        /// 1-based turn number.
        turn: u32,
        /// Encounter state after the turn.
        state: EncounterState,
    },
    /// Combat ended.
    EncounterEnded {
        /// The enemy in this encounter.
        enemy: ActorId,
        /// Final state.
        state: EncounterState,
    },
    /// A combat zone will no longer trigger.
    ZoneCleared {
        /// Name of the zone.
        zone: String,
    },

    // Quest
    /// The player stepped into the final zone.
    EnteredFinalZone {
        /// The actor that entered.
        actor: ActorId,
    },
    /// A quest flag was set for the first time.
    QuestStepCompleted {
        /// The flag that was set.
        flag: String,
    },
    /// The current quest step moved on. `None` means every step is done.
    QuestAdvanced {
        /// New current step index.
        step: Option<usize>,
    },
    /// Every quest step is done.
    FinalVictory,
    /// The player fell.
    PlayerDefeated,
}

impl GameEventKind {
    /// Check whether a given actor is involved in this event.
    pub fn involves(&self, id: ActorId) -> bool {
        match self {
            Self::Moved { actor, .. }
            | Self::MoveRejected { actor, .. }
            | Self::ItemCollected { actor, .. }
            | Self::PickupFailed { actor, .. }
            | Self::ItemDropped { actor, .. }
            | Self::ItemUsed { actor, .. }
            | Self::EnteredFinalZone { actor } => *actor == id,
            Self::Bumped { actor, target } => *actor == id || *target == id,
            Self::DialogueLine { npc, .. } | Self::DialogueCompleted { npc } => *npc == id,
            Self::EncounterStarted { player, enemy } => *player == id || *enemy == id,
            Self::CombatTurn { enemy, .. } | Self::EncounterEnded { enemy, .. } => *enemy == id,
            Self::ActionRejected { .. }
            | Self::ItemSpawned { .. }
            | Self::ZoneCleared { .. }
            | Self::QuestStepCompleted { .. }
            | Self::QuestAdvanced { .. }
            | Self::FinalVictory
            | Self::PlayerDefeated => false,
        }
    }
}

/// A record of something that happened during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: GameEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl GameEvent {
    /// Create a new event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: GameEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a session.
///
/// Besides the bounded history, the log keeps every event fired since the
/// last [`EventLog::begin_tick`] so systems later in the tick can react to
/// them even when the history is trimmed.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    current: Vec<GameEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            current: Vec::new(),
            max_events,
        }
    }

    /// Forget the previous tick's events.
    pub fn begin_tick(&mut self) {
        self.current.clear();
    }

    /// Append an event, dropping the oldest history if the log exceeds its capacity.
    pub fn push(&mut self, event: GameEvent) {
        self.current.push(event.clone());
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Events fired during the current tick, in order.
    pub fn current(&self) -> &[GameEvent] {
        &self.current
    }

    /// Return a slice of all retained events.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Return all retained events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&GameEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all retained events involving the given actor.
    pub fn events_for_actor(&self, id: ActorId) -> Vec<&GameEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events are retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
