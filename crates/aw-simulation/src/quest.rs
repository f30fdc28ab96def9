//! Quest progression.
//!
//! The quest is an ordered list of named flags with a pointer to the current
//! step. Setting the current step's flag moves the pointer to the next step
//! whose flag is still unset; setting any other flag only records it. Once
//! every flag is set the pointer is [`QuestPointer::Done`] and stays there.

use aw_core::{ActorKind, ItemKind};
use aw_mechanics::EncounterState;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::TickContext;
use crate::error::SimResult;
use crate::event::GameEventKind;
use crate::system::System;

/// The event that completes a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum QuestTrigger {
    /// Any NPC finished its dialogue.
    DialogueCompleted,
    /// The player picked up an item of this kind.
    ItemCollected {
        /// Kind of item required.
        item_kind: ItemKind,
    },
    /// The player won an encounter.
    EncounterWon,
    /// The player stepped into the final zone.
    EnteredFinalZone,
    /// Only completed by calling [`QuestTracker::complete_step`] directly.
    Manual,
}

impl QuestTrigger {
    fn matches(self, event: &GameEventKind) -> bool {
        match (self, event) {
            (Self::DialogueCompleted, GameEventKind::DialogueCompleted { .. })
            | (Self::EnteredFinalZone, GameEventKind::EnteredFinalZone { .. }) => true,
            (Self::ItemCollected { item_kind }, GameEventKind::ItemCollected { item_kind: k, .. }) => {
                item_kind == *k
            }
            (
                Self::EncounterWon,
                GameEventKind::EncounterEnded {
                    state: EncounterState::PlayerWon,
                    ..
                },
            ) => true,
            _ => false,
        }
    }
}

/// One milestone of the quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestStep {
    /// Unique flag name.
    pub flag: String,
    /// Objective shown to the player.
    pub label: String,
    /// What completes the step.
    pub trigger: QuestTrigger,
    #[serde(skip)]
    done: bool,
}

impl QuestStep {
    /// A step that is not yet done.
    pub fn new(flag: impl Into<String>, label: impl Into<String>, trigger: QuestTrigger) -> Self {
        Self {
            flag: flag.into(),
            label: label.into(),
            trigger,
            done: false,
        }
    }

    /// Returns true once the flag is set.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Where a step stands relative to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not the current step and not done.
    NotStarted,
    /// The current step.
    InProgress,
    /// The flag is set.
    Done,
}

/// The current-step pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestPointer {
    /// Index of the current step.
    Step(usize),
    /// Every step is done.
    Done,
}

/// What a call to [`QuestTracker::complete_step`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepProgress {
    /// The flag was set for the first time.
    pub newly_completed: bool,
    /// The pointer moved.
    pub advanced: bool,
    /// The pointer reached [`QuestPointer::Done`] during this call.
    pub finished: bool,
}

/// Ordered quest steps and the pointer into them.
#[derive(Debug, Clone)]
pub struct QuestTracker {
    steps: Vec<QuestStep>,
    pointer: QuestPointer,
}

impl QuestTracker {
    /// A tracker over `steps`, pointing at the first one.
    pub fn new(steps: Vec<QuestStep>) -> Self {
        let pointer = if steps.is_empty() {
            QuestPointer::Done
        } else {
            QuestPointer::Step(0)
        };
        Self { steps, pointer }
    }

    /// The rescue of the kidnapped family.
    pub fn standard() -> Self {
        Self::new(vec![
            QuestStep::new(
                "talk_to_guide",
                "Talk to the guide",
                QuestTrigger::DialogueCompleted,
            ),
            QuestStep::new(
                "collect_weapon",
                "Find a weapon",
                QuestTrigger::ItemCollected {
                    item_kind: ItemKind::Weapon,
                },
            ),
            QuestStep::new(
                "collect_potion",
                "Find something to eat",
                QuestTrigger::ItemCollected {
                    item_kind: ItemKind::Potion,
                },
            ),
            QuestStep::new(
                "defeat_guardian",
                "Defeat the guardian of the pass",
                QuestTrigger::EncounterWon,
            ),
            QuestStep::new(
                "reach_summit",
                "Reach the summit of the mountain",
                QuestTrigger::EnteredFinalZone,
            ),
        ])
    }

    /// Sets `flag`. Unknown flags are ignored. Repeated calls never advance
    /// the pointer twice.
    pub fn complete_step(&mut self, flag: &str) -> StepProgress {
        let mut progress = StepProgress::default();
        let Some(index) = self.steps.iter().position(|s| s.flag == flag) else {
            return progress;
        };
        if !self.steps[index].done {
            self.steps[index].done = true;
            progress.newly_completed = true;
        }
        if self.pointer == QuestPointer::Step(index) {
            self.pointer = self.next_unmet(index);
            progress.advanced = true;
            progress.finished = self.pointer == QuestPointer::Done;
        }
        progress
    }

    fn next_unmet(&self, after: usize) -> QuestPointer {
        self.steps
            .iter()
            .enumerate()
            .skip(after + 1)
            .find(|(_, s)| !s.done)
            .map_or(QuestPointer::Done, |(i, _)| QuestPointer::Step(i))
    }

    /// The current pointer.
    pub fn pointer(&self) -> QuestPointer {
        self.pointer
    }

    /// Index of the current step, or `None` when done.
    pub fn current_step(&self) -> Option<usize> {
        match self.pointer {
            QuestPointer::Step(i) => Some(i),
            QuestPointer::Done => None,
        }
    }

    /// Objective of the current step, or `None` when done.
    pub fn current_step_label(&self) -> Option<&str> {
        self.current_step()
            .and_then(|i| self.steps.get(i))
            .map(|s| s.label.as_str())
    }

    /// Returns true once the pointer is [`QuestPointer::Done`].
    pub fn is_complete(&self) -> bool {
        self.pointer == QuestPointer::Done
    }

    /// Status of the step at `index`.
    pub fn status(&self, index: usize) -> Option<StepStatus> {
        let step = self.steps.get(index)?;
        Some(if step.done {
            StepStatus::Done
        } else if self.pointer == QuestPointer::Step(index) {
            StepStatus::InProgress
        } else {
            StepStatus::NotStarted
        })
    }

    /// Returns true if `flag` is set.
    pub fn is_flag_set(&self, flag: &str) -> bool {
        self.steps.iter().any(|s| s.flag == flag && s.done)
    }

    /// All steps, in order.
    pub fn steps(&self) -> &[QuestStep] {
        &self.steps
    }
}

impl Default for QuestTracker {
    fn default() -> Self {
        Self::standard()
    }
}

impl System for QuestTracker {
    fn name(&self) -> &str {
        "quest"
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let fired: Vec<GameEventKind> = ctx.fired().iter().map(|e| e.kind.clone()).collect();
        for event in &fired {
            if let GameEventKind::ItemCollected { actor, .. } = event {
                if ctx.grid.actor(*actor)?.kind != ActorKind::Player {
                    continue;
                }
            }
            let flags: Vec<String> = self
                .steps
                .iter()
                .filter(|s| s.trigger.matches(event))
                .map(|s| s.flag.clone())
                .collect();
            for flag in flags {
                let progress = self.complete_step(&flag);
                if progress.newly_completed {
                    ctx.emit(
                        GameEventKind::QuestStepCompleted { flag: flag.clone() },
                        format!("Quest flag set: {flag}"),
                    );
                }
                if progress.advanced {
                    let step = self.current_step();
                    let description = match self.current_step_label() {
                        Some(label) => format!("New objective: {label}"),
                        None => "Quest complete".to_string(),
                    };
                    info!(flag = %flag, ?step, "quest advanced");
                    ctx.emit(GameEventKind::QuestAdvanced { step }, description);
                }
                if progress.finished {
                    ctx.emit(
                        GameEventKind::FinalVictory,
                        "Your family is safe. The valley will remember you.",
                    );
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn in_order_completion() {
        let mut q = QuestTracker::standard();
        assert_eq!(q.current_step_label(), Some("Talk to the guide"));
        for flag in [
            "talk_to_guide",
            "collect_weapon",
            "collect_potion",
            "defeat_guardian",
        ] {
            let p = q.complete_step(flag);
            assert!(p.newly_completed && p.advanced && !p.finished);
        }
        let p = q.complete_step("reach_summit");
        assert!(p.finished);
        assert!(q.is_complete());
        assert_eq!(q.current_step_label(), None);
    }

    #[test]
    fn out_of_order_flag_is_recorded_without_advancing() {
        let mut q = QuestTracker::standard();
        q.complete_step("talk_to_guide");
        q.complete_step("collect_weapon");
        assert_eq!(q.current_step(), Some(2));
        let p = q.complete_step("defeat_guardian");
        assert!(p.newly_completed && !p.advanced);
        assert_eq!(q.current_step(), Some(2));
        assert_eq!(q.status(3), Some(StepStatus::Done));
        assert_eq!(q.status(2), Some(StepStatus::InProgress));
        assert_eq!(q.status(4), Some(StepStatus::NotStarted));
        // Completing the current step skips the already-met one.
        q.complete_step("collect_potion");
        assert_eq!(q.current_step(), Some(4));
    }

    #[test]
    fn unknown_flag_ignored() {
        let mut q = QuestTracker::standard();
        assert_eq!(q.complete_step("fly"), StepProgress::default());
        assert_eq!(q.current_step(), Some(0));
    }

    #[test]
    fn empty_quest_is_complete() {
        assert!(QuestTracker::new(Vec::new()).is_complete());
    }

    #[test]
    fn triggers_match_events() {
        use aw_core::ActorId;
        let weapon = GameEventKind::ItemCollected {
            actor: ActorId(0),
            item: "m4".into(),
            item_kind: ItemKind::Weapon,
        };
        assert!(QuestTrigger::ItemCollected { item_kind: ItemKind::Weapon }.matches(&weapon));
        assert!(!QuestTrigger::ItemCollected { item_kind: ItemKind::Potion }.matches(&weapon));
        let fled = GameEventKind::EncounterEnded {
            enemy: ActorId(1),
            state: EncounterState::Fled,
        };
        assert!(!QuestTrigger::EncounterWon.matches(&fled));
        assert!(!QuestTrigger::Manual.matches(&GameEventKind::FinalVictory));
    }

    proptest! {
        #[test]
        fn completion_is_idempotent_and_monotonic(flags in prop::collection::vec(0usize..5, 0..30)) {
            let mut q = QuestTracker::standard();
            let names: Vec<String> = q.steps().iter().map(|s| s.flag.clone()).collect();
            let mut last = 0usize;
            for i in flags {
                let before = q.pointer();
                q.complete_step(&names[i]);
                let again = q.pointer();
                let p = q.complete_step(&names[i]);
                prop_assert!(!p.newly_completed);
                prop_assert!(!p.advanced);
                prop_assert!(before == again || q.is_flag_set(&names[i]));
                prop_assert_eq!(q.pointer(), again);
                let now = q.current_step().unwrap_or(usize::MAX);
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
