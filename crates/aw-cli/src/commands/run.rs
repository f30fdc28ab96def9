use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use aw_simulation::{GameEventKind, GameOutcome, GameSession, StepStatus};

use super::SessionSource;

pub fn run(source: &SessionSource, verbose: bool) -> Result<(), String> {
    let (name, session) = source.play()?;
    let ticks = session.clock().tick();

    println!(
        "  {} '{}' {}",
        "Session".bold(),
        name,
        format!("({ticks} ticks, seed={})", source.seed).dimmed()
    );
    println!("  {} events logged", session.events().len());
    println!();

    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in session.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if session.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = session
            .events()
            .events()
            .iter()
            .filter(|e| is_notable(&e.kind))
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                println!("  {}", colorize_event(&event.kind, &event.description));
            }
            println!();
        }
    }

    print_status(&session)?;
    print_quest(&session);

    match session.outcome() {
        Some(GameOutcome::Victory) => println!("  {}", "VICTORY".green().bold()),
        Some(GameOutcome::Defeat) => println!("  {}", "DEFEAT".red().bold()),
        None => println!("  {}", "(session still running)".dimmed()),
    }

    Ok(())
}

fn print_status(session: &GameSession) -> Result<(), String> {
    let player = session.player_actor().map_err(|e| e.to_string())?;

    println!("  {}", "Player".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Race", "Faction", "HP", "Position", "Weapon", "Armor"]);
    table.add_row(vec![
        player.name.clone(),
        player
            .race
            .map_or_else(|| "--".to_string(), |r| r.to_string()),
        player.faction.to_string(),
        format!("{}/{}", player.health.current(), player.health.max()),
        player.position().to_string(),
        player
            .inventory
            .equipped_weapon()
            .map_or_else(|| "--".to_string(), |w| w.name.clone()),
        player
            .inventory
            .equipped_armor()
            .map_or_else(|| "--".to_string(), |a| a.name.clone()),
    ]);
    println!("{table}");

    if !player.inventory.is_empty() {
        let items: Vec<String> = player
            .inventory
            .items()
            .iter()
            .enumerate()
            .map(|(slot, item)| {
                let mark = if player.inventory.is_equipped(slot) { "*" } else { "" };
                format!("{slot}:{}{mark}", item.name)
            })
            .collect();
        println!(
            "  Inventory ({}/{}): {}",
            player.inventory.len(),
            player.inventory.capacity(),
            items.join(", ")
        );
    }
    println!();
    Ok(())
}

fn print_quest(session: &GameSession) {
    let Some(quest) = session.quest() else {
        return;
    };
    println!("  {}", "Quest".bold().underline());
    for (i, step) in quest.steps().iter().enumerate() {
        let mark = match quest.status(i) {
            Some(StepStatus::Done) => "[x]".green(),
            Some(StepStatus::InProgress) => "[>]".yellow(),
            _ => "[ ]".dimmed(),
        };
        println!("  {mark} {}", step.label);
    }
    println!();
}

fn is_notable(kind: &GameEventKind) -> bool {
    matches!(
        kind,
        GameEventKind::EncounterStarted { .. }
            | GameEventKind::EncounterEnded { .. }
            | GameEventKind::ItemCollected { .. }
            | GameEventKind::DialogueCompleted { .. }
            | GameEventKind::QuestAdvanced { .. }
            | GameEventKind::EnteredFinalZone { .. }
            | GameEventKind::FinalVictory
            | GameEventKind::PlayerDefeated
    )
}

fn colorize_event(kind: &GameEventKind, description: &str) -> colored::ColoredString {
    match kind {
        GameEventKind::PlayerDefeated => description.red().bold(),
        GameEventKind::FinalVictory => description.green().bold(),
        GameEventKind::MoveRejected { .. }
        | GameEventKind::ActionRejected { .. }
        | GameEventKind::PickupFailed { .. } => description.yellow(),
        GameEventKind::EncounterStarted { .. }
        | GameEventKind::CombatTurn { .. }
        | GameEventKind::EncounterEnded { .. } => description.red(),
        GameEventKind::DialogueLine { .. } | GameEventKind::DialogueCompleted { .. } => {
            description.cyan()
        }
        GameEventKind::ItemSpawned { .. }
        | GameEventKind::ItemCollected { .. }
        | GameEventKind::ItemDropped { .. }
        | GameEventKind::ItemUsed { .. } => description.blue(),
        GameEventKind::QuestStepCompleted { .. }
        | GameEventKind::QuestAdvanced { .. }
        | GameEventKind::ZoneCleared { .. }
        | GameEventKind::EnteredFinalZone { .. } => description.green(),
        GameEventKind::Moved { .. } | GameEventKind::Bumped { .. } => description.normal(),
    }
}
