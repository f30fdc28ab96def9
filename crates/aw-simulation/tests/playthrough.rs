//! End-to-end playthrough tests for game sessions.

use aw_core::{ItemKind, Position};
use aw_simulation::{
    GameEventKind, GameOutcome, GameSession, Scenario, SessionConfig, SessionSnapshot, SimError,
    TickInput, parse_script,
};

const WALKTHROUGH: &str = "
    # meet the guide
    up up interact*4 interact
    # sword, then banana
    up*3 up*4 right*2
    # through the pass into the guardian's ground
    up*3 right*6 up*6
    attack*7
    # to the summit
    up*10
";

fn valley() -> GameSession {
    Scenario::valley()
        .into_session(SessionConfig::default().with_spawn_interval(0))
        .unwrap()
}

#[test]
fn valley_walkthrough_wins() {
    let mut session = valley();
    let inputs = parse_script(WALKTHROUGH).unwrap();
    assert_eq!(inputs.len(), 48);
    session.run(inputs).unwrap();

    assert_eq!(session.outcome(), Some(GameOutcome::Victory));
    assert_eq!(session.clock().tick(), 48);

    let player = session.player_actor().unwrap();
    assert_eq!(player.position(), Position::new(14, 1));
    assert_eq!(player.health.current(), 76);
    assert_eq!(player.inventory.equipped_weapon().unwrap().id, "rusty_sword");
    assert!(player.inventory.has_kind(ItemKind::Potion));

    let kinds: Vec<&GameEventKind> = session.events().events().iter().map(|e| &e.kind).collect();
    assert_eq!(
        kinds
            .iter()
            .filter(|k| matches!(k, GameEventKind::DialogueLine { .. }))
            .count(),
        5
    );
    assert_eq!(
        kinds
            .iter()
            .filter(|k| matches!(k, GameEventKind::CombatTurn { .. }))
            .count(),
        7
    );
    assert!(matches!(kinds.last(), Some(GameEventKind::FinalVictory)));

    let snapshot = session.snapshot().unwrap();
    assert!(snapshot.quest_complete);
    assert_eq!(snapshot.quest_step, None);
    assert_eq!(snapshot.cleared_zones, vec!["Shadow Guardian's ground".to_string()]);
    assert_eq!(snapshot.outcome, Some(GameOutcome::Victory));
}

#[test]
fn finished_session_refuses_ticks() {
    let mut session = valley();
    session.run(parse_script(WALKTHROUGH).unwrap()).unwrap();
    let err = session.tick(TickInput::idle()).unwrap_err();
    assert!(matches!(err, SimError::SessionOver(GameOutcome::Victory)));
    assert_eq!(err.to_string(), "session is over: victory");
}

#[test]
fn summit_before_guardian_is_not_victory() {
    let mut session = valley();
    // Skip the guide and pass the guardian's ground along column 12.
    let script = "left up*10 right*7 up*17";
    session.run(parse_script(script).unwrap()).unwrap();
    assert_eq!(session.outcome(), None);
    let quest = session.quest().unwrap();
    assert!(quest.is_flag_set("reach_summit"));
    assert!(!quest.is_flag_set("talk_to_guide"));
    assert_eq!(quest.current_step_label(), Some("Talk to the guide"));
}

#[test]
fn same_seed_same_history() {
    let history = |seed| {
        let mut session = Scenario::valley()
            .into_session(SessionConfig::default().with_seed(seed).with_spawn_interval(1))
            .unwrap();
        session
            .run(parse_script("up*2 interact*5 up*8 right*2").unwrap())
            .unwrap();
        session
            .events()
            .events()
            .iter()
            .map(|e| e.description.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(history(9), history(9));
}

#[test]
fn scenario_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("valley.json");
    std::fs::write(&path, Scenario::valley().to_json().unwrap()).unwrap();

    let mut session = Scenario::load(&path)
        .unwrap()
        .into_session(SessionConfig::default().with_spawn_interval(0))
        .unwrap();
    session.run(parse_script("up up").unwrap()).unwrap();

    let saved = dir.path().join("save.json");
    std::fs::write(&saved, session.snapshot().unwrap().to_json().unwrap()).unwrap();
    let snapshot = SessionSnapshot::from_json(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(snapshot.player.name, "Kito");
    assert_eq!((snapshot.player.x, snapshot.player.y), (6, 27));
    assert_eq!(snapshot.elapsed_ticks, 2);
}

#[test]
fn missing_scenario_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}
