//! Encounter loop integration tests.
//!
//! These tests play whole turns: enemy ordering, the boss routine,
//! lives and defeat, wave-gated victory, and configuration loading.

use rust_tactics::core::{Coord, EncounterConfig, EntityId, Team};
use rust_tactics::error::{ActionRejected, ConfigError, TacticsError};
use rust_tactics::events::{GameEvent, MoveReason};
use rust_tactics::pieces::{DefinitionId, PieceCatalog};
use rust_tactics::turns::{Encounter, EnemyStep, IntentKind, Outcome, SpawnRequest, TurnPhase, Wave, WaveDirector, WaveTrigger};

const ROOK: DefinitionId = DefinitionId::new(1);
const DUMMY: DefinitionId = DefinitionId::new(2);
const WALKER: DefinitionId = DefinitionId::new(3);
const IMP: DefinitionId = DefinitionId::new(4);
const WARDEN: DefinitionId = DefinitionId::new(5);

const CATALOG: &str = r#"
[[piece]]
id = 1
name = "Rook"
max_hp = 5
attack = 3
movement = { kind = "slider", directions = "orthogonal", stride = 8 }

[[piece]]
id = 2
name = "Dummy"
max_hp = 9
attack = 1
movement = { kind = "slider", directions = "orthogonal", stride = 1 }

[[piece]]
id = 3
name = "Walker"
max_hp = 4
attack = 1
movement = { kind = "slider", directions = "orthogonal", stride = 1 }

[[piece]]
id = 4
name = "Imp"
max_hp = 1
attack = 1
movement = { kind = "slider", directions = "orthogonal", stride = 1 }

[[piece]]
id = 5
name = "Warden"
max_hp = 9
attack = 2
movement = { kind = "slider", directions = "omni", stride = 1 }
patrol = [{ x = 4, y = 7 }, { x = 5, y = 7 }]
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn encounter(config: EncounterConfig) -> Encounter {
    init_tracing();
    let catalog = PieceCatalog::from_toml_str(CATALOG).unwrap();
    let mut encounter = Encounter::new(config, catalog, 11).unwrap();
    encounter.bus_mut().enable_recording();
    encounter
}

fn count(encounter: &Encounter, pred: impl Fn(&GameEvent) -> bool) -> usize {
    encounter.bus().recorded().iter().filter(|e| pred(*e)).count()
}

fn moved_entities(encounter: &Encounter) -> Vec<EntityId> {
    encounter
        .bus()
        .recorded()
        .iter()
        .filter_map(|event| match event {
            GameEvent::PieceMoved { entity, .. } => Some(*entity),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Enemy Turn
// =============================================================================

/// Test that enemies act nearest-to-crossing first, then by column.
#[test]
fn test_enemy_order_breaks_ties_by_column() {
    let mut enc = encounter(EncounterConfig::default());
    enc.spawn(ROOK, Coord::new(7, 0), Team::Player).unwrap();
    let far_right = enc.spawn(WALKER, Coord::new(5, 5), Team::Enemy).unwrap();
    let far_left = enc.spawn(WALKER, Coord::new(2, 5), Team::Enemy).unwrap();
    let near = enc.spawn(WALKER, Coord::new(6, 3), Team::Enemy).unwrap();
    enc.begin().unwrap();

    let mut driver = enc.end_player_turn().unwrap();
    assert_eq!(driver.order(), &[near, far_left, far_right]);

    let mut acted = Vec::new();
    while let EnemyStep::Acted { entity, total, .. } = driver.step(&mut enc).unwrap() {
        assert_eq!(total, 3);
        acted.push(entity);
    }
    assert_eq!(acted, vec![near, far_left, far_right]);
    assert_eq!(moved_entities(&enc), vec![near, far_left, far_right]);

    // Each walker steps one row toward the player.
    assert_eq!(enc.board().piece(near).unwrap().coord(), Coord::new(6, 2));
    assert_eq!(enc.board().piece(far_left).unwrap().coord(), Coord::new(2, 4));
    assert_eq!(enc.phase(), TurnPhase::PlayerTurn);
    assert_eq!(enc.rounds_completed(), 1);
}

/// Test that a stale driver cannot be stepped into a later turn.
#[test]
fn test_finished_driver_stays_finished() {
    let mut enc = encounter(EncounterConfig::default());
    enc.spawn(ROOK, Coord::new(7, 0), Team::Player).unwrap();
    enc.spawn(WALKER, Coord::new(2, 6), Team::Enemy).unwrap();
    enc.begin().unwrap();

    let mut driver = enc.end_player_turn().unwrap();
    while driver.step(&mut enc).unwrap() != EnemyStep::Finished {}
    assert_eq!(driver.step(&mut enc).unwrap(), EnemyStep::Finished);
    assert_eq!(enc.phase(), TurnPhase::PlayerTurn);
}

/// Test that a dropped driver can be replaced without anyone acting twice.
#[test]
fn test_resume_after_dropped_driver() {
    let mut enc = encounter(EncounterConfig::default());
    enc.spawn(ROOK, Coord::new(7, 0), Team::Player).unwrap();
    let near = enc.spawn(WALKER, Coord::new(6, 3), Team::Enemy).unwrap();
    let left = enc.spawn(WALKER, Coord::new(2, 5), Team::Enemy).unwrap();
    let right = enc.spawn(WALKER, Coord::new(5, 5), Team::Enemy).unwrap();
    enc.begin().unwrap();
    assert!(matches!(
        enc.resume_enemy_turn(),
        Err(TacticsError::Rejected(ActionRejected::WrongPhase(TurnPhase::PlayerTurn)))
    ));

    let mut first = enc.end_player_turn().unwrap();
    assert!(matches!(first.step(&mut enc).unwrap(), EnemyStep::Acted { entity, .. } if entity == near));
    let mut stale = first.clone();
    drop(first);
    assert_eq!(enc.phase(), TurnPhase::EnemyTurn);

    let resumed = enc.resume_enemy_turn().unwrap();
    assert_eq!(resumed.order(), &[left, right]);
    assert_eq!(enc.run_enemy_turn(resumed).unwrap(), 2);

    assert_eq!(moved_entities(&enc), vec![near, left, right]);
    assert_eq!(enc.phase(), TurnPhase::PlayerTurn);
    assert_eq!(enc.rounds_completed(), 1);
    assert!(stale.step(&mut enc).is_err());
    assert_eq!(moved_entities(&enc).len(), 3);
}

/// Test that two live drivers for one turn never activate an enemy twice.
#[test]
fn test_parallel_drivers_share_progress() {
    let mut enc = encounter(EncounterConfig::default());
    enc.spawn(ROOK, Coord::new(7, 0), Team::Player).unwrap();
    let a = enc.spawn(WALKER, Coord::new(1, 4), Team::Enemy).unwrap();
    let b = enc.spawn(WALKER, Coord::new(4, 5), Team::Enemy).unwrap();
    enc.begin().unwrap();

    let mut original = enc.end_player_turn().unwrap();
    let mut resumed = enc.resume_enemy_turn().unwrap();
    assert!(matches!(resumed.step(&mut enc).unwrap(), EnemyStep::Acted { entity, .. } if entity == a));
    assert!(matches!(original.step(&mut enc).unwrap(), EnemyStep::Acted { entity, .. } if entity == b));
    assert_eq!(original.step(&mut enc).unwrap(), EnemyStep::Finished);
    assert_eq!(enc.phase(), TurnPhase::PlayerTurn);
    assert_eq!(moved_entities(&enc), vec![a, b]);
}

/// Test the boss routine: barrage hits along clear rays, allies block and
/// are spared, and the patrol step follows.
#[test]
fn test_boss_barrage_and_patrol() {
    let mut enc = encounter(EncounterConfig::default());
    let rook = enc.spawn(ROOK, Coord::new(4, 2), Team::Player).unwrap();
    let dummy = enc.spawn(DUMMY, Coord::new(7, 4), Team::Player).unwrap();
    let warden = enc.spawn(WARDEN, Coord::new(4, 7), Team::Enemy).unwrap();
    // Acts first and steps onto the warden's south-east diagonal.
    let escort = enc.spawn(WALKER, Coord::new(6, 6), Team::Enemy).unwrap();
    enc.begin().unwrap();

    let intent = enc.intents().iter().find(|i| i.entity == warden).unwrap().clone();
    assert_eq!(intent.kind, IntentKind::Barrage);
    assert_eq!(intent.target, Some(Coord::new(5, 7)));
    assert!(intent.tiles.iter().any(|t| t.coord == Coord::new(4, 2)));
    assert!(!intent.tiles.iter().any(|t| t.coord == Coord::new(7, 4)));

    enc.end_turn().unwrap();

    assert_eq!(enc.board().piece(escort).unwrap().coord(), Coord::new(6, 5));
    assert_eq!(enc.board().piece(escort).unwrap().current_hp, 4);
    assert_eq!(enc.board().piece(rook).unwrap().current_hp, 3);
    assert_eq!(enc.board().piece(dummy).unwrap().current_hp, 9);
    assert_eq!(enc.board().piece(warden).unwrap().current_hp, 9);
    assert_eq!(enc.board().piece(warden).unwrap().coord(), Coord::new(5, 7));
    assert_eq!(
        count(&enc, |e| matches!(
            e,
            GameEvent::PieceMoved { entity, reason: MoveReason::Forced, .. } if *entity == warden
        )),
        1
    );
}

// =============================================================================
// Lives and Defeat
// =============================================================================

/// Test that each crossing enemy costs one life and is removed.
#[test]
fn test_crossing_costs_one_life_each() {
    let mut enc = encounter(EncounterConfig::default().with_lives(3));
    enc.spawn(ROOK, Coord::new(7, 7), Team::Player).unwrap();
    let a = enc.spawn(WALKER, Coord::new(1, 1), Team::Enemy).unwrap();
    let b = enc.spawn(WALKER, Coord::new(4, 1), Team::Enemy).unwrap();
    enc.spawn(WALKER, Coord::new(0, 6), Team::Enemy).unwrap();
    enc.begin().unwrap();

    enc.end_turn().unwrap();

    assert_eq!(enc.lives(), 1);
    assert!(!enc.is_over());
    assert!(!enc.board().piece(a).unwrap().is_active());
    assert!(!enc.board().piece(b).unwrap().is_active());
    assert_eq!(count(&enc, |e| matches!(e, GameEvent::LifeLost { .. })), 2);
    assert_eq!(enc.phase(), TurnPhase::PlayerTurn);
}

/// Test that losing the last life ends the encounter exactly once.
#[test]
fn test_last_life_is_defeat() {
    let mut enc = encounter(EncounterConfig::default().with_lives(1));
    let rook = enc.spawn(ROOK, Coord::new(7, 7), Team::Player).unwrap();
    enc.spawn(WALKER, Coord::new(3, 1), Team::Enemy).unwrap();
    enc.spawn(WALKER, Coord::new(5, 1), Team::Enemy).unwrap();
    enc.begin().unwrap();

    enc.end_turn().unwrap();

    assert_eq!(enc.outcome(), Some(Outcome::Defeat));
    assert_eq!(enc.lives(), 0);
    assert_eq!(count(&enc, |e| matches!(e, GameEvent::LifeLost { .. })), 1);
    assert_eq!(count(&enc, |e| matches!(e, GameEvent::OutcomeReached(_))), 1);
    assert!(enc.intents().is_empty());

    assert!(matches!(
        enc.move_piece(rook, Coord::new(7, 6)),
        Err(TacticsError::Rejected(ActionRejected::EncounterOver))
    ));
    assert!(matches!(
        enc.end_turn(),
        Err(TacticsError::Rejected(ActionRejected::EncounterOver))
    ));
}

// =============================================================================
// Waves and Victory
// =============================================================================

/// Test that clearing the board wins only after every wave has fired.
#[test]
fn test_victory_waits_for_waves() {
    let mut enc = encounter(EncounterConfig::default());
    let rook = enc.spawn(ROOK, Coord::new(0, 0), Team::Player).unwrap();

    let mut director = WaveDirector::new(vec![
        Wave::new(WaveTrigger::Immediate, vec![SpawnRequest::new(IMP, Coord::new(0, 7), Team::Enemy)]),
        Wave::new(
            WaveTrigger::AfterEnemyTurns(1),
            vec![SpawnRequest::new(IMP, Coord::new(3, 7), Team::Enemy)],
        ),
    ]);
    director.attach(&mut enc);
    assert_eq!(director.drive(&mut enc).unwrap(), 1);
    enc.begin().unwrap();

    assert!(enc.attack(rook, Coord::new(0, 7)).unwrap().defender_died);
    assert!(enc.is_board_cleared());
    assert_eq!(enc.outcome(), None);

    enc.end_turn().unwrap();
    assert_eq!(enc.outcome(), None);
    assert_eq!(director.drive(&mut enc).unwrap(), 1);
    assert!(director.is_complete());
    assert_eq!(enc.waves_outstanding(), 0);

    enc.move_piece(rook, Coord::new(3, 0)).unwrap();
    enc.attack(rook, Coord::new(3, 7)).unwrap();

    assert_eq!(enc.outcome(), Some(Outcome::Victory));
    assert_eq!(
        count(&enc, |e| matches!(e, GameEvent::OutcomeReached(Outcome::Victory))),
        1
    );
    assert!(matches!(enc.undo(), Err(TacticsError::Rejected(ActionRejected::EncounterOver))));
}

/// Test that a wave with a bad request spawns nothing.
#[test]
fn test_wave_spawns_atomically() {
    let mut enc = encounter(EncounterConfig::default());
    enc.spawn(ROOK, Coord::new(2, 7), Team::Player).unwrap();
    enc.expect_waves(1);

    let wave = Wave::new(
        WaveTrigger::Immediate,
        vec![
            SpawnRequest::new(IMP, Coord::new(0, 7), Team::Enemy),
            SpawnRequest::new(IMP, Coord::new(2, 7), Team::Enemy),
        ],
    );
    assert!(enc.spawn_wave(&wave).is_err());
    assert_eq!(enc.board().count_active(Team::Enemy), 0);
    assert_eq!(enc.waves_outstanding(), 1);
    assert_eq!(count(&enc, |e| matches!(e, GameEvent::PieceSpawned { team: Team::Enemy, .. })), 0);
}

// =============================================================================
// Actions and Configuration
// =============================================================================

/// Test that a rejected action changes nothing and publishes nothing.
#[test]
fn test_rejected_action_is_silent() {
    let mut enc = encounter(EncounterConfig::default().with_ap_per_turn(1));
    let rook = enc.spawn(ROOK, Coord::new(0, 0), Team::Player).unwrap();
    enc.spawn(WALKER, Coord::new(0, 5), Team::Enemy).unwrap();

    assert!(matches!(
        enc.move_piece(rook, Coord::new(0, 1)),
        Err(TacticsError::Rejected(ActionRejected::WrongPhase(TurnPhase::Preparation)))
    ));
    enc.begin().unwrap();
    enc.move_piece(rook, Coord::new(1, 0)).unwrap();

    let seen = enc.bus().recorded().len();
    let board = enc.board().encode().unwrap();
    assert!(matches!(
        enc.move_piece(rook, Coord::new(1, 1)),
        Err(TacticsError::Rejected(ActionRejected::InsufficientAp { needed: 1, available: 0 }))
    ));
    assert_eq!(enc.bus().recorded().len(), seen);
    assert_eq!(enc.board().encode().unwrap(), board);
}

/// Test loading an encounter from TOML documents.
#[test]
fn test_encounter_from_toml() {
    init_tracing();
    let config = r#"
columns = 6
rows = 5
ap_per_turn = 2
lives = 1
"#;
    let mut enc = Encounter::from_toml_str(config, CATALOG, 3).unwrap();
    assert_eq!(enc.config().columns, 6);
    assert_eq!(enc.config().move_cost, 1);
    assert!(enc.board().in_bounds(Coord::new(5, 4)));
    assert!(!enc.board().in_bounds(Coord::new(6, 0)));

    enc.spawn(ROOK, Coord::new(0, 0), Team::Player).unwrap();
    enc.spawn(IMP, Coord::new(5, 4), Team::Enemy).unwrap();
    enc.begin().unwrap();
    assert_eq!(enc.ap().current(), 2);
    assert_eq!(enc.board().home_row(Team::Enemy), 4);
}

/// Test that malformed configuration is rejected up front.
#[test]
fn test_bad_config_rejected() {
    assert!(matches!(
        Encounter::from_toml_str("columns = 0", CATALOG, 0),
        Err(ConfigError::InvalidDimensions { columns: 0, .. })
    ));
    assert!(matches!(
        Encounter::from_toml_str("lives = 0", CATALOG, 0),
        Err(ConfigError::ZeroLives)
    ));
    assert!(Encounter::from_toml_str("", "[[piece]]\nid = 1\nname = \"Ghost\"\nmax_hp = 1\nattack = 1\n", 0).is_err());
}
