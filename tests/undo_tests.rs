//! Undo/redo integration tests.
//!
//! The central law: for any sequence of successful player commands,
//! undoing them all restores the encoded board and the AP exactly, and
//! redoing them all reproduces the state reached before the undo.

use proptest::prelude::*;

use rust_tactics::abilities::Modifier;
use rust_tactics::commands::CommandAction;
use rust_tactics::core::{Coord, EncounterConfig, EntityId, Team};
use rust_tactics::error::{ActionRejected, TacticsError};
use rust_tactics::events::{GameEvent, MoveReason};
use rust_tactics::pieces::{DefinitionId, MovementRule, PieceCatalog, PieceDefinition};
use rust_tactics::turns::{ActionPoints, Encounter};

const ROOK: DefinitionId = DefinitionId::new(1);
const PAWN: DefinitionId = DefinitionId::new(2);
const RIDER: DefinitionId = DefinitionId::new(3);
const RAIDER: DefinitionId = DefinitionId::new(4);
const WALL: DefinitionId = DefinitionId::new(5);
const GRUNT: DefinitionId = DefinitionId::new(6);

fn catalog() -> PieceCatalog {
    let mut catalog = PieceCatalog::new();
    let definitions = [
        PieceDefinition::new(ROOK, "Rook", 5, 3)
            .with_movement(MovementRule::rook())
            .with_modifier(Modifier::Charge { bonus: 1, primed: false }),
        PieceDefinition::new(PAWN, "Pawn", 3, 2)
            .with_movement(MovementRule::pawn())
            .with_modifier(Modifier::Splash { damage: 1 }),
        PieceDefinition::new(RIDER, "Rider", 4, 2).with_movement(MovementRule::forward_knight()),
        PieceDefinition::new(RAIDER, "Raider", 4, 2)
            .with_movement(MovementRule::queen())
            .with_modifier(Modifier::Bleed { stacks: 1 })
            .with_modifier(Modifier::Lifesteal { amount: 1 }),
        PieceDefinition::new(WALL, "Wall", 99, 1).with_movement(MovementRule::king()),
        PieceDefinition::new(GRUNT, "Grunt", 2, 1).with_movement(MovementRule::king()),
    ];
    for definition in definitions {
        catalog.register(definition).unwrap();
    }
    catalog
}

/// A player turn in progress with a mixed board. Walls keep the enemy side
/// alive so the encounter cannot end mid-sequence.
fn setup(seed: u64) -> (Encounter, Vec<EntityId>) {
    let config = EncounterConfig::default().with_ap_per_turn(30);
    let mut enc = Encounter::new(config, catalog(), seed).unwrap();
    let players = vec![
        enc.spawn(ROOK, Coord::new(0, 0), Team::Player).unwrap(),
        enc.spawn(PAWN, Coord::new(3, 1), Team::Player).unwrap(),
        enc.spawn(RIDER, Coord::new(5, 0), Team::Player).unwrap(),
        enc.spawn(RAIDER, Coord::new(7, 1), Team::Player).unwrap(),
    ];
    enc.spawn(WALL, Coord::new(0, 6), Team::Enemy).unwrap();
    enc.spawn(WALL, Coord::new(4, 4), Team::Enemy).unwrap();
    enc.spawn(GRUNT, Coord::new(4, 2), Team::Enemy).unwrap();
    enc.spawn(GRUNT, Coord::new(2, 2), Team::Enemy).unwrap();
    enc.spawn(GRUNT, Coord::new(7, 5), Team::Enemy).unwrap();
    enc.begin().unwrap();
    enc.bus_mut().enable_recording();
    (enc, players)
}

fn snapshot(enc: &Encounter) -> (Vec<u8>, ActionPoints) {
    (enc.board().encode().unwrap(), enc.ap())
}

fn action_strategy() -> impl Strategy<Value = (usize, i32, i32, bool)> {
    (0usize..4, 0i32..8, 0i32..8, any::<bool>())
}

fn to_action(players: &[EntityId], (who, x, y, attack): (usize, i32, i32, bool)) -> CommandAction {
    let piece = players[who];
    let to = Coord::new(x, y);
    if attack {
        CommandAction::Attack { attacker: piece, target: to }
    } else {
        CommandAction::Move { piece, to }
    }
}

// =============================================================================
// Round-trip Laws
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_undo_all_restores_start(
        seed in 0u64..500,
        raw in prop::collection::vec(action_strategy(), 0..16)
    ) {
        let (mut enc, players) = setup(seed);
        let start = snapshot(&enc);

        let mut applied = Vec::new();
        for step in raw {
            let before = snapshot(&enc);
            match enc.submit(to_action(&players, step)) {
                Ok(()) => applied.push((before, snapshot(&enc))),
                Err(_) => prop_assert_eq!(snapshot(&enc), before),
            }
        }

        for (before, after) in applied.iter().rev() {
            prop_assert_eq!(&snapshot(&enc), after);
            enc.undo().unwrap();
            prop_assert_eq!(&snapshot(&enc), before);
        }
        prop_assert_eq!(snapshot(&enc), start);
        prop_assert!(matches!(
            enc.undo(),
            Err(TacticsError::Rejected(ActionRejected::NothingToUndo))
        ));

        for (_, after) in &applied {
            enc.redo().unwrap();
            prop_assert_eq!(&snapshot(&enc), after);
        }
    }

    #[test]
    fn prop_rejections_emit_nothing(raw in prop::collection::vec(action_strategy(), 1..16)) {
        let (mut enc, players) = setup(3);
        for step in raw {
            let seen = enc.bus().recorded().len();
            if enc.submit(to_action(&players, step)).is_err() {
                prop_assert_eq!(enc.bus().recorded().len(), seen);
            }
        }
    }
}

// =============================================================================
// Targeted Cases
// =============================================================================

/// Test that undoing a kill puts the victim back with its exact state.
#[test]
fn test_undo_restores_captured_piece() {
    let (mut enc, players) = setup(1);
    let rook = players[0];
    let grunt = enc.board().get_at(Coord::new(2, 2)).unwrap().id;
    let start = snapshot(&enc);

    // Rook slides next to the grunt's column, then kills it.
    enc.move_piece(rook, Coord::new(2, 0)).unwrap();
    let report = enc.attack(rook, Coord::new(2, 2)).unwrap();
    assert!(report.defender_died);
    assert!(enc.board().get_at(Coord::new(2, 2)).is_none());

    enc.undo().unwrap();
    assert_eq!(enc.board().get_at(Coord::new(2, 2)).map(|p| p.id), Some(grunt));
    assert!(enc
        .bus()
        .recorded()
        .iter()
        .any(|e| matches!(e, GameEvent::PieceRestored { entity, .. } if *entity == grunt)));

    enc.undo().unwrap();
    assert_eq!(snapshot(&enc), start);
    assert!(matches!(
        enc.bus().recorded().last(),
        Some(GameEvent::CommandUndone { .. })
    ));
}

/// Test that a random jumper lands on the same tile when redone.
#[test]
fn test_redo_reproduces_random_jump() {
    let (mut enc, players) = setup(77);
    let rider = players[2];

    let options = enc.legal_moves(rider).unwrap();
    assert_eq!(options.len(), 1);
    let target = *options.iter().next().unwrap();
    let action = if enc.board().get_at(target).is_some() {
        CommandAction::Attack { attacker: rider, target }
    } else {
        CommandAction::Move { piece: rider, to: target }
    };

    enc.submit(action).unwrap();
    let after = snapshot(&enc);
    enc.undo().unwrap();

    assert_eq!(enc.legal_moves(rider).unwrap(), options);
    assert_eq!(enc.redo().unwrap(), action);
    assert_eq!(snapshot(&enc), after);
    assert!(matches!(
        enc.bus().recorded().last(),
        Some(GameEvent::CommandRedone { .. })
    ));
}

/// Test that redone moves are tagged as redo on the bus.
#[test]
fn test_redo_move_reason() {
    let (mut enc, players) = setup(8);
    enc.move_piece(players[0], Coord::new(0, 4)).unwrap();
    enc.undo().unwrap();
    enc.redo().unwrap();

    let reasons: Vec<_> = enc
        .bus()
        .recorded()
        .iter()
        .filter_map(|e| match e {
            GameEvent::PieceMoved { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(reasons, vec![MoveReason::Normal, MoveReason::Undo, MoveReason::Redo]);
}

/// Test that a new command after undo drops the redo branch.
#[test]
fn test_new_command_discards_redo() {
    let (mut enc, players) = setup(2);
    enc.move_piece(players[0], Coord::new(0, 3)).unwrap();
    enc.undo().unwrap();
    assert!(enc.history().can_redo());

    enc.move_piece(players[0], Coord::new(1, 0)).unwrap();
    assert!(matches!(
        enc.redo(),
        Err(TacticsError::Rejected(ActionRejected::NothingToRedo))
    ));
}

/// Test that history does not survive the end of the player turn.
#[test]
fn test_history_cleared_at_turn_end() {
    let (mut enc, players) = setup(4);
    enc.move_piece(players[0], Coord::new(0, 2)).unwrap();

    let driver = enc.end_player_turn().unwrap();
    assert!(!enc.history().can_undo());
    assert!(enc.bus().recorded().iter().any(|e| matches!(e, GameEvent::HistoryCleared)));
    assert!(matches!(
        enc.undo(),
        Err(TacticsError::Rejected(ActionRejected::WrongPhase(_)))
    ));

    enc.run_enemy_turn(driver).unwrap();
    assert!(matches!(
        enc.undo(),
        Err(TacticsError::Rejected(ActionRejected::NothingToUndo))
    ));
}

/// Test that a mid-turn spawn drops the redo branch.
#[test]
fn test_spawn_mid_turn_discards_history() {
    let (mut enc, players) = setup(5);
    enc.move_piece(players[0], Coord::new(0, 3)).unwrap();
    enc.undo().unwrap();
    assert!(enc.history().can_redo());

    enc.spawn(WALL, Coord::new(0, 3), Team::Enemy).unwrap();
    assert!(!enc.history().can_redo());
    assert!(matches!(enc.bus().recorded().last(), Some(GameEvent::HistoryCleared)));
    assert!(matches!(
        enc.redo(),
        Err(TacticsError::Rejected(ActionRejected::NothingToRedo))
    ));
}
