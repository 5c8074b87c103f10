//! Enemy intent previews.
//!
//! Intents show the player what each enemy will do next turn. They are
//! computed by playing the enemy turn forward on a clone of the game
//! state with a muted bus, so they never touch the real board, RNG or
//! subscribers. The clone goes through the same turn hand-over as the
//! real encounter first: player turn-end hooks, then the enemy side's
//! turn-begin processing (bleed included).

use serde::{Deserialize, Serialize};

use crate::abilities::{HintColor, HintTile, HookDispatcher};
use crate::commands::CommandAction;
use crate::core::{Coord, EntityId, GameState, Team};
use crate::events::EventBus;

use super::encounter::open_side;
use super::enemy::{EnemyAction, EnemyAi};

/// Kind of action an enemy intends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    Move,
    Attack,
    Barrage,
}

/// One enemy's predicted action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub entity: EntityId,
    pub kind: IntentKind,
    /// Move destination, attack target, or a boss's next patrol tile.
    pub target: Option<Coord>,
    pub tiles: Vec<HintTile>,
}

/// Predict the next enemy turn from `state`.
///
/// Enemies are simulated in turn order, each seeing the board as the
/// earlier ones left it. Enemies with nothing to do, or that will not
/// survive their own turn start, have no intent.
#[must_use]
pub fn forecast(state: &GameState) -> Vec<Intent> {
    let mut preview = state.clone();
    let mut bus = EventBus::muted();
    let mut intents = Vec::new();

    HookDispatcher::turn_end(&mut preview, &mut bus, Team::Player);
    open_side(&mut preview, &mut bus, Team::Enemy);

    for entity in EnemyAi::turn_order(&preview.board, Team::Enemy) {
        let board_before = preview.board.clone();
        let intent = match EnemyAi::act(&mut preview, &mut bus, entity) {
            EnemyAction::Command(CommandAction::Move { to, .. }) => Intent {
                entity,
                kind: IntentKind::Move,
                target: Some(to),
                tiles: vec![HintTile::new(to, HintColor::Move)],
            },
            EnemyAction::Command(CommandAction::Attack { target, .. }) => {
                let mut tiles = vec![HintTile::new(target, HintColor::Attack)];
                if let Some(attacker) = board_before.piece(entity) {
                    for modifier in &attacker.modifiers {
                        tiles.extend(modifier.hint_tiles(attacker, target, &board_before));
                    }
                }
                Intent {
                    entity,
                    kind: IntentKind::Attack,
                    target: Some(target),
                    tiles,
                }
            }
            EnemyAction::Barrage { tiles, moved_to, .. } => Intent {
                entity,
                kind: IntentKind::Barrage,
                target: moved_to,
                tiles: tiles
                    .into_iter()
                    .map(|coord| HintTile::new(coord, HintColor::Attack))
                    .collect(),
            },
            EnemyAction::Idle => continue,
        };
        intents.push(intent);
    }

    intents
}
