//! Instance-scoped abilities.
//!
//! Each piece carries an ordered list of `Modifier`s copied from its
//! definition. The engine calls into them at fixed points:
//!
//! | Hook             | Fires                                   |
//! |------------------|-----------------------------------------|
//! | `on_spawn`       | once, right after placement             |
//! | `on_turn_begin`  | start of the owner's turn               |
//! | `on_turn_end`    | end of the owner's turn                 |
//! | `on_post_move`   | after the owner completes a move        |
//! | `on_pre_attack`  | before damage, may adjust the context   |
//! | `on_post_attack` | after damage and deaths are applied     |
//!
//! Hooks that change the board do so by returning an [`EffectBatch`].
//! Pre-attack hooks are the exception: they edit the attack context in
//! place, which is how damage adjustments accumulate.
//!
//! A modifier that does not care about a hook returns nothing for it.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::combat::{AttackContext, CombatRole};
use crate::core::{Coord, Direction};
use crate::pieces::Piece;

use super::effect::{Effect, EffectBatch};
use super::hint::{HintColor, HintTile};

/// Read-only view handed to hooks.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    /// The piece that owns the modifier. Its own modifier list is
    /// detached while hooks run.
    pub owner: &'a Piece,
    pub board: &'a Board,
}

/// A per-piece ability.
///
/// Serialized with an internal `kind` tag so catalogs can write
/// `{ kind = "lifesteal", amount = 1 }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modifier {
    /// Heal after dealing damage, up to the damage dealt.
    Lifesteal { amount: i32 },
    /// Damage enemies orthogonally adjacent to the target.
    Splash { damage: i32 },
    /// Apply bleed stacks to a surviving target.
    Bleed { stacks: i32 },
    /// Attacks ignore fortification.
    Piercing,
    /// Damage the enemy standing directly behind the target.
    Lance { damage: i32 },
    /// Gain attack permanently on each kill.
    Frenzy { bonus: i32 },
    /// Reduce incoming attack damage.
    Guarded { reduction: i32 },
    /// After moving, the next attack deals bonus damage.
    Charge {
        bonus: i32,
        #[serde(default)]
        primed: bool,
    },
    /// Gain a point of fortification each turn spent stationary.
    Entrench { max: i32 },
    /// Enter play fortified.
    Armored { fortify: i32 },
    /// Heal at the start of each own turn.
    Regenerate { amount: i32 },
}

impl Modifier {
    // === Lifecycle hooks ===

    pub fn on_spawn(&mut self, ctx: &HookContext<'_>) -> EffectBatch {
        let mut effects = EffectBatch::new();
        if let Modifier::Armored { fortify } = *self {
            effects.push(Effect::SetFortify {
                target: ctx.owner.id,
                amount: fortify,
            });
        }
        effects
    }

    pub fn on_turn_begin(&mut self, ctx: &HookContext<'_>) -> EffectBatch {
        let mut effects = EffectBatch::new();
        if let Modifier::Regenerate { amount } = *self {
            effects.push(Effect::Heal {
                target: ctx.owner.id,
                amount,
            });
        }
        effects
    }

    pub fn on_turn_end(&mut self, ctx: &HookContext<'_>) -> EffectBatch {
        let mut effects = EffectBatch::new();
        match self {
            Modifier::Entrench { max } if !ctx.owner.moved_this_turn => {
                effects.push(Effect::GainFortify {
                    target: ctx.owner.id,
                    amount: 1,
                    cap: *max,
                });
            }
            // A charge fizzles after a full turn spent standing still.
            Modifier::Charge { primed, .. } if !ctx.owner.moved_this_turn => {
                *primed = false;
            }
            _ => {}
        }
        effects
    }

    pub fn on_post_move(&mut self, _ctx: &HookContext<'_>, from: Coord, to: Coord) -> EffectBatch {
        if let Modifier::Charge { primed, .. } = self {
            if from != to {
                *primed = true;
            }
        }
        EffectBatch::new()
    }

    // === Combat hooks ===

    pub fn on_pre_attack(&mut self, _ctx: &HookContext<'_>, attack: &mut AttackContext, role: CombatRole) {
        match (self, role) {
            (Modifier::Piercing, CombatRole::Attacker) => attack.bypass_mitigation = true,
            (Modifier::Charge { bonus, primed }, CombatRole::Attacker) if *primed => {
                attack.damage_delta += *bonus;
                *primed = false;
            }
            (Modifier::Guarded { reduction }, CombatRole::Defender) => attack.damage_delta -= *reduction,
            _ => {}
        }
    }

    pub fn on_post_attack(&mut self, ctx: &HookContext<'_>, attack: &AttackContext, role: CombatRole) -> EffectBatch {
        let mut effects = EffectBatch::new();
        if role != CombatRole::Attacker {
            return effects;
        }
        let owner = ctx.owner;

        match *self {
            Modifier::Lifesteal { amount } if attack.damage_to_defender > 0 => {
                effects.push(Effect::Heal {
                    target: owner.id,
                    amount: amount.min(attack.damage_to_defender),
                });
            }
            Modifier::Splash { damage } => {
                for coord in splash_tiles(attack.defender_coord, ctx.board) {
                    if coord == attack.attacker_coord {
                        continue;
                    }
                    if let Some(victim) = ctx.board.get_at(coord).filter(|p| p.team != owner.team) {
                        effects.push(Effect::Damage {
                            target: victim.id,
                            amount: damage,
                            pierce: false,
                        });
                    }
                }
            }
            Modifier::Bleed { stacks } if !attack.defender_died => {
                effects.push(Effect::ApplyBleed {
                    target: attack.defender,
                    stacks,
                });
            }
            Modifier::Lance { damage } => {
                let behind = attack
                    .direction()
                    .map(|dir| attack.defender_coord.step(dir, 1))
                    .and_then(|coord| ctx.board.get_at(coord))
                    .filter(|p| p.team != owner.team);
                if let Some(victim) = behind {
                    effects.push(Effect::Damage {
                        target: victim.id,
                        amount: damage,
                        pierce: false,
                    });
                }
            }
            Modifier::Frenzy { bonus } if attack.defender_died => {
                effects.push(Effect::AddAttack {
                    target: owner.id,
                    amount: bonus,
                });
            }
            _ => {}
        }
        effects
    }

    // === Presentation ===

    /// Extra tiles this ability would touch if the owner attacked `focus`.
    #[must_use]
    pub fn hint_tiles(&self, owner: &Piece, focus: Coord, board: &Board) -> Vec<HintTile> {
        match self {
            Modifier::Splash { .. } => splash_tiles(focus, board)
                .filter(|&coord| coord != owner.coord())
                .map(|coord| HintTile::new(coord, HintColor::Splash))
                .collect(),
            Modifier::Lance { .. } => Direction::toward(owner.coord(), focus)
                .map(|dir| focus.step(dir, 1))
                .filter(|&coord| board.in_bounds(coord))
                .map(|coord| vec![HintTile::new(coord, HintColor::Pierce)])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

fn splash_tiles(center: Coord, board: &Board) -> impl Iterator<Item = Coord> + '_ {
    Direction::ORTHOGONAL
        .into_iter()
        .map(move |dir| center.step(dir, 1))
        .filter(move |&coord| board.in_bounds(coord))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::StrikeKind;
    use crate::core::{EntityId, Team};
    use crate::pieces::{DefinitionId, MovementRule, PieceDefinition};

    fn board_with(pieces: &[(Coord, Team)]) -> (Board, Vec<EntityId>) {
        let mut board = Board::new(8, 8, 1.0);
        let def = PieceDefinition::new(DefinitionId::new(1), "Pawn", 3, 2).with_movement(MovementRule::pawn());
        let ids = pieces
            .iter()
            .map(|&(coord, team)| {
                board
                    .place(Piece::from_definition(&def, team).unwrap(), coord, team)
                    .unwrap()
            })
            .collect();
        (board, ids)
    }

    fn attack(board: &Board, attacker: EntityId, defender: EntityId) -> AttackContext {
        AttackContext::new(
            board.piece(attacker).unwrap(),
            board.piece(defender).unwrap(),
            StrikeKind::OneWay,
        )
    }

    #[test]
    fn test_pre_attack_adjustments() {
        let (board, ids) = board_with(&[(Coord::new(0, 0), Team::Player), (Coord::new(0, 1), Team::Enemy)]);
        let ctx = HookContext { owner: board.piece(ids[0]).unwrap(), board: &board };
        let mut attack = attack(&board, ids[0], ids[1]);

        Modifier::Piercing.on_pre_attack(&ctx, &mut attack, CombatRole::Attacker);
        assert!(attack.bypass_mitigation);

        let mut charge = Modifier::Charge { bonus: 2, primed: true };
        charge.on_pre_attack(&ctx, &mut attack, CombatRole::Attacker);
        assert_eq!(attack.damage_delta, 2);
        assert_eq!(charge, Modifier::Charge { bonus: 2, primed: false });

        Modifier::Guarded { reduction: 3 }.on_pre_attack(&ctx, &mut attack, CombatRole::Defender);
        assert_eq!(attack.damage_delta, -1);

        // Guarded does nothing when its owner is the one attacking.
        Modifier::Guarded { reduction: 3 }.on_pre_attack(&ctx, &mut attack, CombatRole::Attacker);
        assert_eq!(attack.damage_delta, -1);
    }

    #[test]
    fn test_splash_hits_only_enemies() {
        let (board, ids) = board_with(&[
            (Coord::new(3, 2), Team::Player),
            (Coord::new(3, 3), Team::Enemy),
            (Coord::new(2, 3), Team::Enemy),
            (Coord::new(4, 3), Team::Player),
        ]);
        let ctx = HookContext { owner: board.piece(ids[0]).unwrap(), board: &board };
        let report = attack(&board, ids[0], ids[1]);

        let effects = Modifier::Splash { damage: 1 }.on_post_attack(&ctx, &report, CombatRole::Attacker);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].target(), ids[2]);
    }

    #[test]
    fn test_lance_hits_tile_behind() {
        let (board, ids) = board_with(&[
            (Coord::new(3, 1), Team::Player),
            (Coord::new(3, 3), Team::Enemy),
            (Coord::new(3, 4), Team::Enemy),
        ]);
        let ctx = HookContext { owner: board.piece(ids[0]).unwrap(), board: &board };
        let report = attack(&board, ids[0], ids[1]);

        let effects = Modifier::Lance { damage: 2 }.on_post_attack(&ctx, &report, CombatRole::Attacker);
        assert_eq!(effects.as_slice(), &[Effect::Damage { target: ids[2], amount: 2, pierce: false }]);

        let hints = Modifier::Lance { damage: 2 }.hint_tiles(ctx.owner, Coord::new(3, 3), &board);
        assert_eq!(hints, vec![HintTile::new(Coord::new(3, 4), HintColor::Pierce)]);
    }

    #[test]
    fn test_post_attack_conditions() {
        let (board, ids) = board_with(&[(Coord::new(0, 0), Team::Player), (Coord::new(1, 1), Team::Enemy)]);
        let ctx = HookContext { owner: board.piece(ids[0]).unwrap(), board: &board };
        let mut report = attack(&board, ids[0], ids[1]);

        assert!(Modifier::Lifesteal { amount: 1 }
            .on_post_attack(&ctx, &report, CombatRole::Attacker)
            .is_empty());
        assert!(Modifier::Frenzy { bonus: 1 }
            .on_post_attack(&ctx, &report, CombatRole::Attacker)
            .is_empty());
        assert_eq!(
            Modifier::Bleed { stacks: 2 }
                .on_post_attack(&ctx, &report, CombatRole::Attacker)
                .len(),
            1
        );

        report.damage_to_defender = 2;
        report.defender_died = true;
        assert_eq!(
            Modifier::Lifesteal { amount: 1 }
                .on_post_attack(&ctx, &report, CombatRole::Attacker)
                .len(),
            1
        );
        assert_eq!(
            Modifier::Frenzy { bonus: 1 }
                .on_post_attack(&ctx, &report, CombatRole::Attacker)
                .as_slice(),
            &[Effect::AddAttack { target: ids[0], amount: 1 }]
        );
        assert!(Modifier::Bleed { stacks: 2 }
            .on_post_attack(&ctx, &report, CombatRole::Attacker)
            .is_empty());
        assert!(Modifier::Lifesteal { amount: 1 }
            .on_post_attack(&ctx, &report, CombatRole::Defender)
            .is_empty());
    }

    #[test]
    fn test_turn_hooks() {
        let (mut board, ids) = board_with(&[(Coord::new(0, 0), Team::Player)]);

        let mut entrench = Modifier::Entrench { max: 2 };
        let mut charge = Modifier::Charge { bonus: 1, primed: false };
        {
            let ctx = HookContext { owner: board.piece(ids[0]).unwrap(), board: &board };
            assert_eq!(entrench.on_turn_end(&ctx).len(), 1);
            charge.on_post_move(&ctx, Coord::new(0, 0), Coord::new(0, 1));
            assert_eq!(charge, Modifier::Charge { bonus: 1, primed: true });
        }

        board.piece_mut(ids[0]).unwrap().moved_this_turn = true;
        let ctx = HookContext { owner: board.piece(ids[0]).unwrap(), board: &board };
        assert!(entrench.on_turn_end(&ctx).is_empty());
        charge.on_turn_end(&ctx);
        assert_eq!(charge, Modifier::Charge { bonus: 1, primed: true });
    }

    #[test]
    fn test_modifier_toml_shape() {
        #[derive(Deserialize)]
        struct Wrapper {
            modifiers: Vec<Modifier>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"modifiers = [{ kind = "charge", bonus = 2 }, { kind = "armored", fortify = 1 }]"#,
        )
        .unwrap();
        assert_eq!(
            parsed.modifiers,
            vec![Modifier::Charge { bonus: 2, primed: false }, Modifier::Armored { fortify: 1 }]
        );
    }
}
