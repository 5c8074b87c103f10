//! The mutable record of one attack.
//!
//! Pre-attack hooks receive an `AttackContext` and may adjust the damage
//! delta or bypass mitigation. The resolver fills in the outcome fields,
//! and post-attack hooks read them to decide their follow-ups.

use serde::{Deserialize, Serialize};

use crate::core::{Coord, Direction, EntityId, Team};
use crate::pieces::Piece;

/// Which side of an attack a hook's owner is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatRole {
    Attacker,
    Defender,
}

/// Whether the defender strikes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrikeKind {
    /// Only the defender takes damage.
    OneWay,
    /// Both sides deal damage in the same exchange.
    Simultaneous,
}

impl StrikeKind {
    /// Player attacks are one-way; everything else trades blows.
    #[must_use]
    pub const fn for_side(attacker_is_player: bool) -> Self {
        if attacker_is_player {
            StrikeKind::OneWay
        } else {
            StrikeKind::Simultaneous
        }
    }
}

/// Snapshot and running totals for one attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackContext {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub attacker_team: Team,
    pub defender_team: Team,
    pub attacker_coord: Coord,
    pub defender_coord: Coord,
    pub strike: StrikeKind,

    /// Attacker's attack value when the exchange began.
    pub base_damage: i32,
    /// Sum of hook adjustments.
    pub damage_delta: i32,
    /// Skip the defender's fortification.
    pub bypass_mitigation: bool,

    // === Filled in by the resolver ===
    pub damage_to_defender: i32,
    pub damage_to_attacker: i32,
    pub attacker_died: bool,
    pub defender_died: bool,
}

impl AttackContext {
    /// Start an exchange between two pieces.
    #[must_use]
    pub fn new(attacker: &Piece, defender: &Piece, strike: StrikeKind) -> Self {
        Self {
            attacker: attacker.id,
            defender: defender.id,
            attacker_team: attacker.team,
            defender_team: defender.team,
            attacker_coord: attacker.coord(),
            defender_coord: defender.coord(),
            strike,
            base_damage: attacker.attack,
            damage_delta: 0,
            bypass_mitigation: false,
            damage_to_defender: 0,
            damage_to_attacker: 0,
            attacker_died: false,
            defender_died: false,
        }
    }

    /// Attack damage after hook adjustments, before mitigation.
    #[must_use]
    pub fn effective_damage(&self) -> i32 {
        (self.base_damage + self.damage_delta).max(0)
    }

    /// Unit direction from attacker to defender.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        Direction::toward(self.attacker_coord, self.defender_coord)
    }
}
