//! Encounter orchestration.
//!
//! `Encounter` owns everything one fight needs: the game state, the turn
//! state machine, action points, lives, the undo history and the event
//! bus. It is the only type that decides *when* things may happen; the
//! board, movement rules, combat pipeline and commands decide *what*
//! happens.
//!
//! ## Turn loop
//!
//! ```text
//! begin()            Preparation -> PlayerTurn
//! submit()/undo()    player actions, victory check, intents refreshed
//! end_player_turn()  player turn-end hooks, history cleared -> EnemyTurn
//! EnemyTurnDriver    one enemy per step, defeat check after each
//!                    enemy turn-end hooks -> Cleanup (victory check)
//!                    -> PlayerTurn
//! ```
//!
//! ## Example
//!
//! ```
//! use rust_tactics::core::{Coord, EncounterConfig, Team};
//! use rust_tactics::pieces::{DefinitionId, MovementRule, PieceCatalog, PieceDefinition};
//! use rust_tactics::turns::{Encounter, Outcome, TurnPhase};
//!
//! let mut catalog = PieceCatalog::new();
//! catalog.register(PieceDefinition::new(DefinitionId::new(1), "Rook", 5, 3).with_movement(MovementRule::rook())).unwrap();
//! catalog.register(PieceDefinition::new(DefinitionId::new(2), "Pawn", 2, 1).with_movement(MovementRule::pawn())).unwrap();
//!
//! let mut encounter = Encounter::new(EncounterConfig::default(), catalog, 42).unwrap();
//! let rook = encounter.spawn(DefinitionId::new(1), Coord::new(0, 0), Team::Player).unwrap();
//! encounter.spawn(DefinitionId::new(2), Coord::new(0, 6), Team::Enemy).unwrap();
//! encounter.begin().unwrap();
//!
//! assert_eq!(encounter.phase(), TurnPhase::PlayerTurn);
//! let report = encounter.attack(rook, Coord::new(0, 6)).unwrap();
//! assert!(report.defender_died);
//! assert_eq!(encounter.outcome(), Some(Outcome::Victory));
//! ```

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::abilities::{Effect, EffectResolver, FactionModifier, HookDispatcher, Modifier};
use crate::board::Board;
use crate::combat::CombatReport;
use crate::commands::{Command, CommandAction, CommandContext, CommandCosts, CommandHistory};
use crate::core::{Coord, EncounterConfig, EntityId, GameState, Team};
use crate::error::{ActionRejected, BoardError, ConfigError, PhaseError, SpawnError, TacticsError};
use crate::events::{EventBus, GameEvent, MoveReason};
use crate::pieces::{DefinitionId, Piece, PieceCatalog};

use super::ap::ActionPoints;
use super::enemy::{EnemyAi, EnemyStep, EnemyTurnDriver};
use super::intent::{self, Intent};
use super::outcome::Outcome;
use super::phase::{TurnPhase, TurnState};
use super::waves::Wave;

/// One fight from setup to outcome.
pub struct Encounter {
    config: EncounterConfig,
    catalog: PieceCatalog,
    state: GameState,
    turn: TurnState,
    ap: ActionPoints,
    lives: u32,
    history: CommandHistory,
    bus: EventBus,
    waves_outstanding: u32,
    intents: Vec<Intent>,
    /// Frozen order of the enemy turn in progress.
    enemy_order: Vec<EntityId>,
    /// Enemies that have taken their activation this enemy turn.
    enemy_acted: BTreeSet<EntityId>,
}

impl Encounter {
    /// Validate setup data and create an encounter in `Preparation`.
    pub fn new(config: EncounterConfig, catalog: PieceCatalog, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        catalog.validate()?;

        Ok(Self {
            state: GameState::new(&config, seed),
            turn: TurnState::new(),
            ap: ActionPoints::new(config.ap_per_turn),
            lives: config.lives,
            history: CommandHistory::new(),
            bus: EventBus::new(),
            waves_outstanding: 0,
            intents: Vec::new(),
            enemy_order: Vec::new(),
            enemy_acted: BTreeSet::new(),
            config,
            catalog,
        })
    }

    /// Build from TOML sources for the config and the piece catalog.
    pub fn from_toml_str(config: &str, catalog: &str, seed: u64) -> Result<Self, ConfigError> {
        Self::new(
            EncounterConfig::from_toml_str(config)?,
            PieceCatalog::from_toml_str(catalog)?,
            seed,
        )
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.state.board
    }

    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.turn.phase()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.turn.outcome()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.turn.is_over()
    }

    #[must_use]
    pub fn ap(&self) -> ActionPoints {
        self.ap
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    #[must_use]
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Predicted enemy actions, refreshed after every player action.
    #[must_use]
    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn.turn_number
    }

    #[must_use]
    pub fn enemy_turns_started(&self) -> u32 {
        self.turn.enemy_turns_started
    }

    #[must_use]
    pub fn rounds_completed(&self) -> u32 {
        self.turn.rounds_completed
    }

    #[must_use]
    pub fn waves_outstanding(&self) -> u32 {
        self.waves_outstanding
    }

    /// No enemy piece is active.
    #[must_use]
    pub fn is_board_cleared(&self) -> bool {
        self.state.board.count_active(Team::Enemy) == 0
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe, or toggle recording.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // === Setup ===

    /// Give a side a faction-wide ability.
    pub fn add_faction_modifier(&mut self, team: Team, modifier: FactionModifier) {
        self.state.factions[team].modifiers.push(modifier);
    }

    /// Spawn a copy of a catalog definition.
    ///
    /// Spawning during the player turn discards the undo history, since
    /// recorded commands never saw the new piece.
    pub fn spawn(&mut self, definition: DefinitionId, coord: Coord, team: Team) -> Result<EntityId, SpawnError> {
        let piece = Piece::from_definition(self.catalog.require(definition)?, team)?;
        let entity = self.state.board.place(piece, coord, team)?;
        debug!(%entity, %definition, %coord, %team, "piece spawned");

        self.bus.publish(GameEvent::PieceSpawned {
            entity,
            definition,
            team,
            coord,
        });
        HookDispatcher::spawn(&mut self.state, &mut self.bus, entity);

        if self.phase() == TurnPhase::PlayerTurn {
            self.discard_history();
            self.refresh_intents();
        }
        Ok(entity)
    }

    /// Attach an extra modifier to an active piece.
    ///
    /// The modifier goes after the piece's existing ones and its spawn
    /// setup runs immediately. Allowed before the encounter starts and
    /// during the player turn; on the player turn the undo history is
    /// discarded, since recorded commands never saw the modifier.
    pub fn equip(&mut self, id: EntityId, modifier: Modifier) -> Result<(), ActionRejected> {
        if self.is_over() {
            return Err(ActionRejected::EncounterOver);
        }
        let phase = self.phase();
        if !matches!(phase, TurnPhase::Preparation | TurnPhase::PlayerTurn) {
            return Err(ActionRejected::WrongPhase(phase));
        }
        let piece = self.state.board.piece(id).ok_or(ActionRejected::UnknownPiece(id))?;
        if !piece.is_active() {
            return Err(ActionRejected::PieceInactive(id));
        }

        debug!(entity = %id, ?modifier, "modifier equipped");
        HookDispatcher::equip(&mut self.state, &mut self.bus, id, modifier);
        if phase == TurnPhase::PlayerTurn {
            self.discard_history();
            self.refresh_intents();
        }
        Ok(())
    }

    /// Register `count` more scripted waves that must fire before victory.
    pub fn expect_waves(&mut self, count: u32) {
        self.waves_outstanding = self.waves_outstanding.saturating_add(count);
    }

    /// Spawn a whole wave and mark one outstanding wave as triggered.
    ///
    /// Every request is checked first, so a bad wave spawns nothing.
    pub fn spawn_wave(&mut self, wave: &Wave) -> Result<Vec<EntityId>, SpawnError> {
        let mut claimed = BTreeSet::new();
        for request in &wave.spawns {
            self.catalog.require(request.definition)?;
            if !self.state.board.in_bounds(request.coord) {
                return Err(BoardError::OutOfBounds(request.coord).into());
            }
            if self.state.board.is_occupied(request.coord) || !claimed.insert(request.coord) {
                return Err(BoardError::Occupied(request.coord).into());
            }
        }

        let spawned = wave
            .spawns
            .iter()
            .map(|request| self.spawn(request.definition, request.coord, request.team))
            .collect::<Result<Vec<_>, _>>()?;

        self.waves_outstanding = self.waves_outstanding.saturating_sub(1);
        info!(spawned = spawned.len(), outstanding = self.waves_outstanding, "wave spawned");
        Ok(spawned)
    }

    /// Leave `Preparation` and start the first player turn.
    pub fn begin(&mut self) -> Result<(), TacticsError> {
        self.enter(TurnPhase::PlayerTurn)?;
        self.start_player_turn();
        Ok(())
    }

    // === Player actions ===

    /// Legal destinations for a piece right now.
    ///
    /// Uses a copy of the RNG, so asking does not change what the piece
    /// will be allowed to do.
    pub fn legal_moves(&self, id: EntityId) -> Result<BTreeSet<Coord>, ActionRejected> {
        let piece = self.state.board.piece(id).ok_or(ActionRejected::UnknownPiece(id))?;
        if !piece.is_active() {
            return Err(ActionRejected::PieceInactive(id));
        }
        Ok(piece.movement.legal_moves(piece, &self.state.board, &mut self.state.rng.clone()))
    }

    pub fn move_piece(&mut self, id: EntityId, to: Coord) -> Result<(), TacticsError> {
        self.submit(CommandAction::Move { piece: id, to })
    }

    /// Attack the piece on `target`. The attacker stays where it is.
    pub fn attack(&mut self, id: EntityId, target: Coord) -> Result<CombatReport, TacticsError> {
        self.submit(CommandAction::Attack { attacker: id, target })?;
        self.history
            .last()
            .and_then(Command::record)
            .and_then(|record| record.report)
            .ok_or_else(|| ActionRejected::IllegalTarget { entity: id, to: target }.into())
    }

    /// Execute a player command and record it for undo.
    ///
    /// Validation failures come back as [`TacticsError::Rejected`] with
    /// nothing changed. A stale occupancy entry under the command aborts
    /// it with [`TacticsError::Invariant`] and clears the history.
    pub fn submit(&mut self, action: CommandAction) -> Result<(), TacticsError> {
        if self.is_over() {
            return Err(ActionRejected::EncounterOver.into());
        }

        let mut ctx = CommandContext {
            state: &mut self.state,
            bus: &mut self.bus,
            ap: Some(&mut self.ap),
            phase: self.turn.phase(),
            costs: CommandCosts::from(&self.config),
            reason: MoveReason::Normal,
        };
        self.history.execute(Command::new(action, Team::Player), &mut ctx)?;
        self.after_player_action();
        Ok(())
    }

    /// Revert the last player command.
    pub fn undo(&mut self) -> Result<CommandAction, TacticsError> {
        self.ensure_player_turn()?;
        let mut ctx = CommandContext {
            state: &mut self.state,
            bus: &mut self.bus,
            ap: Some(&mut self.ap),
            phase: self.turn.phase(),
            costs: CommandCosts::from(&self.config),
            reason: MoveReason::Undo,
        };
        let action = self.history.undo(&mut ctx)?;
        debug!(?action, "undo");
        self.after_player_action();
        Ok(action)
    }

    /// Re-apply the last undone command.
    pub fn redo(&mut self) -> Result<CommandAction, TacticsError> {
        self.ensure_player_turn()?;
        let mut ctx = CommandContext {
            state: &mut self.state,
            bus: &mut self.bus,
            ap: Some(&mut self.ap),
            phase: self.turn.phase(),
            costs: CommandCosts::from(&self.config),
            reason: MoveReason::Normal,
        };
        let action = self.history.redo(&mut ctx)?;
        self.after_player_action();
        Ok(action)
    }

    /// Close the player turn and freeze the enemy order.
    ///
    /// The returned driver processes the enemies; see
    /// [`run_enemy_turn`](Self::run_enemy_turn) for the unpaced version.
    pub fn end_player_turn(&mut self) -> Result<EnemyTurnDriver, TacticsError> {
        self.ensure_player_turn()?;

        HookDispatcher::turn_end(&mut self.state, &mut self.bus, Team::Player);
        self.discard_history();
        self.enter(TurnPhase::EnemyTurn)?;
        self.intents.clear();
        self.begin_side(Team::Enemy);

        let order = EnemyAi::turn_order(&self.state.board, Team::Enemy);
        debug!(enemies = order.len(), turn = self.turn.enemy_turns_started, "enemy order frozen");
        self.enemy_order.clone_from(&order);
        self.enemy_acted.clear();
        Ok(EnemyTurnDriver::new(order, self.turn.enemy_turns_started))
    }

    /// A fresh driver for the enemy turn in progress.
    ///
    /// Covers the enemies of the frozen order that have not acted yet, so
    /// a turn whose driver was dropped can still be finished. Drivers
    /// never activate an enemy twice in one turn, whichever of them steps.
    pub fn resume_enemy_turn(&self) -> Result<EnemyTurnDriver, TacticsError> {
        if self.is_over() {
            return Err(ActionRejected::EncounterOver.into());
        }
        let phase = self.phase();
        if phase != TurnPhase::EnemyTurn {
            return Err(ActionRejected::WrongPhase(phase).into());
        }
        let remaining: Vec<EntityId> = self
            .enemy_order
            .iter()
            .copied()
            .filter(|id| !self.enemy_acted.contains(id))
            .collect();
        debug!(remaining = remaining.len(), turn = self.turn.enemy_turns_started, "enemy turn resumed");
        Ok(EnemyTurnDriver::new(remaining, self.turn.enemy_turns_started))
    }

    /// Step a driver to completion. Returns how many enemies acted.
    pub fn run_enemy_turn(&mut self, mut driver: EnemyTurnDriver) -> Result<usize, TacticsError> {
        let mut acted = 0;
        while let EnemyStep::Acted { .. } = driver.step(self)? {
            acted += 1;
        }
        Ok(acted)
    }

    /// End the player turn and play the whole enemy turn.
    pub fn end_turn(&mut self) -> Result<usize, TacticsError> {
        let driver = self.end_player_turn()?;
        self.run_enemy_turn(driver)
    }

    // === Enemy turn internals ===

    pub(crate) fn has_enemy_acted(&self, entity: EntityId) -> bool {
        self.enemy_acted.contains(&entity)
    }

    pub(crate) fn activate_enemy(&mut self, entity: EntityId) {
        self.enemy_acted.insert(entity);
        let action = EnemyAi::act(&mut self.state, &mut self.bus, entity);
        debug!(%entity, ?action, "enemy activation");
    }

    /// Despawn enemies standing on the player's home row, one life each.
    pub(crate) fn check_defeat(&mut self) {
        if self.is_over() {
            return;
        }
        let home = self.state.board.home_row(Team::Player);
        let crossed: Vec<(EntityId, Coord)> = self
            .state
            .board
            .active(Team::Enemy)
            .filter(|piece| piece.coord().y == home)
            .map(|piece| (piece.id, piece.coord()))
            .collect();

        for (entity, coord) in crossed {
            if !self.state.board.capture_soft(entity) {
                continue;
            }
            self.bus.publish(GameEvent::PieceCaptured { entity, coord });
            self.lives = self.lives.saturating_sub(1);
            info!(%entity, remaining = self.lives, "enemy reached the home row");
            self.bus.publish(GameEvent::LifeLost {
                entity,
                remaining: self.lives,
            });
            if self.lives == 0 {
                self.conclude(Outcome::Defeat);
                return;
            }
        }
    }

    /// Enemy turn-end hooks, cleanup, and the next player turn.
    pub(crate) fn finish_enemy_turn(&mut self) -> Result<(), PhaseError> {
        HookDispatcher::turn_end(&mut self.state, &mut self.bus, Team::Enemy);
        self.enter(TurnPhase::Cleanup)?;
        self.state.board.prune_stale();
        self.check_victory();
        if self.is_over() {
            return Ok(());
        }
        self.enter(TurnPhase::PlayerTurn)?;
        self.start_player_turn();
        Ok(())
    }

    // === Helpers ===

    fn enter(&mut self, to: TurnPhase) -> Result<(), PhaseError> {
        let from = self.turn.transition(to)?;
        info!(?from, ?to, turn = self.turn.turn_number, "phase changed");
        self.bus.publish(GameEvent::PhaseChanged { from, to });
        Ok(())
    }

    fn ensure_player_turn(&self) -> Result<(), ActionRejected> {
        if self.is_over() {
            return Err(ActionRejected::EncounterOver);
        }
        match self.phase() {
            TurnPhase::PlayerTurn => Ok(()),
            phase => Err(ActionRejected::WrongPhase(phase)),
        }
    }

    fn start_player_turn(&mut self) {
        let before = self.ap.current();
        self.ap.reset();
        if self.ap.current() != before {
            self.bus.publish(GameEvent::ApChanged {
                before,
                after: self.ap.current(),
            });
        }
        self.begin_side(Team::Player);
        self.refresh_intents();
    }

    fn begin_side(&mut self, team: Team) {
        open_side(&mut self.state, &mut self.bus, team);
    }

    fn after_player_action(&mut self) {
        self.check_victory();
        self.refresh_intents();
    }

    fn check_victory(&mut self) {
        if self.phase() == TurnPhase::Preparation || self.waves_outstanding > 0 {
            return;
        }
        if self.is_board_cleared() {
            self.conclude(Outcome::Victory);
        }
    }

    fn conclude(&mut self, outcome: Outcome) {
        if !self.turn.conclude(outcome) {
            return;
        }
        info!(%outcome, turn = self.turn.turn_number, "encounter over");
        self.intents.clear();
        self.bus.publish(GameEvent::OutcomeReached(outcome));
    }

    fn refresh_intents(&mut self) {
        if self.phase() == TurnPhase::PlayerTurn && !self.is_over() {
            self.intents = intent::forecast(&self.state);
        }
    }

    fn discard_history(&mut self) {
        if !self.history.can_undo() && !self.history.can_redo() {
            return;
        }
        self.history.clear();
        self.bus.publish(GameEvent::HistoryCleared);
    }
}

/// Turn-begin processing for one side: clear moved flags, tick bleed,
/// then fire turn-begin hooks.
pub(crate) fn open_side(state: &mut GameState, bus: &mut EventBus, team: Team) {
    let ids: Vec<EntityId> = state.board.active(team).map(|piece| piece.id).collect();
    for &id in &ids {
        if let Some(piece) = state.board.piece_mut(id) {
            piece.begin_turn();
        }
    }

    for id in ids {
        let Some(stacks) = state.board.piece(id).filter(|p| p.is_active()).map(|p| p.bleed) else {
            continue;
        };
        if stacks <= 0 {
            continue;
        }
        EffectResolver::resolve_single(
            state,
            bus,
            &Effect::Damage {
                target: id,
                amount: stacks,
                pierce: true,
            },
        );
        if let Some(piece) = state.board.piece_mut(id) {
            piece.bleed = (piece.bleed - 1).max(0);
        }
    }

    HookDispatcher::turn_begin(state, bus, team);
}

impl std::fmt::Debug for Encounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encounter")
            .field("phase", &self.turn.phase())
            .field("turn", &self.turn.turn_number)
            .field("ap", &self.ap)
            .field("lives", &self.lives)
            .field("waves_outstanding", &self.waves_outstanding)
            .field("outcome", &self.turn.outcome())
            .finish_non_exhaustive()
    }
}
