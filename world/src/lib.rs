#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Polaris Arena.
//!
//! The [`Arena`] owns the board, both scores and both energy wallets.
//! Callers drive it exclusively through [`apply`], which consumes one
//! [`Command`] and reports everything that happened as [`Event`]s. Read
//! access goes through [`query`].

pub mod abilities;
mod energy;

use polaris_core::{
    Board, ConfigError, Coord, EjectionEvent, EngineConfig, PlacementError, Player, Polarity,
    TokenId,
};
use polaris_system_boundary::{energy_gain, translate_ejections, ScoreChange};
use polaris_system_cascade::CascadeManager;
use tracing::{debug, info};

pub use crate::abilities::{apply_ability, Ability, AbilityFailure, AbilityOutcome, AbilityRequest};
pub use crate::energy::EnergyWallet;

/// Actions a match controller can submit to the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Starts `player`'s turn, expiring that player's anchors.
    BeginTurn {
        /// Player whose turn starts.
        player: Player,
    },
    /// Places a new token and resolves the resulting cascade.
    Place {
        /// Player placing the token.
        player: Player,
        /// Target cell.
        cell: Coord,
        /// Polarity of the new token.
        polarity: Polarity,
    },
    /// Spends energy on an ability.
    UseAbility {
        /// Ability, target and acting player.
        request: AbilityRequest,
    },
}

/// Observable consequences of an applied command.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A turn started and `anchors_cleared` anchors expired.
    TurnBegan {
        /// Player whose turn started.
        player: Player,
        /// Number of anchors that expired.
        anchors_cleared: usize,
    },
    /// A placement was refused; nothing changed.
    PlacementRejected {
        /// Player who attempted the placement.
        player: Player,
        /// Why the placement is illegal.
        reason: PlacementError,
    },
    /// A new token entered the board.
    TokenPlaced {
        /// Owner of the token.
        player: Player,
        /// Cell the token was placed on.
        cell: Coord,
        /// Identity minted for the token.
        token: TokenId,
        /// Polarity of the token.
        polarity: Polarity,
    },
    /// The cascade following a placement finished.
    CascadeResolved {
        /// Player who triggered the cascade.
        player: Player,
        /// Recorded steps, including the placement step.
        steps: usize,
        /// Moves applied across all steps.
        moves: usize,
        /// Displacements rejected because wave triggers disagreed.
        collisions: usize,
    },
    /// A token left the board.
    TokenEjected(EjectionEvent),
    /// A player's score changed.
    ScoreChanged {
        /// The applied delta.
        change: ScoreChange,
        /// Score after the change.
        total: i32,
    },
    /// A player's energy changed.
    EnergyChanged {
        /// Wallet owner.
        player: Player,
        /// Signed change actually applied.
        delta: i32,
        /// Energy after the change.
        current: i32,
    },
    /// An ability was applied and paid for.
    AbilityUsed {
        /// Player who used the ability.
        player: Player,
        /// What the ability did.
        outcome: AbilityOutcome,
    },
    /// An ability was refused; nothing changed.
    AbilityRejected {
        /// Player who requested the ability.
        player: Player,
        /// Why it was refused.
        failure: AbilityFailure,
    },
}

/// Authoritative state of a match in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arena {
    board: Board,
    scores: [i32; 2],
    wallets: [EnergyWallet; 2],
    config: EngineConfig,
    cascade: CascadeManager,
    placements: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::build(Board::new(), EngineConfig::default())
    }
}

impl Arena {
    /// Creates an arena with an empty board.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_board(Board::new(), config)
    }

    /// Creates an arena starting from `board`, for puzzles and replays.
    pub fn with_board(board: Board, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(board, config))
    }

    fn build(board: Board, config: EngineConfig) -> Self {
        let wallet = EnergyWallet::new(0, config.max_energy);
        Self {
            board,
            scores: [0, 0],
            wallets: [wallet, wallet],
            cascade: CascadeManager::from_config(&config),
            config,
            placements: 0,
        }
    }

    fn settle_ejections(&mut self, ejections: &[EjectionEvent], out_events: &mut Vec<Event>) {
        for ejection in ejections {
            out_events.push(Event::TokenEjected(*ejection));
        }
        for change in translate_ejections(ejections) {
            let total = &mut self.scores[seat_index(change.player)];
            *total += change.amount;
            out_events.push(Event::ScoreChanged {
                change,
                total: *total,
            });
        }
    }

    fn place(
        &mut self,
        player: Player,
        cell: Coord,
        polarity: Polarity,
        out_events: &mut Vec<Event>,
    ) {
        let token = self.board.fresh_token(player, polarity);
        let result = match self.cascade.simulate(cell, token, &self.board) {
            Ok(result) => result,
            Err(reason) => {
                debug!(player = player.seat(), %cell, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected { player, reason });
                return;
            }
        };

        out_events.push(Event::TokenPlaced {
            player,
            cell,
            token: token.id(),
            polarity,
        });
        out_events.push(Event::CascadeResolved {
            player,
            steps: result.chain_length(),
            moves: result.steps.iter().map(|step| step.moves.len()).sum(),
            collisions: result.steps.iter().map(|step| step.collisions.len()).sum(),
        });

        self.board = result.final_board;
        self.settle_ejections(&result.ejections, out_events);

        let gain = energy_gain(&result.ejections, player, self.config.energy_per_turn);
        let wallet = &mut self.wallets[seat_index(player)];
        let delta = wallet.add(gain);
        out_events.push(Event::EnergyChanged {
            player,
            delta,
            current: wallet.current(),
        });

        self.placements = self.placements.saturating_add(1);
        info!(
            player = player.seat(),
            %cell,
            steps = result.steps.len(),
            ejections = result.ejections.len(),
            energy = wallet.current(),
            "turn resolved"
        );
    }

    fn use_ability(&mut self, request: AbilityRequest, out_events: &mut Vec<Event>) {
        let player = request.player;
        let cost = request.ability.cost(&self.config.ability_costs);
        // Charged on a copy that is committed only once the ability applies.
        let mut wallet = self.wallets[seat_index(player)];

        let applied = if wallet.spend(cost) {
            apply_ability(&request, &self.board)
        } else {
            Err(AbilityFailure::InsufficientEnergy {
                required: cost,
                available: wallet.current(),
            })
        };

        let (board, outcome) = match applied {
            Ok(applied) => applied,
            Err(failure) => {
                debug!(player = player.seat(), reason = failure.reason(), "ability rejected");
                out_events.push(Event::AbilityRejected { player, failure });
                return;
            }
        };

        self.wallets[seat_index(player)] = wallet;
        let current = wallet.current();

        self.board = board;
        out_events.push(Event::AbilityUsed {
            player,
            outcome: outcome.clone(),
        });
        out_events.push(Event::EnergyChanged {
            player,
            delta: -cost,
            current,
        });
        self.settle_ejections(outcome.ejections(), out_events);
        info!(player = player.seat(), ?outcome, "ability used");
    }
}

/// Applies `command` to the arena, appending every consequence to
/// `out_events`.
pub fn apply(arena: &mut Arena, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginTurn { player } => {
            let anchors_cleared = arena.board.clear_anchors(player);
            out_events.push(Event::TurnBegan {
                player,
                anchors_cleared,
            });
        }
        Command::Place {
            player,
            cell,
            polarity,
        } => arena.place(player, cell, polarity, out_events),
        Command::UseAbility { request } => arena.use_ability(request, out_events),
    }
}

fn seat_index(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

/// Query functions that provide read-only access to the arena.
pub mod query {
    use super::{seat_index, Arena, EnergyWallet};
    use polaris_core::{Board, EngineConfig, Player};

    /// Current board.
    #[must_use]
    pub fn board(arena: &Arena) -> &Board {
        &arena.board
    }

    /// Current score of `player`.
    #[must_use]
    pub fn score(arena: &Arena, player: Player) -> i32 {
        arena.scores[seat_index(player)]
    }

    /// Energy wallet of `player`.
    #[must_use]
    pub fn energy(arena: &Arena, player: Player) -> &EnergyWallet {
        &arena.wallets[seat_index(player)]
    }

    /// Configuration the arena runs with.
    #[must_use]
    pub fn config(arena: &Arena) -> &EngineConfig {
        &arena.config
    }

    /// Number of placements resolved so far.
    #[must_use]
    pub fn placements(arena: &Arena) -> u32 {
        arena.placements
    }
}
