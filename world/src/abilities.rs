//! Energy-funded abilities that act directly on the board.
//!
//! Abilities never trigger a cascade. Each request targets one of the
//! acting player's tokens; the pure [`apply_ability`] either returns the new
//! board with a description of what happened or a tagged failure.

use polaris_core::{
    AbilityCosts, Board, Coord, Direction, EjectionEvent, MoveEvent, Player, Polarity,
};
use thiserror::Error;

/// Priority recorded on moves produced by a kick; kicks bypass link ordering.
pub const KICK_PRIORITY: u8 = 0;

/// Ability together with its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Inverts the polarity of an own token.
    Flip {
        /// Cell of the token to flip.
        cell: Coord,
    },
    /// Pushes the contiguous line starting at an own token one step.
    Kick {
        /// Cell of the token at the head of the line.
        cell: Coord,
        /// Direction of the push.
        direction: Direction,
    },
    /// Makes an own token immune to displacement until its owner's next turn.
    Anchor {
        /// Cell of the token to anchor.
        cell: Coord,
    },
}

impl Ability {
    /// Cell of the targeted token.
    #[must_use]
    pub const fn cell(&self) -> Coord {
        match *self {
            Self::Flip { cell } | Self::Kick { cell, .. } | Self::Anchor { cell } => cell,
        }
    }

    /// Energy price of the ability under `costs`.
    #[must_use]
    pub const fn cost(&self, costs: &AbilityCosts) -> i32 {
        match self {
            Self::Flip { .. } => costs.flip,
            Self::Kick { .. } => costs.kick,
            Self::Anchor { .. } => costs.anchor,
        }
    }
}

/// A player asking to use an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AbilityRequest {
    /// Player spending the energy.
    pub player: Player,
    /// Ability and target.
    pub ability: Ability,
}

impl AbilityRequest {
    /// Creates a new request.
    #[must_use]
    pub const fn new(player: Player, ability: Ability) -> Self {
        Self { player, ability }
    }
}

/// What a successful ability did.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbilityOutcome {
    /// The token at `cell` now has `polarity`.
    Flipped {
        /// Cell of the flipped token.
        cell: Coord,
        /// Polarity after the flip.
        polarity: Polarity,
    },
    /// A line of tokens moved one step, far end first.
    Kicked {
        /// Direction of the push.
        direction: Direction,
        /// Moves applied, far end first.
        moves: Vec<MoveEvent>,
        /// Tokens pushed off the board.
        ejections: Vec<EjectionEvent>,
    },
    /// The token at `cell` is anchored.
    Anchored {
        /// Cell of the anchored token.
        cell: Coord,
    },
}

impl AbilityOutcome {
    /// Ejections caused by the ability.
    #[must_use]
    pub fn ejections(&self) -> &[EjectionEvent] {
        match self {
            Self::Kicked { ejections, .. } => ejections,
            Self::Flipped { .. } | Self::Anchored { .. } => &[],
        }
    }
}

/// Why an ability request was refused. The board is never changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum AbilityFailure {
    /// The target lies outside the board.
    #[error("cell {0} is not a valid target")]
    InvalidTarget(Coord),
    /// The target cell holds no token.
    #[error("no token at {0}")]
    EmptyCell(Coord),
    /// The target token belongs to the opponent.
    #[error("token at {0} belongs to the opponent")]
    NotOwner(Coord),
    /// A locked token is part of the kicked line.
    #[error("cannot kick the locked token at {0}")]
    Locked(Coord),
    /// The player's wallet cannot cover the cost.
    #[error("ability costs {required} energy but only {available} is available")]
    InsufficientEnergy {
        /// Price of the ability.
        required: i32,
        /// Energy in the wallet.
        available: i32,
    },
}

impl AbilityFailure {
    /// Stable tag callers can branch on.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidTarget(_) => "invalid-target",
            Self::EmptyCell(_) => "empty-cell",
            Self::NotOwner(_) => "not-owner",
            Self::Locked(_) => "locked",
            Self::InsufficientEnergy { .. } => "insufficient-energy",
        }
    }
}

/// Applies `request` to a copy of `board`.
///
/// Energy is not checked here; the arena charges the wallet only after a
/// successful application.
pub fn apply_ability(
    request: &AbilityRequest,
    board: &Board,
) -> Result<(Board, AbilityOutcome), AbilityFailure> {
    let cell = request.ability.cell();
    if !cell.is_valid() {
        return Err(AbilityFailure::InvalidTarget(cell));
    }
    let token = board.get(cell).ok_or(AbilityFailure::EmptyCell(cell))?;
    if token.owner() != request.player {
        return Err(AbilityFailure::NotOwner(cell));
    }

    let mut next = board.clone();
    let outcome = match request.ability {
        Ability::Flip { cell } => {
            let flipped = token.flipped();
            let _ = next.insert(cell, flipped);
            AbilityOutcome::Flipped {
                cell,
                polarity: flipped.polarity(),
            }
        }
        Ability::Anchor { cell } => {
            let _ = next.insert(cell, token.with_anchor(true));
            AbilityOutcome::Anchored { cell }
        }
        Ability::Kick { cell, direction } => kick(&mut next, cell, direction)?,
    };
    Ok((next, outcome))
}

fn kick(
    board: &mut Board,
    head: Coord,
    direction: Direction,
) -> Result<AbilityOutcome, AbilityFailure> {
    let mut line = vec![head];
    let mut cursor = head;
    while let Some(next) = cursor.neighbor(direction) {
        if !board.is_occupied(next) {
            break;
        }
        line.push(next);
        cursor = next;
    }

    if let Some(locked) = line
        .iter()
        .copied()
        .find(|cell| board.get(*cell).is_some_and(|token| token.is_locked()))
    {
        return Err(AbilityFailure::Locked(locked));
    }

    let mut moves = Vec::new();
    let mut ejections = Vec::new();
    for &cell in line.iter().rev() {
        let Some(token) = board.remove(cell) else {
            continue;
        };
        let destination = cell.step(direction);
        if destination.is_valid() {
            let _ = board.insert(destination, token);
            moves.push(MoveEvent {
                token: token.id(),
                from: cell,
                to: destination,
                priority: KICK_PRIORITY,
            });
        } else {
            ejections.push(EjectionEvent {
                token: token.id(),
                from: cell,
                owner: token.owner(),
            });
        }
    }

    Ok(AbilityOutcome::Kicked {
        direction,
        moves,
        ejections,
    })
}
