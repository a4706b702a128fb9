//! Wave resolution: every trigger of one cascade step is solved against the
//! same pre-wave board, then the collected effects are applied as a batch.
//!
//! Independent triggers can disagree about the board. When two of them move
//! the same token, or send two tokens into one cell, or move a token into a
//! cell whose occupant stays put, the later proposal in canonical order
//! (trigger cells row-major, then solver commit order) is rejected and
//! reported as a [`WaveCollision`]. The rejected token stays where it was.

use std::collections::BTreeSet;

use polaris_core::{Board, Coord, EjectionEvent, MoveEvent, TokenId};
use polaris_system_magnetics::OrderedSolver;

/// How a proposed displacement conflicted with another trigger's effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// An earlier trigger already displaced the same token.
    SharedOrigin,
    /// An earlier accepted move already targets the same cell.
    SharedDestination,
    /// The destination keeps an occupant that is not leaving.
    DestinationHeld,
}

/// A displacement rejected while applying a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaveCollision {
    /// Reason for the rejection.
    pub kind: CollisionKind,
    /// Trigger whose resolution proposed the displacement.
    pub trigger: Coord,
    /// Token that stays in place.
    pub token: TokenId,
    /// Cell the token would have left.
    pub from: Coord,
    /// Cell the token would have entered; `None` for ejections.
    pub to: Option<Coord>,
}

/// Effects of one wave after batch application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wave {
    /// Applied moves in canonical order.
    pub moves: Vec<MoveEvent>,
    /// Applied ejections in canonical order.
    pub ejections: Vec<EjectionEvent>,
    /// Blocked links summed over every trigger.
    pub conflicts: u32,
    /// Displacements rejected because triggers disagreed.
    pub collisions: Vec<WaveCollision>,
}

impl Wave {
    /// Reports whether the triggers proposed nothing at all.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.moves.is_empty() && self.ejections.is_empty() && self.collisions.is_empty()
    }

    /// Destination cells of applied moves; the next trigger set.
    #[must_use]
    pub fn destinations(&self) -> BTreeSet<Coord> {
        self.moves.iter().map(|event| event.to).collect()
    }
}

struct Proposal {
    trigger: Coord,
    event: MoveEvent,
    accepted: bool,
}

/// Solves every occupied trigger against the current board, then applies
/// the union of their effects to `board` in one batch.
pub fn resolve_wave(
    solver: &mut OrderedSolver,
    triggers: &BTreeSet<Coord>,
    board: &mut Board,
) -> Wave {
    let mut wave = Wave::default();
    let mut claimed: BTreeSet<Coord> = BTreeSet::new();
    let mut proposals: Vec<Proposal> = Vec::new();

    for &trigger in triggers {
        let Some(token) = board.get(trigger) else {
            continue;
        };
        let result = solver.resolve(trigger, token.polarity(), board);
        wave.conflicts += result.conflicts;

        for ejection in result.ejections {
            if claimed.insert(ejection.from) {
                wave.ejections.push(ejection);
            } else {
                wave.collisions.push(WaveCollision {
                    kind: CollisionKind::SharedOrigin,
                    trigger,
                    token: ejection.token,
                    from: ejection.from,
                    to: None,
                });
            }
        }
        for event in result.moves {
            if claimed.insert(event.from) {
                proposals.push(Proposal {
                    trigger,
                    event,
                    accepted: true,
                });
            } else {
                wave.collisions.push(WaveCollision {
                    kind: CollisionKind::SharedOrigin,
                    trigger,
                    token: event.token,
                    from: event.from,
                    to: Some(event.to),
                });
            }
        }
    }

    settle_destinations(board, &mut claimed, &mut proposals, &mut wave.collisions);

    for ejection in &wave.ejections {
        let _ = board.remove(ejection.from);
    }
    let mut lifted = Vec::with_capacity(proposals.len());
    for proposal in proposals.into_iter().filter(|proposal| proposal.accepted) {
        if let Some(token) = board.remove(proposal.event.from) {
            lifted.push((proposal.event.to, token));
            wave.moves.push(proposal.event);
        }
    }
    for (cell, token) in lifted {
        let _ = board.insert(cell, token);
    }

    wave
}

/// Rejects moves until every accepted destination is unique and either
/// empty or being vacated. Rejecting a move keeps its token in place, which
/// can invalidate other destinations, so this runs to a fixpoint.
fn settle_destinations(
    board: &Board,
    vacated: &mut BTreeSet<Coord>,
    proposals: &mut [Proposal],
    collisions: &mut Vec<WaveCollision>,
) {
    loop {
        let mut changed = false;
        let mut taken: BTreeSet<Coord> = BTreeSet::new();

        for proposal in proposals.iter_mut().filter(|proposal| proposal.accepted) {
            let destination = proposal.event.to;
            let kind = if taken.contains(&destination) {
                Some(CollisionKind::SharedDestination)
            } else if board.is_occupied(destination) && !vacated.contains(&destination) {
                Some(CollisionKind::DestinationHeld)
            } else {
                None
            };

            match kind {
                Some(kind) => {
                    proposal.accepted = false;
                    let _ = vacated.remove(&proposal.event.from);
                    collisions.push(WaveCollision {
                        kind,
                        trigger: proposal.trigger,
                        token: proposal.event.token,
                        from: proposal.event.from,
                        to: Some(destination),
                    });
                    changed = true;
                }
                None => {
                    let _ = taken.insert(destination);
                }
            }
        }

        if !changed {
            break;
        }
    }
}
