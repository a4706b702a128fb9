#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Magnetic force resolution for a single emitting token.
//!
//! [`field`] derives the links an emitter exerts on its neighbors and the
//! outcome of each one. [`OrderedSolver`] commits those outcomes against a
//! private working copy of the board: axial links before diagonal links,
//! each group by descending priority with ties kept in canonical direction
//! order. Later links observe the effects of earlier ones.

pub mod field;

use polaris_core::{Board, Coord, EjectionEvent, MoveEvent, Polarity};

use crate::field::{Link, LinkOutcome};

/// Committed effects of every link emitted by one source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverResult {
    /// Moves in commit order. Chain pushes contribute one entry per token,
    /// far end first.
    pub moves: Vec<MoveEvent>,
    /// Ejections in commit order.
    pub ejections: Vec<EjectionEvent>,
    /// Number of links that resolved to a blocked outcome.
    pub conflicts: u32,
}

impl SolverResult {
    /// Reports whether the source displaced nothing.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.moves.is_empty() && self.ejections.is_empty()
    }
}

/// Ordered solver that reuses scratch buffers between resolutions.
#[derive(Debug, Default)]
pub struct OrderedSolver {
    axial: Vec<Link>,
    diagonal: Vec<Link>,
}

impl OrderedSolver {
    /// Creates a solver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves all links emitted by a `polarity` token at `source`.
    ///
    /// The caller's board is never mutated. Identical inputs always produce
    /// identical ordered results.
    pub fn resolve(&mut self, source: Coord, polarity: Polarity, board: &Board) -> SolverResult {
        self.axial.clear();
        self.diagonal.clear();

        for link in field::links(source, polarity, board) {
            if link.direction.is_axial() {
                self.axial.push(link);
            } else {
                self.diagonal.push(link);
            }
        }

        // Stable sorts keep canonical order among equal priorities.
        self.axial.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.diagonal.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut working = board.clone();
        let mut result = SolverResult::default();
        for link in self.axial.iter().chain(self.diagonal.iter()) {
            commit(link, &mut working, &mut result);
        }
        result
    }
}

/// Resolves a single source with a throwaway solver.
#[must_use]
pub fn resolve(source: Coord, polarity: Polarity, board: &Board) -> SolverResult {
    OrderedSolver::new().resolve(source, polarity, board)
}

fn commit(link: &Link, working: &mut Board, result: &mut SolverResult) {
    let Some(outcome) = field::outcome(link, working) else {
        return;
    };

    match outcome {
        LinkOutcome::Moved { from, to } => move_token(from, to, link.priority, working, result),
        LinkOutcome::Ejected { from } => eject_token(from, working, result),
        LinkOutcome::ChainPush { cells, direction } => {
            for cell in cells.into_iter().rev() {
                let destination = cell.step(direction);
                if destination.is_valid() {
                    move_token(cell, destination, link.priority, working, result);
                } else {
                    eject_token(cell, working, result);
                }
            }
        }
        LinkOutcome::Blocked(_) => result.conflicts += 1,
    }
}

fn move_token(from: Coord, to: Coord, priority: u8, working: &mut Board, result: &mut SolverResult) {
    let Some(token) = working.get(from) else {
        return;
    };
    let event = MoveEvent {
        token: token.id(),
        from,
        to,
        priority,
    };
    if working.apply_move(&event) {
        result.moves.push(event);
    }
}

fn eject_token(from: Coord, working: &mut Board, result: &mut SolverResult) {
    let Some(token) = working.get(from) else {
        return;
    };
    let event = EjectionEvent {
        token: token.id(),
        from,
        owner: token.owner(),
    };
    if working.apply_ejection(&event) {
        result.ejections.push(event);
    }
}
