#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Candidate enumeration and cheap static ranking for the lookahead agents.

use std::cmp::Reverse;

use polaris_core::{Board, Candidate, Coord, Player, Polarity};

const CENTER_BONUS: i32 = 50;
const NEAR_CENTER_BONUS: i32 = 30;
const NEIGHBOR_BONUS: i32 = 10;
const EDGE_PENALTY: i32 = -20;

/// Every legal placement: each empty cell in row-major order, once per
/// polarity (`Alpha` before `Beta`).
#[must_use]
pub fn generate(board: &Board) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    generate_into(board, &mut candidates);
    candidates
}

/// Appends every legal placement to `out` in enumeration order.
pub fn generate_into(board: &Board, out: &mut Vec<Candidate>) {
    for cell in board.empty_cells() {
        for polarity in Polarity::ALL {
            out.push(Candidate::new(cell, polarity));
        }
    }
}

/// Static desirability of `candidate` without simulating it.
///
/// Rewards the center (+50) and its four axial neighbors (+30), every
/// occupied neighbor (+10 each), and penalizes edge cells (−20). Polarity is
/// ignored.
#[must_use]
pub fn quick_score(candidate: Candidate, board: &Board) -> i32 {
    let cell = candidate.cell;
    let mut score = 0;

    if cell.is_center() {
        score += CENTER_BONUS;
    } else if cell.manhattan_distance(Coord::CENTER) == 1 {
        score += NEAR_CENTER_BONUS;
    }

    let occupied = cell
        .neighbors()
        .filter(|(_, neighbor)| board.is_occupied(*neighbor))
        .count();
    score += NEIGHBOR_BONUS * i32::try_from(occupied).unwrap_or(0);

    if cell.is_edge() {
        score += EDGE_PENALTY;
    }

    score
}

/// Candidates ordered by descending [`quick_score`]. Equal scores keep
/// enumeration order, so the ranking is reproducible.
///
/// The ranking is the same for both players; the seat is accepted so
/// callers can stay player-relative.
#[must_use]
pub fn rank_candidates(board: &Board, _player: Player) -> Vec<Candidate> {
    let mut scored: Vec<(i32, Candidate)> = generate(board)
        .into_iter()
        .map(|candidate| (quick_score(candidate, board), candidate))
        .collect();
    scored.sort_by_key(|(score, _)| Reverse(*score));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}
