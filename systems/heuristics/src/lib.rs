#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static position evaluation used by the lookahead agents.
//!
//! The composite score weighs four player-relative components:
//! `10·tokens + 30·center + 20·stability − 15·risk`. Agents that simulate a
//! move add [`ejection_score`] for the ejections the move produced.

use polaris_core::{Board, Coord, EjectionEvent, Interaction, Player};

const TOKEN_WEIGHT: i32 = 10;
const CENTER_WEIGHT: i32 = 30;
const STABILITY_WEIGHT: i32 = 20;
const RISK_WEIGHT: i32 = 15;

const CENTER_BONUS: i32 = 100;
const NEAR_CENTER_BONUS: i32 = 20;
const NEAR_CENTER: [Coord; 4] = [
    Coord::new(1, 2),
    Coord::new(2, 1),
    Coord::new(2, 3),
    Coord::new(3, 2),
];

const EDGE_DISTANCE_STABILITY: i32 = 10;
const OWN_NEIGHBOR_STABILITY: i32 = 5;

const EDGE_RISK: i32 = 30;
const REPULSION_RISK: i32 = 15;

const OWN_LOSS_PENALTY: i32 = -30;
const OPPONENT_EJECTION_REWARD: i32 = 50;

/// Composite score and its components for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Evaluation {
    /// Player the evaluation is relative to.
    pub player: Player,
    /// Weighted composite score.
    pub score: i32,
    /// Number of tokens the player owns.
    pub token_count: i32,
    /// Center occupancy score.
    pub center_control: i32,
    /// Edge distance and friendly support score.
    pub stability: i32,
    /// Exposure to the edge and to repelling opponents.
    pub risk: i32,
}

/// Evaluates `board` from the perspective of `player`.
#[must_use]
pub fn evaluate(board: &Board, player: Player) -> Evaluation {
    let token_count = i32::try_from(board.count_owned(player)).unwrap_or(i32::MAX);
    let center_control = center_control(board, player);
    let stability = stability(board, player);
    let risk = risk(board, player);

    Evaluation {
        player,
        score: TOKEN_WEIGHT * token_count + CENTER_WEIGHT * center_control
            + STABILITY_WEIGHT * stability
            - RISK_WEIGHT * risk,
        token_count,
        center_control,
        stability,
        risk,
    }
}

/// Composite score only; shorthand for `evaluate(board, player).score`.
#[must_use]
pub fn score(board: &Board, player: Player) -> i32 {
    evaluate(board, player).score
}

/// Scores ejections from `player`'s perspective: −30 per own token lost,
/// +50 per opposing token ejected.
#[must_use]
pub fn ejection_score(ejections: &[EjectionEvent], player: Player) -> i32 {
    ejections
        .iter()
        .map(|ejection| {
            if ejection.owner == player {
                OWN_LOSS_PENALTY
            } else {
                OPPONENT_EJECTION_REWARD
            }
        })
        .sum()
}

fn owns(board: &Board, cell: Coord, player: Player) -> bool {
    board.get(cell).is_some_and(|token| token.owner() == player)
}

fn center_control(board: &Board, player: Player) -> i32 {
    let center = if owns(board, Coord::CENTER, player) {
        CENTER_BONUS
    } else {
        0
    };
    let near = NEAR_CENTER
        .iter()
        .filter(|cell| owns(board, **cell, player))
        .count();
    center + NEAR_CENTER_BONUS * i32::try_from(near).unwrap_or(0)
}

fn stability(board: &Board, player: Player) -> i32 {
    board
        .occupied()
        .filter(|(_, token)| token.owner() == player)
        .map(|(cell, _)| {
            let supporters = cell
                .neighbors()
                .filter(|(_, neighbor)| owns(board, *neighbor, player))
                .count();
            EDGE_DISTANCE_STABILITY * i32::from(cell.edge_distance())
                + OWN_NEIGHBOR_STABILITY * i32::try_from(supporters).unwrap_or(0)
        })
        .sum()
}

// No edge-push bonus: a neighbor that exists is always on the board.
fn risk(board: &Board, player: Player) -> i32 {
    board
        .occupied()
        .filter(|(_, token)| token.owner() == player)
        .map(|(cell, token)| {
            let edge = if cell.is_edge() { EDGE_RISK } else { 0 };
            let repelling = cell
                .neighbors()
                .filter_map(|(_, neighbor)| board.get(neighbor))
                .filter(|other| other.owner() != player)
                .filter(|other| {
                    token.polarity().interaction_with(other.polarity()) == Interaction::Repulsion
                })
                .count();
            edge + REPULSION_RISK * i32::try_from(repelling).unwrap_or(0)
        })
        .sum()
}
