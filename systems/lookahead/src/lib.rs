#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Move selection agents for three difficulty levels.
//!
//! All agents are player-relative and use the cascade fast path as their
//! forward model. Searches are reproducible: candidates are ranked with a
//! stable order and every comparison keeps the first of equal scores.

use std::{fmt, str::FromStr};

use polaris_core::{Board, Candidate, Player};
use polaris_system_cascade::{CascadeManager, FastOutcome};
use polaris_system_heuristics::{ejection_score, evaluate};
use polaris_system_movegen::{generate, rank_candidates};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const TACTICAL_BREADTH: usize = 15;
const FORESIGHT_ROOT_BREADTH: usize = 10;
const FORESIGHT_REPLY_BREADTH: usize = 5;
const FORESIGHT_DEPTH: u32 = 2;

/// Strength of the move selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Takes the first placement that loses nothing.
    Reactive,
    /// Scores the best ranked placements one ply deep.
    Tactical,
    /// Three-ply minimax over the best ranked placements.
    Foresight,
}

impl Difficulty {
    /// Every difficulty from weakest to strongest.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Reactive,
        Difficulty::Tactical,
        Difficulty::Foresight,
    ];

    /// Lowercase name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reactive => "reactive",
            Self::Tactical => "tactical",
            Self::Foresight => "foresight",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a difficulty name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}`, expected reactive, tactical or foresight")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(text.trim()))
            .ok_or_else(|| UnknownDifficulty(text.to_owned()))
    }
}

/// Placement chosen by an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decision {
    /// The chosen placement.
    pub candidate: Candidate,
    /// Search score backing the choice; reactive choices carry none.
    pub score: Option<i32>,
}

/// Agent selecting placements for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookaheadAgent {
    difficulty: Difficulty,
    player: Player,
    cascade: CascadeManager,
}

impl LookaheadAgent {
    /// Creates an agent using the default cascade depth.
    #[must_use]
    pub fn new(difficulty: Difficulty, player: Player) -> Self {
        Self::with_cascade(difficulty, player, CascadeManager::default())
    }

    /// Creates an agent simulating with `cascade`.
    #[must_use]
    pub const fn with_cascade(
        difficulty: Difficulty,
        player: Player,
        cascade: CascadeManager,
    ) -> Self {
        Self {
            difficulty,
            player,
            cascade,
        }
    }

    /// Difficulty the agent plays at.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Player the agent moves for.
    #[must_use]
    pub const fn player(&self) -> Player {
        self.player
    }

    /// Chooses a placement, or `None` when the board is full.
    #[must_use]
    pub fn select_move(&self, board: &Board) -> Option<Candidate> {
        self.decide(board).map(|decision| decision.candidate)
    }

    /// Chooses a placement and reports the score behind it.
    #[must_use]
    pub fn decide(&self, board: &Board) -> Option<Decision> {
        let decision = match self.difficulty {
            Difficulty::Reactive => self.reactive(board),
            Difficulty::Tactical => self.tactical(board),
            Difficulty::Foresight => self.foresight(board),
        };
        if let Some(decision) = decision {
            debug!(
                difficulty = %self.difficulty,
                player = self.player.seat(),
                candidate = %decision.candidate,
                score = ?decision.score,
                "lookahead decision"
            );
        }
        decision
    }

    fn reactive(&self, board: &Board) -> Option<Decision> {
        let candidates = generate(board);
        let safe = candidates.iter().copied().find(|candidate| {
            self.simulate(*candidate, self.player, board)
                .is_some_and(|outcome| outcome.losses_for(self.player) == 0)
        });
        safe.or_else(|| candidates.first().copied())
            .map(|candidate| Decision {
                candidate,
                score: None,
            })
    }

    fn tactical(&self, board: &Board) -> Option<Decision> {
        let ranked = rank_candidates(board, self.player);
        let scored = ranked.iter().take(TACTICAL_BREADTH).filter_map(|candidate| {
            self.simulate(*candidate, self.player, board)
                .map(|outcome| (*candidate, self.terminal_score(&outcome)))
        });
        match first_best(scored) {
            Some((candidate, score)) => Some(Decision {
                candidate,
                score: Some(score),
            }),
            None => ranked.first().map(|candidate| Decision {
                candidate: *candidate,
                score: None,
            }),
        }
    }

    fn foresight(&self, board: &Board) -> Option<Decision> {
        let ranked = rank_candidates(board, self.player);
        let roots = &ranked[..ranked.len().min(FORESIGHT_ROOT_BREADTH)];

        #[cfg(feature = "parallel")]
        let values: Vec<Option<i32>> = roots
            .par_iter()
            .map(|candidate| self.line_value(*candidate, board, FORESIGHT_DEPTH, true))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let values: Vec<Option<i32>> = roots
            .iter()
            .map(|candidate| self.line_value(*candidate, board, FORESIGHT_DEPTH, true))
            .collect();

        let scored = roots
            .iter()
            .zip(values)
            .filter_map(|(candidate, value)| value.map(|value| (*candidate, value)));
        first_best(scored).map(|(candidate, score)| Decision {
            candidate,
            score: Some(score),
        })
    }

    /// Value of playing `candidate` on `board`, always from the agent's
    /// perspective. `maximizing` marks a placement made by the agent itself.
    fn line_value(
        &self,
        candidate: Candidate,
        board: &Board,
        depth: u32,
        maximizing: bool,
    ) -> Option<i32> {
        let mover = if maximizing {
            self.player
        } else {
            self.player.opponent()
        };
        let outcome = self.simulate(candidate, mover, board)?;
        if depth == 0 {
            return Some(self.terminal_score(&outcome));
        }

        let replier = mover.opponent();
        let replies = rank_candidates(&outcome.board, replier);
        let values = replies
            .iter()
            .take(FORESIGHT_REPLY_BREADTH)
            .filter_map(|reply| self.line_value(*reply, &outcome.board, depth - 1, !maximizing));
        let value = if maximizing {
            values.min()
        } else {
            values.max()
        };

        Some(value.unwrap_or_else(|| self.terminal_score(&outcome)))
    }

    fn terminal_score(&self, outcome: &FastOutcome) -> i32 {
        evaluate(&outcome.board, self.player).score + ejection_score(&outcome.ejections, self.player)
    }

    fn simulate(&self, candidate: Candidate, owner: Player, board: &Board) -> Option<FastOutcome> {
        let token = board.fresh_token(owner, candidate.polarity);
        self.cascade
            .fast_simulate(candidate.cell, token, board)
            .ok()
    }
}

/// Chooses a placement for `player` at `difficulty` with the default
/// cascade depth.
#[must_use]
pub fn select_move(board: &Board, difficulty: Difficulty, player: Player) -> Option<Candidate> {
    LookaheadAgent::new(difficulty, player).select_move(board)
}

/// Highest score, keeping the earliest entry among equals.
fn first_best<I>(scored: I) -> Option<(Candidate, i32)>
where
    I: IntoIterator<Item = (Candidate, i32)>,
{
    scored.into_iter().fold(None, |best, (candidate, score)| match best {
        Some((_, best_score)) if best_score >= score => best,
        _ => Some((candidate, score)),
    })
}

#[cfg(test)]
mod tests {
    use super::{first_best, Difficulty, LookaheadAgent, FORESIGHT_REPLY_BREADTH};
    use polaris_core::{Board, Candidate, Coord, Player, Polarity, Token, TokenId};
    use polaris_system_movegen::rank_candidates;

    fn edge_target_board() -> Board {
        let mut board = Board::new();
        let _ = board.insert(
            Coord::CENTER,
            Token::new(TokenId::new(0), Player::One, Polarity::Alpha).locked(),
        );
        let _ = board.insert(
            Coord::new(0, 2),
            Token::new(TokenId::new(1), Player::Two, Polarity::Alpha),
        );
        board
    }

    /// Terminal scores of `replier`'s ranked answers to `board`.
    fn reply_scores(agent: &LookaheadAgent, board: &Board, replier: Player) -> Vec<i32> {
        rank_candidates(board, replier)
            .into_iter()
            .take(FORESIGHT_REPLY_BREADTH)
            .filter_map(|reply| agent.simulate(reply, replier, board))
            .map(|outcome| agent.terminal_score(&outcome))
            .collect()
    }

    #[test]
    fn own_placement_is_valued_by_the_opponents_strongest_answer() {
        let board = edge_target_board();
        let agent = LookaheadAgent::new(Difficulty::Foresight, Player::One);
        let root = Candidate::new(Coord::new(1, 2), Polarity::Alpha);
        let after = agent.simulate(root, Player::One, &board).expect("legal placement");

        let scores = reply_scores(&agent, &after.board, Player::Two);
        let weakest = scores.iter().copied().min().expect("replies exist");
        let strongest = scores.iter().copied().max().expect("replies exist");

        assert!(weakest < strongest, "answers must differ: {scores:?}");
        assert_eq!(agent.line_value(root, &board, 1, true), Some(weakest));
    }

    #[test]
    fn opponent_placement_is_valued_by_the_agents_best_answer() {
        let board = edge_target_board();
        let agent = LookaheadAgent::new(Difficulty::Foresight, Player::One);
        let reply = Candidate::new(Coord::new(2, 1), Polarity::Beta);
        let after = agent.simulate(reply, Player::Two, &board).expect("legal placement");

        let best = reply_scores(&agent, &after.board, Player::One)
            .into_iter()
            .max()
            .expect("answers exist");

        assert_eq!(agent.line_value(reply, &board, 1, false), Some(best));
    }

    #[test]
    fn first_best_keeps_the_earliest_tie() {
        let first = Candidate::new(Coord::new(0, 0), Polarity::Alpha);
        let second = Candidate::new(Coord::new(0, 1), Polarity::Alpha);
        let third = Candidate::new(Coord::new(0, 2), Polarity::Beta);

        let best = first_best([(first, 5), (second, 7), (third, 7)]);

        assert_eq!(best, Some((second, 7)));
        assert_eq!(first_best(std::iter::empty()), None);
    }

    #[test]
    fn difficulty_names_parse_case_insensitively() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.name().parse::<Difficulty>(), Ok(difficulty));
        }
        assert_eq!("Foresight".parse::<Difficulty>(), Ok(Difficulty::Foresight));
        assert!("grandmaster".parse::<Difficulty>().is_err());
    }
}
