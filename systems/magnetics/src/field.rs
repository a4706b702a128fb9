//! Local field: the directed interactions one emitter exerts on its
//! neighbors and the physical outcome of each against a board.

use polaris_core::{Board, Coord, Direction, Interaction, Polarity};

const AXIAL_PRIORITY: u8 = 100;
const DIAGONAL_PRIORITY: u8 = 50;
const REPULSION_BONUS: u8 = 10;

/// Directed interaction between an emitter and one occupied neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    /// Cell of the emitting token.
    pub source: Coord,
    /// Cell of the affected neighbor.
    pub target: Coord,
    /// Direction from the source to the target.
    pub direction: Direction,
    /// Force kind derived from the two polarities.
    pub interaction: Interaction,
    /// Resolution priority; higher resolves first within an axis class.
    pub priority: u8,
}

impl Link {
    /// Priority of a link: axial 100, diagonal 50, plus 10 for repulsion.
    #[must_use]
    pub const fn priority_for(direction: Direction, interaction: Interaction) -> u8 {
        let base = if direction.is_axial() {
            AXIAL_PRIORITY
        } else {
            DIAGONAL_PRIORITY
        };
        match interaction {
            Interaction::Repulsion => base + REPULSION_BONUS,
            Interaction::Attraction => base,
        }
    }
}

/// Why a link produced no displacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// The target is anchored or locked.
    Immovable,
    /// A token further down the pushed line is anchored or locked.
    ChainImmovable,
    /// Target and source are not adjacent, so no pull direction exists.
    NoPullDirection,
    /// The pulled token would leave the board.
    PullOffGrid,
    /// The pulled token would land on the emitter itself.
    PullIntoSource,
    /// The pulled token would land on an occupied cell.
    PullOccupied,
}

/// Physical result of resolving one link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The target moves one cell.
    Moved {
        /// Cell the target leaves.
        from: Coord,
        /// Cell the target enters.
        to: Coord,
    },
    /// Nothing moves.
    Blocked(BlockReason),
    /// The target is pushed off the board.
    Ejected {
        /// Cell the target leaves.
        from: Coord,
    },
    /// A contiguous line starting at the target is pushed as a unit.
    ChainPush {
        /// Cells of the line ordered from the target outward.
        cells: Vec<Coord>,
        /// Direction of the push.
        direction: Direction,
    },
}

/// Links from an emitter of `polarity` at `source` to every occupied
/// neighbor, in canonical direction order.
#[must_use]
pub fn links(source: Coord, polarity: Polarity, board: &Board) -> Vec<Link> {
    let mut out = Vec::with_capacity(Direction::CANONICAL.len());
    collect_links(source, polarity, board, &mut out);
    out
}

/// Appends the links of [`links`] to `out` without clearing it.
pub fn collect_links(source: Coord, polarity: Polarity, board: &Board, out: &mut Vec<Link>) {
    for (direction, target) in source.neighbors() {
        let Some(token) = board.get(target) else {
            continue;
        };
        let interaction = polarity.interaction_with(token.polarity());
        out.push(Link {
            source,
            target,
            direction,
            interaction,
            priority: Link::priority_for(direction, interaction),
        });
    }
}

/// Resolves `link` against the current `board`.
///
/// Returns `None` when the target cell has been vacated since the link was
/// generated.
#[must_use]
pub fn outcome(link: &Link, board: &Board) -> Option<LinkOutcome> {
    let token = board.get(link.target)?;
    if !token.is_movable() {
        return Some(LinkOutcome::Blocked(BlockReason::Immovable));
    }

    Some(match link.interaction {
        Interaction::Repulsion => push(link.target, link.direction, board),
        Interaction::Attraction => pull(link.target, link.source, board),
    })
}

fn push(target: Coord, direction: Direction, board: &Board) -> LinkOutcome {
    let destination = target.step(direction);
    if !destination.is_valid() {
        return LinkOutcome::Ejected { from: target };
    }
    if !board.is_occupied(destination) {
        return LinkOutcome::Moved {
            from: target,
            to: destination,
        };
    }

    let mut cells = vec![target];
    let mut current = target;
    while let Some(next) = current.neighbor(direction) {
        if !board.is_occupied(next) {
            break;
        }
        cells.push(next);
        current = next;
    }

    let immovable = cells
        .iter()
        .filter_map(|cell| board.get(*cell))
        .any(|token| !token.is_movable());
    if immovable {
        return LinkOutcome::Blocked(BlockReason::ChainImmovable);
    }

    LinkOutcome::ChainPush { cells, direction }
}

fn pull(target: Coord, source: Coord, board: &Board) -> LinkOutcome {
    let Some(direction) = target.direction_to(source) else {
        return LinkOutcome::Blocked(BlockReason::NoPullDirection);
    };
    let destination = target.step(direction);
    if !destination.is_valid() {
        return LinkOutcome::Blocked(BlockReason::PullOffGrid);
    }
    if destination == source {
        return LinkOutcome::Blocked(BlockReason::PullIntoSource);
    }
    if board.is_occupied(destination) {
        return LinkOutcome::Blocked(BlockReason::PullOccupied);
    }
    LinkOutcome::Moved {
        from: target,
        to: destination,
    }
}

#[cfg(test)]
mod tests {
    use polaris_core::{Board, Coord, Direction, Interaction, Player, Polarity, Token, TokenId};

    use super::{links, outcome, BlockReason, Link, LinkOutcome};

    fn board_with(tokens: &[(Coord, Polarity, bool)]) -> Board {
        let mut board = Board::new();
        for (index, (cell, polarity, locked)) in tokens.iter().enumerate() {
            let id = TokenId::new(u32::try_from(index).expect("few tokens"));
            let mut token = Token::new(id, Player::Two, *polarity);
            if *locked {
                token = token.locked();
            }
            assert!(board.insert(*cell, token).is_none());
        }
        board
    }

    #[test]
    fn priorities_favor_axial_then_repulsion() {
        assert_eq!(Link::priority_for(Direction::North, Interaction::Repulsion), 110);
        assert_eq!(Link::priority_for(Direction::East, Interaction::Attraction), 100);
        assert_eq!(Link::priority_for(Direction::SouthWest, Interaction::Repulsion), 60);
        assert_eq!(Link::priority_for(Direction::NorthEast, Interaction::Attraction), 50);
    }

    #[test]
    fn links_skip_empty_neighbors_and_follow_canonical_order() {
        let board = board_with(&[
            (Coord::new(1, 3), Polarity::Alpha, false),
            (Coord::new(2, 1), Polarity::Beta, false),
            (Coord::new(3, 2), Polarity::Alpha, false),
        ]);

        let found = links(Coord::CENTER, Polarity::Alpha, &board);
        let directions: Vec<_> = found.iter().map(|link| link.direction).collect();
        assert_eq!(
            directions,
            vec![Direction::South, Direction::West, Direction::NorthEast]
        );
        assert_eq!(found[1].interaction, Interaction::Attraction);
    }

    #[test]
    fn repulsion_off_the_edge_ejects() {
        let board = board_with(&[(Coord::new(2, 4), Polarity::Alpha, false)]);
        let link = links(Coord::new(2, 3), Polarity::Alpha, &board)[0];
        assert_eq!(
            outcome(&link, &board),
            Some(LinkOutcome::Ejected {
                from: Coord::new(2, 4)
            })
        );
    }

    #[test]
    fn locked_target_is_blocked() {
        let board = board_with(&[(Coord::new(1, 2), Polarity::Alpha, true)]);
        let link = links(Coord::CENTER, Polarity::Alpha, &board)[0];
        assert_eq!(
            outcome(&link, &board),
            Some(LinkOutcome::Blocked(BlockReason::Immovable))
        );
    }

    #[test]
    fn attraction_between_neighbors_never_moves() {
        let board = board_with(&[(Coord::new(1, 1), Polarity::Beta, false)]);
        let link = links(Coord::CENTER, Polarity::Alpha, &board)[0];
        assert_eq!(
            outcome(&link, &board),
            Some(LinkOutcome::Blocked(BlockReason::PullIntoSource))
        );
    }

    #[test]
    fn pull_without_adjacency_is_blocked() {
        let board = board_with(&[(Coord::new(0, 2), Polarity::Beta, false)]);
        let link = Link {
            source: Coord::CENTER,
            target: Coord::new(0, 2),
            direction: Direction::North,
            interaction: Interaction::Attraction,
            priority: 100,
        };
        assert_eq!(
            outcome(&link, &board),
            Some(LinkOutcome::Blocked(BlockReason::NoPullDirection))
        );
    }

    #[test]
    fn chain_collects_contiguous_line() {
        let board = board_with(&[
            (Coord::new(2, 1), Polarity::Alpha, false),
            (Coord::new(2, 0), Polarity::Beta, false),
        ]);
        let link = links(Coord::CENTER, Polarity::Alpha, &board)[0];
        assert_eq!(
            outcome(&link, &board),
            Some(LinkOutcome::ChainPush {
                cells: vec![Coord::new(2, 1), Coord::new(2, 0)],
                direction: Direction::West,
            })
        );
    }

    #[test]
    fn chain_with_locked_tail_is_blocked() {
        let board = board_with(&[
            (Coord::new(1, 2), Polarity::Alpha, false),
            (Coord::new(0, 2), Polarity::Alpha, true),
        ]);
        let link = links(Coord::CENTER, Polarity::Alpha, &board)[0];
        assert_eq!(
            outcome(&link, &board),
            Some(LinkOutcome::Blocked(BlockReason::ChainImmovable))
        );
    }
}
