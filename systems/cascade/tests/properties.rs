use std::collections::BTreeMap;

use polaris_core::{Board, Coord, Player, Polarity, Token, TokenId};
use polaris_system_cascade::CascadeManager;
use proptest::prelude::*;

type CellSeed = Option<(bool, bool, u8)>;

fn board_strategy() -> impl Strategy<Value = Vec<CellSeed>> {
    proptest::collection::vec(
        proptest::option::weighted(0.45, (any::<bool>(), any::<bool>(), 0u8..8)),
        25,
    )
}

fn build_board(seeds: &[CellSeed]) -> Board {
    let mut board = Board::new();
    for (index, (cell, seed)) in Coord::all().zip(seeds).enumerate() {
        let Some((second_seat, beta, lock_roll)) = *seed else {
            continue;
        };
        let owner = if second_seat { Player::Two } else { Player::One };
        let polarity = if beta { Polarity::Beta } else { Polarity::Alpha };
        let id = TokenId::new(u32::try_from(index).expect("25 cells"));
        let mut token = Token::new(id, owner, polarity);
        if lock_roll == 0 {
            token = token.locked();
        }
        let _ = board.insert(cell, token);
    }
    board
}

fn cell_at(index: usize) -> Coord {
    Coord::all().nth(index).expect("index within grid")
}

proptest! {
    #[test]
    fn fast_path_never_diverges(
        seeds in board_strategy(),
        placement in 0usize..25,
        beta in any::<bool>(),
        depth in 1u32..12,
    ) {
        let board = build_board(&seeds);
        let cell = cell_at(placement);
        prop_assume!(!board.is_occupied(cell));
        let polarity = if beta { Polarity::Beta } else { Polarity::Alpha };
        let token = board.fresh_token(Player::One, polarity);
        let manager = CascadeManager::new(depth);

        let recorded = manager.simulate(cell, token, &board).expect("legal placement");
        let fast = manager.fast_simulate(cell, token, &board).expect("legal placement");

        prop_assert_eq!(&recorded.final_board, &fast.board);
        prop_assert_eq!(&recorded.ejections, &fast.ejections);
        prop_assert!(recorded.chain_length() >= 1);
        prop_assert!(recorded.chain_length() <= depth as usize);
    }

    #[test]
    fn every_token_ends_on_the_board_or_ejected_exactly_once(
        seeds in board_strategy(),
        placement in 0usize..25,
        beta in any::<bool>(),
    ) {
        let board = build_board(&seeds);
        let cell = cell_at(placement);
        prop_assume!(!board.is_occupied(cell));
        let polarity = if beta { Polarity::Beta } else { Polarity::Alpha };
        let token = board.fresh_token(Player::Two, polarity);

        let result = CascadeManager::default()
            .simulate(cell, token, &board)
            .expect("legal placement");

        let mut seen: BTreeMap<TokenId, usize> = BTreeMap::new();
        for (_, resident) in result.final_board.occupied() {
            *seen.entry(resident.id()).or_default() += 1;
        }
        for ejection in &result.ejections {
            *seen.entry(ejection.token).or_default() += 1;
        }

        let mut expected: Vec<TokenId> = board.occupied().map(|(_, resident)| resident.id()).collect();
        expected.push(token.id());
        expected.sort();
        let observed: Vec<TokenId> = seen.keys().copied().collect();
        prop_assert_eq!(observed, expected);
        prop_assert!(seen.values().all(|count| *count == 1));
    }

    #[test]
    fn locked_tokens_never_move(
        seeds in board_strategy(),
        placement in 0usize..25,
        beta in any::<bool>(),
    ) {
        let board = build_board(&seeds);
        let cell = cell_at(placement);
        prop_assume!(!board.is_occupied(cell));
        let polarity = if beta { Polarity::Beta } else { Polarity::Alpha };
        let token = board.fresh_token(Player::One, polarity);

        let result = CascadeManager::default()
            .simulate(cell, token, &board)
            .expect("legal placement");

        for (origin, resident) in board.occupied().filter(|(_, resident)| resident.is_locked()) {
            prop_assert_eq!(result.final_board.get(origin), Some(resident));
        }
    }
}
