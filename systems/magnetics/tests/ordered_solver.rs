use polaris_core::{Board, Coord, EjectionEvent, MoveEvent, Player, Polarity, Token, TokenId};
use polaris_system_magnetics::{resolve, OrderedSolver};

struct Layout {
    board: Board,
    next: u32,
}

impl Layout {
    fn new() -> Self {
        Self {
            board: Board::new(),
            next: 0,
        }
    }

    fn put(mut self, cell: Coord, owner: Player, polarity: Polarity) -> Self {
        let token = Token::new(TokenId::new(self.next), owner, polarity);
        self.next += 1;
        assert!(self.board.insert(cell, token).is_none());
        self
    }

    fn put_locked(mut self, cell: Coord, owner: Player, polarity: Polarity) -> Self {
        let token = Token::new(TokenId::new(self.next), owner, polarity).locked();
        self.next += 1;
        assert!(self.board.insert(cell, token).is_none());
        self
    }

    fn id_at(&self, cell: Coord) -> TokenId {
        self.board.get(cell).expect("cell occupied").id()
    }
}

#[test]
fn identical_inputs_resolve_identically() {
    let layout = Layout::new()
        .put(Coord::CENTER, Player::One, Polarity::Alpha)
        .put(Coord::new(1, 2), Player::Two, Polarity::Alpha)
        .put(Coord::new(3, 3), Player::Two, Polarity::Alpha)
        .put(Coord::new(2, 3), Player::One, Polarity::Beta)
        .put(Coord::new(2, 1), Player::Two, Polarity::Alpha)
        .put(Coord::new(2, 0), Player::One, Polarity::Beta);

    let mut solver = OrderedSolver::new();
    let first = solver.resolve(Coord::CENTER, Polarity::Alpha, &layout.board);
    let second = solver.resolve(Coord::CENTER, Polarity::Alpha, &layout.board);
    let third = resolve(Coord::CENTER, Polarity::Alpha, &layout.board);

    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn axial_links_commit_before_diagonal_links() {
    let layout = Layout::new()
        .put(Coord::CENTER, Player::One, Polarity::Alpha)
        .put(Coord::new(1, 3), Player::Two, Polarity::Alpha)
        .put(Coord::new(2, 1), Player::Two, Polarity::Alpha)
        .put(Coord::new(3, 2), Player::Two, Polarity::Beta);

    let result = resolve(Coord::CENTER, Polarity::Alpha, &layout.board);

    assert_eq!(
        result.moves,
        vec![
            MoveEvent {
                token: layout.id_at(Coord::new(2, 1)),
                from: Coord::new(2, 1),
                to: Coord::new(2, 0),
                priority: 110,
            },
            MoveEvent {
                token: layout.id_at(Coord::new(1, 3)),
                from: Coord::new(1, 3),
                to: Coord::new(0, 4),
                priority: 60,
            },
        ],
        "the axial push must be committed ahead of the diagonal push",
    );
    assert!(result.ejections.is_empty());
    assert_eq!(result.conflicts, 1, "the attracted southern neighbor is blocked");
}

#[test]
fn locked_token_anywhere_in_chain_freezes_the_line() {
    let layout = Layout::new()
        .put(Coord::new(2, 0), Player::One, Polarity::Alpha)
        .put(Coord::new(2, 1), Player::Two, Polarity::Alpha)
        .put_locked(Coord::new(2, 2), Player::Two, Polarity::Beta)
        .put(Coord::new(2, 3), Player::Two, Polarity::Alpha)
        .put(Coord::new(2, 4), Player::One, Polarity::Beta);

    let result = resolve(Coord::new(2, 0), Polarity::Alpha, &layout.board);

    assert!(result.moves.is_empty(), "no partial pushes: {:?}", result.moves);
    assert!(result.ejections.is_empty());
    assert_eq!(result.conflicts, 1);
}

#[test]
fn chain_push_resolves_far_end_first() {
    let layout = Layout::new()
        .put(Coord::new(2, 0), Player::One, Polarity::Alpha)
        .put(Coord::new(2, 1), Player::Two, Polarity::Alpha)
        .put(Coord::new(2, 2), Player::Two, Polarity::Beta)
        .put(Coord::new(2, 3), Player::One, Polarity::Alpha)
        .put(Coord::new(2, 4), Player::Two, Polarity::Beta);

    let result = resolve(Coord::new(2, 0), Polarity::Alpha, &layout.board);

    assert_eq!(
        result.ejections,
        vec![EjectionEvent {
            token: layout.id_at(Coord::new(2, 4)),
            from: Coord::new(2, 4),
            owner: Player::Two,
        }]
    );
    let hops: Vec<_> = result.moves.iter().map(|event| (event.from, event.to)).collect();
    assert_eq!(
        hops,
        vec![
            (Coord::new(2, 3), Coord::new(2, 4)),
            (Coord::new(2, 2), Coord::new(2, 3)),
            (Coord::new(2, 1), Coord::new(2, 2)),
        ]
    );
    assert!(result.moves.iter().all(|event| event.priority == 110));
}

#[test]
fn anchored_neighbor_counts_as_conflict() {
    let mut layout = Layout::new()
        .put(Coord::CENTER, Player::One, Polarity::Beta)
        .put(Coord::new(1, 1), Player::Two, Polarity::Beta);
    let anchored = layout
        .board
        .get(Coord::new(1, 1))
        .expect("occupied")
        .with_anchor(true);
    let _ = layout.board.insert(Coord::new(1, 1), anchored);

    let result = resolve(Coord::CENTER, Polarity::Beta, &layout.board);

    assert!(result.is_inert());
    assert_eq!(result.conflicts, 1);
}

#[test]
fn caller_board_is_never_mutated() {
    let layout = Layout::new()
        .put(Coord::CENTER, Player::One, Polarity::Alpha)
        .put(Coord::new(1, 2), Player::Two, Polarity::Alpha)
        .put(Coord::new(3, 1), Player::Two, Polarity::Alpha);
    let before = layout.board.clone();

    let result = resolve(Coord::CENTER, Polarity::Alpha, &layout.board);

    assert_eq!(result.moves.len(), 2);
    assert_eq!(layout.board, before);
}
