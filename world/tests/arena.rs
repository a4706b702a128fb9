use polaris_core::{
    AbilityCosts, Board, ConfigError, Coord, Direction, EjectionEvent, EngineConfig,
    PlacementError, Player, Polarity, Token, TokenId,
};
use polaris_system_boundary::{ScoreChange, ScoreKind};
use polaris_world::{
    self as world, query, Ability, AbilityFailure, AbilityOutcome, AbilityRequest, Arena, Command,
    EnergyWallet, Event,
};

fn arena_with(tokens: &[(Coord, Token)], config: EngineConfig) -> Arena {
    let mut board = Board::new();
    for (cell, token) in tokens {
        assert!(board.insert(*cell, *token).is_none());
    }
    Arena::with_board(board, config).expect("valid config")
}

fn run(arena: &mut Arena, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(arena, command, &mut events);
    events
}

#[test]
fn placement_scores_ejections_and_grants_energy() {
    let near = Token::new(TokenId::new(0), Player::One, Polarity::Alpha);
    let edge = Token::new(TokenId::new(1), Player::Two, Polarity::Alpha);
    let mut arena = arena_with(
        &[(Coord::new(2, 3), near), (Coord::new(2, 4), edge)],
        EngineConfig::default(),
    );

    let events = run(
        &mut arena,
        Command::Place {
            player: Player::One,
            cell: Coord::CENTER,
            polarity: Polarity::Alpha,
        },
    );

    assert_eq!(
        events,
        vec![
            Event::TokenPlaced {
                player: Player::One,
                cell: Coord::CENTER,
                token: TokenId::new(2),
                polarity: Polarity::Alpha,
            },
            Event::CascadeResolved {
                player: Player::One,
                steps: 1,
                moves: 1,
                collisions: 0,
            },
            Event::TokenEjected(EjectionEvent {
                token: edge.id(),
                from: Coord::new(2, 4),
                owner: Player::Two,
            }),
            Event::ScoreChanged {
                change: ScoreChange::new(Player::Two, ScoreKind::LostOwn),
                total: -1,
            },
            Event::ScoreChanged {
                change: ScoreChange::new(Player::One, ScoreKind::EjectedOpponent),
                total: 1,
            },
            Event::EnergyChanged {
                player: Player::One,
                delta: 1,
                current: 1,
            },
        ]
    );
    assert_eq!(query::score(&arena, Player::One), 1);
    assert_eq!(query::score(&arena, Player::Two), -1);
    assert_eq!(query::board(&arena).get(Coord::new(2, 4)), Some(near));
    assert_eq!(query::placements(&arena), 1);
}

#[test]
fn illegal_placement_changes_nothing() {
    let resident = Token::new(TokenId::new(0), Player::Two, Polarity::Beta);
    let mut arena = arena_with(&[(Coord::CENTER, resident)], EngineConfig::default());
    let before = arena.clone();

    let events = run(
        &mut arena,
        Command::Place {
            player: Player::One,
            cell: Coord::CENTER,
            polarity: Polarity::Alpha,
        },
    );

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            player: Player::One,
            reason: PlacementError::Occupied(Coord::CENTER),
        }]
    );
    assert_eq!(arena, before);
}

#[test]
fn abilities_charge_only_on_success() {
    let config = EngineConfig {
        energy_per_turn: 5,
        ..EngineConfig::default()
    };
    let opponent = Token::new(TokenId::new(0), Player::Two, Polarity::Beta);
    let mut arena = arena_with(&[(Coord::new(4, 4), opponent)], config);
    let flip = |cell| Command::UseAbility {
        request: AbilityRequest::new(Player::One, Ability::Flip { cell }),
    };

    let broke = run(&mut arena, flip(Coord::new(0, 0)));
    assert_eq!(
        broke,
        vec![Event::AbilityRejected {
            player: Player::One,
            failure: AbilityFailure::InsufficientEnergy {
                required: 2,
                available: 0,
            },
        }]
    );

    let _ = run(
        &mut arena,
        Command::Place {
            player: Player::One,
            cell: Coord::new(0, 0),
            polarity: Polarity::Alpha,
        },
    );
    assert_eq!(query::energy(&arena, Player::One).current(), 5);

    let refused = run(&mut arena, flip(Coord::new(4, 4)));
    assert!(matches!(
        refused.as_slice(),
        [Event::AbilityRejected {
            failure: AbilityFailure::NotOwner(_),
            ..
        }]
    ));
    assert_eq!(query::energy(&arena, Player::One).current(), 5);

    let flipped = run(&mut arena, flip(Coord::new(0, 0)));
    assert_eq!(
        flipped,
        vec![
            Event::AbilityUsed {
                player: Player::One,
                outcome: AbilityOutcome::Flipped {
                    cell: Coord::new(0, 0),
                    polarity: Polarity::Beta,
                },
            },
            Event::EnergyChanged {
                player: Player::One,
                delta: -2,
                current: 3,
            },
        ]
    );
}

#[test]
fn anchors_expire_when_their_owner_begins_a_turn() {
    let config = EngineConfig {
        energy_per_turn: 2,
        ..EngineConfig::default()
    };
    let mut arena = arena_with(&[], config);
    let _ = run(
        &mut arena,
        Command::Place {
            player: Player::Two,
            cell: Coord::new(4, 0),
            polarity: Polarity::Beta,
        },
    );
    let _ = run(
        &mut arena,
        Command::UseAbility {
            request: AbilityRequest::new(
                Player::Two,
                Ability::Anchor {
                    cell: Coord::new(4, 0),
                },
            ),
        },
    );
    assert!(query::board(&arena)
        .get(Coord::new(4, 0))
        .is_some_and(|token| token.is_anchored()));

    let other = run(&mut arena, Command::BeginTurn { player: Player::One });
    assert_eq!(
        other,
        vec![Event::TurnBegan {
            player: Player::One,
            anchors_cleared: 0,
        }]
    );

    let own = run(&mut arena, Command::BeginTurn { player: Player::Two });
    assert_eq!(
        own,
        vec![Event::TurnBegan {
            player: Player::Two,
            anchors_cleared: 1,
        }]
    );
}

#[test]
fn kick_ejections_are_scored() {
    let config = EngineConfig {
        energy_per_turn: 3,
        ..EngineConfig::default()
    };
    let kicker = Token::new(TokenId::new(0), Player::One, Polarity::Alpha);
    let victim = Token::new(TokenId::new(1), Player::Two, Polarity::Beta);
    let mut arena = arena_with(&[(Coord::new(2, 3), kicker), (Coord::new(2, 4), victim)], config);
    let _ = run(
        &mut arena,
        Command::Place {
            player: Player::One,
            cell: Coord::new(0, 0),
            polarity: Polarity::Alpha,
        },
    );

    let events = run(
        &mut arena,
        Command::UseAbility {
            request: AbilityRequest::new(
                Player::One,
                Ability::Kick {
                    cell: Coord::new(2, 3),
                    direction: Direction::East,
                },
            ),
        },
    );

    assert!(events.contains(&Event::TokenEjected(EjectionEvent {
        token: victim.id(),
        from: Coord::new(2, 4),
        owner: Player::Two,
    })));
    assert_eq!(query::score(&arena, Player::One), 1);
    assert_eq!(query::score(&arena, Player::Two), -1);
    assert_eq!(query::energy(&arena, Player::One).current(), 0);
    assert_eq!(query::board(&arena).get(Coord::new(2, 4)), Some(kicker));
}

#[test]
fn invalid_configuration_is_refused() {
    let config = EngineConfig {
        max_cascade_depth: 0,
        ..EngineConfig::default()
    };
    assert_eq!(Arena::new(config), Err(ConfigError::ZeroCascadeDepth));
}

#[test]
fn negative_ability_costs_are_refused() {
    let config = EngineConfig {
        ability_costs: AbilityCosts {
            flip: -50,
            ..AbilityCosts::default()
        },
        ..EngineConfig::default()
    };
    let own = Token::new(TokenId::new(0), Player::One, Polarity::Alpha);
    let mut board = Board::new();
    let _ = board.insert(Coord::CENTER, own);

    assert_eq!(
        Arena::with_board(board, config),
        Err(ConfigError::NegativeAbilityCost {
            ability: "flip",
            cost: -50,
        })
    );
}

#[test]
fn wallets_never_exceed_their_cap() {
    let mut wallet = EnergyWallet::new(0, 20);

    assert!(!wallet.can_afford(-50));
    assert!(!wallet.spend(-50));
    assert_eq!(wallet.current(), 0);
    assert_eq!(wallet.add(50), 20);
    assert!(wallet.spend(20));
    assert_eq!(wallet.current(), 0);
}
