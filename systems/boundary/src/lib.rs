#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates ejections into score deltas and energy gains.

use polaris_core::{EjectionEvent, Player};
use serde::{Deserialize, Serialize};

/// Why a player's score changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreKind {
    /// An opposing token left the board.
    EjectedOpponent,
    /// One of the player's own tokens left the board.
    LostOwn,
}

impl ScoreKind {
    /// Delta applied to the affected player's score.
    #[must_use]
    pub const fn amount(self) -> i32 {
        match self {
            Self::EjectedOpponent => 1,
            Self::LostOwn => -1,
        }
    }
}

/// A single score delta for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreChange {
    /// Player whose score changes.
    pub player: Player,
    /// Reason for the change.
    pub kind: ScoreKind,
    /// Signed amount added to the score.
    pub amount: i32,
}

impl ScoreChange {
    /// Creates a change carrying the canonical amount for `kind`.
    #[must_use]
    pub const fn new(player: Player, kind: ScoreKind) -> Self {
        Self {
            player,
            kind,
            amount: kind.amount(),
        }
    }
}

/// Emits a `LostOwn` change for the owner and an `EjectedOpponent` change
/// for the opponent, per ejection, in event order.
#[must_use]
pub fn translate_ejections(events: &[EjectionEvent]) -> Vec<ScoreChange> {
    let mut changes = Vec::with_capacity(events.len() * 2);
    translate_into(events, &mut changes);
    changes
}

/// Appends the translation of `events` to `out`.
pub fn translate_into(events: &[EjectionEvent], out: &mut Vec<ScoreChange>) {
    for event in events {
        out.push(ScoreChange::new(event.owner, ScoreKind::LostOwn));
        out.push(ScoreChange::new(event.owner.opponent(), ScoreKind::EjectedOpponent));
    }
}

/// Net score delta per player, indexed by seat order.
#[must_use]
pub fn score_totals(changes: &[ScoreChange]) -> [i32; 2] {
    changes.iter().fold([0, 0], |mut totals, change| {
        totals[seat_index(change.player)] += change.amount;
        totals
    })
}

/// Number of ejected tokens not owned by `causer`.
#[must_use]
pub fn opposing_ejections(events: &[EjectionEvent], causer: Player) -> usize {
    events.iter().filter(|event| event.owner != causer).count()
}

/// Bonus energy earned by `causer`: one point per two opposing ejections.
#[must_use]
pub fn energy_bonus(events: &[EjectionEvent], causer: Player) -> i32 {
    i32::try_from(opposing_ejections(events, causer) / 2).unwrap_or(i32::MAX)
}

/// Total energy earned by `causer` for a resolved turn.
#[must_use]
pub fn energy_gain(events: &[EjectionEvent], causer: Player, base: i32) -> i32 {
    base.saturating_add(energy_bonus(events, causer))
}

fn seat_index(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}
