#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cascade manager that drives a placement through successive waves.
//!
//! Step 0 solves the freshly placed token alone. Every later wave uses the
//! destination cells of the previous wave's moves as triggers, solves them
//! against one pre-wave board and applies the union of their effects (see
//! [`wave`]). The cascade ends when a wave moves nothing or the configured
//! depth is reached, so termination never depends on board content.
//!
//! [`CascadeManager::simulate`] records every step for turn processing,
//! [`CascadeManager::fast_simulate`] runs the identical loop without
//! bookkeeping for what-if search.

pub mod wave;

use std::collections::BTreeSet;

use polaris_core::{
    Board, Coord, EjectionEvent, EngineConfig, MoveEvent, PlacementError, Player, Token,
};
use polaris_system_magnetics::OrderedSolver;
use tracing::{debug, trace, warn};

pub use crate::wave::{resolve_wave, CollisionKind, Wave, WaveCollision};

/// One recorded wave of a cascade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeStep {
    /// Zero for the placement itself, then one per wave.
    pub index: u32,
    /// Cells whose occupants emitted forces in this wave, row-major.
    pub triggers: Vec<Coord>,
    /// Moves applied by this wave.
    pub moves: Vec<MoveEvent>,
    /// Ejections applied by this wave.
    pub ejections: Vec<EjectionEvent>,
    /// Blocked links across all triggers of the wave.
    pub conflicts: u32,
    /// Displacements rejected because triggers disagreed.
    pub collisions: Vec<WaveCollision>,
}

/// Complete record of a placement and its chain reaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeResult {
    /// Recorded steps in order; never empty.
    pub steps: Vec<CascadeStep>,
    /// Board after the last step.
    pub final_board: Board,
    /// Every ejection of the cascade in order.
    pub ejections: Vec<EjectionEvent>,
}

impl CascadeResult {
    /// Number of recorded steps.
    #[must_use]
    pub fn chain_length(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether nothing happened after the placement step.
    #[must_use]
    pub fn was_stable(&self) -> bool {
        self.steps.len() == 1
    }
}

/// Result of the bookkeeping-free simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastOutcome {
    /// Board after the cascade.
    pub board: Board,
    /// Every ejection of the cascade in order.
    pub ejections: Vec<EjectionEvent>,
}

impl FastOutcome {
    /// Number of ejected tokens owned by `player`.
    #[must_use]
    pub fn losses_for(&self, player: Player) -> usize {
        self.ejections
            .iter()
            .filter(|ejection| ejection.owner == player)
            .count()
    }
}

/// Drives cascades with a fixed maximum depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CascadeManager {
    max_depth: u32,
}

impl Default for CascadeManager {
    fn default() -> Self {
        Self::new(EngineConfig::DEFAULT_MAX_CASCADE_DEPTH)
    }
}

impl CascadeManager {
    /// Creates a manager that records at most `max_depth` steps.
    ///
    /// A depth of zero is raised to one: the placement step always runs.
    #[must_use]
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Creates a manager using the configured maximum depth.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_cascade_depth)
    }

    /// Maximum number of recorded steps.
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Places `token` at `placement` on a copy of `board` and records every
    /// step of the resulting cascade.
    pub fn simulate(
        &self,
        placement: Coord,
        token: Token,
        board: &Board,
    ) -> Result<CascadeResult, PlacementError> {
        let mut log = StepLog::default();
        let (final_board, ejections) = self.run(placement, token, board, &mut log)?;
        Ok(CascadeResult {
            steps: log.steps,
            final_board,
            ejections,
        })
    }

    /// Behaves exactly like [`CascadeManager::simulate`] but only returns
    /// the final board and the flattened ejections.
    pub fn fast_simulate(
        &self,
        placement: Coord,
        token: Token,
        board: &Board,
    ) -> Result<FastOutcome, PlacementError> {
        let (board, ejections) = self.run(placement, token, board, &mut Discard)?;
        Ok(FastOutcome { board, ejections })
    }

    fn run<S: StepSink>(
        &self,
        placement: Coord,
        token: Token,
        board: &Board,
        sink: &mut S,
    ) -> Result<(Board, Vec<EjectionEvent>), PlacementError> {
        board.check_placement(placement)?;

        let mut board = board.clone();
        let _ = board.insert(placement, token);

        let mut solver = OrderedSolver::new();
        let mut ejections = Vec::new();
        let mut triggers = BTreeSet::from([placement]);
        let mut index = 0;

        while !triggers.is_empty() {
            if index >= self.max_depth {
                trace!(depth = self.max_depth, "cascade depth limit reached");
                break;
            }

            let wave = resolve_wave(&mut solver, &triggers, &mut board);
            if index > 0 && wave.is_inert() {
                break;
            }

            debug!(
                step = index,
                triggers = triggers.len(),
                moves = wave.moves.len(),
                ejections = wave.ejections.len(),
                conflicts = wave.conflicts,
                "cascade wave resolved"
            );
            if !wave.collisions.is_empty() {
                warn!(
                    step = index,
                    collisions = wave.collisions.len(),
                    "wave triggers disagreed; later displacements rejected"
                );
            }

            let next = wave.destinations();
            ejections.extend_from_slice(&wave.ejections);
            sink.record(index, &triggers, wave);

            triggers = next;
            index += 1;
        }

        Ok((board, ejections))
    }
}

/// Places `token` and records the cascade with the default depth.
pub fn simulate(
    placement: Coord,
    token: Token,
    board: &Board,
) -> Result<CascadeResult, PlacementError> {
    CascadeManager::default().simulate(placement, token, board)
}

/// Places `token` and returns only the outcome, with the default depth.
pub fn fast_simulate(
    placement: Coord,
    token: Token,
    board: &Board,
) -> Result<FastOutcome, PlacementError> {
    CascadeManager::default().fast_simulate(placement, token, board)
}

trait StepSink {
    fn record(&mut self, index: u32, triggers: &BTreeSet<Coord>, wave: Wave);
}

#[derive(Default)]
struct StepLog {
    steps: Vec<CascadeStep>,
}

impl StepSink for StepLog {
    fn record(&mut self, index: u32, triggers: &BTreeSet<Coord>, wave: Wave) {
        self.steps.push(CascadeStep {
            index,
            triggers: triggers.iter().copied().collect(),
            moves: wave.moves,
            ejections: wave.ejections,
            conflicts: wave.conflicts,
            collisions: wave.collisions,
        });
    }
}

struct Discard;

impl StepSink for Discard {
    fn record(&mut self, _index: u32, _triggers: &BTreeSet<Coord>, _wave: Wave) {}
}
