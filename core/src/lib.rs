#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Polaris Arena engine.
//!
//! This crate defines the value types every other crate speaks: grid
//! coordinates and the eight canonical directions, polarized tokens, the
//! 5×5 board that exclusively owns them, and the transient move/ejection
//! events produced while resolving a placement. Systems consume immutable
//! boards and answer with new boards plus event lists; nothing here performs
//! I/O or keeps hidden state.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows and columns on the board.
pub const GRID_SIZE: i8 = 5;

/// Largest valid row or column index.
const GRID_MAX: i8 = GRID_SIZE - 1;

/// Column letters used by chess-style notation.
const COLUMN_LETTERS: [char; GRID_SIZE as usize] = ['A', 'B', 'C', 'D', 'E'];

/// One of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// Side that moves first in a standard match.
    One,
    /// Side that moves second in a standard match.
    Two,
}

impl Player {
    /// Both players in seat order.
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// Returns the other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Seat number used by text layouts (`1` or `2`).
    #[must_use]
    pub const fn seat(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Token polarity. Equal polarities repel, different polarities attract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Polarity {
    /// First polarity, written `A`.
    Alpha,
    /// Second polarity, written `B`.
    Beta,
}

impl Polarity {
    /// Both polarities in candidate enumeration order.
    pub const ALL: [Polarity; 2] = [Polarity::Alpha, Polarity::Beta];

    /// Returns the inverted polarity.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Alpha => Self::Beta,
            Self::Beta => Self::Alpha,
        }
    }

    /// Interaction an emitter of this polarity exerts on a token of `other`.
    #[must_use]
    pub fn interaction_with(self, other: Polarity) -> Interaction {
        if self == other {
            Interaction::Repulsion
        } else {
            Interaction::Attraction
        }
    }

    /// Single letter used in notation and layouts.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Alpha => 'A',
            Self::Beta => 'B',
        }
    }

    /// Parses a polarity letter, ignoring case.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'A' => Some(Self::Alpha),
            'B' => Some(Self::Beta),
            _ => None,
        }
    }
}

/// Force kind derived from two polarities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interaction {
    /// Same polarity: the target is pushed away from the emitter.
    Repulsion,
    /// Different polarity: the target is pulled toward the emitter.
    Attraction,
}

/// The eight unit directions of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing row indices.
    South,
    /// Toward increasing column indices.
    East,
    /// Toward decreasing column indices.
    West,
    /// North and east at once.
    NorthEast,
    /// North and west at once.
    NorthWest,
    /// South and east at once.
    SouthEast,
    /// South and west at once.
    SouthWest,
}

impl Direction {
    /// Canonical enumeration order. Every interaction scan walks directions
    /// in this order so tie-breaking is reproducible.
    pub const CANONICAL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Row and column delta of a single step.
    #[must_use]
    pub const fn offset(self) -> (i8, i8) {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
            Self::NorthEast => (-1, 1),
            Self::NorthWest => (-1, -1),
            Self::SouthEast => (1, 1),
            Self::SouthWest => (1, -1),
        }
    }

    /// Reports whether the direction runs along a row or a column.
    #[must_use]
    pub const fn is_axial(self) -> bool {
        matches!(
            self,
            Self::North | Self::South | Self::East | Self::West
        )
    }

    /// Reports whether the direction runs along a diagonal.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        !self.is_axial()
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::NorthEast => Self::SouthWest,
            Self::NorthWest => Self::SouthEast,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
        }
    }

    /// Position of the direction within [`Direction::CANONICAL`].
    #[must_use]
    pub const fn canonical_index(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::East => 2,
            Self::West => 3,
            Self::NorthEast => 4,
            Self::NorthWest => 5,
            Self::SouthEast => 6,
            Self::SouthWest => 7,
        }
    }
}

/// Grid position expressed as row and column indices.
///
/// Coordinates are plain values and may point off the board; use
/// [`Coord::is_valid`] before treating one as a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    row: i8,
    col: i8,
}

impl Coord {
    /// The single center cell, `C3`.
    pub const CENTER: Coord = Coord::new(2, 2);

    /// Creates a coordinate without checking bounds.
    #[must_use]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> i8 {
        self.row
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn col(&self) -> i8 {
        self.col
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.row >= 0 && self.row <= GRID_MAX && self.col >= 0 && self.col <= GRID_MAX
    }

    /// Reports whether the cell lies on the outermost ring.
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        self.row == 0 || self.row == GRID_MAX || self.col == 0 || self.col == GRID_MAX
    }

    /// Reports whether the cell is the center cell.
    #[must_use]
    pub const fn is_center(&self) -> bool {
        self.row == Self::CENTER.row && self.col == Self::CENTER.col
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coord) -> u8 {
        self.row
            .abs_diff(other.row)
            .saturating_add(self.col.abs_diff(other.col))
    }

    /// Number of steps to the nearest board edge (zero on the edge).
    #[must_use]
    pub fn edge_distance(self) -> i8 {
        self.row
            .min(self.col)
            .min(GRID_MAX - self.row)
            .min(GRID_MAX - self.col)
    }

    /// Coordinate one step away, even when it leaves the board. Saturates
    /// at the `i8` range.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.offset();
        Self::new(self.row.saturating_add(dr), self.col.saturating_add(dc))
    }

    /// Neighboring cell in `direction`, if it lies on the board.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<Self> {
        let next = self.step(direction);
        next.is_valid().then_some(next)
    }

    /// On-board neighbors in canonical direction order.
    pub fn neighbors(self) -> impl Iterator<Item = (Direction, Coord)> {
        Direction::CANONICAL
            .into_iter()
            .filter_map(move |direction| self.neighbor(direction).map(|cell| (direction, cell)))
    }

    /// Direction of a single step from `self` to an adjacent `other`.
    ///
    /// Returns `None` when the coordinates are equal or not adjacent.
    #[must_use]
    pub fn direction_to(self, other: Coord) -> Option<Direction> {
        let dr = other.row - self.row;
        let dc = other.col - self.col;
        Direction::CANONICAL
            .into_iter()
            .find(|direction| direction.offset() == (dr, dc))
    }

    /// Every on-board cell in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Coord::new(row, col)))
    }

    /// Chess-style notation (`A1`..`E5`), or `None` for off-board coordinates.
    ///
    /// Letters name columns, digits name rows starting from row zero as `1`.
    #[must_use]
    pub fn notation(self) -> Option<String> {
        if !self.is_valid() {
            return None;
        }
        let letter = COLUMN_LETTERS[usize::try_from(self.col).ok()?];
        Some(format!("{letter}{}", self.row + 1))
    }

    /// Parses chess-style notation such as `C3`, ignoring case.
    #[must_use]
    pub fn from_notation(text: &str) -> Option<Self> {
        let mut chars = text.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let digit = chars.next()?.to_digit(10)?;
        if chars.next().is_some() {
            return None;
        }
        let col = COLUMN_LETTERS.iter().position(|candidate| *candidate == letter)?;
        let row = i8::try_from(digit).ok()? - 1;
        let coord = Coord::new(row, i8::try_from(col).ok()?);
        coord.is_valid().then_some(coord)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notation() {
            Some(notation) => f.write_str(&notation),
            None => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

/// Identity of a token, stable for the duration of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(u32);

impl TokenId {
    /// Creates a new token identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// A polarized token owned by one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    id: TokenId,
    owner: Player,
    polarity: Polarity,
    anchored: bool,
    locked: bool,
}

impl Token {
    /// Creates a movable token.
    #[must_use]
    pub const fn new(id: TokenId, owner: Player, polarity: Polarity) -> Self {
        Self {
            id,
            owner,
            polarity,
            anchored: false,
            locked: false,
        }
    }

    /// Returns a copy with the permanent lock applied.
    #[must_use]
    pub const fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Returns a copy with the anchored flag set to `anchored`.
    #[must_use]
    pub const fn with_anchor(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    /// Returns a copy with inverted polarity.
    #[must_use]
    pub const fn flipped(mut self) -> Self {
        self.polarity = self.polarity.opposite();
        self
    }

    /// Identity of the token.
    #[must_use]
    pub const fn id(&self) -> TokenId {
        self.id
    }

    /// Player owning the token.
    #[must_use]
    pub const fn owner(&self) -> Player {
        self.owner
    }

    /// Current polarity.
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Temporary immunity that expires at the start of the owner's next turn.
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Permanent immunity used for fixed content.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// A token is movable iff it is neither anchored nor locked.
    #[must_use]
    pub const fn is_movable(&self) -> bool {
        !self.anchored && !self.locked
    }
}

/// Reasons a placement request is rejected before entering the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the 5×5 grid.
    #[error("cell {0} is outside the board")]
    OutOfBounds(Coord),
    /// The requested cell already holds a token.
    #[error("cell {0} is already occupied")]
    Occupied(Coord),
}

/// A committed displacement of one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Token being displaced.
    pub token: TokenId,
    /// Cell the token occupied before the move.
    pub from: Coord,
    /// Cell the token occupies after the move.
    pub to: Coord,
    /// Priority of the link that produced the move.
    pub priority: u8,
}

/// A token pushed past the board boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EjectionEvent {
    /// Token removed from play.
    pub token: TokenId,
    /// Last cell the token occupied.
    pub from: Coord,
    /// Player who owned the token.
    pub owner: Player,
}

/// The 5×5 grid. The board exclusively owns its tokens by position.
///
/// Equality and hashing cover the cells only. The identity mint counter is
/// bookkeeping and two boards holding the same tokens compare equal however
/// many identities each has handed out.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Token>; GRID_SIZE as usize]; GRID_SIZE as usize],
    next_id: u32,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token occupying `cell`, if any. Off-board cells are always empty.
    #[must_use]
    pub fn get(&self, cell: Coord) -> Option<Token> {
        let (row, col) = Self::index(cell)?;
        self.cells[row][col]
    }

    /// Reports whether `cell` holds a token.
    #[must_use]
    pub fn is_occupied(&self, cell: Coord) -> bool {
        self.get(cell).is_some()
    }

    /// Writes `token` into `cell`, returning the previous occupant.
    ///
    /// Off-board cells cannot hold tokens; the token is handed back instead.
    pub fn insert(&mut self, cell: Coord, token: Token) -> Option<Token> {
        let Some((row, col)) = Self::index(cell) else {
            return Some(token);
        };
        self.next_id = self.next_id.max(token.id.get().saturating_add(1));
        self.cells[row][col].replace(token)
    }

    /// Removes and returns the token occupying `cell`.
    pub fn remove(&mut self, cell: Coord) -> Option<Token> {
        let (row, col) = Self::index(cell)?;
        self.cells[row][col].take()
    }

    /// Mutable access to the token occupying `cell`.
    pub fn token_mut(&mut self, cell: Coord) -> Option<&mut Token> {
        let (row, col) = Self::index(cell)?;
        self.cells[row][col].as_mut()
    }

    /// Checks that `cell` is a legal placement target.
    pub fn check_placement(&self, cell: Coord) -> Result<(), PlacementError> {
        if !cell.is_valid() {
            return Err(PlacementError::OutOfBounds(cell));
        }
        if self.is_occupied(cell) {
            return Err(PlacementError::Occupied(cell));
        }
        Ok(())
    }

    /// Mints a token whose identity is unused on this board.
    #[must_use]
    pub fn fresh_token(&self, owner: Player, polarity: Polarity) -> Token {
        Token::new(TokenId::new(self.next_id), owner, polarity)
    }

    /// Occupied cells and their tokens in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, Token)> + '_ {
        Coord::all().filter_map(|cell| self.get(cell).map(|token| (cell, token)))
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        Coord::all().filter(|cell| !self.is_occupied(*cell))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    /// Number of tokens owned by `player`.
    #[must_use]
    pub fn count_owned(&self, player: Player) -> usize {
        self.occupied()
            .filter(|(_, token)| token.owner() == player)
            .count()
    }

    /// Cell currently holding the token with identity `id`.
    #[must_use]
    pub fn locate(&self, id: TokenId) -> Option<Coord> {
        self.occupied()
            .find(|(_, token)| token.id() == id)
            .map(|(cell, _)| cell)
    }

    /// Clears the anchored flag on every token owned by `player`.
    ///
    /// Returns the number of anchors that expired.
    pub fn clear_anchors(&mut self, player: Player) -> usize {
        let mut cleared = 0;
        for row in self.cells.iter_mut() {
            for token in row.iter_mut().flatten() {
                if token.owner == player && token.anchored {
                    token.anchored = false;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Applies a move, vacating the origin before writing the destination.
    ///
    /// Returns `false` and leaves the board untouched when the origin no
    /// longer holds the moving token or the destination is off the board
    /// or occupied.
    pub fn apply_move(&mut self, event: &MoveEvent) -> bool {
        if !event.to.is_valid() || self.is_occupied(event.to) {
            return false;
        }
        match self.get(event.from) {
            Some(token) if token.id() == event.token => {}
            _ => return false,
        }
        let Some(token) = self.remove(event.from) else {
            return false;
        };
        let _ = self.insert(event.to, token);
        true
    }

    /// Applies an ejection, removing the token from play.
    ///
    /// Returns `false` when the origin no longer holds the ejected token.
    pub fn apply_ejection(&mut self, event: &EjectionEvent) -> bool {
        match self.get(event.from) {
            Some(token) if token.id() == event.token => self.remove(event.from).is_some(),
            _ => false,
        }
    }

    fn index(cell: Coord) -> Option<(usize, usize)> {
        if !cell.is_valid() {
            return None;
        }
        Some((usize::try_from(cell.row).ok()?, usize::try_from(cell.col).ok()?))
    }
}

/// Energy prices of the tactical abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityCosts {
    /// Cost of inverting the polarity of an own token.
    pub flip: i32,
    /// Cost of pushing a line of tokens one step.
    pub kick: i32,
    /// Cost of anchoring an own token until the next turn.
    pub anchor: i32,
}

impl Default for AbilityCosts {
    fn default() -> Self {
        Self {
            flip: 2,
            kick: 3,
            anchor: 2,
        }
    }
}

/// Tunable parameters consumed from the rules collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of recorded cascade steps, including the placement step.
    pub max_cascade_depth: u32,
    /// Base energy granted to the player who resolved a placement.
    pub energy_per_turn: i32,
    /// Capacity of each player's energy wallet.
    pub max_energy: i32,
    /// Energy prices of the abilities.
    pub ability_costs: AbilityCosts,
}

impl EngineConfig {
    /// Default maximum cascade depth.
    pub const DEFAULT_MAX_CASCADE_DEPTH: u32 = 10;

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cascade_depth == 0 {
            return Err(ConfigError::ZeroCascadeDepth);
        }
        if self.max_energy <= 0 {
            return Err(ConfigError::NonPositiveEnergyCap(self.max_energy));
        }
        if self.energy_per_turn < 0 {
            return Err(ConfigError::NegativeEnergyPerTurn(self.energy_per_turn));
        }
        let costs = self.ability_costs;
        for (ability, cost) in [("flip", costs.flip), ("kick", costs.kick), ("anchor", costs.anchor)] {
            if cost < 0 {
                return Err(ConfigError::NegativeAbilityCost { ability, cost });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: Self::DEFAULT_MAX_CASCADE_DEPTH,
            energy_per_turn: 1,
            max_energy: 20,
            ability_costs: AbilityCosts::default(),
        }
    }
}

/// Reasons an [`EngineConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A cascade must be allowed to record at least the placement step.
    #[error("max cascade depth must be at least 1")]
    ZeroCascadeDepth,
    /// Wallets need room for at least one energy point.
    #[error("energy cap must be positive, got {0}")]
    NonPositiveEnergyCap(i32),
    /// Turns may not drain energy.
    #[error("energy per turn must not be negative, got {0}")]
    NegativeEnergyPerTurn(i32),
    /// Abilities may not pay energy out.
    #[error("{ability} cost must not be negative, got {cost}")]
    NegativeAbilityCost {
        /// Name of the ability.
        ability: &'static str,
        /// The rejected price.
        cost: i32,
    },
}

/// Placement candidate considered by the move generator and agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Empty cell receiving the new token.
    pub cell: Coord,
    /// Polarity of the new token.
    pub polarity: Polarity,
}

impl Candidate {
    /// Creates a new candidate placement.
    #[must_use]
    pub const fn new(cell: Coord, polarity: Polarity) -> Self {
        Self { cell, polarity }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.cell, self.polarity.symbol())
    }
}
