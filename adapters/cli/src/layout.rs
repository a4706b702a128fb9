//! Plain-text board layouts.
//!
//! A layout is five rows of five whitespace-separated cells, top row first.
//! `.` marks an empty cell; a token is written `<seat><polarity>[flag]`, for
//! example `1A` or `2B*`, where `*` marks a locked token and `^` an anchored
//! one. Rows are separated by newlines or `/`. Blank lines and lines starting
//! with `#` are ignored.

use polaris_core::{Board, Coord, Player, Polarity, Token, TokenId, GRID_SIZE};
use thiserror::Error;

const EMPTY_CELL: &str = ".";
const LOCKED_FLAG: char = '*';
const ANCHORED_FLAG: char = '^';

/// Errors raised while parsing a plain-text layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    /// The layout did not contain exactly five rows.
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    /// A row did not contain exactly five cells.
    #[error("row {row} has {found} cells, expected {expected}")]
    CellCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A cell could not be read as a token.
    #[error("cannot read cell `{text}` at {cell}")]
    InvalidCell { cell: Coord, text: String },
}

/// Parses a layout into a board. Tokens receive identities in row-major
/// order starting from zero.
pub(crate) fn parse_layout(text: &str) -> Result<Board, LayoutError> {
    let rows: Vec<&str> = text
        .split(['\n', '/'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    let size = usize::try_from(GRID_SIZE).unwrap_or_default();
    if rows.len() != size {
        return Err(LayoutError::RowCount {
            expected: size,
            found: rows.len(),
        });
    }

    let mut board = Board::new();
    let mut next_id = 0;
    for (row_index, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row.split_whitespace().collect();
        if cells.len() != size {
            return Err(LayoutError::CellCount {
                row: row_index + 1,
                expected: size,
                found: cells.len(),
            });
        }
        for (col_index, text) in cells.into_iter().enumerate() {
            let cell = Coord::new(to_index(row_index), to_index(col_index));
            if text == EMPTY_CELL {
                continue;
            }
            let token = parse_token(text, TokenId::new(next_id)).ok_or_else(|| {
                LayoutError::InvalidCell {
                    cell,
                    text: text.to_owned(),
                }
            })?;
            next_id += 1;
            let _ = board.insert(cell, token);
        }
    }
    Ok(board)
}

/// Renders `board` in the layout format accepted by [`parse_layout`].
pub(crate) fn render_layout(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..GRID_SIZE {
        let cells: Vec<String> = (0..GRID_SIZE)
            .map(|col| match board.get(Coord::new(row, col)) {
                Some(token) => render_token(&token),
                None => EMPTY_CELL.to_owned(),
            })
            .map(|cell| format!("{cell:<3}"))
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn parse_token(text: &str, id: TokenId) -> Option<Token> {
    let mut chars = text.chars();
    let owner = match chars.next()? {
        '1' => Player::One,
        '2' => Player::Two,
        _ => return None,
    };
    let polarity = Polarity::from_symbol(chars.next()?)?;
    let mut token = Token::new(id, owner, polarity);
    match chars.next() {
        None => {}
        Some(LOCKED_FLAG) => token = token.locked(),
        Some(ANCHORED_FLAG) => token = token.with_anchor(true),
        Some(_) => return None,
    }
    chars.next().is_none().then_some(token)
}

fn render_token(token: &Token) -> String {
    let flag = if token.is_locked() {
        LOCKED_FLAG.to_string()
    } else if token.is_anchored() {
        ANCHORED_FLAG.to_string()
    } else {
        String::new()
    };
    format!("{}{}{flag}", token.owner().seat(), token.polarity().symbol())
}

fn to_index(value: usize) -> i8 {
    i8::try_from(value).unwrap_or(i8::MAX)
}
