#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use polaris_core::{Board, Coord, Player, Polarity, Token, TokenId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "polaris";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "polaris:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the tokens on a board, suitable for clipboard transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BoardSnapshot {
    /// Tokens in row-major order of their cells.
    pub tokens: Vec<SnapshotToken>,
}

/// Token description captured within a board snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SnapshotToken {
    /// Cell holding the token.
    pub cell: Coord,
    /// Owner of the token.
    pub owner: Player,
    /// Polarity of the token.
    pub polarity: Polarity,
    /// Whether the token is permanently immovable.
    #[serde(default)]
    pub locked: bool,
    /// Whether the token is anchored until its owner's next turn.
    #[serde(default)]
    pub anchored: bool,
}

impl BoardSnapshot {
    /// Captures every token on `board`.
    #[must_use]
    pub(crate) fn capture(board: &Board) -> Self {
        let tokens = board
            .occupied()
            .map(|(cell, token)| SnapshotToken {
                cell,
                owner: token.owner(),
                polarity: token.polarity(),
                locked: token.is_locked(),
                anchored: token.is_anchored(),
            })
            .collect();
        Self { tokens }
    }

    /// Rebuilds a board, minting identities in snapshot order.
    pub(crate) fn restore(&self) -> Result<Board, LayoutTransferError> {
        let mut board = Board::new();
        for (index, entry) in self.tokens.iter().enumerate() {
            if !entry.cell.is_valid() {
                return Err(LayoutTransferError::CellOutOfBounds(entry.cell));
            }
            let id = u32::try_from(index).map_err(|_| LayoutTransferError::TooManyTokens)?;
            let mut token = Token::new(TokenId::new(id), entry.owner, entry.polarity)
                .with_anchor(entry.anchored);
            if entry.locked {
                token = token.locked();
            }
            if board.insert(entry.cell, token).is_some() {
                return Err(LayoutTransferError::DuplicateCell(entry.cell));
            }
        }
        Ok(board)
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(self).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)
    }
}

/// Reports whether `value` looks like a transfer string rather than a layout.
pub(crate) fn is_transfer_string(value: &str) -> bool {
    value
        .trim_start()
        .strip_prefix(SNAPSHOT_DOMAIN)
        .is_some_and(|rest| rest.starts_with(FIELD_DELIMITER))
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include the payload segment.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode transfer payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be (de)serialised.
    #[error("could not parse transfer payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// A token was placed outside the board.
    #[error("snapshot places a token outside the board at {0}")]
    CellOutOfBounds(Coord),
    /// Two tokens share one cell.
    #[error("snapshot places two tokens on {0}")]
    DuplicateCell(Coord),
    /// The snapshot holds more tokens than identities can be minted for.
    #[error("snapshot holds too many tokens")]
    TooManyTokens,
}
