//! Error types for board operations.

use std::fmt;

/// Error type for FEN parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few fields (needs at least 4).
    TooFewFields { found: usize },
    /// Invalid piece character in the placement field.
    InvalidPiece { ch: char },
    /// A rank does not describe exactly 8 files.
    BadRankWidth { rank: usize, files: usize },
    /// Placement field does not describe exactly 8 ranks.
    BadRankCount { ranks: usize },
    /// Invalid side-to-move field (must be 'w' or 'b').
    InvalidSideToMove { found: String },
    /// Invalid castling field character.
    InvalidCastling { ch: char },
    /// Invalid en-passant field.
    InvalidEnPassant { found: String },
    /// Invalid halfmove or fullmove counter.
    InvalidCounter { found: String },
    /// The described position fails the census (kings, pawn ranks, counts).
    InvalidCensus { reason: &'static str },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewFields { found } => {
                write!(f, "FEN must have at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { ch } => {
                write!(f, "invalid piece character '{ch}' in FEN")
            }
            FenError::BadRankWidth { rank, files } => {
                write!(f, "rank {rank} describes {files} files, expected 8")
            }
            FenError::BadRankCount { ranks } => {
                write!(f, "FEN placement has {ranks} ranks, expected 8")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { ch } => {
                write!(f, "invalid castling character '{ch}' in FEN")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en passant square '{found}'")
            }
            FenError::InvalidCounter { found } => {
                write!(f, "invalid move counter '{found}' in FEN")
            }
            FenError::InvalidCensus { reason } => {
                write!(f, "position fails census check: {reason}")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Error type for move-notation parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Empty or unrecognizable move text.
    BadSyntax { text: String },
    /// Invalid promotion piece letter.
    InvalidPromotion { ch: char },
    /// The notation matches more than one legal move.
    AmbiguousMove { text: String },
    /// No legal move matches the notation.
    IllegalMove { text: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::BadSyntax { text } => {
                write!(f, "unrecognizable move notation '{text}'")
            }
            MoveParseError::InvalidPromotion { ch } => {
                write!(f, "invalid promotion piece '{ch}'")
            }
            MoveParseError::AmbiguousMove { text } => {
                write!(f, "ambiguous move '{text}'")
            }
            MoveParseError::IllegalMove { text } => {
                write!(f, "no legal move matches '{text}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}
