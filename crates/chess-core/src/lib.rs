//! Core types for chess.
//!
//! This crate provides the fundamental value types shared by the rules engine
//! and its hosts:
//! - [`Piece`], [`Color`] and [`ColoredPiece`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`MoveInfo`] and [`MoveType`] for move requests
//! - [`MoveCheckResult`] for the outcome of validating a move request
//! - FEN field parsing

mod color;
mod error;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use error::CoreError;
pub use fen::{FenError, FenParser};
pub use mov::{MoveCheckResult, MoveInfo, MoveType};
pub use piece::{ColoredPiece, Piece};
pub use square::{File, Rank, Square};
