//! Chess rules engine with bitboard representation.
//!
//! This crate provides:
//! - [`BoardConstants`] - precomputed move masks and sliding-piece tables,
//!   built once and shared between positions
//! - [`Position`] - full board state with FEN input and output
//! - [`Position::try_make_move`] - validation of a requested move, reporting
//!   every reason it is illegal or incomplete, and optionally playing it
//! - [`Game`] - a linear move history with an undo/redo cursor
//! - [`MoveTree`] - a tree of variations for analysis
//! - [`notation`] - short and long algebraic move text
//!
//! # Example
//!
//! ```
//! use chess_core::{MoveInfo, Square};
//! use chess_rules::{Game, MoveFormatter, ShortAlgebraic};
//!
//! let mut game = Game::new();
//! let text = ShortAlgebraic::default()
//!     .format_game_move(&mut game, MoveInfo::new(Square::E2, Square::E4))
//!     .unwrap();
//! assert_eq!(text, "e4");
//! assert_eq!(game.position().legal_moves().len(), 20);
//! ```

mod bitboard;
pub mod constants;
mod game;
mod movecheck;
pub mod movegen;
mod moves;
pub mod notation;
mod position;
mod tree;

pub use bitboard::{Bitboard, BitboardIter};
pub use constants::{BoardConstants, CastlingRule, RayFamily};
pub use game::{ActiveMoveChanged, Game, GameError};
pub use movegen::perft::{perft, perft_divide};
pub use moves::Move;
pub use notation::{
    LongAlgebraic, MoveFormatter, NotationError, NotationStyle, PieceSymbols, ShortAlgebraic,
};
pub use position::{Position, PositionError};
pub use tree::{BranchId, MainLine, MoveTree, TreeError, Variation, VariationId};
