//! A position plus a navigable, linear move history.
//!
//! The [`Game`] keeps the position it started from and every committed move.
//! A cursor, the active move index, says how many of those moves have been
//! played into the current position. Moving the cursor back and making a
//! different move overwrites the moves after it.

use crate::{Move, Position, PositionError};
use chess_core::MoveInfo;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Error type for game navigation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("active move index {index} is out of range (game has {len} moves)")]
    ActiveMoveIndexOutOfRange { index: usize, len: usize },
}

/// Sent to observers whenever the active move index changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveMoveChanged {
    pub previous: usize,
    pub current: usize,
}

type Observer = Box<dyn FnMut(&ActiveMoveChanged)>;

/// A chess game with undo/redo over a linear move list.
pub struct Game {
    initial: Position,
    moves: Vec<Move>,
    active_move_index: usize,
    current: Position,
    observers: Vec<Observer>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::initial())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        Game {
            current: position.clone(),
            initial: position,
            moves: Vec::new(),
            active_move_index: 0,
            observers: Vec::new(),
        }
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// A copy of the starting position.
    pub fn initial_position(&self) -> Position {
        self.initial.clone()
    }

    /// A copy of the position after the active moves.
    pub fn current_position(&self) -> Position {
        self.current.clone()
    }

    /// Borrows the position after the active moves.
    pub fn position(&self) -> &Position {
        &self.current
    }

    /// Every recorded move, including those after the cursor.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// The moves that have been played into the current position.
    pub fn active_moves(&self) -> &[Move] {
        &self.moves[..self.active_move_index]
    }

    pub fn active_move_index(&self) -> usize {
        self.active_move_index
    }

    /// Registers a callback for cursor changes.
    pub fn subscribe(&mut self, observer: impl FnMut(&ActiveMoveChanged) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Moves the cursor, replaying moves from the starting position.
    pub fn set_active_move_index(&mut self, index: usize) -> Result<(), GameError> {
        if index > self.moves.len() {
            return Err(GameError::ActiveMoveIndexOutOfRange {
                index,
                len: self.moves.len(),
            });
        }
        let mut position = self.initial.clone();
        for mv in &self.moves[..index] {
            let replayed = position.try_make_move(mv.info(), true);
            debug_assert!(replayed.is_ok(), "recorded move {mv} no longer applies");
        }
        self.current = position;
        self.move_cursor(index);
        Ok(())
    }

    /// Steps the cursor back one move. Returns false at the start of the game.
    pub fn undo(&mut self) -> bool {
        match self.active_move_index.checked_sub(1) {
            Some(index) => self.set_active_move_index(index).is_ok(),
            None => false,
        }
    }

    /// Steps the cursor forward one recorded move. Returns false at the end.
    pub fn redo(&mut self) -> bool {
        self.active_move_index < self.moves.len()
            && self.set_active_move_index(self.active_move_index + 1).is_ok()
    }

    /// Validates `info` against the current position and, when `commit` is
    /// set and the move is legal and complete, plays it.
    ///
    /// Playing the move already recorded at the cursor just advances the
    /// cursor; any other move replaces everything after the cursor.
    pub fn try_make_move(&mut self, info: MoveInfo, commit: bool) -> Move {
        let mv = self.current.try_make_move(info, commit);
        if !(commit && mv.is_ok()) {
            return mv;
        }

        let index = self.active_move_index;
        let is_redo = self.moves.get(index).is_some_and(|recorded| recorded.same_move(&mv));
        if !is_redo {
            let dropped = self.moves.len() - index;
            if dropped > 0 {
                debug!(dropped, at = index, "overwriting recorded moves");
            }
            self.moves.truncate(index);
            self.moves.push(mv);
        }
        self.move_cursor(index + 1);
        mv
    }

    /// Legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.current.legal_moves()
    }

    fn move_cursor(&mut self, index: usize) {
        let previous = self.active_move_index;
        self.active_move_index = index;
        if previous == index {
            return;
        }
        debug!(previous, current = index, "active move changed");
        let event = ActiveMoveChanged {
            previous,
            current: index,
        };
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("initial", &self.initial)
            .field("moves", &self.moves)
            .field("active_move_index", &self.active_move_index)
            .field("observers", &self.observers.len())
            .finish()
    }
}
