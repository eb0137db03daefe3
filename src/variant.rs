/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::Result;
use chessie::{Color, Game, Move, PieceKind, Square};
use thiserror::Error;

use crate::{mask_of, Rules, ALL_SQUARES, COLORS, FEN_STARTPOS, PIECE_KINDS};

/// Reasons a move may be refused by [`Antichess::make_move`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalMove {
    /// The underlying rules engine does not allow this move at all.
    #[error("{0} is not a legal move in this position")]
    NotLegal(Move),

    /// The move is a legal chess move, but captures are mandatory and one is available.
    #[error("{0} is not a capture, but a capture is available")]
    CaptureRequired(Move),

    /// The input could not be understood as a move.
    #[error("failed to parse {input:?} as a move: {reason}")]
    Unparsable { input: String, reason: String },
}

/// How a game of losing chess has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The given side won by running out of legal moves.
    Win(Color),

    /// Neither side won (fifty-move rule).
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win(Color::White) => write!(f, "1-0"),
            Self::Win(Color::Black) => write!(f, "0-1"),
            Self::Draw => write!(f, "1/2-1/2"),
        }
    }
}

/// A position of losing chess.
///
/// Wraps a standard rules engine and filters its move generation so that captures are mandatory:
/// if any capture is available, only captures may be played.
/// Kings have no special status beyond what the underlying engine gives them.
#[derive(Clone, Copy, Debug)]
pub struct Antichess<R: Rules = Game> {
    /// The standard-chess position.
    rules: R,

    /// The move that produced this position, if known.
    last_move: Option<Move>,
}

impl Antichess<Game> {
    /// Parses a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Game::from_fen(fen)?))
    }
}

impl Default for Antichess<Game> {
    /// The standard starting position.
    fn default() -> Self {
        Self::new(Game::default())
    }
}

impl<R: Rules> Antichess<R> {
    /// Wraps a standard-chess position.
    #[inline(always)]
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            last_move: None,
        }
    }

    /// The underlying standard-chess position.
    #[inline(always)]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// The move that led to this position, if it was produced by a move.
    #[inline(always)]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.rules.side_to_move()
    }

    /// Returns `true` if `mv` removes an enemy piece from the board.
    #[inline(always)]
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.is_capture()
    }

    /// All captures that are legal under standard rules.
    pub fn legal_captures(&self) -> Vec<Move> {
        self.rules
            .legal_moves()
            .into_iter()
            .filter(Move::is_capture)
            .collect()
    }

    /// Returns `true` if the side-to-move has at least one capture available.
    #[inline(always)]
    pub fn has_capture(&self) -> bool {
        self.rules.legal_moves().iter().any(Move::is_capture)
    }

    /// Checks whether `mv` may be played in losing chess.
    ///
    /// The move must be legal under standard rules, and may only be a non-capture if no capture exists.
    /// Any capture is acceptable; the player may choose freely among them.
    pub fn is_legal(&self, mv: Move) -> bool {
        if !self.rules.is_legal(mv) {
            return false;
        }

        mv.is_capture() || !self.has_capture()
    }

    /// Generates the moves of this position that start in `from` and end in `to`.
    ///
    /// If any capture matches the masks, exactly those captures are produced.
    /// Otherwise, all moves onto squares not held by the opponent are produced.
    /// The same filtering applies whether or not the side-to-move is in check.
    pub fn generate_moves(&self, from: u64, to: u64) -> impl Iterator<Item = Move> {
        let captures = self
            .rules
            .legal_moves_masked(from, to)
            .into_iter()
            .filter(Move::is_capture)
            .collect::<Vec<_>>();

        let moves = if captures.is_empty() {
            let quiet_targets = to & !self.rules.occupancy(self.side_to_move().opponent());
            self.rules.legal_moves_masked(from, quiet_targets)
        } else {
            captures
        };

        moves.into_iter()
    }

    /// All legal moves of this position, in generation order.
    #[inline(always)]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.generate_moves(ALL_SQUARES, ALL_SQUARES).collect()
    }

    /// Copies `self` and applies `mv` to the copy. No legality checks are performed.
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        Self {
            rules: self.rules.with_move_made(mv),
            last_move: Some(mv),
        }
    }

    /// Copies `self` and passes the turn to the opponent.
    #[inline(always)]
    pub fn with_nullmove_made(&self) -> Self {
        Self {
            rules: self.rules.with_nullmove_made(),
            last_move: None,
        }
    }

    /// Applies `mv` if it is legal in losing chess, otherwise leaves the position untouched.
    pub fn make_move(&mut self, mv: Move) -> Result<(), IllegalMove> {
        if !self.rules.is_legal(mv) {
            return Err(IllegalMove::NotLegal(mv));
        }

        if !mv.is_capture() && self.has_capture() {
            return Err(IllegalMove::CaptureRequired(mv));
        }

        *self = self.with_move_made(mv);
        Ok(())
    }

    /// Parses `uci` and applies it with [`Self::make_move`], returning the move that was made.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, IllegalMove> {
        let mv = self
            .rules
            .parse_move(uci)
            .map_err(|err| IllegalMove::Unparsable {
                input: uci.to_string(),
                reason: err.to_string(),
            })?;

        self.make_move(mv)?;
        Ok(mv)
    }

    #[inline(always)]
    pub fn is_check(&self) -> bool {
        self.rules.is_check()
    }

    #[inline(always)]
    pub fn is_checkmate(&self) -> bool {
        self.rules.is_checkmate()
    }

    #[inline(always)]
    pub fn is_stalemate(&self) -> bool {
        self.rules.is_stalemate()
    }

    /// Occupancy mask of all `color` pieces attacking `square`.
    #[inline(always)]
    pub fn attackers(&self, color: Color, square: Square) -> u64 {
        self.rules.attackers(color, square)
    }

    /// Occupancy mask of all pieces of the given kind and color.
    #[inline(always)]
    pub fn pieces(&self, kind: PieceKind, color: Color) -> u64 {
        self.rules.pieces(kind, color)
    }

    /// Occupancy mask of all pieces of `color`.
    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> u64 {
        self.rules.occupancy(color)
    }

    /// Number of pieces (Pawns and King included) that `color` has on the board.
    #[inline(always)]
    pub fn piece_count(&self, color: Color) -> u32 {
        self.occupancy(color).count_ones()
    }

    /// Fetches the kind and color of the piece on `square`, if there is one.
    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        let mask = mask_of(square);
        COLORS.into_iter().find_map(|color| {
            PIECE_KINDS
                .into_iter()
                .find(|&kind| self.pieces(kind, color) & mask != 0)
                .map(|kind| (color, kind))
        })
    }

    /// Returns how the game has ended, if it has.
    ///
    /// A side with no legal moves wins. Reaching the fifty-move limit is a draw.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.rules.legal_moves().is_empty() {
            Some(Outcome::Win(self.side_to_move()))
        } else if self.rules.halfmove_clock() >= 100 {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    #[inline(always)]
    pub fn to_fen(&self) -> String {
        self.rules.to_fen()
    }
}

impl<R: Rules> fmt::Display for Antichess<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = "   a b c d e f g h";

        writeln!(f, "{files}")?;
        writeln!(f)?;
        for rank in (0..8).rev() {
            write!(f, "{}  ", rank + 1)?;
            for file in 0..8 {
                let square = Square::from_index_unchecked(rank * 8 + file);
                let c = self
                    .piece_at(square)
                    .map(|(color, kind)| piece_char(color, kind))
                    .unwrap_or('.');

                if file < 7 {
                    write!(f, "{c} ")?;
                } else {
                    writeln!(f, "{c}")?;
                }
            }
        }
        writeln!(f)?;
        write!(f, "{files}")
    }
}

/// FEN character of a piece.
#[inline(always)]
fn piece_char(color: Color, kind: PieceKind) -> char {
    let c = match kind {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };

    if color == Color::White {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

impl<R: Rules> From<R> for Antichess<R> {
    fn from(rules: R) -> Self {
        Self::new(rules)
    }
}

/// Parses a position from a FEN string, defaulting to the starting position when `fen` is `None`.
pub fn position_from(fen: Option<&str>) -> Result<Antichess> {
    Antichess::from_fen(fen.unwrap_or(FEN_STARTPOS))
}
