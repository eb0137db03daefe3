/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, PieceKind, Square};

use crate::Score;

/// Piece-Square tables copied from the [Simplified Evaluation Function](https://www.chessprogramming.org/Simplified_Evaluation_Function)
#[rustfmt::skip]
const PAWN: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
     50,  50,  50,  50,  50,  50,  50,  50,
     10,  10,  20,  30,  30,  20,  10,  10,
      5,   5,  10,  25,  25,  10,   5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      5,  10,  10, -20, -20,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const KNIGHT: Psqt = Psqt::new([
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
]);

#[rustfmt::skip]
const BISHOP: Psqt = Psqt::new([
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
]);

#[rustfmt::skip]
const ROOK: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
]);

#[rustfmt::skip]
const QUEEN: Psqt = Psqt::new([
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
]);

#[rustfmt::skip]
const KING_MG: Psqt = Psqt::new([
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
]);

#[rustfmt::skip]
const KING_EG: Psqt = Psqt::new([
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
///
/// Values are stored in centipawns, indexed by square from White's perspective.
#[derive(Debug)]
pub struct Psqt([i32; 64]);

impl Psqt {
    /// Fetch the positional value, in pawns, of a `color` piece of `kind` standing on `square`.
    ///
    /// If `endgame` is set, the King uses its endgame table.
    #[inline(always)]
    pub fn eval(kind: PieceKind, color: Color, square: Square, endgame: bool) -> Score {
        let psqt = Self::get_table_for(kind, endgame);
        Score(psqt.get_relative(square, color) as f64 / 100.0)
    }

    /// Fetch the Piece-Square Table for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_table_for<'a>(kind: PieceKind, endgame: bool) -> &'a Self {
        match kind {
            PieceKind::Pawn => &PAWN,
            PieceKind::Knight => &KNIGHT,
            PieceKind::Bishop => &BISHOP,
            PieceKind::Rook => &ROOK,
            PieceKind::Queen => &QUEEN,
            PieceKind::King if endgame => &KING_EG,
            PieceKind::King => &KING_MG,
        }
    }

    /// Creates a new [`Psqt`] from an array written as it is displayed (rank 8 first).
    const fn new(psqt: [i32; 64]) -> Self {
        let mut flipped = psqt;

        let mut i = 0;
        while i < psqt.len() {
            // Flip the rank, not the file, so it can be indexed by square from White's perspective
            flipped[i] = psqt[i ^ 56];
            i += 1;
        }

        Self(flipped)
    }

    /// Get the value of this PSQT at the provided square.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `color`.
    ///
    /// Black's tables are White's, mirrored across the middle of the board.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        match color {
            Color::White => self.0[square.index()],
            Color::Black => self.0[square.index() ^ 56],
        }
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it in the same way it is written in the code (White's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Black
        } else {
            Color::White
        };

        for rank in (0..8).rev() {
            write!(f, "{}| ", rank + 1)?;
            for file in 0..8 {
                let square = Square::from_index_unchecked(rank * 8 + file);
                write!(f, "{:3} ", self.get_relative(square, color))?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in 0..8 {
            write!(f, "----")?;
        }
        write!(f, "\n    ")?;
        for file in 'a'..='h' {
            write!(f, "{file}   ")?;
        }

        Ok(())
    }
}
