/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, PieceKind, Square};

use crate::{single_square, squares_of, Antichess, Rules};

/// File of `square`, as an index in `[0, 7]`.
#[inline(always)]
pub const fn file_of(square: Square) -> i32 {
    (square.index() % 8) as i32
}

/// Rank of `square`, as an index in `[0, 7]`.
#[inline(always)]
pub const fn rank_of(square: Square) -> i32 {
    (square.index() / 8) as i32
}

/// Builds a square from file and rank indices, if both are on the board.
#[inline(always)]
pub fn square_at(file: i32, rank: i32) -> Option<Square> {
    ((0..8).contains(&file) && (0..8).contains(&rank))
        .then(|| Square::from_index_unchecked((rank * 8 + file) as usize))
}

/// Manhattan distance between two squares.
#[inline(always)]
pub const fn distance(a: Square, b: Square) -> u32 {
    (file_of(a) - file_of(b)).unsigned_abs() + (rank_of(a) - rank_of(b)).unsigned_abs()
}

/// Chebyshev (King-move) distance between two squares.
#[inline(always)]
pub fn king_distance(a: Square, b: Square) -> u32 {
    (file_of(a) - file_of(b))
        .unsigned_abs()
        .max((rank_of(a) - rank_of(b)).unsigned_abs())
}

/// A corner of the board, as seen from a confining piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    SouthWest,
    NorthWest,
    SouthEast,
    NorthEast,
}

impl Quadrant {
    /// The quadrant `square` lies in relative to `piece`.
    ///
    /// Squares on the piece's file count as east, and squares on its rank count as north.
    pub fn of(piece: Square, square: Square) -> Self {
        let west = file_of(square) < file_of(piece);
        let south = rank_of(square) < rank_of(piece);

        match (west, south) {
            (true, true) => Self::SouthWest,
            (true, false) => Self::NorthWest,
            (false, true) => Self::SouthEast,
            (false, false) => Self::NorthEast,
        }
    }
}

/// Size of the rectangle the enemy King is confined to by a Rook or Queen on `piece`.
///
/// The rectangle spans from `piece` to the corner of the quadrant the enemy King is in.
/// This shrinks as the piece closes in, and is used as a progress metric.
pub fn king_movement_area(piece: Square, enemy_king: Square) -> u32 {
    let (file, rank) = (file_of(piece) as u32, rank_of(piece) as u32);

    match Quadrant::of(piece, enemy_king) {
        Quadrant::SouthWest => file * rank,
        Quadrant::NorthWest => file * (7 - rank),
        Quadrant::SouthEast => (7 - file) * rank,
        Quadrant::NorthEast => (7 - file) * (7 - rank),
    }
}

/// Returns `true` if `king` stands on the file or rank of `piece`, on the side facing the enemy King.
///
/// From there, the friendly King gets in the way of the confinement and the enemy King can approach
/// the piece to win it back.
pub fn is_king_picking(piece: Square, king: Square, enemy_king: Square) -> bool {
    let (pf, pr) = (file_of(piece), rank_of(piece));
    let (kf, kr) = (file_of(king), rank_of(king));

    let (west, south) = match Quadrant::of(piece, enemy_king) {
        Quadrant::SouthWest => (true, true),
        Quadrant::NorthWest => (true, false),
        Quadrant::SouthEast => (false, true),
        Quadrant::NorthEast => (false, false),
    };

    let along_rank = kr == pr && if west { kf < pf } else { kf > pf };
    let along_file = kf == pf && if south { kr < pr } else { kr > pr };

    along_rank || along_file
}

/// Returns `true` if `king` is adjacent to `piece`, and can therefore recapture on its square.
#[inline(always)]
pub fn is_protected(piece: Square, king: Square) -> bool {
    king_distance(piece, king) <= 1
}

/// Returns `true` if `a` and `b` are a Knight's move apart.
#[inline(always)]
pub fn is_knight_move(a: Square, b: Square) -> bool {
    let df = (file_of(a) - file_of(b)).abs();
    let dr = (rank_of(a) - rank_of(b)).abs();
    (df == 1 && dr == 2) || (df == 2 && dr == 1)
}

/// Returns `true` if both Kings lie in the same quadrant relative to `piece`.
#[inline(always)]
pub fn kings_share_quadrant(piece: Square, king: Square, enemy_king: Square) -> bool {
    Quadrant::of(piece, king) == Quadrant::of(piece, enemy_king)
}

/// The squares that matter in an ending of a single confining piece against a lone King.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setup {
    /// The confining Rook or Queen.
    pub piece: Square,

    /// The friendly King.
    pub king: Square,

    /// The lone enemy King.
    pub enemy_king: Square,
}

impl Setup {
    /// Locates the pieces of `us` and the enemy King.
    ///
    /// If `us` has several pieces of `kind`, the one confining the enemy King the most is used.
    pub fn of<R: Rules>(position: &Antichess<R>, us: Color, kind: PieceKind) -> Option<Self> {
        let king = single_square(position.pieces(PieceKind::King, us))?;
        let enemy_king = single_square(position.pieces(PieceKind::King, us.opponent()))?;
        let piece = squares_of(position.pieces(kind, us))
            .min_by_key(|&sq| king_movement_area(sq, enemy_king))?;

        Some(Self {
            piece,
            king,
            enemy_king,
        })
    }

    /// Confinement area of the enemy King.
    #[inline(always)]
    pub fn area(&self) -> u32 {
        king_movement_area(self.piece, self.enemy_king)
    }

    /// Sum of the three pairwise distances between the pieces.
    #[inline(always)]
    pub fn spread(&self) -> u32 {
        distance(self.king, self.piece)
            + distance(self.piece, self.enemy_king)
            + distance(self.king, self.enemy_king)
    }

    /// Manhattan distance between the two Kings.
    #[inline(always)]
    pub fn kings_distance(&self) -> u32 {
        distance(self.king, self.enemy_king)
    }
}
