/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Result;
use chessie::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks, Bitboard, Color,
    Game, Move, PieceKind, Square,
};

/// Mask containing every square of the board.
pub const ALL_SQUARES: u64 = u64::MAX;

/// The capabilities a standard chess rules engine must provide for the engine to play on top of it.
///
/// Implementors are value types: every "push" produces an independent copy, and the previous
/// position is kept around by the caller instead of being "popped".
pub trait Rules: Copy + Send + Sync {
    /// Parses a move in coordinate notation (`b1c3`, `e7e8q`) relative to this position.
    fn parse_move(&self, uci: &str) -> Result<Move>;

    /// The side whose turn it is.
    fn side_to_move(&self) -> Color;

    /// All standard-legal moves originating in `from` and landing in `to`, in generation order.
    fn legal_moves_masked(&self, from: u64, to: u64) -> Vec<Move>;

    /// All standard-legal moves, in generation order.
    #[inline(always)]
    fn legal_moves(&self) -> Vec<Move> {
        self.legal_moves_masked(ALL_SQUARES, ALL_SQUARES)
    }

    /// Returns `true` if `mv` is legal under standard chess rules.
    #[inline(always)]
    fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    /// Copies `self` and applies `mv` to the copy. No legality checks are performed.
    fn with_move_made(&self, mv: Move) -> Self;

    /// Copies `self` and passes the turn to the opponent.
    fn with_nullmove_made(&self) -> Self;

    /// Returns `true` if the side-to-move's King is attacked.
    fn is_check(&self) -> bool;

    /// Returns `true` if the side-to-move is in check and has no legal moves.
    #[inline(always)]
    fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves().is_empty()
    }

    /// Returns `true` if the side-to-move is not in check but has no legal moves.
    #[inline(always)]
    fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_moves().is_empty()
    }

    /// Occupancy mask of all `color` pieces that attack `square`.
    fn attackers(&self, color: Color, square: Square) -> u64;

    /// Occupancy mask of all pieces of the given kind and color.
    fn pieces(&self, kind: PieceKind, color: Color) -> u64;

    /// Occupancy mask of all pieces of `color`.
    fn occupancy(&self, color: Color) -> u64;

    /// Number of half-moves since the last capture or pawn move.
    fn halfmove_clock(&self) -> usize;

    /// FEN string of this position.
    fn to_fen(&self) -> String;
}

impl Rules for Game {
    #[inline(always)]
    fn parse_move(&self, uci: &str) -> Result<Move> {
        Move::from_uci(self, uci)
    }

    #[inline(always)]
    fn side_to_move(&self) -> Color {
        self.position().side_to_move()
    }

    fn legal_moves_masked(&self, from: u64, to: u64) -> Vec<Move> {
        self.get_legal_moves_from(Bitboard::new(from))
            .into_iter()
            .filter(|mv| to & mask_of(mv.to()) != 0)
            .collect()
    }

    #[inline(always)]
    fn with_move_made(&self, mv: Move) -> Self {
        Game::with_move_made(self, mv)
    }

    #[inline(always)]
    fn with_nullmove_made(&self) -> Self {
        let mut copied = *self;
        copied.toggle_side_to_move();
        copied
    }

    #[inline(always)]
    fn is_check(&self) -> bool {
        self.is_in_check()
    }

    fn attackers(&self, color: Color, square: Square) -> u64 {
        let blockers = self.occupied();
        let queens = self.piece_parts(color, PieceKind::Queen);

        let pawns = pawn_attacks(square, color.opponent()) & self.piece_parts(color, PieceKind::Pawn);
        let knights = knight_attacks(square) & self.piece_parts(color, PieceKind::Knight);
        let diagonals =
            bishop_attacks(square, blockers) & (self.piece_parts(color, PieceKind::Bishop) | queens);
        let orthogonals =
            rook_attacks(square, blockers) & (self.piece_parts(color, PieceKind::Rook) | queens);
        let king = king_attacks(square) & self.piece_parts(color, PieceKind::King);

        (pawns | knights | diagonals | orthogonals | king).inner()
    }

    #[inline(always)]
    fn pieces(&self, kind: PieceKind, color: Color) -> u64 {
        self.piece_parts(color, kind).inner()
    }

    #[inline(always)]
    fn occupancy(&self, color: Color) -> u64 {
        self.color(color).inner()
    }

    #[inline(always)]
    fn halfmove_clock(&self) -> usize {
        self.position().halfmove()
    }

    #[inline(always)]
    fn to_fen(&self) -> String {
        self.position().to_fen()
    }
}

/// Single-bit mask of `square`.
#[inline(always)]
pub const fn mask_of(square: Square) -> u64 {
    1 << square.index()
}

/// Iterates over the squares set in `mask`, from A1 to H8.
pub fn squares_of(mask: u64) -> impl Iterator<Item = Square> {
    (0..64usize)
        .filter(move |&i| mask & (1u64 << i) != 0)
        .map(Square::from_index_unchecked)
}

/// Fetches the only square set in `mask`, if exactly one is set.
#[inline(always)]
pub fn single_square(mask: u64) -> Option<Square> {
    (mask.count_ones() == 1).then(|| Square::from_index_unchecked(mask.trailing_zeros() as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    #[test]
    fn test_masked_generation_filters_both_ends() {
        let game = Game::from_fen(FEN_STARTPOS).unwrap();
        let knights = game.pieces(PieceKind::Knight, Color::White);
        let all = game.legal_moves_masked(knights, ALL_SQUARES);
        assert_eq!(all.len(), 4);

        let c3 = mask_of(Square::C3);
        let to_c3 = game.legal_moves_masked(knights, c3);
        assert_eq!(to_c3.len(), 1);
        assert_eq!(to_c3[0], "b1c3");
    }

    #[test]
    fn test_attackers_of_square() {
        // Black king on e5 is attacked by the rook on e1 and the knight on d3
        let game = Game::from_fen("8/8/8/4k3/8/3N4/8/K3R3 b - - 0 1").unwrap();
        let attackers = game.attackers(Color::White, Square::E5);
        assert_eq!(attackers, mask_of(Square::E1) | mask_of(Square::D3));
        assert!(game.is_check());
        assert_eq!(game.attackers(Color::Black, Square::E1), 0);
    }

    #[test]
    fn test_nullmove_passes_turn() {
        let game = Game::from_fen(FEN_STARTPOS).unwrap();
        let passed = game.with_nullmove_made();
        assert_eq!(passed.side_to_move(), Color::Black);
        assert_eq!(passed.legal_moves().len(), 20);
    }

    #[test]
    fn test_square_mask_helpers() {
        let mask = mask_of(Square::A1) | mask_of(Square::H8);
        let squares: Vec<_> = squares_of(mask).collect();
        assert_eq!(squares, vec![Square::A1, Square::H8]);
        assert_eq!(single_square(mask), None);
        assert_eq!(single_square(mask_of(Square::D4)), Some(Square::D4));
    }
}
