/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Move, PieceKind};
use rand::{rngs::StdRng, SeedableRng};

use crate::{squares_of, Antichess, Rules};

/// Squares, distances, and confinement metrics shared by the solvers.
mod geometry;

/// Lone Queen against lone King.
mod queen;

/// Lone Rook against lone King, and the confinement scan shared with the two-piece endings.
mod rook;

/// Two Rooks, or Rook and Queen, against lone King.
mod simplify;

pub use geometry::*;

/// A low-material ending that is played by technique rather than search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndgameKind {
    /// King and Rook against a lone King.
    OneRook,

    /// King and Queen against a lone King.
    OneQueen,

    /// King and two Rooks against a lone King.
    TwoRooks,

    /// King, Rook, and Queen against a lone King.
    RookAndQueen,
}

impl EndgameKind {
    /// Classifies `position` from the side-to-move's point of view.
    ///
    /// Returns `None` unless the opponent has a lone King and the side-to-move has one of the known shapes.
    pub fn classify<R: Rules>(position: &Antichess<R>) -> Option<Self> {
        let us = position.side_to_move();
        if position.piece_count(us.opponent()) != 1 {
            return None;
        }

        let pieces = position.piece_count(us);
        let rooks = position.pieces(PieceKind::Rook, us).count_ones();
        let queens = position.pieces(PieceKind::Queen, us).count_ones();

        match (pieces, rooks, queens) {
            (2, 1, _) => Some(Self::OneRook),
            (2, _, 1) => Some(Self::OneQueen),
            (3, 2, _) => Some(Self::TwoRooks),
            (3, 1, 1) => Some(Self::RookAndQueen),
            _ => None,
        }
    }
}

/// Computes moves for the known endings directly from the geometry of the board.
///
/// Near-ties are broken randomly to avoid repeating positions.
/// The random source is owned by the solver, so a fixed seed makes it deterministic.
#[derive(Debug, Clone)]
pub struct EndgameSolver {
    rng: StdRng,
}

impl EndgameSolver {
    /// Construct a new [`EndgameSolver`], seeded with `seed` if provided, or from the OS otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self { rng }
    }

    /// Chooses a move for `position`, which must be an ending of the given `kind`.
    ///
    /// Returns `None` only if there are no legal moves.
    ///
    /// # Panics
    /// If `position` does not classify as `kind`.
    pub fn get_best_move<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        kind: EndgameKind,
    ) -> Option<Move> {
        let mv = match kind {
            EndgameKind::OneRook => self.lone_rook(position),
            EndgameKind::OneQueen => self.lone_queen(position),
            EndgameKind::TwoRooks | EndgameKind::RookAndQueen => self.two_pieces(position, kind),
        };

        tracing::debug!(
            "{kind:?} ending on {:?}: playing {}",
            position.to_fen(),
            mv.map(|mv| mv.to_string()).unwrap_or_default()
        );

        mv
    }
}

/// Fails fast if `position` is not an ending of the given `kind`.
fn check_precondition<R: Rules>(position: &Antichess<R>, kind: EndgameKind) {
    let found = EndgameKind::classify(position);
    assert!(
        found == Some(kind),
        "{kind:?} solver called on a {found:?} position: {:?}",
        position.to_fen()
    );
}

/// Returns `true` if a non-King piece of `us` can be captured for free.
fn leaves_piece_hanging<R: Rules>(position: &Antichess<R>, us: Color) -> bool {
    let them = us.opponent();
    let pieces = position.occupancy(us) & !position.pieces(PieceKind::King, us);

    squares_of(pieces)
        .any(|sq| position.attackers(them, sq) != 0 && position.attackers(us, sq) == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let cases = [
            ("8/8/8/8/8/1R6/8/k1K5 w - - 0 1", Some(EndgameKind::OneRook)),
            ("8/8/8/8/8/1Q6/8/k1K5 w - - 0 1", Some(EndgameKind::OneQueen)),
            ("8/8/8/8/8/1R6/7R/k1K5 w - - 0 1", Some(EndgameKind::TwoRooks)),
            ("8/8/8/8/8/1R6/7Q/k1K5 w - - 0 1", Some(EndgameKind::RookAndQueen)),
            // Wrong side to move
            ("8/8/8/8/8/1R6/8/k1K5 b - - 0 1", None),
            // Opponent has more than a King
            ("8/8/8/8/8/1R6/p7/k1K5 w - - 0 1", None),
            // Two Queens isn't a known shape
            ("8/8/8/8/8/1Q6/7Q/k1K5 w - - 0 1", None),
            (crate::FEN_STARTPOS, None),
        ];

        for (fen, expected) in cases {
            let pos = Antichess::from_fen(fen).unwrap();
            assert_eq!(EndgameKind::classify(&pos), expected, "{fen}");
        }
    }

    #[test]
    fn test_seeded_solver_is_deterministic() {
        let pos = Antichess::from_fen("8/8/3k4/8/8/8/8/R3K3 w - - 0 1").unwrap();

        let a = EndgameSolver::new(Some(7)).get_best_move(&pos, EndgameKind::OneRook);
        let b = EndgameSolver::new(Some(7)).get_best_move(&pos, EndgameKind::OneRook);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic]
    fn test_wrong_shape_is_a_programming_error() {
        let pos = Antichess::from_fen("8/8/8/8/8/1R6/7R/k1K5 w - - 0 1").unwrap();
        EndgameSolver::new(Some(0)).get_best_move(&pos, EndgameKind::OneRook);
    }
}
