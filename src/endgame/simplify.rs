/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Move, PieceKind};

use super::{check_precondition, EndgameKind, EndgameSolver, Setup};
use crate::{Antichess, Rules};

impl EndgameSolver {
    /// Plays two Rooks, or Rook and Queen, against a lone King.
    ///
    /// The extra piece is given away as soon as the enemy King is forced to take it, which reduces
    /// the position to [`EndgameKind::OneRook`]. Until then, the Rooks confine the enemy King the same
    /// way a lone Rook does.
    pub(super) fn two_pieces<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        kind: EndgameKind,
    ) -> Option<Move> {
        check_precondition(position, kind);

        let us = position.side_to_move();

        for mv in position.legal_moves() {
            let child = position.with_move_made(mv);

            if child.is_checkmate() {
                return Some(mv);
            }
            if child.is_stalemate() {
                continue;
            }

            if simplifies(&child, us) {
                tracing::trace!("{mv} forces the ending down to a lone Rook");
                return Some(mv);
            }
        }

        let start = Setup::of(position, us, PieceKind::Rook)?;
        self.confine(position, PieceKind::Rook, &start)
    }
}

/// Returns `true` if every reply in `position` captures a piece of `us` and leaves a lone Rook ending.
///
/// Losing the Rook of a Rook and Queen instead would leave a lone Queen, so that does not count.
fn simplifies<R: Rules>(position: &Antichess<R>, us: Color) -> bool {
    let replies = position.legal_moves();

    !replies.is_empty()
        && replies.into_iter().all(|reply| {
            let after = position.with_move_made(reply);
            position.is_capture(reply)
                && after.side_to_move() == us
                && EndgameKind::classify(&after) == Some(EndgameKind::OneRook)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(fen: &str, kind: EndgameKind) -> (Antichess, Move) {
        let pos = Antichess::from_fen(fen).unwrap();
        let mv = EndgameSolver::new(Some(0))
            .get_best_move(&pos, kind)
            .unwrap();
        (pos, mv)
    }

    #[test]
    fn test_queen_is_given_up_for_a_lone_rook() {
        let (pos, mv) = solve("7k/8/8/3Q4/8/8/2R5/K7 w - - 0 1", EndgameKind::RookAndQueen);
        assert_eq!(mv, "d5g8");

        let child = pos.with_move_made(mv);
        assert!(simplifies(&child, Color::White));

        let reply = child.legal_moves();
        assert_eq!(reply.len(), 1);
        let after = child.with_move_made(reply[0]);
        assert_eq!(EndgameKind::classify(&after), Some(EndgameKind::OneRook));
    }

    #[test]
    fn test_one_of_two_rooks_is_given_up() {
        let (pos, mv) = solve("7k/8/8/8/8/8/1R4R1/K7 w - - 0 1", EndgameKind::TwoRooks);
        assert!(mv == "g2g7" || mv == "g2g8", "{mv}");
        assert!(simplifies(&pos.with_move_made(mv), Color::White));
    }

    #[test]
    fn test_rook_sacrifice_from_rook_and_queen_does_not_simplify() {
        // Rg8+ forces Kxg8, but that leaves a lone Queen
        let pos = Antichess::from_fen("7k/8/8/8/8/8/6R1/K2Q4 w - - 0 1").unwrap();
        let rg8 = pos.legal_moves().into_iter().find(|mv| *mv == "g2g8").unwrap();
        assert!(!simplifies(&pos.with_move_made(rg8), Color::White));
    }

    #[test]
    fn test_confines_when_nothing_simplifies() {
        let (pos, mv) = solve("8/8/3k4/8/8/8/R7/R3K3 w - - 0 1", EndgameKind::TwoRooks);
        assert!(pos.is_legal(mv));

        let child = pos.with_move_made(mv);
        assert!(!child.is_stalemate());

        let before = Setup::of(&pos, Color::White, PieceKind::Rook).unwrap();
        let after = Setup::of(&child, Color::White, PieceKind::Rook).unwrap();
        assert!(after.area() <= before.area(), "{mv}");
    }

    #[test]
    #[should_panic]
    fn test_lone_rook_is_not_two_pieces() {
        let pos = Antichess::from_fen("8/8/8/8/8/1R6/8/k1K5 w - - 0 1").unwrap();
        EndgameSolver::new(Some(0)).get_best_move(&pos, EndgameKind::TwoRooks);
    }
}
