/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Move, PieceKind};
use rand::Rng;

use super::{
    check_precondition, file_of, is_king_picking, leaves_piece_hanging, rank_of, square_at,
    EndgameKind, EndgameSolver, Setup,
};
use crate::{Antichess, Rules};

impl EndgameSolver {
    /// Plays King and Rook against a lone King.
    ///
    /// Once the enemy King is confined to two squares, mates directly if the Kings are in opposition on an edge.
    /// Otherwise, scans every move for a mate, and failing that, for the move that pulls all
    /// three pieces closest together without loosening the confinement.
    pub(super) fn lone_rook<R: Rules>(&mut self, position: &Antichess<R>) -> Option<Move> {
        check_precondition(position, EndgameKind::OneRook);

        let us = position.side_to_move();
        let start = Setup::of(position, us, PieceKind::Rook)?;

        if start.area() == 2 {
            if let Some(mv) = rook_finish(position, &start) {
                return Some(mv);
            }
        }

        self.confine(position, PieceKind::Rook, &start)
    }

    /// One-ply scan shared by the Rook endings.
    ///
    /// Checkmates are played immediately. Checks and stalemates are skipped, as are moves that
    /// leave a piece hanging or let the enemy King pick off the confining `kind` piece.
    /// Among the rest, the move with the smallest confinement area and piece spread is chosen,
    /// with exact ties decided by a coin flip. The area may never exceed the one in `start`.
    ///
    /// If nothing qualifies, the least-bad move found is returned instead.
    pub(super) fn confine<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        kind: PieceKind,
        start: &Setup,
    ) -> Option<Move> {
        let us = position.side_to_move();
        let moves = position.legal_moves();

        let mut min_area = start.area();
        let mut min_spread = u32::MAX;
        let mut best = None;

        // Ordered by (hangs a piece, area, spread)
        let mut fallback: Option<((bool, u32, u32), Move)> = None;

        for &mv in &moves {
            let child = position.with_move_made(mv);

            if child.is_checkmate() {
                return Some(mv);
            }
            if child.is_stalemate() {
                continue;
            }

            let Some(setup) = Setup::of(&child, us, kind) else {
                continue;
            };
            let (area, spread) = (setup.area(), setup.spread());
            let hangs = leaves_piece_hanging(&child, us);

            let key = (hangs, area, spread);
            if fallback.map_or(true, |(k, _)| key < k) {
                fallback = Some((key, mv));
            }

            if child.is_check()
                || hangs
                || is_king_picking(setup.piece, setup.king, setup.enemy_king)
            {
                continue;
            }

            if area <= min_area && spread <= min_spread {
                if area == min_area && spread == min_spread && self.rng.random_bool(0.5) {
                    continue;
                }

                min_area = area;
                min_spread = spread;
                best = Some(mv);
            }
        }

        best.or(fallback.map(|(_, mv)| mv)).or(moves.first().copied())
    }
}

/// Finds the mating Rook move when the enemy King is boxed into two squares on an edge.
///
/// With the Kings two files apart on the same rank and the enemy King on an edge file, the Rook
/// slides along its rank onto the enemy King's file. The transposed pattern works the same way.
/// The move is only returned if it is legal and actually mates.
fn rook_finish<R: Rules>(position: &Antichess<R>, setup: &Setup) -> Option<Move> {
    let (kf, kr) = (file_of(setup.king), rank_of(setup.king));
    let (ef, er) = (file_of(setup.enemy_king), rank_of(setup.enemy_king));
    let (pf, pr) = (file_of(setup.piece), rank_of(setup.piece));

    let target = if kr == er && (kf - ef).abs() == 2 && (ef == 0 || ef == 7) {
        square_at(ef, pr)
    } else if kf == ef && (kr - er).abs() == 2 && (er == 0 || er == 7) {
        square_at(pf, er)
    } else {
        None
    }?;

    position
        .legal_moves()
        .into_iter()
        .find(|mv| mv.from() == setup.piece && mv.to() == target)
        .filter(|&mv| position.with_move_made(mv).is_checkmate())
}
