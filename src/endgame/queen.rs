/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Move, PieceKind, Square};
use rand::{seq::IndexedRandom, Rng};

use super::{
    check_precondition, file_of, is_knight_move, is_protected, kings_share_quadrant, rank_of,
    square_at, EndgameKind, EndgameSolver, Setup,
};
use crate::{Antichess, Rules};

/// A known mate: the Queen moves from `queen` to `to`.
#[derive(Debug, Clone, Copy)]
struct Finish {
    queen: Square,
    king: Square,
    enemy_king: Square,
    to: Square,
}

/// Mating Queen moves, with the enemy King in the south-west corner or on the a-file.
///
/// Every other orientation is found by [`Symmetry`].
#[rustfmt::skip]
const FINISHING_MOVES: [Finish; 7] = [
    Finish { queen: Square::H2, king: Square::B3, enemy_king: Square::A1, to: Square::B2 },
    Finish { queen: Square::D2, king: Square::B3, enemy_king: Square::A1, to: Square::B2 },
    Finish { queen: Square::B6, king: Square::C2, enemy_king: Square::A1, to: Square::B2 },
    Finish { queen: Square::C5, king: Square::B3, enemy_king: Square::A1, to: Square::C1 },
    Finish { queen: Square::G2, king: Square::B3, enemy_king: Square::A1, to: Square::A2 },
    Finish { queen: Square::B8, king: Square::C2, enemy_king: Square::A1, to: Square::B1 },
    Finish { queen: Square::H8, king: Square::C4, enemy_king: Square::A4, to: Square::A8 },
];

/// One of the eight symmetries of the board.
///
/// Applied as the flips first, then the transposition across the a1-h8 diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Symmetry {
    flip_file: bool,
    flip_rank: bool,
    transpose: bool,
}

impl Symmetry {
    fn all() -> impl Iterator<Item = Self> {
        (0..8).map(|i| Self {
            flip_file: i & 1 != 0,
            flip_rank: i & 2 != 0,
            transpose: i & 4 != 0,
        })
    }

    fn apply(self, square: Square) -> Square {
        let (mut file, mut rank) = (file_of(square), rank_of(square));
        if self.flip_file {
            file = 7 - file;
        }
        if self.flip_rank {
            rank = 7 - rank;
        }
        if self.transpose {
            (file, rank) = (rank, file);
        }

        square_at(file, rank).unwrap_or(square)
    }

    fn invert(self, square: Square) -> Square {
        let (mut file, mut rank) = (file_of(square), rank_of(square));
        if self.transpose {
            (file, rank) = (rank, file);
        }
        if self.flip_file {
            file = 7 - file;
        }
        if self.flip_rank {
            rank = 7 - rank;
        }

        square_at(file, rank).unwrap_or(square)
    }
}

/// Looks up the current placement in [`FINISHING_MOVES`] under every symmetry of the board.
fn finishing_move<R: Rules>(position: &Antichess<R>, setup: &Setup) -> Option<Move> {
    Symmetry::all().find_map(|sym| {
        let key = (
            sym.apply(setup.piece),
            sym.apply(setup.king),
            sym.apply(setup.enemy_king),
        );

        let finish = FINISHING_MOVES
            .iter()
            .find(|f| (f.queen, f.king, f.enemy_king) == key)?;
        let to = sym.invert(finish.to);

        position
            .legal_moves()
            .into_iter()
            .find(|mv| mv.from() == setup.piece && mv.to() == to)
    })
}

/// Returns `true` if the Queen of `us` can be captured for free in `position`.
#[inline(always)]
fn queen_hangs<R: Rules>(position: &Antichess<R>, us: Color, setup: &Setup) -> bool {
    position.attackers(us.opponent(), setup.piece) != 0 && !is_protected(setup.piece, setup.king)
}

impl EndgameSolver {
    /// Plays King and Queen against a lone King.
    ///
    /// Known mating placements are looked up first. After that, the stages are tried in order:
    /// confining the enemy King while walking the friendly King closer, closing in with the King
    /// when the Queen is a Knight's move away, and finally any move that neither stalemates nor
    /// gives the Queen away.
    pub(super) fn lone_queen<R: Rules>(&mut self, position: &Antichess<R>) -> Option<Move> {
        check_precondition(position, EndgameKind::OneQueen);

        let us = position.side_to_move();
        let start = Setup::of(position, us, PieceKind::Queen)?;
        let moves = position.legal_moves();

        if let Some(mv) = finishing_move(position, &start) {
            return Some(mv);
        }

        if let Some(mv) = self.queen_confine(position, &moves, &start) {
            return Some(mv);
        }

        if is_knight_move(start.piece, start.enemy_king) {
            if let Some(mv) = self.queen_approach(position, &moves) {
                return Some(mv);
            }
        }

        self.queen_last_resort(position, &moves)
            .or_else(|| moves.first().copied())
    }

    /// Mates if possible, otherwise brings the Kings closer without loosening the confinement.
    ///
    /// Skips stalemates, moves that leave the Queen en prise, and Queen moves that end with both Kings
    /// in the same quadrant relative to the Queen.
    /// Once the enemy King is boxed into three squares or fewer, the Kings must actually get closer.
    fn queen_confine<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        moves: &[Move],
        start: &Setup,
    ) -> Option<Move> {
        let us = position.side_to_move();
        let start_area = start.area();
        let start_distance = start.kings_distance();
        let strict = start_area <= 3;

        // Ordered by (Kings' distance, area)
        let mut best: Option<((u32, u32), Move)> = None;

        for &mv in moves {
            let child = position.with_move_made(mv);

            if child.is_checkmate() {
                return Some(mv);
            }
            if child.is_stalemate() {
                continue;
            }

            let Some(setup) = Setup::of(&child, us, PieceKind::Queen) else {
                continue;
            };

            if queen_hangs(&child, us, &setup) {
                continue;
            }
            if mv.from() == start.piece
                && kings_share_quadrant(setup.piece, setup.king, setup.enemy_king)
            {
                continue;
            }

            let (area, dist) = (setup.area(), setup.kings_distance());
            if area > start_area || (strict && dist >= start_distance) {
                continue;
            }

            let key = (dist, area);
            match best {
                Some((k, _)) if key > k => {}
                Some((k, _)) if key == k && self.rng.random_bool(0.5) => {}
                _ => best = Some((key, mv)),
            }
        }

        best.map(|(_, mv)| mv)
    }

    /// Brings the Kings as close as possible, ignoring the confinement.
    fn queen_approach<R: Rules>(&mut self, position: &Antichess<R>, moves: &[Move]) -> Option<Move> {
        let us = position.side_to_move();
        let mut best: Option<(u32, Move)> = None;

        for &mv in moves {
            let child = position.with_move_made(mv);
            if child.is_stalemate() {
                continue;
            }

            let Some(setup) = Setup::of(&child, us, PieceKind::Queen) else {
                continue;
            };
            if queen_hangs(&child, us, &setup) {
                continue;
            }

            let dist = setup.kings_distance();
            match best {
                Some((d, _)) if dist > d => {}
                Some((d, _)) if dist == d && self.rng.random_bool(0.5) => {}
                _ => best = Some((dist, mv)),
            }
        }

        best.map(|(_, mv)| mv)
    }

    /// Picks a random move that neither stalemates nor hangs the Queen, preferring ones that keep it protected.
    fn queen_last_resort<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        moves: &[Move],
    ) -> Option<Move> {
        let us = position.side_to_move();
        let mut protected = Vec::new();
        let mut safe = Vec::new();

        for &mv in moves {
            let child = position.with_move_made(mv);
            if child.is_stalemate() {
                continue;
            }

            let Some(setup) = Setup::of(&child, us, PieceKind::Queen) else {
                continue;
            };
            if queen_hangs(&child, us, &setup) {
                continue;
            }

            if is_protected(setup.piece, setup.king) {
                protected.push(mv);
            } else {
                safe.push(mv);
            }
        }

        let pool = if protected.is_empty() { safe } else { protected };
        pool.choose(&mut self.rng).copied()
    }
}
