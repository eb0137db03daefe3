/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, PieceKind};

/// FEN string of the standard starting position.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Move played by White on its very first turn, before any search takes place.
pub const DEFAULT_OPENING: &str = "b1c3";

/// Default depth limit of the search, in plies.
pub const DEFAULT_DEPTH: usize = 4;

/// Default node allowance of the search.
///
/// This is compared against the product of the branching factors along a path,
/// not against an exact count of visited nodes.
pub const DEFAULT_NODES: u64 = 1000;

/// Default number of worker threads used to evaluate root moves.
pub const DEFAULT_THREADS: usize = 4;

/// Number of pieces each side has in the starting position.
pub const PIECES_PER_SIDE: u32 = 16;

/// Every kind of piece, King last.
pub const PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

/// Both colors, White first.
pub const COLORS: [Color; 2] = [Color::White, Color::Black];
