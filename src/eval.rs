/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, Game, PieceKind};

use crate::{squares_of, Antichess, Psqt, Rules, Score, COLORS, PIECES_PER_SIDE, PIECE_KINDS};

/// Weights of the individual evaluation terms, and the piece counts at which they switch on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    /// Weight of the (phase-scaled) material difference.
    pub material: f64,

    /// Weight of the mobility difference.
    ///
    /// Mobility requires a full move generation for each side, so it is disabled when this is `0.0`.
    pub mobility: f64,

    /// Weight of the piece-square table difference.
    pub positional: f64,

    /// The positional term is only applied once at most this many pieces remain on the board.
    pub positional_pieces: u32,

    /// The endgame King table is used once both sides have at most this many pieces.
    pub king_endgame_pieces: u32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 20.0,
            mobility: 0.0,
            positional: 0.5,
            positional_pieces: 16,
            king_endgame_pieces: 5,
        }
    }
}

/// Encapsulates the logic of scoring a losing chess position.
///
/// Positions are evaluated from the side-to-move's perspective.
/// That is, if it is Black's turn, a "good" evaluation for Black will be a positive number.
#[derive(Debug, Clone)]
pub struct Evaluator<'a, R: Rules = Game> {
    /// The position to evaluate.
    position: &'a Antichess<R>,

    /// Weights of each term.
    weights: EvalWeights,
}

impl<'a, R: Rules> Evaluator<'a, R> {
    /// Construct a new [`Evaluator`].
    #[inline(always)]
    pub fn new(position: &'a Antichess<R>, weights: EvalWeights) -> Self {
        Self { position, weights }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// A positive/high number is good for the side-to-move, while a negative number is better for the opponent.
    /// A side-to-move without any legal moves has won, so that position scores [`Score::WIN`].
    #[inline(always)]
    pub fn eval(self) -> Score {
        if self.position.rules().legal_moves().is_empty() {
            return Score::WIN;
        }

        self.eval_for(self.position.side_to_move())
    }

    /// Evaluate this position from `color`'s perspective, ignoring whether the game is over.
    pub fn eval_for(&self, color: Color) -> Score {
        let material = self.material(color) * self.weights.material;
        let positional = self.positional(color) * self.weights.positional;

        // Mobility is relative to the side-to-move, so flip it for the opponent
        let mobility = if self.weights.mobility == 0.0 {
            Score::DRAW
        } else if color == self.position.side_to_move() {
            self.mobility() * self.weights.mobility
        } else {
            -self.mobility() * self.weights.mobility
        };

        material + mobility + positional
    }

    /// Difference in phase-scaled material between `color` and its opponent.
    pub fn material(&self, color: Color) -> Score {
        let opponent = color.opponent();
        let own_ratio = phase_ratio(self.position.piece_count(opponent));
        let opp_ratio = phase_ratio(self.position.piece_count(color));

        // Pawns grow in value once material thins for either side
        let thinning = own_ratio > 0.5 || opp_ratio > 0.5;

        self.material_of(color, own_ratio, thinning) - self.material_of(opponent, opp_ratio, thinning)
    }

    /// Sum of the values of all `color` pieces, each scaled by `ratio`.
    fn material_of(&self, color: Color, ratio: f64, thinning: bool) -> Score {
        PIECE_KINDS
            .into_iter()
            .map(|kind| {
                let count = self.position.pieces(kind, color).count_ones() as f64;
                let mut multiplier = ratio.max(min_multiplier(kind));
                if thinning && kind == PieceKind::Pawn {
                    multiplier *= 1.5;
                }

                Score(value_of(kind) * multiplier * count)
            })
            .sum()
    }

    /// Difference between the number of moves the side-to-move has and the number its opponent
    /// would have if it were their turn.
    ///
    /// Moves are counted by the base rules, so a pending capture does not shrink either side's count.
    /// A side in check cannot pass, so mobility is `0` in that case.
    pub fn mobility(&self) -> Score {
        if self.position.is_check() {
            return Score::DRAW;
        }

        let own = self.position.rules().legal_moves().len() as f64;
        let opp = self
            .position
            .with_nullmove_made()
            .rules()
            .legal_moves()
            .len() as f64;

        Score(own - opp)
    }

    /// Difference in piece-square table values between `color` and its opponent.
    ///
    /// Returns `0` unless few enough pieces remain on the board.
    pub fn positional(&self, color: Color) -> Score {
        let own = self.position.piece_count(color);
        let opp = self.position.piece_count(color.opponent());

        if own + opp > self.weights.positional_pieces {
            return Score::DRAW;
        }

        let endgame = own <= self.weights.king_endgame_pieces && opp <= self.weights.king_endgame_pieces;

        self.psqt_of(color, endgame) - self.psqt_of(color.opponent(), endgame)
    }

    /// Sum of the piece-square table values of all `color` pieces.
    fn psqt_of(&self, color: Color, endgame: bool) -> Score {
        PIECE_KINDS
            .into_iter()
            .flat_map(|kind| squares_of(self.position.pieces(kind, color)).map(move |sq| (kind, sq)))
            .map(|(kind, square)| Psqt::eval(kind, color, square, endgame))
            .sum()
    }
}

impl<R: Rules> fmt::Display for Evaluator<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.position.side_to_move();

        writeln!(f, "Side to move: {color:?}")?;
        for side in COLORS {
            writeln!(f, "{side:?} pieces: {}", self.position.piece_count(side))?;
        }
        writeln!(
            f,
            "Material:   {} (x{})",
            self.material(color),
            self.weights.material
        )?;
        if self.weights.mobility != 0.0 {
            writeln!(
                f,
                "Mobility:   {} (x{})",
                self.mobility(),
                self.weights.mobility
            )?;
        }
        writeln!(
            f,
            "Positional: {} (x{})",
            self.positional(color),
            self.weights.positional
        )?;
        write!(f, "Score:      {}", self.clone().eval())
    }
}

/// Returns the base value of the provided `PieceKind`, in pawns.
///
/// Values are obtained from here: <https://www.chessprogramming.org/Simplified_Evaluation_Function>
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> f64 {
    match kind {
        PieceKind::Pawn => 1.0,
        PieceKind::Knight => 3.2,
        PieceKind::Bishop => 3.3,
        PieceKind::Rook => 5.0,
        PieceKind::Queen => 9.0,
        PieceKind::King => 2000.0,
    }
}

/// Smallest multiplier a piece's value may be scaled by, regardless of game phase.
#[inline(always)]
pub const fn min_multiplier(kind: PieceKind) -> f64 {
    match kind {
        PieceKind::Pawn => 0.3,
        PieceKind::Knight => 0.5,
        PieceKind::Bishop => 0.5,
        PieceKind::Rook => 0.6,
        PieceKind::Queen => 0.7,
        PieceKind::King => 1.0,
    }
}

/// Fraction of the opponent's starting pieces that have been removed, in `[0, 1]`.
#[inline(always)]
fn phase_ratio(opponent_pieces: u32) -> f64 {
    PIECES_PER_SIDE.saturating_sub(opponent_pieces) as f64 / PIECES_PER_SIDE as f64
}
