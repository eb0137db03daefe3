/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Antichess, EvalWeights, Evaluator, Rules, Score};

/// Returns `true` if `position` can be evaluated statically without missing a pending exchange.
///
/// A position is not quiet if the side-to-move is in check, or if it was entered by a capture.
#[inline(always)]
pub fn is_quiet<R: Rules>(position: &Antichess<R>) -> bool {
    !position.is_check() && !position.last_move().is_some_and(|mv| mv.is_capture())
}

/// Extends the search through captures until the position settles.
///
/// Quiet positions are scored statically. Otherwise the static evaluation serves as the
/// baseline ("stand pat"), and every legal capture is searched one ply deeper within `(alpha, beta)`.
///
/// Each recursive call consumes a capture, so this terminates.
pub fn quiescent_search<R: Rules>(
    position: &Antichess<R>,
    mut alpha: Score,
    beta: Score,
    weights: EvalWeights,
    nodes: &mut u64,
) -> Score {
    *nodes += 1;

    // Evaluate the current position, to serve as our baseline
    let stand_pat = Evaluator::new(position, weights).eval();
    if is_quiet(position) {
        return stand_pat;
    }

    // Beta cutoff; this position is "too good" and our opponent would never let us get here
    if stand_pat >= beta {
        return beta;
    }
    alpha = alpha.max(stand_pat);

    for mv in position.legal_captures() {
        // Copy-make the new position
        let new = position.with_move_made(mv);
        let score = -quiescent_search(&new, -beta, -alpha, weights, nodes);

        if score >= beta {
            return beta;
        }
        alpha = alpha.max(score);
    }

    alpha
}
