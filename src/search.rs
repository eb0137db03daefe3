/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{Context, Result};
use chessie::Move;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    is_quiet, quiescent_search, Antichess, EvalWeights, Evaluator, Rules, Score, DEFAULT_DEPTH,
    DEFAULT_NODES, DEFAULT_THREADS,
};

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, from the perspective of the side that made it.
    pub score: Score,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: usize,

    /// Node allowance.
    ///
    /// Every ply multiplies a running budget factor by the number of moves available.
    /// Once that factor reaches this value, the node is treated as a leaf.
    /// Wide subtrees therefore stop earlier than narrow ones.
    pub max_nodes: u64,

    /// Number of worker threads evaluating root moves.
    pub threads: usize,

    /// Weights used when evaluating leaves.
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            max_nodes: DEFAULT_NODES,
            threads: DEFAULT_THREADS,
            weights: EvalWeights::default(),
        }
    }
}

/// Chooses moves by depth- and budget-bounded alpha-beta search.
///
/// Root moves are evaluated in parallel on a dedicated pool of worker threads.
/// Each worker owns its copy of the position, so nothing is shared between them.
#[derive(Debug)]
pub struct Search {
    /// Configuration variables for this search.
    config: SearchConfig,

    /// Workers for evaluating root moves.
    pool: ThreadPool,
}

impl Search {
    /// Construct a new [`Search`], spawning its worker threads.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads.max(1))
            .thread_name(|i| format!("search-worker-{i}"))
            .build()
            .context("Failed to build search worker pool")?;

        Ok(Self { config, pool })
    }

    #[inline(always)]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches every legal move of `position` and returns the one with the highest utility.
    ///
    /// Ties are resolved in favor of the move generated first.
    /// If `position` has no legal moves, the result has no `bestmove`.
    pub fn get_best_move<R: Rules>(&self, position: &Antichess<R>) -> SearchResult {
        self.get_best_move_with(position, &self.config)
    }

    /// Like [`Search::get_best_move`], but bounded by the limits in `config` instead.
    ///
    /// The worker pool is reused as-is, so `config.threads` has no effect here.
    pub fn get_best_move_with<R: Rules>(
        &self,
        position: &Antichess<R>,
        config: &SearchConfig,
    ) -> SearchResult {
        let moves = position.legal_moves();
        let budget_factor = moves.len() as u64;

        let scores: Vec<(Score, u64)> = self.pool.install(|| {
            moves
                .par_iter()
                .map(|&mv| {
                    let mut ab = AlphaBeta::new(config);
                    let child = position.with_move_made(mv);
                    let score = ab.min_node(&child, 1, budget_factor, -Score::INF, Score::INF);
                    (score, ab.nodes)
                })
                .collect()
        });

        let mut res = SearchResult {
            // Initialize `bestmove` to the first move available
            bestmove: moves.first().copied(),
            ..Default::default()
        };

        for (&mv, (score, nodes)) in moves.iter().zip(scores) {
            res.nodes += nodes;
            if score > res.score {
                res.score = score;
                res.bestmove = Some(mv);
            }
        }

        tracing::debug!(
            "Searched {} root moves ({} nodes) on {:?}: {} with score {}",
            moves.len(),
            res.nodes,
            position.to_fen(),
            res.bestmove.map(|mv| mv.to_string()).unwrap_or_default(),
            res.score
        );

        res
    }
}

/// Paired max/min alpha-beta recursion, run by a single worker on one subtree.
///
/// Utilities are always from the perspective of the side to move at the root.
#[derive(Debug)]
pub(crate) struct AlphaBeta<'a> {
    config: &'a SearchConfig,

    /// Number of nodes visited, quiescence included.
    pub(crate) nodes: u64,
}

impl<'a> AlphaBeta<'a> {
    #[inline(always)]
    pub(crate) fn new(config: &'a SearchConfig) -> Self {
        Self { config, nodes: 0 }
    }

    /// Returns `true` if a node at this depth and budget should not be expanded.
    #[inline(always)]
    fn is_leaf(&self, depth: usize, budget_factor: u64) -> bool {
        depth >= self.config.max_depth || budget_factor >= self.config.max_nodes
    }

    /// Scores a leaf from the perspective of its side-to-move.
    #[inline(always)]
    fn leaf<R: Rules>(&mut self, position: &Antichess<R>, alpha: Score, beta: Score) -> Score {
        if is_quiet(position) {
            Evaluator::new(position, self.config.weights).eval()
        } else {
            quiescent_search(position, alpha, beta, self.config.weights, &mut self.nodes)
        }
    }

    /// A node where the side to move at the root is to move.
    pub(crate) fn max_node<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        depth: usize,
        budget_factor: u64,
        mut alpha: Score,
        beta: Score,
    ) -> Score {
        self.nodes += 1;

        if self.is_leaf(depth, budget_factor) {
            return self.leaf(position, alpha, beta);
        }

        let moves = position.legal_moves();

        // No legal moves is a win for the side to move, which the evaluator knows about
        if moves.is_empty() {
            return Evaluator::new(position, self.config.weights).eval();
        }

        let budget_factor = budget_factor.saturating_mul(moves.len() as u64);
        let mut value = -Score::INF;

        for mv in moves {
            // Copy-make the new position
            let new = position.with_move_made(mv);
            value = value.max(self.min_node(&new, depth + 1, budget_factor, alpha, beta));

            if value >= beta {
                break;
            }
            alpha = alpha.max(value);
        }

        value
    }

    /// A node where the opponent of the side to move at the root is to move.
    pub(crate) fn min_node<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        depth: usize,
        budget_factor: u64,
        alpha: Score,
        mut beta: Score,
    ) -> Score {
        self.nodes += 1;

        if self.is_leaf(depth, budget_factor) {
            return -self.leaf(position, -beta, -alpha);
        }

        let moves = position.legal_moves();
        if moves.is_empty() {
            return -Evaluator::new(position, self.config.weights).eval();
        }

        let budget_factor = budget_factor.saturating_mul(moves.len() as u64);
        let mut value = Score::INF;

        for mv in moves {
            let new = position.with_move_made(mv);
            value = value.min(self.max_node(&new, depth + 1, budget_factor, alpha, beta));

            if value <= alpha {
                break;
            }
            beta = beta.min(value);
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain minimax over the same tree as [`AlphaBeta`], without any pruning.
    fn minimax(
        config: &SearchConfig,
        position: &Antichess,
        depth: usize,
        budget_factor: u64,
        maximizing: bool,
    ) -> Score {
        let sign = if maximizing { 1.0 } else { -1.0 };
        let leaf = |pos: &Antichess| {
            let score = if is_quiet(pos) {
                Evaluator::new(pos, config.weights).eval()
            } else {
                let mut nodes = 0;
                quiescent_search(pos, -Score::INF, Score::INF, config.weights, &mut nodes)
            };
            score * sign
        };

        if depth >= config.max_depth || budget_factor >= config.max_nodes {
            return leaf(position);
        }

        let moves = position.legal_moves();
        if moves.is_empty() {
            return Evaluator::new(position, config.weights).eval() * sign;
        }

        let budget_factor = budget_factor * moves.len() as u64;
        let children = moves.into_iter().map(|mv| {
            let new = position.with_move_made(mv);
            minimax(config, &new, depth + 1, budget_factor, !maximizing)
        });

        if maximizing {
            children.fold(-Score::INF, Score::max)
        } else {
            children.fold(Score::INF, Score::min)
        }
    }

    fn best_by_minimax(config: &SearchConfig, position: &Antichess) -> Score {
        let moves = position.legal_moves();
        let factor = moves.len() as u64;
        moves
            .into_iter()
            .map(|mv| minimax(config, &position.with_move_made(mv), 1, factor, false))
            .fold(-Score::INF, Score::max)
    }

    #[test]
    fn test_pruning_does_not_change_result() {
        let config = SearchConfig {
            max_depth: 3,
            max_nodes: u64::MAX,
            threads: 2,
            ..Default::default()
        };
        let search = Search::new(config).unwrap();

        for fen in [
            "4k3/8/8/4p3/3P4/2P5/8/4K3 b - - 0 1",
            "4k3/3p4/8/8/8/8/4P3/4K3 w - - 0 1",
            "r3k3/8/8/8/8/8/8/R3K3 w - - 0 1",
        ] {
            let pos = Antichess::from_fen(fen).unwrap();
            let res = search.get_best_move(&pos);
            assert_eq!(res.score, best_by_minimax(&config, &pos), "{fen}");
        }
    }

    #[test]
    fn test_search_returns_capture_when_forced() {
        let search = Search::new(SearchConfig::default()).unwrap();
        let pos = Antichess::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        )
        .unwrap();

        let res = search.get_best_move(&pos);
        assert_eq!(res.bestmove.unwrap(), "e4d5");
        assert!(res.nodes > 0);
    }

    #[test]
    fn test_no_moves_has_no_bestmove() {
        let search = Search::new(SearchConfig::default()).unwrap();
        let pos = Antichess::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();

        let res = search.get_best_move(&pos);
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -Score::INF);
    }

    #[test]
    fn test_budget_bounds_the_tree() {
        let pos = Antichess::default();
        let narrow = SearchConfig {
            max_nodes: 20,
            ..Default::default()
        };

        // 20 root moves already reach the budget, so every child is a leaf
        let mut ab = AlphaBeta::new(&narrow);
        let child = pos.with_move_made(pos.legal_moves()[0]);
        ab.min_node(&child, 1, 20, -Score::INF, Score::INF);
        assert_eq!(ab.nodes, 1);
    }

    #[test]
    fn test_ties_go_to_first_move() {
        // Every move from the start leaves material level, so a material-only depth-1 search is a tie
        let config = SearchConfig {
            max_depth: 1,
            weights: EvalWeights {
                positional: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let search = Search::new(config).unwrap();
        let pos = Antichess::default();

        let res = search.get_best_move(&pos);
        assert_eq!(res.bestmove, pos.legal_moves().first().copied());
    }
}
