/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Sender},
    thread,
};

use anyhow::{bail, Context, Result};
use chessie::{Color, Move};
use clap::Parser;

use crate::{
    Antichess, EndgameKind, EndgameSolver, EngineCommand, Evaluator, Rules, Search, SearchConfig,
    DEFAULT_OPENING,
};

/// Everything that determines how the [`Engine`] picks its moves.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Limits of the search, and the evaluation weights used at its leaves.
    pub search: SearchConfig,

    /// Move played on the engine's first turn, if it is White.
    pub opening: Option<String>,

    /// Whether known low-material endings are played by the [`EndgameSolver`] instead of searched.
    pub endgames: bool,

    /// Seed for the endgame solver's tie-breaking. Drawn from the OS if not set.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            opening: Some(String::from(DEFAULT_OPENING)),
            endgames: true,
            seed: None,
        }
    }
}

/// How the [`Engine`] should come up with a move for a single position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovePlan {
    /// Opening move on the first turn, then the endgame solver if the position is a known ending,
    /// and search otherwise.
    Auto,

    /// Search with the provided limits, regardless of the position.
    Search(SearchConfig),

    /// Use the solver for the provided ending.
    ///
    /// The position must actually be an ending of this kind.
    Endgame(EndgameKind),
}

/// The Newt losing chess engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,

    /// Alpha-beta search, along with its worker threads.
    search: Search,

    /// Technique for the known endings.
    solver: EndgameSolver,

    /// Whether the engine has yet to pick its first move.
    first_move: bool,
}

impl Engine {
    /// Constructs a new [`Engine`], spawning the search's worker threads.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let search = Search::new(config.search)?;
        let solver = EndgameSolver::new(config.seed);

        Ok(Self {
            config,
            search,
            solver,
            first_move: true,
        })
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Picks the move to play in `position`.
    ///
    /// Returns `None` if, and only if, `position` has no legal moves.
    #[inline(always)]
    pub fn choose_move<R: Rules>(&mut self, position: &Antichess<R>) -> Option<Move> {
        self.choose_move_with(position, MovePlan::Auto)
    }

    /// Picks the move to play in `position`, following `plan`.
    ///
    /// Returns `None` if, and only if, `position` has no legal moves.
    ///
    /// # Panics
    /// If `plan` is [`MovePlan::Endgame`] and `position` is not that kind of ending.
    pub fn choose_move_with<R: Rules>(
        &mut self,
        position: &Antichess<R>,
        plan: MovePlan,
    ) -> Option<Move> {
        match plan {
            MovePlan::Auto => {
                if std::mem::take(&mut self.first_move) {
                    if let Some(mv) = self.opening_move(position) {
                        return Some(mv);
                    }
                }

                match EndgameKind::classify(position).filter(|_| self.config.endgames) {
                    Some(kind) => self.solver.get_best_move(position, kind),
                    None => self.search.get_best_move(position).bestmove,
                }
            }

            MovePlan::Search(config) => self.search.get_best_move_with(position, &config).bestmove,

            MovePlan::Endgame(kind) => self.solver.get_best_move(position, kind),
        }
    }

    /// The configured opening move, if White is to move and it is legal.
    fn opening_move<R: Rules>(&self, position: &Antichess<R>) -> Option<Move> {
        let uci = self.config.opening.as_deref()?;
        if !position.side_to_move().is_white() {
            return None;
        }

        match position.rules().parse_move(uci) {
            Ok(mv) if position.is_legal(mv) => Some(mv),
            _ => {
                tracing::warn!("Opening move {uci:?} cannot be played here; searching instead");
                None
            }
        }
    }

    /// Picks a move for `position` and applies it.
    ///
    /// If the chosen move is rejected, the ply is retried with a plain search.
    fn play_move(&mut self, position: &mut Antichess) -> Result<Move> {
        if let Some(mv) = self.choose_move(position) {
            match position.make_move(mv) {
                Ok(()) => return Ok(mv),
                Err(err) => tracing::warn!("{err}; retrying with search"),
            }
        }

        let config = self.config.search;
        let mv = self
            .choose_move_with(position, MovePlan::Search(config))
            .context("No legal moves to play")?;
        position.make_move(mv)?;

        Ok(mv)
    }

    /// Plays a game as `color`, starting from `position`.
    ///
    /// Moves are read from `stdin` on a separate thread, and the engine's own moves are printed
    /// to `stdout`, one per line, in coordinate notation. Malformed or illegal moves are ignored.
    /// The game ends when it is over, on `quit`, or when `stdin` closes.
    pub fn run(&mut self, color: Color, mut position: Antichess) -> Result<()> {
        let (sender, receiver) = channel();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                tracing::debug!("Input handler thread stopping: {err}");
            }
        });

        tracing::info!("{} playing {color:?}", self.name());

        while position.outcome().is_none() {
            if position.side_to_move() == color {
                let mv = self.play_move(&mut position)?;
                println!("{mv}");
                continue;
            }

            let Ok(cmd) = receiver.recv() else {
                break;
            };

            match cmd {
                EngineCommand::Move { mv } => {
                    if let Err(err) = position.make_move_uci(&mv) {
                        tracing::debug!("Ignoring input: {err}");
                    }
                }

                EngineCommand::Display => println!("{position}"),

                EngineCommand::Eval => {
                    println!("{}", Evaluator::new(&position, self.config.search.weights));
                }

                EngineCommand::Fen => println!("{}", position.to_fen()),

                EngineCommand::Moves => {
                    let moves = position.legal_moves();
                    let moves_string = if moves.is_empty() {
                        String::from("(none)")
                    } else {
                        moves
                            .into_iter()
                            .map(|mv| mv.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    println!("{moves_string}");
                }

                EngineCommand::Quit => break,
            }
        }

        if let Some(outcome) = position.outcome() {
            tracing::info!("Game over: {outcome}");
        }

        Ok(())
    }
}

/// Loops endlessly to await input via `stdin`, sending every line through `sender` as a command,
/// or as a move if it isn't a known command.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line from stdin")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Quit)
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        let cmd = EngineCommand::try_parse_from(buf.split_ascii_whitespace()).unwrap_or_else(|_| {
            EngineCommand::Move {
                mv: buf.to_string(),
            }
        });

        sender
            .send(cmd)
            .context("Failed to send command to engine")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(EngineConfig {
            seed: Some(0),
            ..config
        })
        .unwrap()
    }

    #[test]
    fn test_opening_move_on_first_turn_only() {
        let mut engine = engine(EngineConfig::default());
        let pos = Antichess::from_fen(FEN_STARTPOS).unwrap();

        assert_eq!(engine.choose_move(&pos).unwrap(), "b1c3");

        // The opening is never repeated, even from the same position
        let second = engine.choose_move(&pos).unwrap();
        assert!(pos.is_legal(second));
    }

    #[test]
    fn test_explicit_plans_keep_the_opening() {
        let mut engine = engine(EngineConfig::default());
        let pos = Antichess::from_fen(FEN_STARTPOS).unwrap();

        let plan = MovePlan::Search(SearchConfig {
            max_depth: 1,
            ..Default::default()
        });
        assert!(engine.choose_move_with(&pos, plan).is_some());
        assert!(engine.first_move);

        assert_eq!(engine.choose_move(&pos).unwrap(), "b1c3");
        assert!(!engine.first_move);
    }

    #[test]
    fn test_no_opening_as_black() {
        let mut engine = engine(EngineConfig::default());
        let pos = Antichess::from_fen(
            "rnbqkbnr/pppppppp/8/8/8/2N5/PPPPPPPP/R1BQKBNR b KQkq - 1 1",
        )
        .unwrap();

        let mv = engine.choose_move(&pos).unwrap();
        assert!(pos.is_legal(mv));
        assert!(!engine.first_move);
    }

    #[test]
    fn test_illegal_opening_falls_back_to_search() {
        let mut engine = engine(EngineConfig {
            opening: Some(String::from("e2e5")),
            ..Default::default()
        });
        let pos = Antichess::from_fen(FEN_STARTPOS).unwrap();

        let mv = engine.choose_move(&pos).unwrap();
        assert!(pos.is_legal(mv));
        assert_ne!(mv, "e2e5");
    }

    #[test]
    fn test_endgames_use_the_solver() {
        let mut engine = engine(EngineConfig::default());
        let pos = Antichess::from_fen("8/8/8/8/8/1R6/8/k1K5 w - - 0 1").unwrap();
        assert_eq!(engine.choose_move(&pos).unwrap(), "b3a3");

        let plan = MovePlan::Endgame(EndgameKind::OneRook);
        assert_eq!(engine.choose_move_with(&pos, plan).unwrap(), "b3a3");
    }

    #[test]
    fn test_explicit_search_plan() {
        let mut engine = engine(EngineConfig::default());
        let pos = Antichess::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        )
        .unwrap();

        let plan = MovePlan::Search(SearchConfig {
            max_depth: 2,
            ..Default::default()
        });
        assert_eq!(engine.choose_move_with(&pos, plan).unwrap(), "e4d5");
    }

    #[test]
    fn test_no_move_when_game_is_over() {
        let mut engine = engine(EngineConfig::default());
        let pos = Antichess::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(engine.choose_move(&pos).is_none());
    }

    #[test]
    fn test_play_move_applies_it() {
        let mut engine = engine(EngineConfig::default());
        let mut pos = Antichess::default();

        let mv = engine.play_move(&mut pos).unwrap();
        assert_eq!(mv, "b1c3");
        assert_eq!(pos.last_move(), Some(mv));
        assert_eq!(pos.side_to_move(), Color::Black);
    }
}
