/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::Color;
use clap::Parser;

use crate::{
    EngineConfig, EvalWeights, SearchConfig, DEFAULT_DEPTH, DEFAULT_NODES, DEFAULT_OPENING,
    DEFAULT_THREADS,
};

/// Plays losing chess against an opponent on `stdin`.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// The color the engine plays: `w`, `white`, `b`, or `black`.
    #[arg(value_parser = parse_color)]
    pub color: Color,

    /// Maximum depth of the search, in plies.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Node allowance of the search.
    #[arg(short, long, default_value_t = DEFAULT_NODES)]
    pub nodes: u64,

    /// Number of threads evaluating root moves.
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Move to play first when the engine is White.
    #[arg(long, default_value = DEFAULT_OPENING)]
    pub opening: String,

    /// Search from the very first move instead of playing the opening move.
    #[arg(long, conflicts_with = "opening")]
    pub no_opening: bool,

    /// Search the known endings instead of playing them by technique.
    #[arg(long)]
    pub no_endgames: bool,

    /// Weight of the mobility term. Costly, so disabled by default.
    #[arg(long, default_value_t = 0.0)]
    pub mobility: f64,

    /// Seed for the endgame solver's tie-breaking.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start from this position instead of the standard one.
    #[arg(long)]
    pub fen: Option<String>,
}

impl Cli {
    /// Builds the engine's configuration from the command line.
    pub fn config(&self) -> EngineConfig {
        let weights = EvalWeights {
            mobility: self.mobility,
            ..Default::default()
        };

        EngineConfig {
            search: SearchConfig {
                max_depth: self.depth,
                max_nodes: self.nodes,
                threads: self.threads,
                weights,
            },
            opening: (!self.no_opening).then(|| self.opening.clone()),
            endgames: !self.no_endgames,
            seed: self.seed,
        }
    }
}

/// Parses a color case-insensitively, by initial or full name.
fn parse_color(s: &str) -> Result<Color, String> {
    match s.to_ascii_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => Err(format!("expected `w`, `white`, `b`, or `black`, got {s:?}")),
    }
}

/// A command sent to the engine while it waits for the opponent's move.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    rename_all = "lower",
    override_usage("<MOVE> | <COMMAND>")
)]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Shows all legal moves in the current position.
    Moves,

    /// Quit the engine.
    #[command(aliases = ["exit", "q"])]
    Quit,

    /// The opponent's move, in coordinate notation.
    #[command(skip)]
    Move { mv: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_case_insensitive() {
        for (arg, color) in [
            ("w", Color::White),
            ("W", Color::White),
            ("White", Color::White),
            ("b", Color::Black),
            ("BLACK", Color::Black),
        ] {
            let cli = Cli::try_parse_from(["newt", arg]).unwrap();
            assert_eq!(cli.color, color, "{arg}");
        }

        assert!(Cli::try_parse_from(["newt", "red"]).is_err());
        assert!(Cli::try_parse_from(["newt"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Cli::try_parse_from(["newt", "w"]).unwrap().config();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "newt",
            "b",
            "--depth",
            "2",
            "--nodes",
            "50",
            "--threads",
            "1",
            "--no-opening",
            "--no-endgames",
            "--mobility",
            "0.1",
            "--seed",
            "9",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(config.search.max_depth, 2);
        assert_eq!(config.search.max_nodes, 50);
        assert_eq!(config.search.threads, 1);
        assert_eq!(config.search.weights.mobility, 0.1);
        assert_eq!(config.opening, None);
        assert!(!config.endgames);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_custom_opening() {
        let cli = Cli::try_parse_from(["newt", "w", "--opening", "e2e3"]).unwrap();
        assert_eq!(cli.config().opening.as_deref(), Some("e2e3"));

        assert!(Cli::try_parse_from(["newt", "w", "--opening", "e2e3", "--no-opening"]).is_err());
    }

    #[test]
    fn test_engine_commands() {
        let parse = |s: &str| EngineCommand::try_parse_from(s.split_ascii_whitespace());

        assert!(matches!(parse("d"), Ok(EngineCommand::Display)));
        assert!(matches!(parse("display"), Ok(EngineCommand::Display)));
        assert!(matches!(parse("fen"), Ok(EngineCommand::Fen)));
        assert!(matches!(parse("quit"), Ok(EngineCommand::Quit)));

        // Moves aren't commands; the input handler forwards them as-is
        assert!(parse("b1c3").is_err());
    }
}
