/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Command-line arguments and the commands accepted while waiting for a move.
mod cli;

/// Technique for the known low-material endings.
mod endgame;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of losing chess positions.
mod eval;

/// Piece-square tables.
mod psqt;

/// Capture-only extension of the search past its horizon.
mod quiescence;

/// The chess rules the losing chess layer is built on.
mod rules;

/// Scores of positions.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Misc utility functions, constants, and types.
mod utils;

/// Forced captures and game outcomes of losing chess.
mod variant;

pub use cli::*;
pub use endgame::*;
pub use engine::*;
pub use eval::*;
pub use psqt::*;
pub use quiescence::*;
pub use rules::*;
pub use score::*;
pub use search::*;
pub use utils::*;
pub use variant::*;
