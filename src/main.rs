/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Result;
use clap::Parser;
use newt::{position_from, Cli, Engine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr, so that stdout only ever carries moves
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let position = position_from(cli.fen.as_deref())?;
    let mut engine = Engine::new(cli.config())?;

    engine.run(cli.color, position)
}
