// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use pnlboard::{cli, commands, logging, store::StateStore};

fn main() -> Result<()> {
    logging::init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let store = StateStore::open(matches.get_one::<PathBuf>("data-dir").cloned())?;

    match matches.subcommand() {
        Some(("business", sub)) => commands::business::handle(&store, sub)?,
        Some(("input", sub)) => commands::input::handle(&store, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&store, sub)?,
        Some(("report", sub)) => commands::report::handle(&store, sub)?,
        Some(("chart", sub)) => commands::chart::handle(&store, sub)?,
        Some(("export", sub)) => commands::export::handle(&store, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
