// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::business::open_session;
use crate::filter::filter_by_names;
use crate::pnl::Column;
use crate::store::StateStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    let key = m.get_one::<String>("metric").unwrap();
    let column = Column::from_key(key).ok_or_else(|| anyhow!("Unknown metric '{}'", key))?;
    let session = open_session(store, m)?;
    let months: Vec<&String> = m
        .get_many::<String>("month")
        .map(|v| v.collect())
        .unwrap_or_default();

    let series = filter_by_names(&session.report()?, &months)?
        .rounded(2)
        .series(column);

    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &series.points)? {
        let rows = series
            .points
            .iter()
            .map(|p| vec![p.month.to_string(), format!("{:.2}", p.value)])
            .collect();
        println!("{}", pretty_table(&["Month", series.name.as_str()], rows));
    }
    Ok(())
}
