// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::business::open_session;
use crate::session::{GROWTH_RATE_KEY, TAX_RATE_KEY, WorkingState};
use crate::store::StateStore;
use crate::utils::{check_rate, pretty_table};
use anyhow::Result;

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    let session = open_session(store, m)?;
    let mut rows = Vec::new();
    if let Some(e) = session.load_error() {
        rows.push(vec!["corrupt_state".into(), e.to_string()]);
    }
    rows.extend(diagnose(session.state()));

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(state: &WorkingState) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    // 1) Series whose category was removed from the custom list
    for label in state.orphaned_series() {
        rows.push(vec!["orphaned_series".into(), label]);
    }

    // 2) Month keys holding text or flags instead of amounts
    for key in state.non_numeric_series_keys() {
        rows.push(vec!["non_numeric_value".into(), key]);
    }

    // 3) Rates the calculator would refuse
    for (key, value) in [
        (TAX_RATE_KEY, state.tax_rate()),
        (GROWTH_RATE_KEY, state.growth_rate()),
    ] {
        if check_rate(key, value).is_err() {
            rows.push(vec![format!("invalid_{}", key), value.to_string()]);
        }
    }
    rows
}
