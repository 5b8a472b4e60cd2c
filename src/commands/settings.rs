// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::business::open_session;
use crate::session::{
    BUSINESS_NAME_KEY, CUSTOM_CATEGORIES_KEY, GROWTH_RATE_KEY, REPORT_YEAR_KEY, TAX_RATE_KEY,
    WorkingState, shadowed_categories,
};
use crate::store::StateStore;
use crate::utils::{fmt_percent, maybe_print_json, parse_rate, pretty_table};
use anyhow::Result;
use serde_json::json;
use tracing::warn;

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    let mut session = open_session(store, m)?;
    let mut changed = false;
    {
        let state = session.state_mut();
        if let Some(raw) = m.get_one::<String>("tax-rate") {
            state.insert(TAX_RATE_KEY, parse_rate("tax rate", raw)?);
            changed = true;
        }
        if let Some(raw) = m.get_one::<String>("growth-rate") {
            state.insert(GROWTH_RATE_KEY, parse_rate("growth rate", raw)?);
            changed = true;
        }
        if let Some(year) = m.get_one::<String>("year") {
            state.insert(REPORT_YEAR_KEY, year.trim());
            changed = true;
        }
        if let Some(name) = m.get_one::<String>("name") {
            state.insert(BUSINESS_NAME_KEY, name.trim());
            changed = true;
        }
        if let Some(text) = m.get_one::<String>("custom-categories") {
            for label in shadowed_categories(text) {
                warn!(label = %label, "custom category shadows a standard category, ignoring");
            }
            state.insert(CUSTOM_CATEGORIES_KEY, text.as_str());
            // New categories start at zero.
            state.merge_defaults();
            changed = true;
        }
    }
    if changed {
        session.save()?;
    }

    let state = session.state();
    let info = json!({
        "business": state.business_name(),
        "year": state.report_year(),
        "tax_rate": state.tax_rate(),
        "growth_rate": state.growth_rate(),
        "custom_categories": state.custom_categories(),
    });
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &info)? {
        println!("{}", pretty_table(&["Setting", "Value"], settings_rows(state)));
    }
    Ok(())
}

pub fn settings_rows(state: &WorkingState) -> Vec<Vec<String>> {
    vec![
        vec!["Business Name".into(), state.business_name().to_string()],
        vec!["Year".into(), state.report_year()],
        vec!["Tax Rate".into(), fmt_percent(state.tax_rate())],
        vec!["Growth Rate".into(), fmt_percent(state.growth_rate())],
        vec!["Custom Categories".into(), state.custom_categories().join(", ")],
    ]
}
