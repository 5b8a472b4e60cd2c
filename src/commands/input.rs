// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::business::open_session;
use crate::models::{Month, MonthlySeries};
use crate::store::StateStore;
use crate::utils::{fmt_money, parse_amount, parse_amount_list};
use anyhow::{Result, anyhow};

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    let mut session = open_session(store, m)?;
    let requested = m.get_one::<String>("category").unwrap().trim().to_string();
    let label = session.state().resolve_category(&requested).ok_or_else(|| {
        anyhow!(
            "Unknown category '{}'; add it with `settings --custom-categories`",
            requested
        )
    })?;

    if let Some(values) = m.get_one::<String>("values") {
        let amounts = parse_amount_list(values)?;
        let series = MonthlySeries::from_partial(&label, &amounts)?;
        let total = series
            .total()
            .ok_or_else(|| anyhow!("Amounts for {} are too large to total", label))?;
        session.state_mut().set_series(&label, &series);
        session.save()?;
        println!(
            "Set {} for {}: {} for the year",
            label,
            session.profile().display_name,
            fmt_money(total)
        );
    } else {
        let month: Month = m.get_one::<String>("month").unwrap().parse()?;
        let amount = parse_amount(m.get_one::<String>("value").unwrap())?;
        session.state_mut().set_month(&label, month, amount);
        session.save()?;
        println!(
            "Set {} {} for {} to {}",
            label,
            month,
            session.profile().display_name,
            fmt_money(amount)
        );
    }
    Ok(())
}
