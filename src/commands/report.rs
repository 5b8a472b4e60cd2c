// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::business::open_session;
use crate::filter::filter_by_names;
use crate::pnl::{Column, DerivedReport};
use crate::store::StateStore;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    let session = open_session(store, m)?;
    let months: Vec<&String> = m
        .get_many::<String>("month")
        .map(|v| v.collect())
        .unwrap_or_default();
    let report = filter_by_names(&session.report()?, &months)?;

    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report.rounded(2).rows)? {
        println!(
            "{} - {} P&L",
            session.state().business_name(),
            session.state().report_year()
        );
        println!("{}", pretty_table(&headers(&report), table_rows(&report)));
    }
    Ok(())
}

pub fn headers(report: &DerivedReport) -> Vec<String> {
    std::iter::once("Month".to_string())
        .chain(Column::ALL.iter().map(|c| c.header(report.tax_rate)))
        .collect()
}

/// Display cells; the margin cell is blank on the Total row.
pub fn table_rows(report: &DerivedReport) -> Vec<Vec<String>> {
    report
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.month.to_string())
                .chain(Column::ALL.iter().map(|c| match (c, c.value(row)) {
                    (_, None) => String::new(),
                    (Column::ProfitMargin, Some(v)) => fmt_percent(v),
                    (_, Some(v)) => fmt_money(v),
                }))
                .collect()
        })
        .collect()
}
