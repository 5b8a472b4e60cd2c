// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pnlboard::error::PnlError;
use pnlboard::filter::{MonthSelection, filter, filter_by_names};
use pnlboard::models::{Month, MonthlySeries};
use pnlboard::pnl::{Column, DerivedReport, PnlInputs, RowLabel, calculate};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

fn report() -> DerivedReport {
    let inputs = PnlInputs {
        revenue: MonthlySeries::new([dec!(100); 12]),
        cogs: MonthlySeries::new([dec!(40); 12]),
        ..Default::default()
    };
    calculate(&inputs, dec!(10), dec!(5)).unwrap()
}

fn labels(report: &DerivedReport) -> Vec<String> {
    report.rows.iter().map(|r| r.month.to_string()).collect()
}

#[test]
fn all_keeps_every_row_and_the_total() {
    let full = report();
    let filtered = filter_by_names::<&str>(&full, &[]).unwrap();
    assert_eq!(filtered, full);
    assert_eq!(filtered.rows.len(), 13);

    let explicit = filter_by_names(&full, &["All"]).unwrap();
    assert_eq!(explicit, full);
    let lower = filter_by_names(&full, &["all"]).unwrap();
    assert_eq!(lower.rows.len(), 13);
}

#[test]
fn single_month_drops_the_total() {
    let filtered = filter_by_names(&report(), &["Mar"]).unwrap();
    assert_eq!(labels(&filtered), vec!["Mar"]);
    assert!(filtered.total().is_none());
    assert_eq!(filtered.rows[0].month, RowLabel::Month(Month::Mar));
}

#[test]
fn several_months_come_back_in_calendar_order() {
    let filtered = filter_by_names(&report(), &["Mar", "jan", " Dec "]).unwrap();
    assert_eq!(labels(&filtered), vec!["Jan", "Mar", "Dec"]);
    assert!(filtered.total().is_none());

    let series = filtered.series(Column::NetProfit);
    assert_eq!(series.points.len(), 3);
    assert_eq!(series.points[0].value, dec!(60));
}

#[test]
fn unknown_names_are_rejected() {
    let full = report();
    assert!(matches!(
        filter_by_names(&full, &["Foo"]),
        Err(PnlError::UnknownMonth(name)) if name == "Foo"
    ));
    assert!(matches!(
        filter_by_names(&full, &["January"]),
        Err(PnlError::UnknownMonth(_))
    ));
    assert!(matches!(
        filter_by_names(&full, &["All", "Jan"]),
        Err(PnlError::UnknownMonth(name)) if name == "All"
    ));
}

#[test]
fn selection_parses_into_variants() {
    assert_eq!(MonthSelection::parse::<&str>(&[]).unwrap(), MonthSelection::All);
    assert_eq!(
        MonthSelection::parse(&["feb"]).unwrap(),
        MonthSelection::Single(Month::Feb)
    );
    let many = MonthSelection::parse(&["Jun", "Jun", "Jul"]).unwrap();
    assert_eq!(
        many,
        MonthSelection::Many(BTreeSet::from([Month::Jun, Month::Jul]))
    );
    assert!(!many.includes_total());
    assert!(many.contains(Month::Jul));
    assert!(!many.contains(Month::Aug));
}

#[test]
fn filtering_never_changes_row_values() {
    let full = report();
    let filtered = filter(&full, &MonthSelection::Single(Month::Aug));
    assert_eq!(filtered.rows[0], *full.row(Month::Aug).unwrap());
    assert_eq!(filtered.tax_rate, full.tax_rate);
}
