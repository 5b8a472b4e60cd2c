// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{PnlError, Result};
use crate::models::Month;
use crate::pnl::{DerivedReport, RowLabel};
use std::collections::BTreeSet;

pub const ALL_MONTHS: &str = "All";

/// Which months of a report to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthSelection {
    /// Twelve month rows plus the Total row.
    All,
    Single(Month),
    /// Exactly these months, calendar order, never a Total row.
    Many(BTreeSet<Month>),
}

impl MonthSelection {
    /// An empty list or a lone `All` selects everything; one name selects a
    /// single month; several names select that set. `All` cannot be combined
    /// with month names.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        match names {
            [] => Ok(MonthSelection::All),
            [only] if only.as_ref().trim().eq_ignore_ascii_case(ALL_MONTHS) => {
                Ok(MonthSelection::All)
            }
            [only] => Ok(MonthSelection::Single(only.as_ref().parse()?)),
            many => {
                let mut months = BTreeSet::new();
                for name in many {
                    let name = name.as_ref();
                    if name.trim().eq_ignore_ascii_case(ALL_MONTHS) {
                        return Err(PnlError::UnknownMonth(name.to_string()));
                    }
                    months.insert(name.parse::<Month>()?);
                }
                Ok(MonthSelection::Many(months))
            }
        }
    }

    pub fn includes_total(&self) -> bool {
        matches!(self, MonthSelection::All)
    }

    pub fn contains(&self, month: Month) -> bool {
        match self {
            MonthSelection::All => true,
            MonthSelection::Single(m) => *m == month,
            MonthSelection::Many(set) => set.contains(&month),
        }
    }
}

pub fn filter(report: &DerivedReport, selection: &MonthSelection) -> DerivedReport {
    let rows = report
        .rows
        .iter()
        .filter(|row| match row.month {
            RowLabel::Month(m) => selection.contains(m),
            RowLabel::Total => selection.includes_total(),
        })
        .cloned()
        .collect();
    DerivedReport {
        tax_rate: report.tax_rate,
        growth_rate: report.growth_rate,
        rows,
    }
}

/// Parses `names` and filters in one step.
pub fn filter_by_names<S: AsRef<str>>(report: &DerivedReport, names: &[S]) -> Result<DerivedReport> {
    let selection = MonthSelection::parse(names)?;
    Ok(filter(report, &selection))
}
