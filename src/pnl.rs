// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Profit & loss derivation.
//!
//! Every month is computed from that month's inputs alone; the Total row is
//! the column-wise sum of the twelve month rows. Profit margin is a ratio and
//! is left empty on the Total row.
//!
//! All arithmetic is checked: a figure that does not fit in a `Decimal` is
//! reported as [`PnlError::Overflow`] instead of panicking.

use crate::error::{PnlError, Result};
use crate::models::{Category, Month, MonthlySeries};
use crate::utils::check_rate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Raw monthly inputs for one business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PnlInputs {
    pub revenue: MonthlySeries,
    pub target_revenue: MonthlySeries,
    pub cogs: MonthlySeries,
    pub target_expenses: MonthlySeries,
    pub marketing: MonthlySeries,
    pub salaries: MonthlySeries,
    pub utilities: MonthlySeries,
    pub rent: MonthlySeries,
    pub other_expenses: MonthlySeries,
    /// User-declared expense categories, in declaration order.
    pub custom: Vec<(String, MonthlySeries)>,
}

impl PnlInputs {
    /// Builds inputs from loosely shaped sequences keyed by category label.
    ///
    /// Every supplied sequence must hold exactly twelve values. All standard
    /// categories and every label in `custom_labels` must be present.
    pub fn from_raw(
        series: &BTreeMap<String, Vec<Decimal>>,
        custom_labels: &[String],
    ) -> Result<Self> {
        let mut shaped = BTreeMap::new();
        for (label, values) in series {
            shaped.insert(label.as_str(), MonthlySeries::try_from_slice(label, values)?);
        }
        let take = |label: &str| -> Result<MonthlySeries> {
            shaped
                .get(label)
                .copied()
                .ok_or_else(|| PnlError::MissingSeries(label.to_string()))
        };

        let custom = custom_labels
            .iter()
            .map(|label| -> Result<(String, MonthlySeries)> {
                Ok((label.clone(), take(label)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            revenue: take(Category::Revenue.label())?,
            target_revenue: take(Category::TargetRevenue.label())?,
            cogs: take(Category::Cogs.label())?,
            target_expenses: take(Category::TargetExpenses.label())?,
            marketing: take(Category::Marketing.label())?,
            salaries: take(Category::Salaries.label())?,
            utilities: take(Category::Utilities.label())?,
            rent: take(Category::Rent.label())?,
            other_expenses: take(Category::OtherExpenses.label())?,
            custom,
        })
    }

    pub fn standard(&self, category: Category) -> &MonthlySeries {
        match category {
            Category::Revenue => &self.revenue,
            Category::TargetRevenue => &self.target_revenue,
            Category::Marketing => &self.marketing,
            Category::Salaries => &self.salaries,
            Category::Utilities => &self.utilities,
            Category::Rent => &self.rent,
            Category::OtherExpenses => &self.other_expenses,
            Category::Cogs => &self.cogs,
            Category::TargetExpenses => &self.target_expenses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLabel {
    Month(Month),
    Total,
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Month(m) => f.write_str(m.label()),
            RowLabel::Total => f.write_str("Total"),
        }
    }
}

impl Serialize for RowLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub month: RowLabel,
    pub revenue: Decimal,
    pub target_revenue: Decimal,
    pub revenue_variance: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub fixed_expenses: Decimal,
    pub custom_expenses: Decimal,
    pub total_expenses: Decimal,
    pub target_expenses: Decimal,
    pub expense_variance: Decimal,
    pub net_profit: Decimal,
    /// `None` only on the Total row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin_pct: Option<Decimal>,
    pub taxes: Decimal,
    pub net_profit_after_tax: Decimal,
    pub projected_revenue: Decimal,
    pub projected_expenses: Decimal,
    pub projected_net_profit: Decimal,
}

impl ReportRow {
    pub fn is_total(&self) -> bool {
        self.month == RowLabel::Total
    }

    fn for_month(
        inputs: &PnlInputs,
        month: Month,
        tax_rate: Decimal,
        growth_rate: Decimal,
    ) -> Result<Self> {
        let at = |s: &MonthlySeries| s.get(month);
        let ck = |v: Option<Decimal>, column: &'static str| checked(v, column, RowLabel::Month(month));
        let hundred = Decimal::ONE_HUNDRED;

        let revenue = at(&inputs.revenue);
        let cogs = at(&inputs.cogs);
        let target_revenue = at(&inputs.target_revenue);
        let target_expenses = at(&inputs.target_expenses);

        let fixed_expenses = ck(
            checked_sum(Category::FIXED_EXPENSES.iter().map(|c| at(inputs.standard(*c)))),
            "fixed-expenses",
        )?;
        let custom_expenses = ck(
            checked_sum(inputs.custom.iter().map(|(_, s)| at(s))),
            "custom-expenses",
        )?;
        let total_expenses = ck(fixed_expenses.checked_add(custom_expenses), "total-expenses")?;

        let gross_profit = ck(revenue.checked_sub(cogs), "gross-profit")?;
        let net_profit = ck(gross_profit.checked_sub(total_expenses), "net-profit")?;
        let profit_margin_pct = if revenue.is_zero() {
            Decimal::ZERO
        } else {
            ck(
                net_profit
                    .checked_div(revenue)
                    .and_then(|ratio| ratio.checked_mul(hundred)),
                "profit-margin",
            )?
        };

        // A loss produces a negative tax (a rebate); it is not clamped.
        let taxes = ck(net_profit.checked_mul(tax_rate / hundred), "taxes")?;
        let net_profit_after_tax = ck(net_profit.checked_sub(taxes), "net-profit-after-tax")?;

        let growth = Decimal::ONE + growth_rate / hundred;
        let projected_revenue = ck(revenue.checked_mul(growth), "projected-revenue")?;
        let projected_expenses = ck(total_expenses.checked_mul(growth), "projected-expenses")?;

        Ok(Self {
            month: RowLabel::Month(month),
            revenue,
            target_revenue,
            revenue_variance: ck(revenue.checked_sub(target_revenue), "revenue-variance")?,
            cogs,
            gross_profit,
            fixed_expenses,
            custom_expenses,
            total_expenses,
            target_expenses,
            expense_variance: ck(
                total_expenses.checked_sub(target_expenses),
                "expense-variance",
            )?,
            net_profit,
            profit_margin_pct: Some(profit_margin_pct),
            taxes,
            net_profit_after_tax,
            projected_revenue,
            projected_expenses,
            projected_net_profit: ck(
                projected_revenue.checked_sub(projected_expenses),
                "projected-net-profit",
            )?,
        })
    }

    fn total_of(rows: &[ReportRow]) -> Result<Self> {
        let sum = |column: &'static str, f: fn(&ReportRow) -> Decimal| {
            checked(checked_sum(rows.iter().map(f)), column, RowLabel::Total)
        };
        Ok(Self {
            month: RowLabel::Total,
            revenue: sum("revenue", |r| r.revenue)?,
            target_revenue: sum("target-revenue", |r| r.target_revenue)?,
            revenue_variance: sum("revenue-variance", |r| r.revenue_variance)?,
            cogs: sum("cogs", |r| r.cogs)?,
            gross_profit: sum("gross-profit", |r| r.gross_profit)?,
            fixed_expenses: sum("fixed-expenses", |r| r.fixed_expenses)?,
            custom_expenses: sum("custom-expenses", |r| r.custom_expenses)?,
            total_expenses: sum("total-expenses", |r| r.total_expenses)?,
            target_expenses: sum("target-expenses", |r| r.target_expenses)?,
            expense_variance: sum("expense-variance", |r| r.expense_variance)?,
            net_profit: sum("net-profit", |r| r.net_profit)?,
            profit_margin_pct: None,
            taxes: sum("taxes", |r| r.taxes)?,
            net_profit_after_tax: sum("net-profit-after-tax", |r| r.net_profit_after_tax)?,
            projected_revenue: sum("projected-revenue", |r| r.projected_revenue)?,
            projected_expenses: sum("projected-expenses", |r| r.projected_expenses)?,
            projected_net_profit: sum("projected-net-profit", |r| r.projected_net_profit)?,
        })
    }

    fn rounded(&self, dp: u32) -> Self {
        let r = |d: Decimal| d.round_dp(dp);
        Self {
            month: self.month,
            revenue: r(self.revenue),
            target_revenue: r(self.target_revenue),
            revenue_variance: r(self.revenue_variance),
            cogs: r(self.cogs),
            gross_profit: r(self.gross_profit),
            fixed_expenses: r(self.fixed_expenses),
            custom_expenses: r(self.custom_expenses),
            total_expenses: r(self.total_expenses),
            target_expenses: r(self.target_expenses),
            expense_variance: r(self.expense_variance),
            net_profit: r(self.net_profit),
            profit_margin_pct: self.profit_margin_pct.map(r),
            taxes: r(self.taxes),
            net_profit_after_tax: r(self.net_profit_after_tax),
            projected_revenue: r(self.projected_revenue),
            projected_expenses: r(self.projected_expenses),
            projected_net_profit: r(self.projected_net_profit),
        }
    }
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}

fn checked(value: Option<Decimal>, column: &'static str, row: RowLabel) -> Result<Decimal> {
    value.ok_or_else(|| PnlError::Overflow {
        column,
        month: row.to_string(),
    })
}

/// The computed P&L table: twelve month rows followed by a Total row, or a
/// filtered subset of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedReport {
    pub tax_rate: Decimal,
    pub growth_rate: Decimal,
    pub rows: Vec<ReportRow>,
}

impl DerivedReport {
    pub fn month_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| !r.is_total())
    }

    pub fn row(&self, month: Month) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.month == RowLabel::Month(month))
    }

    pub fn total(&self) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.is_total())
    }

    /// Per-month points of one column, Total row excluded.
    pub fn series(&self, column: Column) -> ChartSeries {
        let points = self
            .month_rows()
            .filter_map(|row| match row.month {
                RowLabel::Month(month) => Some(ChartPoint {
                    month,
                    value: column.value(row).unwrap_or(Decimal::ZERO),
                }),
                RowLabel::Total => None,
            })
            .collect();
        ChartSeries {
            name: column.header(self.tax_rate),
            points,
        }
    }

    pub fn rounded(&self, dp: u32) -> DerivedReport {
        DerivedReport {
            tax_rate: self.tax_rate,
            growth_rate: self.growth_rate,
            rows: self.rows.iter().map(|r| r.rounded(dp)).collect(),
        }
    }
}

/// Runs the full derivation. Rates are percentages in `[0, 100]`.
///
/// Fails with `InvalidRate` for a rate outside that range and with
/// `Overflow` when stored amounts are too large to derive from.
pub fn calculate(
    inputs: &PnlInputs,
    tax_rate: Decimal,
    growth_rate: Decimal,
) -> Result<DerivedReport> {
    check_rate("tax rate", tax_rate)?;
    check_rate("growth rate", growth_rate)?;

    let mut rows = Month::ALL
        .iter()
        .map(|m| ReportRow::for_month(inputs, *m, tax_rate, growth_rate))
        .collect::<Result<Vec<_>>>()?;
    let total = ReportRow::total_of(&rows)?;
    rows.push(total);

    Ok(DerivedReport {
        tax_rate,
        growth_rate,
        rows,
    })
}

/// Displayed columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Revenue,
    TargetRevenue,
    RevenueVariance,
    Cogs,
    GrossProfit,
    TotalExpenses,
    TargetExpenses,
    ExpenseVariance,
    NetProfit,
    ProfitMargin,
    Taxes,
    NetProfitAfterTax,
    ProjectedRevenue,
    ProjectedExpenses,
    ProjectedNetProfit,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Revenue,
        Column::TargetRevenue,
        Column::RevenueVariance,
        Column::Cogs,
        Column::GrossProfit,
        Column::TotalExpenses,
        Column::TargetExpenses,
        Column::ExpenseVariance,
        Column::NetProfit,
        Column::ProfitMargin,
        Column::Taxes,
        Column::NetProfitAfterTax,
        Column::ProjectedRevenue,
        Column::ProjectedExpenses,
        Column::ProjectedNetProfit,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Column::Revenue => "revenue",
            Column::TargetRevenue => "target-revenue",
            Column::RevenueVariance => "revenue-variance",
            Column::Cogs => "cogs",
            Column::GrossProfit => "gross-profit",
            Column::TotalExpenses => "total-expenses",
            Column::TargetExpenses => "target-expenses",
            Column::ExpenseVariance => "expense-variance",
            Column::NetProfit => "net-profit",
            Column::ProfitMargin => "profit-margin",
            Column::Taxes => "taxes",
            Column::NetProfitAfterTax => "net-profit-after-tax",
            Column::ProjectedRevenue => "projected-revenue",
            Column::ProjectedExpenses => "projected-expenses",
            Column::ProjectedNetProfit => "projected-net-profit",
        }
    }

    pub fn from_key(key: &str) -> Option<Column> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// The Taxes header carries the rate, e.g. `Taxes (10%)`.
    pub fn header(self, tax_rate: Decimal) -> String {
        match self {
            Column::Revenue => "Revenue".into(),
            Column::TargetRevenue => "Target Revenue".into(),
            Column::RevenueVariance => "Revenue Variance".into(),
            Column::Cogs => "COGS".into(),
            Column::GrossProfit => "Gross Profit".into(),
            Column::TotalExpenses => "Total Expenses".into(),
            Column::TargetExpenses => "Target Expenses".into(),
            Column::ExpenseVariance => "Expense Variance".into(),
            Column::NetProfit => "Net Profit".into(),
            Column::ProfitMargin => "Profit Margin (%)".into(),
            Column::Taxes => format!("Taxes ({}%)", tax_rate.normalize()),
            Column::NetProfitAfterTax => "Net Profit After Tax".into(),
            Column::ProjectedRevenue => "Projected Revenue".into(),
            Column::ProjectedExpenses => "Projected Expenses".into(),
            Column::ProjectedNetProfit => "Projected Net Profit".into(),
        }
    }

    pub fn value(self, row: &ReportRow) -> Option<Decimal> {
        let v = match self {
            Column::Revenue => row.revenue,
            Column::TargetRevenue => row.target_revenue,
            Column::RevenueVariance => row.revenue_variance,
            Column::Cogs => row.cogs,
            Column::GrossProfit => row.gross_profit,
            Column::TotalExpenses => row.total_expenses,
            Column::TargetExpenses => row.target_expenses,
            Column::ExpenseVariance => row.expense_variance,
            Column::NetProfit => row.net_profit,
            Column::ProfitMargin => return row.profit_margin_pct,
            Column::Taxes => row.taxes,
            Column::NetProfitAfterTax => row.net_profit_after_tax,
            Column::ProjectedRevenue => row.projected_revenue,
            Column::ProjectedExpenses => row.projected_expenses,
            Column::ProjectedNetProfit => row.projected_net_profit,
        };
        Some(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub month: Month,
    pub value: Decimal,
}

/// One plotted line: what the chart and export renderers consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}
