// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{PnlError, Result};
use crate::utils::{slugify, unslugify};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const MONTHS_PER_YEAR: usize = 12;

/// Largest amount accepted for a single month (one quadrillion).
pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; MONTHS_PER_YEAR] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the canonical three-letter labels, ignoring case and surrounding
/// whitespace. Full month names are rejected.
impl FromStr for Month {
    type Err = PnlError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PnlError::UnknownMonth(s.to_string()))
    }
}

/// The fixed series every business carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Revenue,
    TargetRevenue,
    Marketing,
    Salaries,
    Utilities,
    Rent,
    OtherExpenses,
    Cogs,
    TargetExpenses,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Revenue,
        Category::TargetRevenue,
        Category::Marketing,
        Category::Salaries,
        Category::Utilities,
        Category::Rent,
        Category::OtherExpenses,
        Category::Cogs,
        Category::TargetExpenses,
    ];

    pub const FIXED_EXPENSES: [Category; 5] = [
        Category::Marketing,
        Category::Salaries,
        Category::Utilities,
        Category::Rent,
        Category::OtherExpenses,
    ];

    /// Label used in persisted composite keys.
    pub fn label(self) -> &'static str {
        match self {
            Category::Revenue => "Revenue",
            Category::TargetRevenue => "Target Revenue",
            Category::Marketing => "Marketing",
            Category::Salaries => "Salaries",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::OtherExpenses => "Other Expenses",
            Category::Cogs => "COGS",
            Category::TargetExpenses => "Target Expenses",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
    }
}

/// Exactly twelve non-negative values, index 0 = Jan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthlySeries([Decimal; MONTHS_PER_YEAR]);

impl MonthlySeries {
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Negative entries are clamped to zero.
    pub fn new(values: [Decimal; MONTHS_PER_YEAR]) -> Self {
        Self(values.map(|v| v.max(Decimal::ZERO)))
    }

    /// Strict conversion: the slice must hold exactly twelve values.
    pub fn try_from_slice(label: &str, values: &[Decimal]) -> Result<Self> {
        let arr: [Decimal; MONTHS_PER_YEAR] =
            values.try_into().map_err(|_| PnlError::ShapeMismatch {
                label: label.to_string(),
                len: values.len(),
            })?;
        Ok(Self::new(arr))
    }

    /// Input-boundary conversion: trailing months that were not supplied
    /// default to zero, more than twelve values is an error.
    pub fn from_partial(label: &str, values: &[Decimal]) -> Result<Self> {
        if values.len() > MONTHS_PER_YEAR {
            return Err(PnlError::ShapeMismatch {
                label: label.to_string(),
                len: values.len(),
            });
        }
        let mut arr = [Decimal::ZERO; MONTHS_PER_YEAR];
        arr[..values.len()].copy_from_slice(values);
        Ok(Self::new(arr))
    }

    pub fn get(&self, month: Month) -> Decimal {
        self.0[month.index()]
    }

    pub fn set(&mut self, month: Month, value: Decimal) {
        self.0[month.index()] = value.max(Decimal::ZERO);
    }

    pub fn values(&self) -> &[Decimal; MONTHS_PER_YEAR] {
        &self.0
    }

    /// `None` when the year does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.0
            .iter()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
    }
}

/// Identity of one business. The slug keys its state file and logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessProfile {
    pub slug: String,
    pub display_name: String,
}

impl BusinessProfile {
    pub fn from_display_name(name: &str) -> Result<Self> {
        let slug = slugify(name)?;
        Ok(Self {
            slug,
            display_name: name.trim().to_string(),
        })
    }

    /// Builds a profile from a slug found on disk. The display name is a
    /// best-effort reconstruction; original casing is not recoverable.
    pub fn from_slug(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            display_name: unslugify(slug),
        }
    }
}

/// A value the state file can hold. Anything else is dropped on save.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Number(Decimal),
    Text(String),
    Sequence(Vec<Decimal>),
}

impl StateValue {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(StateValue::Bool(*b)),
            Value::Number(n) => decimal_from_number(n).map(StateValue::Number),
            Value::String(s) => Some(StateValue::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::Number(n) => decimal_from_number(n),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(StateValue::Sequence),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            StateValue::Bool(b) => Value::Bool(*b),
            StateValue::Number(d) => number_from_decimal(*d),
            StateValue::Text(s) => Value::String(s.clone()),
            StateValue::Sequence(items) => {
                Value::Array(items.iter().map(|d| number_from_decimal(*d)).collect())
            }
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            StateValue::Number(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Decimal> for StateValue {
    fn from(d: Decimal) -> Self {
        StateValue::Number(d)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::Text(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::Text(s)
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

// Numbers are read from their literal text so 1234.56 stays 1234.56.
fn decimal_from_number(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    let text = n.to_string();
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

// Written as exact decimal text; serde_json keeps it verbatim.
fn number_from_decimal(d: Decimal) -> Value {
    d.normalize()
        .to_string()
        .parse::<serde_json::Number>()
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
