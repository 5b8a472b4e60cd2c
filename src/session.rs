// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The working set of one business and the session that owns it.
//!
//! Monthly series live under composite keys `"{label}_{month_index}"`;
//! scalar settings live under their own keys. Keys this module does not
//! understand are carried through untouched.

use crate::error::{PnlError, Result};
use crate::models::{BusinessProfile, Category, Month, MonthlySeries, StateValue};
use crate::pnl::{DerivedReport, PnlInputs, calculate};
use crate::store::{StateMap, StateStore};
use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::collections::btree_map::Entry;
use tracing::{debug, info, warn};

pub const TAX_RATE_KEY: &str = "tax_rate";
pub const GROWTH_RATE_KEY: &str = "growth_rate";
pub const BUSINESS_NAME_KEY: &str = "business_name";
pub const REPORT_YEAR_KEY: &str = "report_year";
pub const CUSTOM_CATEGORIES_KEY: &str = "custom_categories";

pub const DEFAULT_CUSTOM_CATEGORIES: &str = "Taxes, Insurance";

pub fn default_tax_rate() -> Decimal {
    Decimal::TEN
}

pub fn default_growth_rate() -> Decimal {
    Decimal::new(5, 0)
}

pub fn series_key(label: &str, month: Month) -> String {
    format!("{}_{}", label, month.index())
}

/// Splits `"Target Revenue_3"` into `("Target Revenue", Mar)`.
pub fn parse_series_key(key: &str) -> Option<(&str, Month)> {
    let (label, index) = key.rsplit_once('_')?;
    if label.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = Month::from_index(index.parse().ok()?)?;
    Some((label, month))
}

/// Comma-separated labels: trimmed, blanks dropped, duplicates and names of
/// standard categories ignored.
pub fn parse_custom_categories(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut labels = Vec::new();
    for raw in text.split(',') {
        let label = raw.trim();
        if label.is_empty() {
            continue;
        }
        if Category::from_label(label).is_some() {
            continue;
        }
        if seen.insert(label.to_lowercase()) {
            labels.push(label.to_string());
        }
    }
    labels
}

/// Labels in `text` that name a standard category and so are dropped by
/// [`parse_custom_categories`]. Each is reported once, as first spelled.
pub fn shadowed_categories(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    text.split(',')
        .map(str::trim)
        .filter(|label| Category::from_label(label).is_some())
        .filter(|label| seen.insert(label.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct WorkingState {
    profile: BusinessProfile,
    values: StateMap,
}

impl WorkingState {
    pub fn new(profile: BusinessProfile) -> Self {
        Self {
            profile,
            values: StateMap::new(),
        }
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    pub fn values(&self) -> &StateMap {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Imports every loaded key that is not already present. In-memory
    /// values always win. Returns how many keys were imported.
    pub fn absorb(&mut self, loaded: StateMap) -> usize {
        let mut imported = 0;
        for (key, value) in loaded {
            if let Entry::Vacant(slot) = self.values.entry(key) {
                slot.insert(value);
                imported += 1;
            }
        }
        imported
    }

    /// Fills every missing setting and month with its default. Never
    /// overwrites a present key.
    pub fn merge_defaults(&mut self) {
        let year = chrono::Local::now().year().to_string();
        let name = self.profile.display_name.clone();
        self.insert_absent(TAX_RATE_KEY, default_tax_rate());
        self.insert_absent(GROWTH_RATE_KEY, default_growth_rate());
        self.insert_absent(BUSINESS_NAME_KEY, name);
        self.insert_absent(REPORT_YEAR_KEY, year);
        self.insert_absent(CUSTOM_CATEGORIES_KEY, DEFAULT_CUSTOM_CATEGORIES);

        for label in self.active_labels() {
            for month in Month::ALL {
                self.insert_absent(series_key(&label, month), Decimal::ZERO);
            }
        }
    }

    fn insert_absent(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Standard labels followed by the active custom ones.
    pub fn active_labels(&self) -> Vec<String> {
        Category::ALL
            .iter()
            .map(|c| c.label().to_string())
            .chain(self.custom_categories())
            .collect()
    }

    /// Re-derived from the free-text setting on every call.
    pub fn custom_categories(&self) -> Vec<String> {
        self.get(CUSTOM_CATEGORIES_KEY)
            .and_then(StateValue::as_text)
            .map(parse_custom_categories)
            .unwrap_or_default()
    }

    /// Canonical label for a user-typed category name, if it is standard or
    /// an active custom category.
    pub fn resolve_category(&self, name: &str) -> Option<String> {
        if let Some(c) = Category::from_label(name) {
            return Some(c.label().to_string());
        }
        let wanted = name.trim();
        self.custom_categories()
            .into_iter()
            .find(|c| c.eq_ignore_ascii_case(wanted))
    }

    /// Missing or non-numeric months read as zero.
    pub fn series(&self, label: &str) -> MonthlySeries {
        let mut series = MonthlySeries::zeros();
        for month in Month::ALL {
            let value = self
                .get(&series_key(label, month))
                .and_then(StateValue::as_decimal)
                .unwrap_or(Decimal::ZERO);
            series.set(month, value);
        }
        series
    }

    pub fn set_series(&mut self, label: &str, series: &MonthlySeries) {
        for month in Month::ALL {
            self.insert(series_key(label, month), series.get(month));
        }
    }

    pub fn set_month(&mut self, label: &str, month: Month, value: Decimal) {
        self.insert(series_key(label, month), value.max(Decimal::ZERO));
    }

    /// Labels that have stored months.
    pub fn series_labels(&self) -> BTreeSet<String> {
        self.values
            .keys()
            .filter_map(|k| parse_series_key(k))
            .map(|(label, _)| label.to_string())
            .collect()
    }

    /// Stored series that no longer count towards any total.
    pub fn orphaned_series(&self) -> BTreeSet<String> {
        let active: BTreeSet<String> = self.active_labels().into_iter().collect();
        self.series_labels()
            .into_iter()
            .filter(|label| !active.contains(label))
            .collect()
    }

    /// Composite series keys holding something other than a number.
    pub fn non_numeric_series_keys(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|(k, v)| parse_series_key(k).is_some() && v.as_decimal().is_none())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn tax_rate(&self) -> Decimal {
        self.decimal_setting(TAX_RATE_KEY)
            .unwrap_or_else(default_tax_rate)
    }

    pub fn growth_rate(&self) -> Decimal {
        self.decimal_setting(GROWTH_RATE_KEY)
            .unwrap_or_else(default_growth_rate)
    }

    pub fn business_name(&self) -> &str {
        self.get(BUSINESS_NAME_KEY)
            .and_then(StateValue::as_text)
            .unwrap_or(self.profile.display_name.as_str())
    }

    pub fn report_year(&self) -> String {
        match self.get(REPORT_YEAR_KEY) {
            Some(StateValue::Text(s)) => s.clone(),
            Some(StateValue::Number(d)) => d.normalize().to_string(),
            _ => chrono::Local::now().year().to_string(),
        }
    }

    fn decimal_setting(&self, key: &str) -> Option<Decimal> {
        self.get(key).and_then(StateValue::as_decimal)
    }

    pub fn pnl_inputs(&self) -> PnlInputs {
        let s = |c: Category| self.series(c.label());
        PnlInputs {
            revenue: s(Category::Revenue),
            target_revenue: s(Category::TargetRevenue),
            cogs: s(Category::Cogs),
            target_expenses: s(Category::TargetExpenses),
            marketing: s(Category::Marketing),
            salaries: s(Category::Salaries),
            utilities: s(Category::Utilities),
            rent: s(Category::Rent),
            other_expenses: s(Category::OtherExpenses),
            custom: self
                .custom_categories()
                .into_iter()
                .map(|label| {
                    let series = self.series(&label);
                    (label, series)
                })
                .collect(),
        }
    }
}

/// One business's working state bound to the store it came from.
#[derive(Debug)]
pub struct Session<'a> {
    store: &'a StateStore,
    state: WorkingState,
    load_error: Option<PnlError>,
}

impl<'a> Session<'a> {
    pub fn open(store: &'a StateStore, profile: BusinessProfile) -> Result<Self> {
        let (state, load_error) = Self::load_state(store, profile)?;
        Ok(Self {
            store,
            state,
            load_error,
        })
    }

    /// Replaces the whole working state with the one for `profile`.
    pub fn switch_business(&mut self, profile: BusinessProfile) -> Result<()> {
        let (state, load_error) = Self::load_state(self.store, profile)?;
        self.state = state;
        self.load_error = load_error;
        Ok(())
    }

    fn load_state(
        store: &StateStore,
        profile: BusinessProfile,
    ) -> Result<(WorkingState, Option<PnlError>)> {
        let mut state = WorkingState::new(profile);
        let slug = state.profile().slug.clone();
        let load_error = match store.load(&slug) {
            Ok(loaded) => {
                let imported = state.absorb(loaded);
                debug!(slug = %slug, imported, "absorbed persisted state");
                None
            }
            Err(e @ PnlError::CorruptState { .. }) => {
                let moved = store.quarantine(&slug)?;
                warn!(
                    slug = %slug,
                    error = %e,
                    moved = %moved.display(),
                    "continuing with default values"
                );
                Some(e)
            }
            Err(e) => return Err(e),
        };
        state.merge_defaults();

        let orphaned = state.orphaned_series();
        if !orphaned.is_empty() {
            info!(slug = %slug, ?orphaned, "series outside the active categories are ignored");
        }
        Ok((state, load_error))
    }

    pub fn profile(&self) -> &BusinessProfile {
        self.state.profile()
    }

    pub fn state(&self) -> &WorkingState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WorkingState {
        &mut self.state
    }

    /// Set when the state file was unreadable and defaults were used.
    pub fn load_error(&self) -> Option<&PnlError> {
        self.load_error.as_ref()
    }

    /// Pulls keys from disk that this session has not seen yet.
    pub fn reload(&mut self) -> Result<usize> {
        let loaded = self.store.load(&self.profile().slug)?;
        let imported = self.state.absorb(loaded);
        self.state.merge_defaults();
        Ok(imported)
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.profile().slug, self.state.values())
    }

    /// Deletes the persisted file and starts over from defaults. Nothing is
    /// written until the next save; the logo is kept.
    pub fn reset(&mut self) -> Result<()> {
        let profile = self.profile().clone();
        self.store.delete(&profile.slug)?;
        let mut state = WorkingState::new(profile);
        state.merge_defaults();
        self.state = state;
        self.load_error = None;
        Ok(())
    }

    pub fn report(&self) -> Result<DerivedReport> {
        calculate(
            &self.state.pnl_inputs(),
            self.state.tax_rate(),
            self.state.growth_rate(),
        )
    }

    pub fn logo(&self) -> Result<Option<Vec<u8>>> {
        self.store.load_logo(&self.profile().slug)
    }

    pub fn set_logo(&self, bytes: &[u8]) -> Result<()> {
        self.store.save_logo(&self.profile().slug, bytes)
    }

    pub fn remove_logo(&self) -> Result<()> {
        self.store.delete_logo(&self.profile().slug)
    }
}
