// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::business::open_session;
use crate::commands::report::headers;
use crate::pnl::{ChartSeries, Column, DerivedReport, ReportRow};
use crate::session::Session;
use crate::store::StateStore;
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unknown format: {} (use csv|json)", other),
        }
    }
}

#[derive(Serialize)]
struct Charts {
    net_profit: ChartSeries,
    profit_margin: ChartSeries,
}

#[derive(Serialize)]
struct ReportExport<'a> {
    business: &'a str,
    year: String,
    tax_rate: Decimal,
    growth_rate: Decimal,
    generated_at: String,
    rows: &'a [ReportRow],
    charts: Charts,
}

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    let format: ExportFormat = m.get_one::<String>("format").unwrap().parse()?;
    let out = Path::new(m.get_one::<String>("out").unwrap().trim());
    let session = open_session(store, m)?;
    export_report(&session, format, out)?;
    println!("Exported P&L report to {}", out.display());
    Ok(())
}

/// Writes the full, unfiltered report.
pub fn export_report(session: &Session<'_>, format: ExportFormat, out: &Path) -> Result<()> {
    let report = session.report()?.rounded(2);
    match format {
        ExportFormat::Csv => write_csv(&report, out),
        ExportFormat::Json => {
            let state = session.state();
            let doc = ReportExport {
                business: state.business_name(),
                year: state.report_year(),
                tax_rate: report.tax_rate,
                growth_rate: report.growth_rate,
                generated_at: chrono::Utc::now().to_rfc3339(),
                rows: &report.rows,
                charts: Charts {
                    net_profit: report.series(Column::NetProfit),
                    profit_margin: report.series(Column::ProfitMargin),
                },
            };
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("Write {}", out.display()))
        }
    }
}

fn write_csv(report: &DerivedReport, out: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(out).with_context(|| format!("Create {}", out.display()))?;
    wtr.write_record(headers(report))?;
    for row in &report.rows {
        let mut record = vec![row.month.to_string()];
        record.extend(Column::ALL.iter().map(|c| {
            c.value(row)
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default()
        }));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
