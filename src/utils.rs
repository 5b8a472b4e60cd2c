// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::PnlError;
use crate::models::max_amount;
use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Monthly inputs are never stored negative; the CLI refuses them outright,
/// along with anything above [`max_amount`].
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_sign_negative() && !d.is_zero() {
        bail!("Negative amount '{}' is not allowed", s.trim());
    }
    if d > max_amount() {
        bail!("Amount '{}' exceeds the maximum of {}", s.trim(), max_amount());
    }
    Ok(d)
}

/// Comma-separated amounts, Jan first. Blank entries count as zero.
pub fn parse_amount_list(s: &str) -> Result<Vec<Decimal>> {
    s.split(',')
        .map(|part| {
            if part.trim().is_empty() {
                Ok(Decimal::ZERO)
            } else {
                parse_amount(part)
            }
        })
        .collect()
}

pub fn parse_rate(name: &'static str, s: &str) -> Result<Decimal> {
    let value = parse_decimal(s)?;
    check_rate(name, value)?;
    Ok(value)
}

pub fn check_rate(name: &'static str, value: Decimal) -> std::result::Result<(), PnlError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(PnlError::InvalidRate { name, value });
    }
    Ok(())
}

/// Lowercase, each whitespace character becomes `_`.
pub fn slugify(name: &str) -> std::result::Result<String, PnlError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed.starts_with('.') {
        return Err(PnlError::InvalidBusinessName(name.to_string()));
    }
    Ok(trimmed
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase())
}

/// Best-effort inverse of [`slugify`]: `_` becomes a space and every word is
/// title-cased. Casing lost by slugging is not recovered.
pub fn unslugify(slug: &str) -> String {
    slug.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// `$1,234.56`, negatives as `-$1,234.56`.
pub fn fmt_money(d: Decimal) -> String {
    let rounded = d.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), frac)
}

pub fn fmt_percent(d: Decimal) -> String {
    format!("{:.2}%", d.round_dp(2))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn pretty_table<H: AsRef<str>>(headers: &[H], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(h.as_ref())));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn slug_lowercases_and_replaces_whitespace() {
        assert_eq!(slugify("Reclam Inc.").unwrap(), "reclam_inc.");
        assert_eq!(
            slugify("  Riverside Worship Ministries ").unwrap(),
            "riverside_worship_ministries"
        );
        assert_eq!(slugify("Two  Spaces").unwrap(), "two__spaces");
    }

    #[test]
    fn slug_rejects_empty_and_path_like_names() {
        assert!(slugify("   ").is_err());
        assert!(slugify("../etc").is_err());
        assert!(slugify("a/b").is_err());
    }

    #[test]
    fn unslug_title_cases_words() {
        assert_eq!(unslugify("reclam_inc."), "Reclam Inc.");
        assert_eq!(unslugify("distinct_ent."), "Distinct Ent.");
        // Lossy: original casing is gone.
        assert_eq!(unslugify(&slugify("ACME co").unwrap()), "Acme Co");
    }

    #[test]
    fn money_is_grouped_and_signed() {
        assert_eq!(fmt_money(dec!(0)), "$0.00");
        assert_eq!(fmt_money(dec!(1234.5)), "$1,234.50");
        assert_eq!(fmt_money(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(fmt_money(dec!(-600)), "-$600.00");
        assert_eq!(fmt_money(dec!(999)), "$999.00");
    }

    #[test]
    fn percent_has_two_places() {
        assert_eq!(fmt_percent(dec!(60)), "60.00%");
        assert_eq!(fmt_percent(dec!(-12.345)), "-12.34%");
    }

    #[test]
    fn amounts_reject_negatives_and_pad_blanks() {
        assert!(parse_amount("-1").is_err());
        assert_eq!(parse_amount(" 12.50 ").unwrap(), dec!(12.50));
        assert_eq!(
            parse_amount_list("1000, ,250").unwrap(),
            vec![dec!(1000), dec!(0), dec!(250)]
        );
    }

    #[test]
    fn amounts_are_capped_at_one_quadrillion() {
        assert_eq!(
            parse_amount("1000000000000000").unwrap(),
            dec!(1000000000000000)
        );
        assert!(parse_amount("1000000000000000.01").is_err());
        assert!(parse_amount("76000000000000000000000000000").is_err());
        assert!(parse_amount_list("1, 2, 5000000000000000").is_err());
    }

    #[test]
    fn rates_must_be_percentages() {
        assert_eq!(parse_rate("tax rate", "10").unwrap(), dec!(10));
        assert!(parse_rate("tax rate", "100.01").is_err());
        assert!(parse_rate("growth rate", "-0.5").is_err());
    }
}
