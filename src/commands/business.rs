// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::BusinessProfile;
use crate::session::Session;
use crate::store::StateStore;
use crate::utils::{fmt_percent, maybe_print_json, pretty_table, unslugify};
use anyhow::{Context, Result, bail};
use serde_json::json;
use std::path::Path;

const LOGO_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// The business named by `--business`, or the only one on disk.
pub fn resolve_profile(store: &StateStore, m: &clap::ArgMatches) -> Result<BusinessProfile> {
    if let Some(name) = m.get_one::<String>("business") {
        return Ok(BusinessProfile::from_display_name(name)?);
    }
    let slugs = store.list_slugs()?;
    let mut it = slugs.iter();
    match (it.next(), it.next()) {
        (Some(slug), None) => Ok(BusinessProfile::from_slug(slug)),
        (None, _) => bail!("No businesses yet; pass --business NAME to create one"),
        _ => {
            let names: Vec<String> = slugs.iter().map(|s| unslugify(s)).collect();
            bail!(
                "Several businesses found ({}); pass --business NAME",
                names.join(", ")
            )
        }
    }
}

/// Opens the selected business. An unreadable state file is logged once by
/// the session, which continues with defaults.
pub fn open_session<'a>(store: &'a StateStore, m: &clap::ArgMatches) -> Result<Session<'a>> {
    let profile = resolve_profile(store, m)?;
    Ok(Session::open(store, profile)?)
}

pub fn handle(store: &StateStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", _)) => list(store)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("reset", sub)) => {
            let mut session = open_session(store, sub)?;
            session.reset()?;
            println!("Reset all data for {}", session.profile().display_name);
        }
        Some(("logo", sub)) => logo(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(store: &StateStore) -> Result<()> {
    let data: Vec<Vec<String>> = store
        .list_slugs()?
        .into_iter()
        .map(|slug| vec![unslugify(&slug), slug])
        .collect();
    if data.is_empty() {
        println!("No businesses yet");
    } else {
        println!("{}", pretty_table(&["Business", "Key"], data));
    }
    Ok(())
}

fn show(store: &StateStore, sub: &clap::ArgMatches) -> Result<()> {
    let session = open_session(store, sub)?;
    let state = session.state();
    let profile = session.profile();
    let logo_size = session.logo()?.map(|b| b.len());
    let orphaned: Vec<String> = state.orphaned_series().into_iter().collect();
    let state_file = store.state_path(&profile.slug);

    let info = json!({
        "business": state.business_name(),
        "key": profile.slug,
        "year": state.report_year(),
        "tax_rate": state.tax_rate(),
        "growth_rate": state.growth_rate(),
        "custom_categories": state.custom_categories(),
        "orphaned_series": orphaned,
        "logo_bytes": logo_size,
        "state_file": state_file.display().to_string(),
        "saved": state_file.exists(),
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &info)? {
        return Ok(());
    }

    let rows = vec![
        vec!["Business".into(), state.business_name().to_string()],
        vec!["Key".into(), profile.slug.clone()],
        vec!["Year".into(), state.report_year()],
        vec!["Tax Rate".into(), fmt_percent(state.tax_rate())],
        vec!["Growth Rate".into(), fmt_percent(state.growth_rate())],
        vec!["Custom Categories".into(), state.custom_categories().join(", ")],
        vec!["Orphaned Series".into(), orphaned.join(", ")],
        vec![
            "Logo".into(),
            logo_size.map_or_else(|| "none".to_string(), |n| format!("{} bytes", n)),
        ],
        vec!["State File".into(), state_file.display().to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn logo(store: &StateStore, sub: &clap::ArgMatches) -> Result<()> {
    let session = open_session(store, sub)?;
    let name = &session.profile().display_name;
    if sub.get_flag("remove") {
        session.remove_logo()?;
        println!("Removed logo for {}", name);
        return Ok(());
    }

    let path = Path::new(sub.get_one::<String>("path").unwrap().trim());
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !LOGO_EXTENSIONS.contains(&ext.as_str()) {
        bail!(
            "Unsupported logo '{}' (use {})",
            path.display(),
            LOGO_EXTENSIONS.join("|")
        );
    }
    let bytes = std::fs::read(path).with_context(|| format!("Read logo {}", path.display()))?;
    session.set_logo(&bytes)?;
    println!("Stored {} byte logo for {}", bytes.len(), name);
    Ok(())
}
