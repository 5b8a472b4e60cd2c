// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Flat-file persistence: one JSON object per business plus an optional logo.
//!
//! Every write goes to a temp file in the data directory and is renamed over
//! the target, so a crash mid-save never leaves a truncated state file.

use crate::error::{PnlError, Result};
use crate::models::StateValue;
use crate::utils::unslugify;
use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pnlboard", "pnlboard"));

static STATE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^stored_values_(.+)\.json$").expect("state file pattern is valid")
});

pub type StateMap = BTreeMap<String, StateValue>;

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Uses `dir` as-is; nothing is created until the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Opens the store at `dir`, or the platform data dir when `None`.
    pub fn open(dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let dir = match dir {
            Some(d) => d,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("stored_values_{}.json", slug))
    }

    pub fn logo_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("logo_{}.png", slug))
    }

    /// Missing file yields an empty mapping. Entries whose value is not a
    /// bool, number, string or numeric array are skipped.
    pub fn load(&self, slug: &str) -> Result<StateMap> {
        let path = self.state_path(slug);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(slug, "no state file, starting empty");
                return Ok(StateMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        let raw: Map<String, Value> = serde_json::from_str(&text)
            .map_err(|source| PnlError::CorruptState {
                path: path.clone(),
                source,
            })?;

        let mut state = StateMap::new();
        for (key, value) in raw {
            match StateValue::from_json(&value) {
                Some(v) => {
                    state.insert(key, v);
                }
                None => debug!(slug, key = %key, "skipping unsupported value"),
            }
        }
        debug!(slug, keys = state.len(), path = %path.display(), "loaded state");
        Ok(state)
    }

    /// Full overwrite of the business file with `state`.
    pub fn save(&self, slug: &str, state: &StateMap) -> Result<()> {
        let doc: Map<String, Value> = state
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .filter(|(_, v)| !v.is_null())
            .collect();
        let bytes = serde_json::to_vec(&doc)?;
        let path = self.state_path(slug);
        self.write_atomic(&path, &bytes)?;
        debug!(slug, keys = doc.len(), path = %path.display(), "saved state");
        Ok(())
    }

    /// Absent file is not an error.
    pub fn delete(&self, slug: &str) -> Result<()> {
        remove_if_present(&self.state_path(slug))?;
        info!(slug, "deleted state");
        Ok(())
    }

    /// Moves an unreadable state file aside so the next save does not
    /// destroy it. Earlier quarantined copies are kept: the first free name
    /// of `.json.corrupt`, `.json.corrupt.1`, ... is used. Returns the new
    /// location.
    pub fn quarantine(&self, slug: &str) -> Result<PathBuf> {
        let from = self.state_path(slug);
        let base = format!("stored_values_{}.json.corrupt", slug);
        let mut to = self.dir.join(&base);
        let mut n = 0u32;
        while to.exists() {
            n += 1;
            to = self.dir.join(format!("{}.{}", base, n));
        }
        fs::rename(&from, &to)?;
        debug!(slug, path = %to.display(), "moved corrupt state aside");
        Ok(to)
    }

    /// Slugs of every business with a state file.
    pub fn list_slugs(&self) -> Result<BTreeSet<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };
        let mut slugs = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(caps) = STATE_FILE.captures(name) {
                slugs.insert(caps[1].to_string());
            }
        }
        Ok(slugs)
    }

    /// Display names reconstructed from the slugs on disk. Lossy: casing and
    /// repeated whitespace in the original names are not recovered.
    pub fn list_businesses(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .list_slugs()?
            .iter()
            .map(|slug| unslugify(slug))
            .collect())
    }

    pub fn load_logo(&self, slug: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.logo_path(slug)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_logo(&self, slug: &str, bytes: &[u8]) -> Result<()> {
        self.write_atomic(&self.logo_path(slug), bytes)?;
        debug!(slug, size = bytes.len(), "saved logo");
        Ok(())
    }

    pub fn delete_logo(&self, slug: &str) -> Result<()> {
        remove_if_present(&self.logo_path(slug))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
