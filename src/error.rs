// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PnlError {
    /// The state file exists but is not a flat JSON object.
    #[error("State file {} is corrupt: {source}", path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Series '{label}' has {len} values, expected 12")]
    ShapeMismatch { label: String, len: usize },

    #[error("Required series '{0}' is missing")]
    MissingSeries(String),

    #[error("Invalid {name} {value}: must be between 0 and 100")]
    InvalidRate { name: &'static str, value: Decimal },

    /// A derived figure does not fit in a `Decimal`.
    #[error("Amounts too large to compute {column} for {month}")]
    Overflow { column: &'static str, month: String },

    #[error("Unknown month '{0}' (use Jan..Dec or All)")]
    UnknownMonth(String),

    #[error("Invalid business name '{0}'")]
    InvalidBusinessName(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PnlError>;
