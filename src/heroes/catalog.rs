use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::error::DataLoadError;

/// Baseline win rate for heroes the dataset has no number for
pub const DEFAULT_WIN_RATE: f64 = 50.0;

/// Legacy and internal hero names seen in match data, mapped to current names
const HERO_ALIASES: &[(&str, &str)] = &[
    ("nevermore", "shadow fiend"),
    ("wisp", "io"),
    ("windrunner", "windranger"),
    ("outworld devourer", "outworld destroyer"),
    ("furion", "natures prophet"),
];

static LEGACY_HEROES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+heroes\s*=\s*(\[.*?\])\s*,\s*heroes_bg").expect("valid regex")
});
static LEGACY_HEROES_WR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)heroes_wr\s*=\s*(\[.*?\])\s*,\s*win_rates").expect("valid regex")
});
static LEGACY_WIN_RATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)win_rates\s*=\s*(\[.*?\])\s*[,;]?\s*(?:(?:var|let|const)\s+)?update_time")
        .expect("valid regex")
});

/// Static hero statistics: baseline win rates and pairwise matchup advantages
///
/// Built once at startup and read-only afterwards. Indices follow the order
/// of the dataset's hero list.
#[derive(Debug, Clone)]
pub struct HeroCatalog {
    /// Map of normalized name (or alias) -> hero index
    index: HashMap<String, usize>,
    names: Vec<String>,
    win_rates: Vec<f64>,
    /// `matchups[row][col]`: advantage of hero `col` when facing hero `row`
    matchups: Vec<Vec<Option<f64>>>,
}

/// Lookup key for a hero name: lowercase ASCII letters and digits only
///
/// Diacritics are stripped by decomposing first, so "Über" and "uber"
/// share a key.
pub fn normalize(name: &str) -> String {
    name.nfkd()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

impl HeroCatalog {
    /// Build a catalog from already-decoded parts
    pub fn from_parts(
        names: Vec<String>,
        win_rates: Vec<Option<f64>>,
        matchups: Vec<Vec<Option<f64>>>,
    ) -> Self {
        let mut index = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            index.insert(normalize(name), idx);
        }

        for (alias, canonical) in HERO_ALIASES {
            let alias = normalize(alias);
            if index.contains_key(&alias) {
                continue;
            }
            if let Some(&idx) = index.get(&normalize(canonical)) {
                index.insert(alias, idx);
            }
        }

        let win_rates = (0..names.len())
            .map(|i| win_rates.get(i).copied().flatten().unwrap_or(DEFAULT_WIN_RATE))
            .collect();

        Self {
            index,
            names,
            win_rates,
            matchups,
        }
    }

    /// Load the dataset file (canonical JSON or legacy script text)
    pub fn load_from_file(path: &Path) -> Result<Self, DataLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self::parse(&content)?;
        info!(
            "Loaded {} heroes from {}",
            catalog.len(),
            path.display()
        );

        Ok(catalog)
    }

    /// Parse dataset text
    pub fn parse(text: &str) -> Result<Self, DataLoadError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DataLoadError::Empty);
        }

        let (heroes, heroes_wr, win_rates) = match canonical_fields(text) {
            Some(fields) => fields,
            None => {
                debug!("Hero dataset is not a JSON object, trying legacy layout");
                legacy_fields(text)?
            }
        };

        let raw_heroes = non_empty_array(heroes, "heroes")?;
        let raw_wr = non_empty_array(heroes_wr, "heroes_wr")?;
        let raw_matrix = non_empty_array(win_rates, "win_rates")?;

        let names: Vec<String> = serde_json::from_value(Value::Array(raw_heroes))
            .map_err(|source| DataLoadError::InvalidJson { field: "heroes", source })?;

        let win_rates = raw_wr
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Null => Ok(None),
                other => numeric(other)
                    .map(Some)
                    .ok_or(DataLoadError::InvalidNumber { field: "heroes_wr", index }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let matchups = raw_matrix.iter().map(matchup_row).collect();

        Ok(Self::from_parts(names, win_rates, matchups))
    }

    /// Hero index for a name as it appears in match data
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize(name)).copied()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    /// Baseline win rate (percent)
    pub fn win_rate(&self, idx: usize) -> f64 {
        self.win_rates[idx]
    }

    /// Advantage of hero `hero` when facing `opponent`; zero when unknown
    pub fn advantage(&self, opponent: usize, hero: usize) -> f64 {
        self.matchups
            .get(opponent)
            .and_then(|row| row.get(hero))
            .copied()
            .flatten()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `heroes`, `heroes_wr` and `win_rates` from a JSON object document
fn canonical_fields(text: &str) -> Option<(Value, Value, Value)> {
    if !text.starts_with('{') {
        return None;
    }

    let mut object = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => object,
        _ => return None,
    };

    Some((
        object.remove("heroes").unwrap_or(Value::Null),
        object.remove("heroes_wr").unwrap_or(Value::Null),
        object.remove("win_rates").unwrap_or(Value::Null),
    ))
}

/// The same three arrays pulled out of the legacy script text
fn legacy_fields(text: &str) -> Result<(Value, Value, Value), DataLoadError> {
    Ok((
        legacy_array(text, &LEGACY_HEROES, "heroes")?,
        legacy_array(text, &LEGACY_HEROES_WR, "heroes_wr")?,
        legacy_array(text, &LEGACY_WIN_RATES, "win_rates")?,
    ))
}

fn legacy_array(text: &str, pattern: &Regex, field: &'static str) -> Result<Value, DataLoadError> {
    let fragment = pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or(DataLoadError::MissingArray { field })?;

    serde_json::from_str(fragment.as_str())
        .map_err(|source| DataLoadError::InvalidJson { field, source })
}

fn non_empty_array(value: Value, field: &'static str) -> Result<Vec<Value>, DataLoadError> {
    match value {
        Value::Array(items) if !items.is_empty() => Ok(items),
        _ => Err(DataLoadError::MissingArray { field }),
    }
}

/// Each matrix cell is `null` or `[advantage, ...]`
fn matchup_row(row: &Value) -> Vec<Option<f64>> {
    row.as_array()
        .map(|cells| {
            cells
                .iter()
                .map(|cell| cell.as_array().and_then(|c| c.first()).and_then(numeric))
                .collect()
        })
        .unwrap_or_default()
}

/// A JSON number, or a string holding one
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
