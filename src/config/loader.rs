//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{TabTreeError, TabTreeResult};

use super::types::EngineConfig;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> TabTreeResult<(EngineConfig, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: EngineConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| TabTreeError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from `explicit`, else the user config file, else defaults; then apply env overrides.
///
/// A broken file is logged and replaced by defaults.
pub fn load_or_default(explicit: Option<&Path>) -> (EngineConfig, Vec<ConfigWarning>) {
    let candidate = explicit.map(Path::to_path_buf).or_else(default_config_path);

    let (config, warnings) = match candidate {
        Some(path) if path.exists() => match load_with_warnings(&path) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                (EngineConfig::default(), Vec::new())
            }
        },
        _ => (EngineConfig::default(), Vec::new()),
    };

    (with_env_overrides(config), warnings)
}

/// `<config dir>/tabtree/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tabtree").join("config.toml"))
}

/// Apply environment variable overrides (TABTREE_* prefix)
pub fn with_env_overrides(config: EngineConfig) -> EngineConfig {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Apply overrides from any variable source
pub(crate) fn apply_overrides<F>(mut config: EngineConfig, lookup: F) -> EngineConfig
where
    F: Fn(&str) -> Option<String>,
{
    // TABTREE_CONFIRM_THRESHOLD
    if let Some(value) = parse_var(&lookup, "TABTREE_CONFIRM_THRESHOLD") {
        config.close.confirm_threshold = value;
    }

    // TABTREE_UNDO_WINDOW_SECS
    if let Some(value) = parse_var(&lookup, "TABTREE_UNDO_WINDOW_SECS") {
        config.close.undo_window_secs = value;
    }

    // TABTREE_DEBOUNCE_MS
    if let Some(value) = parse_var(&lookup, "TABTREE_DEBOUNCE_MS") {
        config.persistence.debounce_ms = value;
    }

    // TABTREE_SNAPSHOT_PATH
    if let Some(path) = lookup("TABTREE_SNAPSHOT_PATH").filter(|p| !p.trim().is_empty()) {
        config.persistence.path = Some(PathBuf::from(path));
    }

    // TABTREE_MIN_QUERY_LEN
    if let Some(value) = parse_var(&lookup, "TABTREE_MIN_QUERY_LEN") {
        config.search.min_query_len = value;
    }

    config
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring invalid environment override");
            None
        }
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "close",
        "confirm_threshold",
        "undo_window_secs",
        "persistence",
        "debounce_ms",
        "path",
        "search",
        "min_query_len",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
