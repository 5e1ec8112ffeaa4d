//! Configuration loader reading the administrator's rule lists.
//!
//! Absence of configuration is a valid state: every loader returns an empty list
//! rather than an error so a broken option never blocks a page render.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::{CriticalScriptRule, PreloadLinkRule};

/// Option name holding the critical script rules.
pub const CRITICAL_SCRIPTS_OPTION: &str = "critical_scripts";

/// Option name holding the preload link rules.
pub const PRELOAD_LINKS_OPTION: &str = "preload_links";

/// File names probed by [`OptionStore::discover`], in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
  ["page-optimizer.json", "page-optimizer.yaml", "page-optimizer.yml"];

/// Key-value option storage owned by the host.
pub trait ConfigSource {
  /// Raw value stored under `name`, if any.
  fn option(&self, name: &str) -> Option<Value>;
}

impl ConfigSource for Map<String, Value> {
  fn option(&self, name: &str) -> Option<Value> {
    self.get(name).cloned()
  }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
  fn option(&self, name: &str) -> Option<Value> {
    (**self).option(name)
  }
}

/// Read the critical script rules from `source`.
pub fn load_critical_script_rules<S: ConfigSource + ?Sized>(source: &S) -> Vec<CriticalScriptRule> {
  let rules: Vec<CriticalScriptRule> = load_entries(source, CRITICAL_SCRIPTS_OPTION)
    .map(|(_, rule)| rule)
    .collect();
  tracing::debug!(count = rules.len(), "loaded critical script rules");
  rules
}

/// Read the preload link rules from `source`, tagging each with its list position.
pub fn load_preload_link_rules<S: ConfigSource + ?Sized>(source: &S) -> Vec<PreloadLinkRule> {
  let rules: Vec<PreloadLinkRule> = load_entries(source, PRELOAD_LINKS_OPTION)
    .map(|(index, rule)| PreloadLinkRule { index, ..rule })
    .collect();
  tracing::debug!(count = rules.len(), "loaded preload link rules");
  rules
}

/// Decode every well-formed entry of the list stored under `name`.
///
/// Entries that fail to decode are skipped but keep their slot, so positions
/// reported alongside later entries still match the stored list.
fn load_entries<S, T>(source: &S, name: &'static str) -> impl Iterator<Item = (usize, T)>
where
  S: ConfigSource + ?Sized,
  T: DeserializeOwned,
{
  let entries = match source.option(name) {
    Some(Value::Array(entries)) => entries,
    _ => Vec::new(),
  };

  entries
    .into_iter()
    .enumerate()
    .filter_map(move |(index, entry)| {
      if !entry.is_object() {
        tracing::warn!(option = name, index, "skipping non-object rule entry");
        return None;
      }
      match serde_json::from_value(entry) {
        Ok(rule) => Some((index, rule)),
        Err(err) => {
          tracing::warn!(option = name, index, error = %err, "skipping malformed rule entry");
          None
        }
      }
    })
}

/// In-memory option table, typically read from a JSON or YAML file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionStore {
  options: BTreeMap<String, Value>,
}

/// Errors that can occur while reading an option file.
#[derive(Debug)]
pub enum ConfigError {
  /// Failed to read the option file from disk.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON option file.
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// Failed to parse the YAML option file.
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_yaml::Error,
  },
}

impl OptionStore {
  /// Create an empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `name` to `value`, replacing any previous value.
  pub fn set(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
    self.options.insert(name.into(), value);
    self
  }

  /// Builder-style variant of [`OptionStore::set`].
  pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
    self.set(name, value);
    self
  }

  /// Look for a known option file in `dir`.
  ///
  /// When no file exists or it fails to parse we fall back to an empty store so
  /// rendering carries on without optimizations.
  pub fn discover(dir: &Path) -> Self {
    for file_name in DEFAULT_CONFIG_FILES {
      let candidate = dir.join(file_name);
      if !candidate.is_file() {
        continue;
      }
      match Self::load_from_path(&candidate) {
        Ok(store) => return store,
        Err(err) => {
          tracing::warn!(error = %err, "ignoring unreadable optimizer configuration");
          return Self::default();
        }
      }
    }
    Self::default()
  }

  /// Read options from a JSON or YAML file. A missing file yields an empty store.
  ///
  /// Files ending in `.yaml` or `.yml` are read as YAML, everything else as JSON.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(ConfigError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let options: Option<BTreeMap<String, Value>> = if is_yaml {
      serde_yaml::from_str(&contents).map_err(|err| ConfigError::Yaml {
        path: path.to_path_buf(),
        source: err,
      })?
    } else {
      serde_json::from_str(&contents).map_err(|err| ConfigError::Json {
        path: path.to_path_buf(),
        source: err,
      })?
    };

    Ok(Self {
      options: options.unwrap_or_default(),
    })
  }
}

impl ConfigSource for OptionStore {
  fn option(&self, name: &str) -> Option<Value> {
    self.options.get(name).cloned()
  }
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io { path, source } => {
        write!(f, "failed to read {}: {}", path.display(), source)
      }
      Self::Json { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
      Self::Yaml { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Json { source, .. } => Some(source),
      Self::Yaml { source, .. } => Some(source),
    }
  }
}
